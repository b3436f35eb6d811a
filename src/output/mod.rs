use std::path::{Path, PathBuf};

use crate::notes::NotesDocument;
use crate::video::VideoId;
use crate::NotesError;

/// Files produced for one notes document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    /// Complete generator output
    pub full: PathBuf,

    /// Notes section, when the document was sectioned
    pub notes: Option<PathBuf>,

    /// Summary section, when the document was sectioned
    pub summary: Option<PathBuf>,
}

impl WrittenFiles {
    pub fn is_sectioned(&self) -> bool {
        self.notes.is_some() && self.summary.is_some()
    }
}

/// Writes run results as UTF-8 text files into one directory
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save the full document, plus notes and summary files when it splits cleanly
    pub fn write_notes(&self, doc: &NotesDocument, stem: &str) -> Result<WrittenFiles, NotesError> {
        let full = self.write_file(&format!("{}_full.txt", stem), doc.raw())?;

        let Some((notes, summary)) = doc.sections() else {
            tracing::debug!("Generator output has no single summary marker, saved full text only");
            return Ok(WrittenFiles {
                full,
                notes: None,
                summary: None,
            });
        };

        let notes = self.write_file(&format!("{}_notes.txt", stem), &notes)?;
        let summary = self.write_file(&format!("{}_summary.txt", stem), &summary)?;

        Ok(WrittenFiles {
            full,
            notes: Some(notes),
            summary: Some(summary),
        })
    }

    /// Save the transcript text as `video_<id>_transcript.txt`
    pub fn write_transcript(&self, video: &VideoId, text: &str) -> Result<PathBuf, NotesError> {
        self.write_file(&format!("{}_transcript.txt", video.file_stem()), text)
    }

    fn write_file(&self, filename: &str, content: &str) -> Result<PathBuf, NotesError> {
        if !self.dir.as_os_str().is_empty() && !self.dir.exists() {
            fs_err::create_dir_all(&self.dir).map_err(|source| NotesError::FileWrite {
                path: self.dir.clone(),
                source,
            })?;
        }

        let path = self.dir.join(filename);
        fs_err::write(&path, content).map_err(|source| NotesError::FileWrite {
            path: path.clone(),
            source,
        })?;

        tracing::debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read(path: &Path) -> String {
        fs_err::read_to_string(path).unwrap()
    }

    #[test]
    fn test_sectioned_document_writes_three_files() {
        let tmp = TempDir::new().unwrap();
        let writer = OutputWriter::new(tmp.path());
        let raw = "NOTES:\n- first\n- second\n\nSUMMARY:\nAll about firsts.\n";

        let files = writer
            .write_notes(&NotesDocument::new(raw), "video_abc12345678")
            .unwrap();

        assert!(files.is_sectioned());
        assert_eq!(files.full, tmp.path().join("video_abc12345678_full.txt"));
        assert_eq!(read(&files.full), raw);
        assert_eq!(read(files.notes.as_ref().unwrap()), "- first\n- second");
        assert_eq!(read(files.summary.as_ref().unwrap()), "All about firsts.");
    }

    #[test]
    fn test_unsectioned_document_writes_full_only() {
        let tmp = TempDir::new().unwrap();
        let writer = OutputWriter::new(tmp.path());

        for raw in ["no markers at all", "SUMMARY: a\nSUMMARY: b"] {
            let files = writer.write_notes(&NotesDocument::new(raw), "stem").unwrap();
            assert!(!files.is_sectioned());
            assert_eq!(read(&files.full), raw);
        }

        assert!(!tmp.path().join("stem_notes.txt").exists());
        assert!(!tmp.path().join("stem_summary.txt").exists());
    }

    #[test]
    fn test_write_transcript_filename() {
        let tmp = TempDir::new().unwrap();
        let writer = OutputWriter::new(tmp.path());
        let video = VideoId::parse("https://youtu.be/abc12345678").unwrap();

        let path = writer.write_transcript(&video, "line one\nline two").unwrap();
        assert_eq!(path, tmp.path().join("video_abc12345678_transcript.txt"));
        assert_eq!(read(&path), "line one\nline two");
    }

    #[test]
    fn test_creates_missing_output_dir() {
        let tmp = TempDir::new().unwrap();
        let writer = OutputWriter::new(tmp.path().join("nested").join("out"));

        let files = writer.write_notes(&NotesDocument::new("text"), "stem").unwrap();
        assert!(files.full.exists());
    }

    #[test]
    fn test_write_failure_names_path() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("occupied");
        fs_err::write(&blocker, "a file, not a directory").unwrap();

        let writer = OutputWriter::new(&blocker);
        let err = writer.write_notes(&NotesDocument::new("text"), "stem").unwrap_err();
        assert!(matches!(err, NotesError::FileWrite { .. }));
        assert_eq!(err.exit_code(), 5);
    }
}
