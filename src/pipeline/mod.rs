use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::captions::youtube::YoutubeCaptions;
use crate::captions::CaptionSource;
use crate::config::{ApiKey, Config};
use crate::generate::gemini::Gemini;
use crate::generate::TextGenerator;
use crate::notes::NotesGenerator;
use crate::output::{OutputWriter, WrittenFiles};
use crate::transcript::{Transcript, TranscriptAcquirer};
use crate::utils;
use crate::video::VideoId;
use crate::NotesError;

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub video_id: VideoId,

    /// Language of the caption track used
    pub language: String,

    /// Whether the transcript was translated to English
    pub translated: bool,

    pub transcript_path: PathBuf,

    /// Notes files; `None` for transcript-only runs
    pub files: Option<WrittenFiles>,

    pub elapsed: Duration,
}

/// Main notes pipeline
pub struct NotesPipeline {
    captions: Box<dyn CaptionSource>,
    generator: Box<dyn TextGenerator>,
    writer: OutputWriter,
    quiet: bool,
}

impl NotesPipeline {
    /// Build the pipeline against YouTube and Gemini
    pub fn new(config: &Config, api_key: &ApiKey, quiet: bool) -> Result<Self, NotesError> {
        let timeout = config.request_timeout();

        let captions = YoutubeCaptions::new(timeout)
            .map_err(|e| NotesError::Config(format!("Failed to create HTTP client: {}", e)))?;
        let generator = Gemini::new(
            api_key.expose(),
            config.gemini.endpoint.clone(),
            config.gemini.model.clone(),
            timeout,
        )
        .map_err(|e| NotesError::Config(format!("Failed to create Gemini client: {}", e)))?;

        Ok(Self::with_services(
            Box::new(captions),
            Box::new(generator),
            OutputWriter::new(config.output_dir()),
            quiet,
        ))
    }

    /// Build the pipeline from explicit collaborators
    pub fn with_services(
        captions: Box<dyn CaptionSource>,
        generator: Box<dyn TextGenerator>,
        writer: OutputWriter,
        quiet: bool,
    ) -> Self {
        Self {
            captions,
            generator,
            writer,
            quiet,
        }
    }

    /// Transcript, notes and summary for the video at `url`
    pub async fn run(&self, url: &str) -> Result<RunReport, NotesError> {
        let start = Instant::now();
        let (video, transcript, transcript_path) = self.prepare(url).await?;

        self.status(&format!(
            "📝 Generating notes with {}... (Original language: {})",
            self.generator.model_name(),
            transcript.language
        ));

        let progress = utils::spinner("Waiting for notes and summary...", self.quiet);
        let generated = NotesGenerator::new(self.generator.as_ref())
            .generate(&transcript.text)
            .await;
        progress.finish_and_clear();
        let doc = generated?;

        let files = self.writer.write_notes(&doc, &video.file_stem())?;

        if files.is_sectioned() {
            self.status("✅ Files saved successfully:");
            self.status(&format!("   - {} (Complete notes and summary)", files.full.display()));
            if let (Some(notes), Some(summary)) = (&files.notes, &files.summary) {
                self.status(&format!("   - {} (Just the notes)", notes.display()));
                self.status(&format!("   - {} (Just the summary)", summary.display()));
            }
        } else {
            self.status(&format!("✅ Full content saved to: {}", files.full.display()));
        }

        let elapsed = start.elapsed();
        self.status(&format!(
            "✅ Processing complete! ({})",
            utils::format_duration(elapsed.as_secs_f64())
        ));

        Ok(RunReport {
            video_id: video,
            language: transcript.language,
            translated: transcript.translated,
            transcript_path,
            files: Some(files),
            elapsed,
        })
    }

    /// Fetch and save the transcript for the video at `url`, without generating notes
    pub async fn run_transcript_only(&self, url: &str) -> Result<RunReport, NotesError> {
        let start = Instant::now();
        let (video, transcript, transcript_path) = self.prepare(url).await?;

        Ok(RunReport {
            video_id: video,
            language: transcript.language,
            translated: transcript.translated,
            transcript_path,
            files: None,
            elapsed: start.elapsed(),
        })
    }

    /// Parse the URL, acquire the transcript and save it
    async fn prepare(&self, url: &str) -> Result<(VideoId, Transcript, PathBuf), NotesError> {
        let video = VideoId::parse(url).ok_or_else(|| NotesError::InvalidUrl(url.trim().to_string()))?;
        tracing::info!("Processing video {}", video);
        self.status(&format!("🎥 Processing video ID: {}", video));

        let progress = utils::spinner(
            format!("Fetching captions from {}...", self.captions.source_name()),
            self.quiet,
        );
        let acquired = TranscriptAcquirer::new(self.captions.as_ref(), self.generator.as_ref())
            .acquire(&video)
            .await;
        progress.finish_and_clear();
        let transcript = acquired?;

        if transcript.translated {
            self.status(&format!(
                "🌐 Transcript in {}. Translated to English using {}",
                transcript.language,
                self.generator.model_name()
            ));
        }

        let transcript_path = self.writer.write_transcript(&video, &transcript.text)?;
        self.status(&format!(
            "✅ Raw transcript saved to: {} ({} words)",
            transcript_path.display(),
            utils::word_count(&transcript.text)
        ));

        Ok((video, transcript, transcript_path))
    }

    fn status(&self, line: &str) {
        if !self.quiet {
            println!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::captions::{track, MockCaptionSource};
    use crate::generate::MockTextGenerator;
    use tempfile::TempDir;

    const URL: &str = "https://www.youtube.com/watch?v=abc12345678";

    fn pipeline(captions: MockCaptionSource, generator: MockTextGenerator, tmp: &TempDir) -> NotesPipeline {
        NotesPipeline::with_services(
            Box::new(captions),
            Box::new(generator),
            OutputWriter::new(tmp.path()),
            true,
        )
    }

    fn generator_with(response: &'static str, calls: usize) -> MockTextGenerator {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .times(calls)
            .returning(move |_| Ok(response.to_string()));
        generator
            .expect_model_name()
            .returning(|| "gemini-1.5-flash".to_string());
        generator
    }

    #[tokio::test]
    async fn test_end_to_end_english_video() {
        let tmp = TempDir::new().unwrap();

        let mut captions = MockCaptionSource::new();
        captions
            .expect_fetch_by_language()
            .withf(|video, _| video.as_str() == "abc12345678")
            .times(1)
            .returning(|_, _| Ok("Welcome to the lecture.\nToday: ownership.".to_string()));
        captions.expect_list_tracks().never();
        captions
            .expect_source_name()
            .returning(|| "YouTube".to_string());

        let generator = generator_with(
            "NOTES:\n- Ownership basics\n\nSUMMARY:\nA lecture on ownership.",
            1,
        );

        let report = pipeline(captions, generator, &tmp).run(URL).await.unwrap();

        assert_eq!(report.video_id.as_str(), "abc12345678");
        assert_eq!(report.language, "en");
        assert!(!report.translated);

        let dir = tmp.path();
        assert_eq!(report.transcript_path, dir.join("video_abc12345678_transcript.txt"));
        assert_eq!(
            fs_err::read_to_string(dir.join("video_abc12345678_transcript.txt")).unwrap(),
            "Welcome to the lecture.\nToday: ownership."
        );
        assert_eq!(
            fs_err::read_to_string(dir.join("video_abc12345678_full.txt")).unwrap(),
            "NOTES:\n- Ownership basics\n\nSUMMARY:\nA lecture on ownership."
        );
        assert_eq!(
            fs_err::read_to_string(dir.join("video_abc12345678_notes.txt")).unwrap(),
            "- Ownership basics"
        );
        assert_eq!(
            fs_err::read_to_string(dir.join("video_abc12345678_summary.txt")).unwrap(),
            "A lecture on ownership."
        );
        assert!(report.files.unwrap().is_sectioned());
    }

    #[tokio::test]
    async fn test_translated_video_uses_generator_twice() {
        let tmp = TempDir::new().unwrap();

        let mut captions = MockCaptionSource::new();
        captions
            .expect_fetch_by_language()
            .returning(|_, _| Err(anyhow::anyhow!("no en")));
        captions
            .expect_list_tracks()
            .returning(|_| Ok(vec![track("es", true)]));
        captions
            .expect_fetch_track()
            .returning(|_, _| Ok("hola".to_string()));
        captions
            .expect_source_name()
            .returning(|| "YouTube".to_string());

        let mut generator = MockTextGenerator::new();
        let mut seq = mockall::Sequence::new();
        generator
            .expect_generate()
            .withf(|p| p.contains("to English"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("hello".to_string()));
        generator
            .expect_generate()
            .withf(|p| p.contains("hello") && p.contains("NOTES:"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("unsectioned output".to_string()));
        generator
            .expect_model_name()
            .returning(|| "gemini-1.5-flash".to_string());

        let report = pipeline(captions, generator, &tmp).run(URL).await.unwrap();

        assert_eq!(report.language, "es");
        assert!(report.translated);
        assert_eq!(
            fs_err::read_to_string(&report.transcript_path).unwrap(),
            "hello"
        );
        let files = report.files.unwrap();
        assert!(!files.is_sectioned());
        assert!(!tmp.path().join("video_abc12345678_notes.txt").exists());
    }

    #[tokio::test]
    async fn test_invalid_url_stops_before_any_call() {
        let tmp = TempDir::new().unwrap();

        let mut captions = MockCaptionSource::new();
        captions.expect_fetch_by_language().never();
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();

        let err = pipeline(captions, generator, &tmp)
            .run("https://vimeo.com/12345")
            .await
            .unwrap_err();
        assert!(matches!(err, NotesError::InvalidUrl(ref u) if u == "https://vimeo.com/12345"));
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_no_transcript_writes_nothing() {
        let tmp = TempDir::new().unwrap();

        let mut captions = MockCaptionSource::new();
        captions
            .expect_fetch_by_language()
            .returning(|_, _| Err(anyhow::anyhow!("no en")));
        captions.expect_list_tracks().returning(|_| Ok(vec![]));
        captions
            .expect_source_name()
            .returning(|| "YouTube".to_string());
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();

        let err = pipeline(captions, generator, &tmp).run(URL).await.unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_empty_transcript_writes_nothing() {
        let tmp = TempDir::new().unwrap();

        let mut captions = MockCaptionSource::new();
        captions
            .expect_fetch_by_language()
            .times(1)
            .returning(|_, _| Ok(String::new()));
        captions
            .expect_source_name()
            .returning(|| "YouTube".to_string());
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();

        let err = pipeline(captions, generator, &tmp).run(URL).await.unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_transcript() {
        let tmp = TempDir::new().unwrap();

        let mut captions = MockCaptionSource::new();
        captions
            .expect_fetch_by_language()
            .returning(|_, _| Ok("english text".to_string()));
        captions
            .expect_source_name()
            .returning(|| "YouTube".to_string());

        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("Gemini API error (500): boom")));
        generator
            .expect_model_name()
            .returning(|| "gemini-1.5-flash".to_string());

        let err = pipeline(captions, generator, &tmp).run(URL).await.unwrap_err();
        assert!(matches!(err, NotesError::Generation(_)));
        assert!(tmp.path().join("video_abc12345678_transcript.txt").exists());
        assert!(!tmp.path().join("video_abc12345678_full.txt").exists());
    }

    #[tokio::test]
    async fn test_transcript_only_skips_generation() {
        let tmp = TempDir::new().unwrap();

        let mut captions = MockCaptionSource::new();
        captions
            .expect_fetch_by_language()
            .returning(|_, _| Ok("just the transcript".to_string()));
        captions
            .expect_source_name()
            .returning(|| "YouTube".to_string());

        let mut generator = MockTextGenerator::new();
        generator.expect_generate().never();

        let report = pipeline(captions, generator, &tmp)
            .run_transcript_only("https://youtu.be/abc12345678")
            .await
            .unwrap();
        assert!(report.files.is_none());
        assert_eq!(
            fs_err::read_to_string(report.transcript_path).unwrap(),
            "just the transcript"
        );
    }
}
