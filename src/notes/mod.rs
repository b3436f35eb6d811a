use crate::generate::{prompts, TextGenerator};
use crate::NotesError;

/// Label that opens the notes section
pub const NOTES_MARKER: &str = "NOTES:";

/// Label that separates the notes from the summary
pub const SUMMARY_MARKER: &str = "SUMMARY:";

/// Raw generator output, expected to hold a notes section and a summary section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesDocument {
    raw: String,
}

impl NotesDocument {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Split into `(notes, summary)` when the text holds exactly one summary marker.
    ///
    /// The notes lose a leading `NOTES:` label; both parts are trimmed. Any other marker
    /// count means the document is unsectioned.
    pub fn sections(&self) -> Option<(String, String)> {
        let parts: Vec<&str> = self.raw.split(SUMMARY_MARKER).collect();
        let [notes, summary] = parts.as_slice() else {
            return None;
        };

        let notes = notes.trim();
        let notes = notes.strip_prefix(NOTES_MARKER).unwrap_or(notes).trim();

        Some((notes.to_string(), summary.trim().to_string()))
    }
}

/// Turns an English transcript into a notes document with one generator call
pub struct NotesGenerator<'a> {
    generator: &'a dyn TextGenerator,
}

impl<'a> NotesGenerator<'a> {
    pub fn new(generator: &'a dyn TextGenerator) -> Self {
        Self { generator }
    }

    pub async fn generate(&self, transcript: &str) -> Result<NotesDocument, NotesError> {
        let prompt = prompts::notes_prompt(transcript);

        let text = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| NotesError::Generation(format!("{:#}", e)))?;

        if text.trim().is_empty() {
            return Err(NotesError::Generation("the model returned an empty response".to_string()));
        }

        Ok(NotesDocument::new(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::MockTextGenerator;

    fn squash(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_sections_with_single_marker() {
        let doc = NotesDocument::new("NOTES:\n- point one\n- point two\n\nSUMMARY:\nShort recap.\n");
        let (notes, summary) = doc.sections().unwrap();
        assert_eq!(notes, "- point one\n- point two");
        assert_eq!(summary, "Short recap.");
    }

    #[test]
    fn test_sections_reconstruct_original() {
        let raw = "  NOTES:\nKey idea A\nKey idea B\nSUMMARY:  It was about A and B. ";
        let (notes, summary) = NotesDocument::new(raw).sections().unwrap();
        let rebuilt = format!("{}{}{}{}", NOTES_MARKER, notes, SUMMARY_MARKER, summary);
        assert_eq!(squash(&rebuilt), squash(raw));
    }

    #[test]
    fn test_sections_without_notes_label() {
        let (notes, summary) = NotesDocument::new("Just notes\nSUMMARY: recap").sections().unwrap();
        assert_eq!(notes, "Just notes");
        assert_eq!(summary, "recap");
    }

    #[test]
    fn test_only_leading_notes_label_is_stripped() {
        let raw = "Here are your notes:\nNOTES:\n- idea\nSUMMARY:\nrecap";
        let (notes, summary) = NotesDocument::new(raw).sections().unwrap();
        assert_eq!(notes, "Here are your notes:\nNOTES:\n- idea");
        assert_eq!(summary, "recap");

        let (notes, _) = NotesDocument::new("NOTES: see NOTES: below\nSUMMARY: s")
            .sections()
            .unwrap();
        assert_eq!(notes, "see NOTES: below");
    }

    #[test]
    fn test_unsectioned_documents() {
        assert!(NotesDocument::new("NOTES: only notes here").sections().is_none());
        assert!(NotesDocument::new("SUMMARY: one\nSUMMARY: two").sections().is_none());
        assert!(NotesDocument::new("").sections().is_none());
    }

    #[tokio::test]
    async fn test_generator_called_once_with_notes_prompt() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .withf(|prompt| prompt.contains("the transcript text") && prompt.contains("SUMMARY:"))
            .times(1)
            .returning(|_| Ok("NOTES: n\nSUMMARY: s".to_string()));

        let doc = NotesGenerator::new(&generator)
            .generate("the transcript text")
            .await
            .unwrap();
        assert_eq!(doc.raw(), "NOTES: n\nSUMMARY: s");
    }

    #[tokio::test]
    async fn test_generator_failure() {
        let mut generator = MockTextGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("Gemini API error (403): forbidden")));

        let err = NotesGenerator::new(&generator).generate("text").await.unwrap_err();
        assert!(matches!(err, NotesError::Generation(ref m) if m.contains("403")));
    }

    #[tokio::test]
    async fn test_blank_response_is_a_failure() {
        let mut generator = MockTextGenerator::new();
        generator.expect_generate().returning(|_| Ok("  \n".to_string()));

        let err = NotesGenerator::new(&generator).generate("text").await.unwrap_err();
        assert!(matches!(err, NotesError::Generation(_)));
    }
}
