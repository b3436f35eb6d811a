use serde::{Deserialize, Serialize};

use crate::captions::{is_english, select_fallback_track, CaptionSource};
use crate::generate::{prompts, TextGenerator};
use crate::video::VideoId;
use crate::NotesError;

/// Language requested before falling back to whatever the video has
pub const PREFERRED_LANGUAGE: &str = "en";

/// Transcript acquired for one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Final English text
    pub text: String,

    /// Language code of the caption track the text came from
    pub language: String,

    /// Whether the text was machine-translated from `language`
    pub translated: bool,
}

/// Obtains a caption track for a video and brings it into English
pub struct TranscriptAcquirer<'a> {
    captions: &'a dyn CaptionSource,
    translator: &'a dyn TextGenerator,
}

impl<'a> TranscriptAcquirer<'a> {
    pub fn new(captions: &'a dyn CaptionSource, translator: &'a dyn TextGenerator) -> Self {
        Self {
            captions,
            translator,
        }
    }

    /// Fetch the transcript, preferring English, then the first manual track, then the first
    /// generated one. Non-English text is translated with a single generator call.
    pub async fn acquire(&self, video: &VideoId) -> Result<Transcript, NotesError> {
        let (text, language) = self.fetch_caption_text(video).await?;

        if is_english(&language) {
            return Ok(Transcript {
                text,
                language,
                translated: false,
            });
        }

        tracing::info!("Transcript is in {}, translating to English", language);

        let prompt = prompts::translation_prompt(&language, &text);
        let translated = self
            .translator
            .generate(&prompt)
            .await
            .map_err(|e| NotesError::Translation(format!("{:#}", e)))?;

        Ok(Transcript {
            text: translated,
            language,
            translated: true,
        })
    }

    async fn fetch_caption_text(&self, video: &VideoId) -> Result<(String, String), NotesError> {
        let (text, language) = self.fetch_any_track(video).await?;

        // An empty timedtext body parses to nothing
        if text.trim().is_empty() {
            return Err(NotesError::TranscriptUnavailable {
                video_id: video.to_string(),
                reason: format!("the {} caption track is empty", language),
            });
        }

        Ok((text, language))
    }

    async fn fetch_any_track(&self, video: &VideoId) -> Result<(String, String), NotesError> {
        let preferred = vec![PREFERRED_LANGUAGE.to_string()];

        match self.captions.fetch_by_language(video, &preferred).await {
            Ok(text) => return Ok((text, PREFERRED_LANGUAGE.to_string())),
            Err(e) => {
                tracing::warn!("No {} transcript for {}: {:#}", PREFERRED_LANGUAGE, video, e);
            }
        }

        let unavailable = |reason: String| NotesError::TranscriptUnavailable {
            video_id: video.to_string(),
            reason,
        };

        let tracks = self
            .captions
            .list_tracks(video)
            .await
            .map_err(|e| unavailable(format!("{:#}", e)))?;

        let track = select_fallback_track(&tracks)
            .ok_or_else(|| unavailable("the video has no caption tracks".to_string()))?;

        tracing::debug!(
            "Selected {} track in {}",
            if track.is_generated { "auto-generated" } else { "manual" },
            track.language_code
        );

        let text = self
            .captions
            .fetch_track(video, track)
            .await
            .map_err(|e| unavailable(format!("{:#}", e)))?;

        Ok((text, track.language_code.clone()))
    }
}
