use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod timedtext;
pub mod youtube;

use crate::video::VideoId;
use crate::Result;

/// A caption track as listed by the caption service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionTrack {
    /// Language code reported by the service (e.g. "en", "pt-BR")
    pub language_code: String,

    /// Human-readable language name
    pub language_name: String,

    /// True for auto-generated (speech recognition) tracks
    pub is_generated: bool,

    /// Service URL the track text is fetched from
    pub base_url: String,
}

/// Caption-retrieval service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch the text of a track in the first available of `languages`
    async fn fetch_by_language(&self, video: &VideoId, languages: &[String]) -> Result<String>;

    /// List every caption track of a video, in the order the service reports them
    async fn list_tracks(&self, video: &VideoId) -> Result<Vec<CaptionTrack>>;

    /// Fetch the text of one listed track
    async fn fetch_track(&self, video: &VideoId, track: &CaptionTrack) -> Result<String>;

    /// Name of the service, for status output
    fn source_name(&self) -> String;
}

/// Pick a track for `languages`: for each code in order, a manual track beats a generated one
pub fn find_track<'a>(tracks: &'a [CaptionTrack], languages: &[String]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|code| {
        tracks
            .iter()
            .find(|t| !t.is_generated && &t.language_code == code)
            .or_else(|| tracks.iter().find(|t| t.is_generated && &t.language_code == code))
    })
}

/// Fallback choice when no preferred language exists: first manual track, else first generated
pub fn select_fallback_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    tracks
        .iter()
        .find(|t| !t.is_generated)
        .or_else(|| tracks.iter().find(|t| t.is_generated))
}

/// Whether a language code denotes English
pub fn is_english(language_code: &str) -> bool {
    let code = language_code.to_ascii_lowercase();
    code == "en" || code.starts_with("en-")
}

#[cfg(test)]
pub(crate) fn track(code: &str, is_generated: bool) -> CaptionTrack {
    CaptionTrack {
        language_code: code.to_string(),
        language_name: code.to_uppercase(),
        is_generated,
        base_url: format!("https://www.youtube.com/api/timedtext?lang={}", code),
    }
}
