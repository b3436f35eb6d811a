use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// URL shapes that carry a video id, tried in order
static VIDEO_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([a-zA-Z0-9_-]{11})",
        r"youtube\.com/watch\?.*?&v=([a-zA-Z0-9_-]{11})",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid video id pattern"))
    .collect()
});

/// An 11-character YouTube video identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    /// Extract the video id from a YouTube URL, or `None` if no known shape matches
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();

        VIDEO_ID_PATTERNS
            .iter()
            .find_map(|pattern| pattern.captures(input))
            .and_then(|caps| caps.get(1))
            .map(|m| VideoId(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filename stem shared by every file written for this video
    pub fn file_stem(&self) -> String {
        format!("video_{}", self.0)
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
