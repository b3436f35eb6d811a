use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header, Client, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

use super::{find_track, timedtext, CaptionSource, CaptionTrack};
use crate::video::VideoId;
use crate::Result;

const INNERTUBE_PLAYER_URL: &str = "https://www.youtube.com/youtubei/v1/player";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

static INNERTUBE_API_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("valid api key pattern")
});

/// Failures reported by the YouTube caption service
#[derive(thiserror::Error, Debug)]
pub enum CaptionError {
    #[error("Transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    #[error("No transcript found for video {video_id} in languages {languages:?}")]
    NoTranscriptFound {
        video_id: String,
        languages: Vec<String>,
    },

    #[error("Video {0} is unavailable")]
    VideoUnavailable(String),

    #[error("Video {0} is age restricted")]
    AgeRestricted(String),

    #[error("Video {video_id} is unplayable: {reason}")]
    VideoUnplayable { video_id: String, reason: String },

    #[error("YouTube is blocking requests from this IP (video {0})")]
    IpBlocked(String),

    #[error("YouTube asked to confirm this is not a bot (video {0})")]
    RequestBlocked(String),

    #[error("Could not parse YouTube data for video {0}")]
    Unparsable(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Caption source backed by YouTube's InnerTube player API
pub struct YoutubeCaptions {
    client: Client,
}

impl YoutubeCaptions {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US"),
        );

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Fetch the watch page HTML, which carries the InnerTube API key
    async fn fetch_watch_html(&self, video: &VideoId) -> Result<String> {
        tracing::debug!("Fetching watch page for {}", video);

        let response = self
            .client
            .get(video.watch_url())
            .send()
            .await
            .map_err(|e| CaptionError::Http(format!("Failed to fetch watch page: {}", e)))?;

        check_status(response.status(), video)?;

        let html = response
            .text()
            .await
            .map_err(|e| CaptionError::Http(format!("Failed to read watch page: {}", e)))?;

        Ok(html)
    }

    async fn fetch_player_response(&self, video: &VideoId, api_key: &str) -> Result<Value> {
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION
                }
            },
            "videoId": video.as_str()
        });

        tracing::debug!("Requesting InnerTube player data for {}", video);

        let response = self
            .client
            .post(INNERTUBE_PLAYER_URL)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| CaptionError::Http(format!("Failed to fetch player data: {}", e)))?;

        check_status(response.status(), video)?;

        let data = response
            .json::<Value>()
            .await
            .map_err(|_| CaptionError::Unparsable(video.to_string()))?;

        Ok(data)
    }
}

#[async_trait]
impl CaptionSource for YoutubeCaptions {
    async fn fetch_by_language(&self, video: &VideoId, languages: &[String]) -> Result<String> {
        let tracks = self.list_tracks(video).await?;

        let track = find_track(&tracks, languages).ok_or_else(|| CaptionError::NoTranscriptFound {
            video_id: video.to_string(),
            languages: languages.to_vec(),
        })?;

        self.fetch_track(video, track).await
    }

    async fn list_tracks(&self, video: &VideoId) -> Result<Vec<CaptionTrack>> {
        let html = self.fetch_watch_html(video).await?;
        let api_key = extract_innertube_api_key(&html, video)?;
        let player = self.fetch_player_response(video, &api_key).await?;
        let tracks = parse_caption_tracks(video, &player)?;

        tracing::debug!(
            "Video {} lists {} caption track(s): {}",
            video,
            tracks.len(),
            tracks
                .iter()
                .map(|t| format!("{}{}", t.language_code, if t.is_generated { " (auto)" } else { "" }))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(tracks)
    }

    async fn fetch_track(&self, video: &VideoId, track: &CaptionTrack) -> Result<String> {
        tracing::debug!("Fetching {} caption track for {}", track.language_code, video);

        let response = self
            .client
            .get(&track.base_url)
            .send()
            .await
            .map_err(|e| CaptionError::Http(format!("Failed to fetch transcript: {}", e)))?;

        check_status(response.status(), video)?;

        let xml = response
            .text()
            .await
            .map_err(|e| CaptionError::Http(format!("Failed to read transcript: {}", e)))?;

        Ok(timedtext::to_plain_text(&xml))
    }

    fn source_name(&self) -> String {
        "YouTube".to_string()
    }
}

fn check_status(status: StatusCode, video: &VideoId) -> std::result::Result<(), CaptionError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(CaptionError::IpBlocked(video.to_string()));
    }
    if !status.is_success() {
        return Err(CaptionError::Http(format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown error")
        )));
    }
    Ok(())
}

/// Pull the InnerTube API key out of the watch page
pub fn extract_innertube_api_key(html: &str, video: &VideoId) -> std::result::Result<String, CaptionError> {
    if html.contains("class=\"g-recaptcha\"") {
        return Err(CaptionError::IpBlocked(video.to_string()));
    }

    INNERTUBE_API_KEY
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| CaptionError::Unparsable(video.to_string()))
}

fn assert_playability(video: &VideoId, player: &Value) -> std::result::Result<(), CaptionError> {
    let Some(playability) = player.get("playabilityStatus") else {
        return Ok(());
    };

    let status = playability.get("status").and_then(Value::as_str).unwrap_or("");
    if status == "OK" {
        return Ok(());
    }

    let reason = playability.get("reason").and_then(Value::as_str).unwrap_or("");

    match status {
        "LOGIN_REQUIRED" if reason.contains("not a bot") => {
            Err(CaptionError::RequestBlocked(video.to_string()))
        }
        "LOGIN_REQUIRED" if reason.contains("inappropriate for some users") => {
            Err(CaptionError::AgeRestricted(video.to_string()))
        }
        "ERROR" if reason.contains("unavailable") => {
            Err(CaptionError::VideoUnavailable(video.to_string()))
        }
        _ => Err(CaptionError::VideoUnplayable {
            video_id: video.to_string(),
            reason: reason.to_string(),
        }),
    }
}

/// Read the caption track list from an InnerTube player response, keeping service order
pub fn parse_caption_tracks(
    video: &VideoId,
    player: &Value,
) -> std::result::Result<Vec<CaptionTrack>, CaptionError> {
    assert_playability(video, player)?;

    let caption_tracks = player
        .get("captions")
        .and_then(|c| c.get("playerCaptionsTracklistRenderer"))
        .and_then(|r| r.get("captionTracks"))
        .and_then(Value::as_array)
        .ok_or_else(|| CaptionError::TranscriptsDisabled(video.to_string()))?;

    let tracks: Vec<CaptionTrack> = caption_tracks
        .iter()
        .filter_map(|caption| {
            let language_code = caption.get("languageCode")?.as_str()?.to_string();
            let base_url = caption.get("baseUrl")?.as_str()?.replace("&fmt=srv3", "");

            let language_name = caption
                .get("name")
                .and_then(|n| {
                    n.get("simpleText")
                        .or_else(|| n.get("runs").and_then(|r| r.get(0)).and_then(|r| r.get("text")))
                })
                .and_then(Value::as_str)
                .unwrap_or(&language_code)
                .to_string();

            let is_generated = caption.get("kind").and_then(Value::as_str) == Some("asr");

            Some(CaptionTrack {
                language_code,
                language_name,
                is_generated,
                base_url,
            })
        })
        .collect();

    if tracks.is_empty() {
        return Err(CaptionError::TranscriptsDisabled(video.to_string()));
    }

    Ok(tracks)
}
