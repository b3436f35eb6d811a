//! ytnotes - A Rust CLI tool for turning YouTube videos into notes
//!
//! This library fetches a video's caption track, translates it to English when needed,
//! and asks Google Gemini for structured notes and a summary, which are saved as text files.

pub mod captions;
pub mod cli;
pub mod config;
pub mod generate;
pub mod notes;
pub mod output;
pub mod pipeline;
pub mod transcript;
pub mod utils;
pub mod video;

pub use captions::{CaptionSource, CaptionTrack};
pub use cli::{Cli, Commands};
pub use config::Config;
pub use generate::TextGenerator;
pub use notes::NotesDocument;
pub use pipeline::{NotesPipeline, RunReport};
pub use transcript::Transcript;
pub use video::VideoId;

use std::path::PathBuf;

/// Result type used by the service collaborators
pub type Result<T> = anyhow::Result<T>;

/// Failures that stop a run, one variant per kind the user can act on
#[derive(thiserror::Error, Debug)]
pub enum NotesError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("No transcript available for video {video_id}: {reason}")]
    TranscriptUnavailable { video_id: String, reason: String },

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Notes generation failed: {0}")]
    Generation(String),

    #[error("Failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl NotesError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            NotesError::InvalidUrl(_) => 2,
            NotesError::TranscriptUnavailable { .. } => 3,
            NotesError::Translation(_) | NotesError::Generation(_) => 4,
            NotesError::FileWrite { .. } => 5,
            NotesError::Config(_) => 1,
        }
    }
}
