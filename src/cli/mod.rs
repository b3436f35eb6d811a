use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ytnotes",
    about = "ytnotes - Turn YouTube videos into study notes and a summary with Google Gemini",
    version,
    long_about = "Fetches a YouTube video's captions (translating them to English when needed) and asks Google Gemini for structured notes and a concise summary. Results are written as text files named after the video id."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (defaults to ./ytnotes.yaml or the user config directory)
    #[arg(long, global = true, value_name = "FILE", env = "YTNOTES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory to write output files to (defaults to the current directory)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Gemini model to use
    #[arg(short, long, global = true, value_name = "NAME")]
    pub model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators and status lines
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Generate notes and a summary for a video (the default command)
    Notes {
        /// YouTube video URL (prompted for if not given)
        #[arg(value_name = "URL")]
        url: Option<String>,
    },

    /// Fetch and save the English transcript only
    Transcript {
        /// YouTube video URL (prompted for if not given)
        #[arg(value_name = "URL")]
        url: Option<String>,
    },

    /// Set up the Gemini API key and configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

impl Cli {
    /// The command to run; no subcommand means `notes` with a prompted URL
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or(Commands::Notes { url: None })
    }
}
