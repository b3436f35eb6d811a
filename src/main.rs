use anyhow::Result;
use clap::Parser;
use console::{style, Term};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ytnotes::cli::{Cli, Commands};
use ytnotes::config::{ApiKey, Config};
use ytnotes::{NotesError, NotesPipeline};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "ytnotes=debug" } else { "ytnotes=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{} {}", style("❌").red(), describe(&err));
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<(), NotesError> {
    let config = Config::load(cli.config.as_deref())
        .and_then(|config| config.with_overrides(cli.model.clone(), cli.output_dir.clone()))
        .map_err(|e| NotesError::Config(format!("{:#}", e)))?;

    match cli.effective_command() {
        Commands::Notes { url } => {
            let url = url_or_prompt(url)?;
            let pipeline = build_pipeline(&config, cli.quiet)?;
            let report = pipeline.run(&url).await?;
            tracing::info!(
                "Finished {} in {:.1}s",
                report.video_id,
                report.elapsed.as_secs_f64()
            );
        }
        Commands::Transcript { url } => {
            let url = url_or_prompt(url)?;
            let pipeline = build_pipeline(&config, cli.quiet)?;
            let report = pipeline.run_transcript_only(&url).await?;
            if cli.quiet {
                println!("{}", report.transcript_path.display());
            }
        }
        Commands::Config { show } => {
            let env_file = &config.app.env_file;
            if show {
                let key = ApiKey::resolve(env_file).map_err(config_error)?;
                config.display(key.as_ref());
            } else {
                if !console::user_attended() {
                    return Err(NotesError::Config(
                        "`ytnotes config` is interactive; run it in a terminal or use --show".to_string(),
                    ));
                }
                let config_path = match cli.config.clone() {
                    Some(path) => path,
                    None => Config::config_path().map_err(config_error)?,
                };
                config.save_to(&config_path).map_err(config_error)?;
                ApiKey::prompt_and_store(env_file).map_err(config_error)?;
                println!("Configuration saved to: {}", config_path.display());
            }
        }
    }

    Ok(())
}

/// Resolve the API key (prompting on first run) and build the pipeline
fn build_pipeline(config: &Config, quiet: bool) -> Result<NotesPipeline, NotesError> {
    let api_key = ApiKey::resolve_or_prompt(&config.app.env_file).map_err(config_error)?;
    tracing::debug!("Using Gemini API key from {}", api_key.origin());
    NotesPipeline::new(config, &api_key, quiet)
}

/// Use the URL given on the command line, or ask for one
fn url_or_prompt(url: Option<String>) -> Result<String, NotesError> {
    if let Some(url) = url {
        return Ok(url);
    }

    if !console::user_attended() {
        return Err(NotesError::Config(
            "No video URL given and no terminal to ask for one".to_string(),
        ));
    }

    let term = Term::stdout();
    term.write_str("Enter YouTube video URL: ")
        .and_then(|_| term.read_line())
        .map(|line| line.trim().to_string())
        .map_err(|e| NotesError::Config(format!("Failed to read URL: {}", e)))
}

fn config_error(err: anyhow::Error) -> NotesError {
    NotesError::Config(format!("{:#}", err))
}

/// User-facing message for a failed run
fn describe(err: &NotesError) -> String {
    match err {
        NotesError::InvalidUrl(_) => format!("{}", err),
        NotesError::TranscriptUnavailable { .. } => format!(
            "Could not retrieve transcript. Make sure the video has subtitles/captions available.\n   {}",
            err
        ),
        NotesError::Translation(_) | NotesError::Generation(_) => {
            format!("Could not generate notes: {}", err)
        }
        NotesError::FileWrite { .. } | NotesError::Config(_) => format!("{}", err),
    }
}
