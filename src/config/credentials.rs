use anyhow::{Context, Result};
use console::Term;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::utils::mask_secret;

/// Variable name the Gemini API key is stored under
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Empty answers accepted before the key prompt gives up
const MAX_PROMPT_ATTEMPTS: usize = 3;

/// Where an API key was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOrigin {
    Environment,
    EnvFile(PathBuf),
    Prompt,
}

impl fmt::Display for KeyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyOrigin::Environment => write!(f, "${}", API_KEY_VAR),
            KeyOrigin::EnvFile(path) => write!(f, "{}", path.display()),
            KeyOrigin::Prompt => write!(f, "prompt"),
        }
    }
}

/// Gemini API key
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey {
    value: String,
    origin: KeyOrigin,
}

// Never print the key itself
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("value", &self.masked())
            .field("origin", &self.origin)
            .finish()
    }
}

impl ApiKey {
    pub fn expose(&self) -> &str {
        &self.value
    }

    pub fn origin(&self) -> &KeyOrigin {
        &self.origin
    }

    pub fn masked(&self) -> String {
        mask_secret(&self.value)
    }

    /// Look the key up in the process environment, then in `env_file`
    pub fn resolve(env_file: &Path) -> Result<Option<Self>> {
        Self::resolve_from(std::env::var(API_KEY_VAR).ok(), env_file)
    }

    /// Resolve from an explicit environment value, falling back to `env_file`
    pub fn resolve_from(env_value: Option<String>, env_file: &Path) -> Result<Option<Self>> {
        if let Some(value) = env_value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            return Ok(Some(Self {
                value,
                origin: KeyOrigin::Environment,
            }));
        }

        Ok(read_env_file(env_file)?.map(|value| Self {
            value,
            origin: KeyOrigin::EnvFile(env_file.to_path_buf()),
        }))
    }

    /// Resolve the key, asking for one on the terminal (and saving it) if none is configured
    pub fn resolve_or_prompt(env_file: &Path) -> Result<Self> {
        if let Some(key) = Self::resolve(env_file)? {
            return Ok(key);
        }

        if !console::user_attended() {
            anyhow::bail!(
                "{} is not set and {} has no key; run `ytnotes config` in a terminal",
                API_KEY_VAR,
                env_file.display()
            );
        }

        println!("No Gemini API key found. It will be saved to {}.", env_file.display());
        Self::prompt_and_store(env_file)
    }

    /// Ask for a key on the terminal and persist it to `env_file`
    pub fn prompt_and_store(env_file: &Path) -> Result<Self> {
        if !console::user_attended() {
            anyhow::bail!(
                "Cannot prompt for {} without a terminal; set it in the environment or {}",
                API_KEY_VAR,
                env_file.display()
            );
        }

        let term = Term::stdout();
        let mut value = None;
        for _ in 0..MAX_PROMPT_ATTEMPTS {
            term.write_str("Enter your Gemini API key: ")?;
            // Closed input also reads as an empty line
            let input = term.read_line()?;
            let input = input.trim();
            if !input.is_empty() {
                value = Some(input.to_string());
                break;
            }
        }
        let value = value.with_context(|| {
            format!("No API key entered after {} attempts", MAX_PROMPT_ATTEMPTS)
        })?;

        store_in_env_file(env_file, &value)?;
        println!("{} saved to {}", API_KEY_VAR, env_file.display());
        tracing::info!("Stored API key in {}", env_file.display());

        Ok(Self {
            value,
            origin: KeyOrigin::Prompt,
        })
    }
}

/// Read `GEMINI_API_KEY` from a dotenv-style file, if the file and entry exist
pub fn read_env_file(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let entries = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to read env file {}", path.display()))?;

    let mut key = None;
    for entry in entries {
        let (name, value) =
            entry.with_context(|| format!("Failed to parse env file {}", path.display()))?;
        if name == API_KEY_VAR {
            key = Some(value);
        }
    }

    Ok(key.filter(|value| !value.trim().is_empty()))
}

/// Write or replace the `GEMINI_API_KEY` entry, keeping other lines
pub fn store_in_env_file(path: &Path, key: &str) -> Result<()> {
    let existing = if path.exists() {
        fs_err::read_to_string(path).context("Failed to read env file")?
    } else {
        String::new()
    };

    let mut lines: Vec<String> = existing
        .lines()
        .filter(|line| !is_key_line(line))
        .map(str::to_string)
        .collect();
    lines.push(format!("{}={}", API_KEY_VAR, key));

    fs_err::write(path, lines.join("\n") + "\n").context("Failed to write env file")?;
    Ok(())
}

fn is_key_line(line: &str) -> bool {
    let line = line.trim_start();
    let line = line.strip_prefix("export ").unwrap_or(line);
    matches!(line.split_once('='), Some((name, _)) if name.trim() == API_KEY_VAR)
}
