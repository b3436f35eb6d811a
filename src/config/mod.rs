use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub mod credentials;

pub use credentials::{ApiKey, API_KEY_VAR};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Gemini API settings
    pub gemini: GeminiConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model used for translation and notes
    pub model: String,

    /// API base endpoint
    pub endpoint: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory for output files (current directory if not set)
    pub output_dir: Option<PathBuf>,

    /// Env file holding the API key
    pub env_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig {
                model: "gemini-1.5-flash".to_string(),
                endpoint: "https://generativelanguage.googleapis.com".to_string(),
                timeout_secs: 120,
            },
            app: AppConfig {
                output_dir: None,
                env_file: PathBuf::from(".env"),
            },
        }
    }
}

impl Config {
    /// Load configuration from `path` (or the default location), writing defaults if missing
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            tracing::debug!("Loaded configuration from {}", config_path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            tracing::debug!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // A config in the working directory wins
        let local_config = PathBuf::from("ytnotes.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("ytnotes").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.gemini.model.trim().is_empty() {
            anyhow::bail!("Gemini model must be configured");
        }

        let endpoint = Url::parse(&self.gemini.endpoint)
            .map_err(|_| anyhow::anyhow!("Invalid Gemini endpoint: {}", self.gemini.endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            anyhow::bail!("Gemini endpoint must use HTTP or HTTPS protocol");
        }

        if self.gemini.timeout_secs == 0 {
            anyhow::bail!("Request timeout must be at least one second");
        }

        Ok(())
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, model: Option<String>, output_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(model) = model {
            self.gemini.model = model;
        }
        if let Some(dir) = output_dir {
            self.app.output_dir = Some(dir);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini.timeout_secs)
    }

    /// Directory output files are written to
    pub fn output_dir(&self) -> PathBuf {
        self.app
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Display current configuration
    pub fn display(&self, api_key: Option<&ApiKey>) {
        println!("Current Configuration:");
        println!("  Gemini Model: {}", self.gemini.model);
        println!("  Gemini Endpoint: {}", self.gemini.endpoint);
        println!("  Request Timeout: {}s", self.gemini.timeout_secs);
        println!("  Output Directory: {}", self.output_dir().display());
        println!("  Env File: {}", self.app.env_file.display());
        match api_key {
            Some(key) => println!("  API Key: {} (from {})", key.masked(), key.origin()),
            None => println!("  API Key: not set"),
        }
    }
}
