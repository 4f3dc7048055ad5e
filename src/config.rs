use anyhow::{anyhow, Context, Result};
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::RenderFormat;

/// Environment variable that overrides the chat store path
pub const CHAT_DB_ENV: &str = "IMESSAGE_DB_PATH";

/// Prefix of environment overrides, e.g. `MSG_INTEL__LOGGING__LEVEL=debug`
pub const ENV_PREFIX: &str = "MSG_INTEL";

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Input locations
    pub source: SourceConfig,
    /// Output settings
    pub output: OutputConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Optional log file; rolled daily
    #[serde(default)]
    pub file_path: Option<String>,
    /// `text` or `json`; applies to the file log
    pub format: String,
}

/// Where the data is read from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to `chat.db`
    pub chat_db_path: String,
    /// Drafts directory
    pub drafts_dir: String,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Format used when none is given
    pub default_format: String,
    /// When set, results are written under this directory instead of stdout
    #[serde(default)]
    pub output_directory: Option<String>,
}

fn messages_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join("Library").join("Messages")
}

impl Default for AppConfig {
    fn default() -> Self {
        let messages = messages_dir();
        Self {
            logging: LoggingConfig { level: "info".to_string(), file_path: None, format: "text".to_string() },
            source: SourceConfig {
                chat_db_path: messages.join("chat.db").to_string_lossy().into_owned(),
                drafts_dir: messages.join("Drafts").to_string_lossy().into_owned(),
            },
            output: OutputConfig { default_format: "json".to_string(), output_directory: None },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// defaults, then `config/default`, `config/local` and `msg-intel` files, then environment.
    pub fn load() -> Result<Self> {
        let builder = Self::defaults_builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("msg-intel").required(false));
        Self::finish(builder)
    }

    /// Load with an explicit configuration file layered over the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let builder = Self::defaults_builder()?.add_source(File::from(path).required(true));
        Self::finish(builder)
    }

    fn defaults_builder() -> Result<ConfigBuilder<config::builder::DefaultState>> {
        let defaults = Self::default();
        Config::builder()
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .set_default("source.chat_db_path", defaults.source.chat_db_path)?
            .set_default("source.drafts_dir", defaults.source.drafts_dir)?
            .set_default("output.default_format", defaults.output.default_format)
            .context("Failed to set configuration defaults")
    }

    fn finish(builder: ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self =
            config.try_deserialize().map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        app_config.validate()?;
        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow!("Invalid log level: {}. Must be one of: {:?}", self.logging.level, valid_levels));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow!("Invalid log format: {}. Must be one of: {:?}", self.logging.format, valid_formats));
        }

        self.default_format()?;

        if self.source.chat_db_path.trim().is_empty() {
            return Err(anyhow!("source.chat_db_path cannot be empty"));
        }
        if self.source.drafts_dir.trim().is_empty() {
            return Err(anyhow!("source.drafts_dir cannot be empty"));
        }

        Ok(())
    }

    /// Configured default render format
    pub fn default_format(&self) -> Result<RenderFormat> {
        self.output.default_format.parse().map_err(|e| anyhow!("{e}"))
    }

    /// Chat store path, `IMESSAGE_DB_PATH` taking precedence over the file
    #[must_use]
    pub fn chat_db_path(&self) -> PathBuf {
        std::env::var(CHAT_DB_ENV).map_or_else(|_| PathBuf::from(&self.source.chat_db_path), PathBuf::from)
    }

    /// Drafts directory with `~` expanded
    #[must_use]
    pub fn drafts_dir(&self) -> PathBuf {
        PathBuf::from(&self.source.drafts_dir)
    }

    /// True when file log lines should be JSON
    #[must_use]
    pub fn json_logs(&self) -> bool {
        self.logging.format == "json"
    }
}
