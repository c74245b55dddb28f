//! Configuration system for Tentaclio
//!
//! Loads configuration from TOML files. Every setting has a default, so an
//! empty (or absent) file is valid.

mod types;

pub use types::*;

use crate::credentials::env::DEFAULT_ENV_PREFIX;
use crate::credentials::secrets_file::DEFAULT_SECRETS_FILE_ENV;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main Tentaclio configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Where credentials come from
    pub credentials: CredentialsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Load configuration from a string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Self::from_raw(raw)
    }

    /// Convert from raw TOML config to validated config
    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let credentials = raw.credentials.unwrap_or_default().try_into()?;
        let logging = raw.logging.unwrap_or_default().try_into()?;

        Ok(Self {
            credentials,
            logging,
        })
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tentaclio")
            .join("config.toml")
    }
}

/// Where credential URLs are read from
#[derive(Debug, Clone)]
pub struct CredentialsConfig {
    /// Environment variables starting with this prefix hold credential URLs
    pub env_prefix: String,
    /// Environment variable naming the secrets file
    pub secrets_file_env: String,
    /// Explicit secrets file; takes precedence over `secrets_file_env`
    pub secrets_file: Option<PathBuf>,
}

impl CredentialsConfig {
    /// The secrets file to load, if any
    pub fn secrets_file_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.secrets_file {
            return Some(path.clone());
        }

        std::env::var_os(&self.secrets_file_env)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            secrets_file_env: DEFAULT_SECRETS_FILE_ENV.to_string(),
            secrets_file: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Format: "json" or "pretty"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format
    Pretty,
    /// JSON format
    Json,
}

/// Contents written by `tentaclio init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Tentaclio Configuration

[credentials]
# Environment variables with this prefix hold credential URLs
env_prefix = "TENTACLIO__CONN__"
# Environment variable pointing at a YAML secrets file
secrets_file_env = "TENTACLIO__SECRETS_FILE"
# Or name the secrets file directly
# secrets_file = "~/.config/tentaclio/secrets.yml"

[logging]
level = "info"
format = "pretty"
"#;
