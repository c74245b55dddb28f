//! Raw configuration types for TOML parsing

use super::*;
use serde::Deserialize;

/// Raw configuration as parsed from TOML
#[derive(Debug, Deserialize)]
pub struct RawConfig {
    pub credentials: Option<RawCredentialsConfig>,
    pub logging: Option<RawLoggingConfig>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawCredentialsConfig {
    pub env_prefix: Option<String>,
    pub secrets_file_env: Option<String>,
    pub secrets_file: Option<String>,
}

impl TryFrom<RawCredentialsConfig> for CredentialsConfig {
    type Error = ConfigError;

    fn try_from(raw: RawCredentialsConfig) -> Result<Self, Self::Error> {
        let defaults = CredentialsConfig::default();

        let env_prefix = raw.env_prefix.unwrap_or(defaults.env_prefix);
        if env_prefix.is_empty() {
            // An empty prefix would treat every variable as a credential
            return Err(ConfigError::Invalid(
                "credentials.env_prefix must not be empty".to_string(),
            ));
        }

        Ok(Self {
            env_prefix,
            secrets_file_env: raw.secrets_file_env.unwrap_or(defaults.secrets_file_env),
            secrets_file: raw.secrets_file.map(|p| expand_home(&p)),
        })
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawLoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl TryFrom<RawLoggingConfig> for LoggingConfig {
    type Error = ConfigError;

    fn try_from(raw: RawLoggingConfig) -> Result<Self, Self::Error> {
        let format = match raw.format.as_deref() {
            Some("pretty") | None => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown log format: {}",
                    other
                )))
            }
        };

        Ok(Self {
            level: raw.level.unwrap_or_else(|| "info".to_string()),
            format,
        })
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
