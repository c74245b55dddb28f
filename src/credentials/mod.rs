//! Credential registration and injection
//!
//! Handles:
//! - Loading credential URLs from the environment and a secrets file
//! - Ranking registered credentials against a target URL
//! - Merging the winning credential into the target

pub mod env;
mod injector;
pub mod secrets_file;
pub mod similarity;

pub use injector::{CredentialsInjector, WILDCARD_HOSTNAME};
pub use similarity::similarity;

use crate::config::CredentialsConfig;
use crate::url::{Url, UrlError};
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Credential source errors
#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("Failed to read secrets file {path}: {source}")]
    SecretsFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid secrets file {path}: {message}")]
    SecretsFileFormat { path: PathBuf, message: String },

    #[error("Secrets file {path} references unset environment variable: {name}")]
    MissingEnvVar { path: PathBuf, name: String },
}

impl CredentialsInjector {
    /// Build an injector from the configured sources.
    ///
    /// Environment credentials are registered first, then the secrets file.
    /// Only a broken secrets file is an error; bad individual entries are
    /// skipped.
    pub fn load(config: &CredentialsConfig) -> Result<Self, CredentialsError> {
        let mut injector = Self::new();

        injector.register_all(env::credentials_from_env(&config.env_prefix));

        if let Some(path) = config.secrets_file_path() {
            injector.register_all(secrets_file::load_secrets_file(&path)?);
        }

        info!(
            credentials = injector.len(),
            schemes = injector.schemes().len(),
            "Credentials loaded"
        );
        Ok(injector)
    }

    /// Build an injector from the default environment variables
    pub fn from_env() -> Result<Self, CredentialsError> {
        Self::load(&CredentialsConfig::default())
    }
}

/// Parse a credential URL. Unlike resource URLs, credentials must name
/// their scheme explicitly.
pub(crate) fn parse_credential_url(raw: &str) -> Result<Url, UrlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlError::Empty);
    }
    if !raw.contains("://") {
        return Err(UrlError::MissingScheme);
    }
    Url::parse(raw)
}
