//! Backend handlers for resource I/O
//!
//! Each concern (streams, scanning, removal, copying, databases) has its own
//! handler trait and its own [`SchemeRegistry`]. Handlers are always given
//! URLs that already went through credential injection.
//!
//! The only built-in backend is [`LocalFileBackend`] for `file://` URLs.
//! Remote protocols plug in by implementing the traits.

mod local;
mod registry;

pub use local::LocalFileBackend;
pub use registry::{copier_key, SchemeRegistry};

use crate::url::Url;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

/// Readable byte stream returned by a [`StreamHandler`]
pub type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;

/// Writable byte stream returned by a [`StreamHandler`]
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Backend-related errors
///
/// URLs in messages are always the redacted rendering.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("No {kind} handler registered for scheme: {scheme}")]
    UnregisteredScheme { kind: &'static str, scheme: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unsupported URL for {backend}: {url}")]
    UnsupportedUrl { backend: String, url: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend failure: {0}")]
    Failed(String),
}

/// A resource found by a [`Scanner`]
#[derive(Debug, Clone, Serialize)]
pub struct ScanEntry {
    /// Location of the resource (serialized redacted)
    pub url: Url,
    /// Whether the entry is a directory/prefix rather than an object
    pub is_dir: bool,
    /// Size in bytes, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Last modification time, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

/// Opens byte streams on resources
#[async_trait]
pub trait StreamHandler: Send + Sync {
    /// Name of the backend, used in logs and errors
    fn name(&self) -> &str;

    /// Open a resource for reading
    async fn open_reader(&self, url: &Url) -> Result<BoxedReader, BackendError>;

    /// Open a resource for writing, replacing any existing content
    async fn open_writer(&self, url: &Url) -> Result<BoxedWriter, BackendError>;
}

/// Lists resources under a URL
#[async_trait]
pub trait Scanner: Send + Sync {
    fn name(&self) -> &str;

    async fn scan(&self, url: &Url) -> Result<Vec<ScanEntry>, BackendError>;
}

/// Deletes resources
#[async_trait]
pub trait Remover: Send + Sync {
    fn name(&self) -> &str;

    async fn remove(&self, url: &Url) -> Result<(), BackendError>;
}

/// Copies between two schemes without going through a local stream
///
/// Registered under [`copier_key`] of the source and destination schemes.
#[async_trait]
pub trait Copier: Send + Sync {
    fn name(&self) -> &str;

    async fn copy(&self, source: &Url, destination: &Url) -> Result<(), BackendError>;
}

/// An open database connection
#[async_trait]
pub trait DatabaseConnection: Send + Sync {
    /// The authenticated URL the connection was opened with
    fn url(&self) -> &Url;

    /// Execute a statement, returning the number of affected rows
    async fn execute(&self, statement: &str) -> Result<u64, BackendError>;
}

/// Opens database connections
#[async_trait]
pub trait DatabaseHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn connect(&self, url: &Url) -> Result<Box<dyn DatabaseConnection>, BackendError>;
}
