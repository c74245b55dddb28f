//! Local filesystem backend

use super::{BackendError, BoxedReader, BoxedWriter, Remover, ScanEntry, Scanner, StreamHandler};
use crate::url::{Url, UrlOverrides};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const BACKEND_NAME: &str = "local-file";

/// Backend for `file://` URLs; the URL path is the filesystem path
#[derive(Debug, Default, Clone)]
pub struct LocalFileBackend;

impl LocalFileBackend {
    pub fn new() -> Self {
        Self
    }

    fn local_path(&self, url: &Url) -> Result<PathBuf, BackendError> {
        if url.hostname().is_some() || url.path().is_empty() {
            return Err(BackendError::UnsupportedUrl {
                backend: BACKEND_NAME.to_string(),
                url: url.to_string(),
            });
        }
        Ok(PathBuf::from(url.path()))
    }
}

fn map_not_found(err: std::io::Error, url: &Url) -> BackendError {
    if err.kind() == ErrorKind::NotFound {
        BackendError::NotFound(url.to_string())
    } else {
        BackendError::Io(err)
    }
}

#[async_trait]
impl StreamHandler for LocalFileBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn open_reader(&self, url: &Url) -> Result<BoxedReader, BackendError> {
        let path = self.local_path(url)?;
        let file = fs::File::open(&path)
            .await
            .map_err(|e| map_not_found(e, url))?;
        debug!(path = %path.display(), "Opened file for reading");
        Ok(Box::new(file))
    }

    async fn open_writer(&self, url: &Url) -> Result<BoxedWriter, BackendError> {
        let path = self.local_path(url)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let file = fs::File::create(&path).await?;
        debug!(path = %path.display(), "Opened file for writing");
        Ok(Box::new(file))
    }
}

#[async_trait]
impl Scanner for LocalFileBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn scan(&self, url: &Url) -> Result<Vec<ScanEntry>, BackendError> {
        let dir = self.local_path(url)?;
        let mut read_dir = fs::read_dir(&dir)
            .await
            .map_err(|e| map_not_found(e, url))?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            let path = entry.path();
            entries.push(ScanEntry {
                url: url.copy(UrlOverrides::new().path(path_to_url_path(&path))),
                is_dir: metadata.is_dir(),
                size: metadata.is_file().then(|| metadata.len()),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        entries.sort_by(|a, b| a.url.path().cmp(b.url.path()));
        Ok(entries)
    }
}

#[async_trait]
impl Remover for LocalFileBackend {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    async fn remove(&self, url: &Url) -> Result<(), BackendError> {
        let path = self.local_path(url)?;
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| map_not_found(e, url))?;

        if metadata.is_dir() {
            fs::remove_dir(&path).await?;
        } else {
            fs::remove_file(&path).await?;
        }
        debug!(path = %path.display(), "Removed");
        Ok(())
    }
}

fn path_to_url_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
