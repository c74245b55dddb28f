//! Resource client
//!
//! Authenticates raw URLs through a [`CredentialsInjector`] and dispatches
//! them to the handler registered for their scheme.

use crate::backends::{
    copier_key, BackendError, BoxedReader, BoxedWriter, Copier, DatabaseConnection,
    DatabaseHandler, LocalFileBackend, Remover, ScanEntry, Scanner, SchemeRegistry, StreamHandler,
};
use crate::credentials::CredentialsInjector;
use crate::url::{Url, LOCAL_FILE_SCHEME};
use crate::TentaclioError;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

/// Entry point for URL-addressed I/O
pub struct ResourceClient {
    /// Credential injector shared with the rest of the application
    injector: Arc<CredentialsInjector>,
    streams: SchemeRegistry<dyn StreamHandler>,
    scanners: SchemeRegistry<dyn Scanner>,
    removers: SchemeRegistry<dyn Remover>,
    copiers: SchemeRegistry<dyn Copier>,
    databases: SchemeRegistry<dyn DatabaseHandler>,
    validate_schemes: bool,
}

impl ResourceClient {
    /// Create a client with no handlers registered
    pub fn new(injector: Arc<CredentialsInjector>) -> Self {
        Self {
            injector,
            streams: SchemeRegistry::new("stream"),
            scanners: SchemeRegistry::new("scanner"),
            removers: SchemeRegistry::new("remover"),
            copiers: SchemeRegistry::new("copier"),
            databases: SchemeRegistry::new("database"),
            validate_schemes: false,
        }
    }

    /// Create a client with the built-in local file backend
    pub fn with_defaults(injector: Arc<CredentialsInjector>) -> Self {
        let client = Self::new(injector);
        let local = Arc::new(LocalFileBackend::new());
        client.streams.register(LOCAL_FILE_SCHEME, local.clone());
        client.scanners.register(LOCAL_FILE_SCHEME, local.clone());
        client.removers.register(LOCAL_FILE_SCHEME, local);
        client
    }

    /// Reject URLs whose scheme no registered handler serves before
    /// authenticating them
    pub fn with_scheme_validation(mut self) -> Self {
        self.validate_schemes = true;
        self
    }

    pub fn injector(&self) -> &CredentialsInjector {
        &self.injector
    }

    pub fn streams(&self) -> &SchemeRegistry<dyn StreamHandler> {
        &self.streams
    }

    pub fn scanners(&self) -> &SchemeRegistry<dyn Scanner> {
        &self.scanners
    }

    pub fn removers(&self) -> &SchemeRegistry<dyn Remover> {
        &self.removers
    }

    pub fn copiers(&self) -> &SchemeRegistry<dyn Copier> {
        &self.copiers
    }

    pub fn databases(&self) -> &SchemeRegistry<dyn DatabaseHandler> {
        &self.databases
    }

    /// Parse and authenticate a raw URL
    pub fn authenticate(&self, raw_url: &str) -> Result<Url, TentaclioError> {
        if !self.validate_schemes {
            return Ok(crate::authenticate(&self.injector, raw_url)?);
        }
        let known = self.known_schemes();
        let url = Url::parse_with_schemes(raw_url, known.iter().map(String::as_str))?;
        Ok(self.injector.inject(&url))
    }

    /// Schemes with a stream, scanner, remover or database handler
    fn known_schemes(&self) -> Vec<String> {
        let mut schemes = self.streams.schemes();
        schemes.extend(self.scanners.schemes());
        schemes.extend(self.removers.schemes());
        schemes.extend(self.databases.schemes());
        schemes.sort_unstable();
        schemes.dedup();
        schemes
    }

    /// Open a resource for reading
    pub async fn open_reader(&self, raw_url: &str) -> Result<BoxedReader, TentaclioError> {
        let url = self.authenticate(raw_url)?;
        let handler = self.streams.get(url.scheme())?;
        debug!(url = %url, handler = handler.name(), "Opening reader");
        Ok(handler.open_reader(&url).await?)
    }

    /// Open a resource for writing
    pub async fn open_writer(&self, raw_url: &str) -> Result<BoxedWriter, TentaclioError> {
        let url = self.authenticate(raw_url)?;
        let handler = self.streams.get(url.scheme())?;
        debug!(url = %url, handler = handler.name(), "Opening writer");
        Ok(handler.open_writer(&url).await?)
    }

    /// Read a whole resource into memory
    pub async fn read(&self, raw_url: &str) -> Result<Vec<u8>, TentaclioError> {
        let mut reader = self.open_reader(raw_url).await?;
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .await
            .map_err(BackendError::from)?;
        Ok(buf)
    }

    /// Replace a resource's content
    pub async fn write(&self, raw_url: &str, data: &[u8]) -> Result<(), TentaclioError> {
        let mut writer = self.open_writer(raw_url).await?;
        writer.write_all(data).await.map_err(BackendError::from)?;
        writer.shutdown().await.map_err(BackendError::from)?;
        Ok(())
    }

    /// List the resources under a URL
    pub async fn scan(&self, raw_url: &str) -> Result<Vec<ScanEntry>, TentaclioError> {
        let url = self.authenticate(raw_url)?;
        let scanner = self.scanners.get(url.scheme())?;
        Ok(scanner.scan(&url).await?)
    }

    /// Delete a resource
    pub async fn remove(&self, raw_url: &str) -> Result<(), TentaclioError> {
        let url = self.authenticate(raw_url)?;
        let remover = self.removers.get(url.scheme())?;
        remover.remove(&url).await?;
        info!(url = %url, "Removed resource");
        Ok(())
    }

    /// Copy a resource.
    ///
    /// Uses the copier registered for the scheme pair if there is one and
    /// streams through the stream handlers otherwise. Returns the number of
    /// bytes streamed, or `None` when a copier did the work.
    pub async fn copy(&self, source: &str, destination: &str) -> Result<Option<u64>, TentaclioError> {
        let source = self.authenticate(source)?;
        let destination = self.authenticate(destination)?;

        let key = copier_key(source.scheme(), destination.scheme());
        if self.copiers.contains(&key) {
            let copier = self.copiers.get(&key)?;
            debug!(source = %source, destination = %destination, copier = copier.name(), "Copying");
            copier.copy(&source, &destination).await?;
            return Ok(None);
        }

        let mut reader = self.streams.get(source.scheme())?.open_reader(&source).await?;
        let mut writer = self
            .streams
            .get(destination.scheme())?
            .open_writer(&destination)
            .await?;

        let copied = tokio::io::copy(&mut reader, &mut writer)
            .await
            .map_err(BackendError::from)?;
        writer.shutdown().await.map_err(BackendError::from)?;

        info!(source = %source, destination = %destination, bytes = copied, "Copied resource");
        Ok(Some(copied))
    }

    /// Open a database connection
    pub async fn connect_database(
        &self,
        raw_url: &str,
    ) -> Result<Box<dyn DatabaseConnection>, TentaclioError> {
        let url = self.authenticate(raw_url)?;
        let handler = self.databases.get(url.scheme())?;
        debug!(url = %url, handler = handler.name(), "Connecting to database");
        Ok(handler.connect(&url).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    /// Records the URLs it is handed
    #[derive(Default)]
    struct RecordingDatabase {
        seen: Mutex<Vec<String>>,
    }

    struct RecordedConnection {
        url: Url,
    }

    #[async_trait]
    impl DatabaseConnection for RecordedConnection {
        fn url(&self) -> &Url {
            &self.url
        }

        async fn execute(&self, _statement: &str) -> Result<u64, BackendError> {
            Ok(0)
        }
    }

    #[async_trait]
    impl DatabaseHandler for RecordingDatabase {
        fn name(&self) -> &str {
            "recording"
        }

        async fn connect(&self, url: &Url) -> Result<Box<dyn DatabaseConnection>, BackendError> {
            self.seen.lock().push(url.as_str().to_string());
            Ok(Box::new(RecordedConnection { url: url.clone() }))
        }
    }

    fn injector(credentials: &[&str]) -> Arc<CredentialsInjector> {
        let mut injector = CredentialsInjector::new();
        injector.register_all(credentials.iter().map(|raw| Url::parse(raw).unwrap()));
        Arc::new(injector)
    }

    #[tokio::test]
    async fn test_database_handler_receives_authenticated_url() {
        let client = ResourceClient::new(injector(&["postgres://etl:pw@db/warehouse"]));
        let handler = Arc::new(RecordingDatabase::default());
        client.databases().register("postgres", handler.clone());

        let conn = client
            .connect_database("postgres://db/warehouse::events")
            .await
            .unwrap();
        assert_eq!(conn.url().as_str(), "postgres://etl:pw@db/warehouse::events");
        assert_eq!(
            handler.seen.lock().clone(),
            vec!["postgres://etl:pw@db/warehouse::events".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unregistered_scheme_fails_loudly() {
        let client = ResourceClient::with_defaults(injector(&[]));
        let err = client.read("gopher://host/thing").await.err().unwrap();
        assert!(matches!(
            err,
            TentaclioError::Backend(BackendError::UnregisteredScheme { kind: "stream", .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_url_is_a_url_error() {
        let client = ResourceClient::with_defaults(injector(&[]));
        assert!(matches!(
            client.scan("").await,
            Err(TentaclioError::Url(crate::url::UrlError::Empty))
        ));
    }

    #[tokio::test]
    async fn test_scheme_validation_rejects_unserved_schemes() {
        let client = ResourceClient::with_defaults(injector(&[])).with_scheme_validation();
        let err = client.read("gopher://host/thing").await.err().unwrap();
        assert!(matches!(
            err,
            TentaclioError::Url(crate::url::UrlError::UnknownScheme(ref scheme)) if scheme == "gopher"
        ));

        client.databases().register("postgres", Arc::new(RecordingDatabase::default()));
        assert!(client.authenticate("postgres://db/warehouse").is_ok());
        assert!(client.authenticate("/tmp/report.csv").is_ok());
    }

    #[tokio::test]
    async fn test_scheme_validation_is_off_by_default() {
        let client = ResourceClient::with_defaults(injector(&[]));
        assert!(client.authenticate("gopher://host/thing").is_ok());
    }

    struct FailingCopier;

    #[async_trait]
    impl Copier for FailingCopier {
        fn name(&self) -> &str {
            "failing"
        }

        async fn copy(&self, _source: &Url, _destination: &Url) -> Result<(), BackendError> {
            Err(BackendError::Failed("copier invoked".to_string()))
        }
    }

    #[tokio::test]
    async fn test_registered_copier_takes_precedence() {
        let client = ResourceClient::with_defaults(injector(&[]));
        client
            .copiers()
            .register(&copier_key("file", "file"), Arc::new(FailingCopier));

        let err = client.copy("/tmp/a", "/tmp/b").await.err().unwrap();
        assert!(err.to_string().contains("copier invoked"));
    }
}
