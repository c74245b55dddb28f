//! Scheme to handler dispatch tables

use super::BackendError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Key under which a [`super::Copier`] is registered
pub fn copier_key(source_scheme: &str, destination_scheme: &str) -> String {
    format!("{}+{}", source_scheme, destination_scheme)
}

/// Registry mapping URL schemes to handlers of one kind
///
/// Keys are case-insensitive. Looking up a scheme nobody registered is an
/// error, never a silent fallback.
pub struct SchemeRegistry<H: ?Sized> {
    kind: &'static str,
    handlers: RwLock<HashMap<String, Arc<H>>>,
}

impl<H: ?Sized> SchemeRegistry<H> {
    /// Create an empty registry; `kind` names the handler type in errors
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a handler, returning the one it replaced
    pub fn register(&self, scheme: &str, handler: Arc<H>) -> Option<Arc<H>> {
        let scheme = scheme.to_ascii_lowercase();
        debug!(kind = self.kind, scheme = %scheme, "Registering handler");
        let mut handlers = self.handlers.write();
        handlers.insert(scheme, handler)
    }

    /// Unregister a handler by scheme
    pub fn unregister(&self, scheme: &str) -> Option<Arc<H>> {
        let mut handlers = self.handlers.write();
        handlers.remove(&scheme.to_ascii_lowercase())
    }

    /// Get the handler for a scheme
    pub fn get(&self, scheme: &str) -> Result<Arc<H>, BackendError> {
        let handlers = self.handlers.read();
        handlers
            .get(&scheme.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| BackendError::UnregisteredScheme {
                kind: self.kind,
                scheme: scheme.to_string(),
            })
    }

    /// Check whether a scheme has a handler
    pub fn contains(&self, scheme: &str) -> bool {
        let handlers = self.handlers.read();
        handlers.contains_key(&scheme.to_ascii_lowercase())
    }

    /// List all registered schemes, sorted
    pub fn schemes(&self) -> Vec<String> {
        let handlers = self.handlers.read();
        let mut schemes: Vec<String> = handlers.keys().cloned().collect();
        schemes.sort();
        schemes
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct Fixed(&'static str);

    impl Greeter for Fixed {
        fn greet(&self) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn test_register_and_get() {
        let registry: SchemeRegistry<dyn Greeter> = SchemeRegistry::new("greeter");
        registry.register("s3", Arc::new(Fixed("hello")));

        assert_eq!(registry.get("s3").unwrap().greet(), "hello");
        assert_eq!(registry.get("S3").unwrap().greet(), "hello");
        assert!(registry.contains("s3"));
    }

    #[test]
    fn test_unregistered_scheme_is_an_error() {
        let registry: SchemeRegistry<dyn Greeter> = SchemeRegistry::new("greeter");
        let err = registry.get("gopher").err().unwrap();
        assert!(matches!(
            err,
            BackendError::UnregisteredScheme { kind: "greeter", ref scheme } if scheme == "gopher"
        ));
    }

    #[test]
    fn test_register_replaces() {
        let registry: SchemeRegistry<dyn Greeter> = SchemeRegistry::new("greeter");
        assert!(registry.register("ftp", Arc::new(Fixed("a"))).is_none());
        let previous = registry.register("ftp", Arc::new(Fixed("b"))).unwrap();
        assert_eq!(previous.greet(), "a");
        assert_eq!(registry.get("ftp").unwrap().greet(), "b");
    }

    #[test]
    fn test_unregister_and_list() {
        let registry: SchemeRegistry<dyn Greeter> = SchemeRegistry::new("greeter");
        registry.register("sftp", Arc::new(Fixed("x")));
        registry.register("ftp", Arc::new(Fixed("y")));
        assert_eq!(registry.schemes(), vec!["ftp", "sftp"]);

        registry.unregister("ftp");
        assert!(!registry.contains("ftp"));
        assert_eq!(registry.schemes(), vec!["sftp"]);
    }

    #[test]
    fn test_copier_key() {
        assert_eq!(copier_key("s3", "file"), "s3+file");
    }
}
