//! Credential registry and injection

use super::similarity::similarity;
use crate::url::{Url, UrlComponents};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Target hostname that matches credentials registered for any host
pub const WILDCARD_HOSTNAME: &str = "hostname";

/// Stores credential URLs and merges the best match into bare URLs
///
/// Credentials are kept per scheme in registration order. That order breaks
/// ties between equally similar candidates: the first registered wins.
#[derive(Debug, Default, Clone)]
pub struct CredentialsInjector {
    registry: HashMap<String, Vec<Url>>,
}

impl CredentialsInjector {
    /// Create an empty injector
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a credential URL under its scheme
    ///
    /// Duplicates are kept.
    pub fn register_credentials(&mut self, url: Url) {
        debug!(scheme = %url.scheme(), url = %url, "Registering credentials");
        self.registry
            .entry(url.scheme().to_string())
            .or_default()
            .push(url);
    }

    /// Register several credential URLs in order
    pub fn register_all(&mut self, urls: impl IntoIterator<Item = Url>) {
        for url in urls {
            self.register_credentials(url);
        }
    }

    /// Merge the best matching credential into `url`.
    ///
    /// Returns a clone of `url` when no registered credential matches.
    pub fn inject(&self, url: &Url) -> Url {
        let Some(candidates) = self.registry.get(url.scheme()) else {
            return url.clone();
        };

        let wildcard = url.hostname() == Some(WILDCARD_HOSTNAME);
        let mut ranked: Vec<(f64, &Url)> = candidates
            .iter()
            .filter(|c| wildcard || same_host(c.hostname(), url.hostname()))
            .map(|c| (similarity(url.path(), c.path()), c))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        // sort_by is stable, so registration order survives among equal scores
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

        let Some(&(score, best)) = ranked.first() else {
            debug!(url = %url, "No matching credentials");
            return url.clone();
        };

        if ranked.len() > 1 {
            warn!(
                url = %url,
                candidates = ranked.len(),
                chosen = %best,
                "Multiple credentials match, using the best ranked"
            );
        }

        debug!(url = %url, credential = %best, score, "Injecting credentials");
        merge(url, best)
    }

    /// Schemes with at least one registered credential, sorted
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.registry.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    /// Credentials registered for a scheme, in registration order
    pub fn credentials_for(&self, scheme: &str) -> &[Url] {
        self.registry.get(scheme).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of registered credentials
    pub fn len(&self) -> usize {
        self.registry.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Extend<Url> for CredentialsInjector {
    fn extend<I: IntoIterator<Item = Url>>(&mut self, iter: I) {
        self.register_all(iter);
    }
}

/// Hostnames compare case-insensitively; `None` only matches `None`
fn same_host(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

/// Build the authenticated URL.
///
/// Identity (user, password, host) always comes from the credential and the
/// path always from the target. Port and query fall back from the target to
/// the credential.
fn merge(target: &Url, credential: &Url) -> Url {
    Url::from_components(UrlComponents {
        scheme: target.scheme().to_string(),
        username: credential.username().map(str::to_string),
        password: credential.password().cloned(),
        hostname: credential.hostname().map(str::to_string),
        port: credential.port().or(target.port()),
        path: target.path().to_string(),
        query: target.query().or(credential.query()).cloned(),
    })
}
