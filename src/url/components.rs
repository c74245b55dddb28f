//! URL components and field overrides

use super::Query;
use crate::Secret;

/// The individual fields a [`super::Url`] is built from
#[derive(Debug, Clone, Default)]
pub struct UrlComponents {
    pub scheme: String,
    pub username: Option<String>,
    pub password: Option<Secret>,
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub path: String,
    pub query: Option<Query>,
}

/// Field replacements for [`super::Url::copy`]
///
/// For the optional fields the outer `Option` means "override or not" and
/// the inner one is the new value, so `port(Some(0))` sets port 0 while
/// `port(None)` removes the port.
#[derive(Debug, Clone, Default)]
pub struct UrlOverrides {
    pub(super) scheme: Option<String>,
    pub(super) username: Option<Option<String>>,
    pub(super) password: Option<Option<Secret>>,
    pub(super) hostname: Option<Option<String>>,
    pub(super) port: Option<Option<u16>>,
    pub(super) path: Option<String>,
    pub(super) query: Option<Option<Query>>,
}

impl UrlOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn username(mut self, username: Option<&str>) -> Self {
        self.username = Some(username.map(str::to_string));
        self
    }

    pub fn password(mut self, password: Option<Secret>) -> Self {
        self.password = Some(password);
        self
    }

    pub fn hostname(mut self, hostname: Option<&str>) -> Self {
        self.hostname = Some(hostname.map(str::to_string));
        self
    }

    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = Some(port);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn query(mut self, query: Option<Query>) -> Self {
        self.query = Some(query);
        self
    }

    /// Apply the overrides on top of `base`
    pub(super) fn apply(self, base: UrlComponents) -> UrlComponents {
        UrlComponents {
            scheme: self.scheme.unwrap_or(base.scheme),
            username: self.username.unwrap_or(base.username),
            password: self.password.unwrap_or(base.password),
            hostname: self.hostname.unwrap_or(base.hostname),
            port: self.port.unwrap_or(base.port),
            path: self.path.unwrap_or(base.path),
            query: self.query.unwrap_or(base.query),
        }
    }
}
