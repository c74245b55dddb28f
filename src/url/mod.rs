//! URL value type
//!
//! Parses resource URLs into typed components and reassembles them.
//!
//! The canonical form ([`Url::as_str`]) carries the password in clear and is
//! what gets handed to backends. Every human-readable rendering (`Display`,
//! `Debug`, serde) shows only a redacted password.

mod components;
mod query;

pub use components::{UrlComponents, UrlOverrides};
pub use query::Query;

use crate::Secret;
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Marker that replaces a password in rendered URLs
pub const REDACTED_MARKER: &str = "__secret__";

/// How many trailing password characters a rendered URL reveals
const REVEALED_SUFFIX_LEN: usize = 4;

/// Scheme assumed for inputs without one
pub const LOCAL_FILE_SCHEME: &str = "file";

/// URL-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,

    #[error("URL has no scheme")]
    MissingScheme,

    #[error("Unknown URL scheme: {0}")]
    UnknownScheme(String),

    #[error("Invalid port")]
    InvalidPort,

    #[error("Invalid percent-encoding in {0}")]
    InvalidEncoding(&'static str),

    #[error("Cannot resolve relative path against the working directory")]
    UnresolvablePath,
}

/// An immutable, parsed resource URL
#[derive(Clone)]
pub struct Url {
    scheme: String,
    username: Option<String>,
    password: Option<Secret>,
    hostname: Option<String>,
    port: Option<u16>,
    path: String,
    query: Option<Query>,
    canonical: String,
}

impl Url {
    /// Parse a URL string.
    ///
    /// Input without a `scheme://` prefix is taken as a local file path and
    /// made absolute against the working directory. Fragments are discarded.
    pub fn parse(raw: &str) -> Result<Self, UrlError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(UrlError::Empty);
        }

        let (scheme, rest) = match raw.split_once("://") {
            Some((scheme, rest)) if is_valid_scheme(scheme) => (scheme.to_ascii_lowercase(), rest),
            _ => {
                // A relative path would render as `file://dir/...` and reparse with `dir` as host
                let path = std::path::absolute(raw).map_err(|_| UrlError::UnresolvablePath)?;
                return Ok(Self::from_components(UrlComponents {
                    scheme: LOCAL_FILE_SCHEME.to_string(),
                    path: path.to_string_lossy().into_owned(),
                    ..Default::default()
                }));
            }
        };

        let authority_end = rest
            .find(|c| matches!(c, '/' | '?' | '#'))
            .unwrap_or(rest.len());
        let (authority, remainder) = rest.split_at(authority_end);
        let remainder = remainder.split_once('#').map_or(remainder, |(r, _)| r);
        let (path, query) = match remainder.split_once('?') {
            Some((path, query)) => (path, Query::parse(query)),
            None => (remainder, None),
        };

        let (userinfo, hostport) = match authority.rsplit_once('@') {
            Some((userinfo, hostport)) => (Some(userinfo), hostport),
            None => (None, authority),
        };

        let (username, password) = match userinfo {
            Some(info) => {
                let (user, pass) = match info.split_once(':') {
                    Some((user, pass)) => (user, Some(pass)),
                    None => (info, None),
                };
                let username = non_empty(user).map(|u| decode(u, "username")).transpose()?;
                let password = pass
                    .and_then(non_empty)
                    .map(|p| decode(p, "password"))
                    .transpose()?
                    .map(Secret::new);
                (username, password)
            }
            None => (None, None),
        };

        let (host, port) = split_host_port(hostport);
        let port = match port.and_then(non_empty) {
            Some(p) => Some(p.parse::<u16>().map_err(|_| UrlError::InvalidPort)?),
            None => None,
        };

        Ok(Self::from_components(UrlComponents {
            scheme,
            username,
            password,
            hostname: non_empty(host).map(str::to_string),
            port,
            path: path.to_string(),
            query,
        }))
    }

    /// Parse a URL and reject schemes that are not in `known`
    pub fn parse_with_schemes<'a>(
        raw: &str,
        known: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, UrlError> {
        let url = Self::parse(raw)?;
        if known.into_iter().any(|s| s.eq_ignore_ascii_case(url.scheme())) {
            Ok(url)
        } else {
            Err(UrlError::UnknownScheme(url.scheme.clone()))
        }
    }

    /// Build a URL from its components.
    ///
    /// The canonical form is
    /// `scheme://[username[:password]@]hostname[:port]path[?query]`, with the
    /// username and password percent-encoded.
    pub fn from_components(components: UrlComponents) -> Self {
        let mut url = Self {
            scheme: components.scheme,
            username: components.username,
            password: components.password,
            hostname: components.hostname,
            port: components.port,
            path: components.path,
            query: components.query.filter(|q| !q.is_empty()),
            canonical: String::new(),
        };
        url.canonical = url.render(PasswordRendering::Clear);
        url
    }

    /// Split the URL back into its components
    pub fn to_components(&self) -> UrlComponents {
        UrlComponents {
            scheme: self.scheme.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            hostname: self.hostname.clone(),
            port: self.port,
            path: self.path.clone(),
            query: self.query.clone(),
        }
    }

    /// Return a new URL with the given fields replaced
    pub fn copy(&self, overrides: UrlOverrides) -> Self {
        Self::from_components(overrides.apply(self.to_components()))
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&Secret> {
        self.password.as_ref()
    }

    pub fn hostname(&self) -> Option<&str> {
        self.hostname.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    /// Whether the URL carries a username or password
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() || self.password.is_some()
    }

    /// The canonical string form, including the password in clear.
    ///
    /// Never log this; use `Display` instead.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    fn render(&self, password: PasswordRendering) -> String {
        let mut out = format!("{}://", self.scheme);

        if self.has_credentials() {
            if let Some(username) = &self.username {
                out.push_str(&urlencoding::encode(username));
            }
            if let Some(secret) = &self.password {
                out.push(':');
                match password {
                    PasswordRendering::Clear => out.push_str(&urlencoding::encode(secret.expose())),
                    PasswordRendering::Redacted => out.push_str(&redact(secret.expose())),
                }
            }
            out.push('@');
        }

        if let Some(hostname) = &self.hostname {
            out.push_str(hostname);
        }
        if let Some(port) = self.port {
            out.push_str(&format!(":{}", port));
        }

        out.push_str(&self.path);

        if let Some(query) = &self.query {
            out.push('?');
            out.push_str(&query.to_string());
        }

        out
    }
}

#[derive(Clone, Copy)]
enum PasswordRendering {
    Clear,
    Redacted,
}

/// Render a password as the marker plus its last few characters.
///
/// Short passwords reveal nothing.
fn redact(password: &str) -> String {
    let len = password.chars().count();
    if len <= REVEALED_SUFFIX_LEN {
        return REDACTED_MARKER.to_string();
    }
    let suffix: String = password.chars().skip(len - REVEALED_SUFFIX_LEN).collect();
    format!("{}{}", REDACTED_MARKER, suffix)
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn split_host_port(hostport: &str) -> (&str, Option<&str>) {
    // Bracketed IPv6 literal
    if hostport.starts_with('[') {
        return match hostport.find(']') {
            Some(end) => {
                let (host, tail) = hostport.split_at(end + 1);
                (host, tail.strip_prefix(':'))
            }
            None => (hostport, None),
        };
    }

    match hostport.rsplit_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (hostport, None),
    }
}

fn decode(raw: &str, field: &'static str) -> Result<String, UrlError> {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .map_err(|_| UrlError::InvalidEncoding(field))
}

fn non_empty(s: &str) -> Option<&str> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

impl FromStr for Url {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl PartialEq for Url {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Url {}

impl Hash for Url {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(PasswordRendering::Redacted))
    }
}

impl fmt::Debug for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Url").field(&self.to_string()).finish()
    }
}

/// Serializes the redacted form
impl Serialize for Url {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
