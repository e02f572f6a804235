//! Platform keys, origins and routing prefixes.
//!
//! # Responsibilities
//! - Validate platform keys (`[a-z0-9]+(-[a-z0-9]+)*`)
//! - Validate upstream origins (scheme + host, no path)
//! - Derive the routing prefix of a key and strip it from request paths
//!
//! # Design Decisions
//! - Prefix matching is a literal byte comparison, never a pattern
//! - The prefix is derived on the fly; nothing is allocated on the hot path

use serde::Serialize;
use url::Url;

use crate::routing::RegistryError;

/// A registered upstream platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformEntry {
    key: String,
    origin: String,
}

impl PlatformEntry {
    /// Validate and build an entry.
    pub fn new(key: impl Into<String>, origin: impl Into<String>) -> Result<Self, RegistryError> {
        let key = key.into();
        let origin = origin.into();

        validate_key(&key)?;
        validate_origin(&key, &origin)?;

        Ok(Self { key, origin })
    }

    /// The platform key, e.g. `cr-ghcr`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The upstream origin, e.g. `https://ghcr.io`.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The client-facing routing prefix, e.g. `/cr/ghcr/`.
    pub fn routing_prefix(&self) -> String {
        routing_prefix(&self.key)
    }
}

/// Derive the routing prefix for a key: `/` + key with `-` as `/` + `/`.
pub fn routing_prefix(key: &str) -> String {
    let mut prefix = String::with_capacity(key.len() + 2);
    prefix.push('/');
    prefix.extend(key.chars().map(|c| if c == '-' { '/' } else { c }));
    prefix.push('/');
    prefix
}

/// Returns the length of the routing prefix of `key` if `path` starts with it.
///
/// Equivalent to `path.starts_with(&routing_prefix(key))` without building the
/// prefix string.
pub fn match_prefix(path: &str, key: &str) -> Option<usize> {
    let path = path.as_bytes();
    let len = key.len() + 2;

    if path.len() < len || path[0] != b'/' || path[len - 1] != b'/' {
        return None;
    }

    let matched = key
        .bytes()
        .zip(&path[1..len - 1])
        .all(|(k, &p)| if k == b'-' { p == b'/' } else { p == k });

    matched.then_some(len)
}

/// Check a key against `[a-z0-9]+(-[a-z0-9]+)*`.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.split('-').all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        })
}

pub(crate) fn validate_key(key: &str) -> Result<(), RegistryError> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(RegistryError::InvalidKey(key.to_string()))
    }
}

pub(crate) fn validate_origin(key: &str, origin: &str) -> Result<(), RegistryError> {
    let invalid = |reason: &str| RegistryError::InvalidOrigin {
        key: key.to_string(),
        origin: origin.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(origin).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host"));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(invalid("credentials are not allowed"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed"));
    }
    // Url normalizes an empty path to "/", so the raw string is checked too.
    if url.path() != "/" || origin.ends_with('/') {
        return Err(invalid("origin must not carry a path or trailing slash"));
    }

    Ok(())
}
