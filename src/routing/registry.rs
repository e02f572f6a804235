//! Platform registry.
//!
//! # Responsibilities
//! - Store validated platform entries keyed by platform key
//! - Look up entries and origins by key
//! - Resolve the platform a client path is addressed to
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) key lookup via HashMap
//! - O(n) prefix scan for path resolution, longest prefix first
//! - Unknown keys are a normal `None`, never an error

use std::collections::{BTreeSet, HashMap};

use crate::config::PlatformConfig;
use crate::routing::builtin::builtin_platforms;
use crate::routing::platform::{match_prefix, PlatformEntry};
use crate::routing::RegistryError;

/// Immutable mapping from platform key to upstream origin.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: HashMap<String, PlatformEntry>,
    /// Keys ordered by routing prefix length, longest first.
    resolution_order: Vec<String>,
}

impl Registry {
    /// Build a registry from `(key, origin)` pairs.
    ///
    /// Fails on the first malformed key, malformed origin or duplicate key.
    pub fn new<I, K, O>(pairs: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (K, O)>,
        K: Into<String>,
        O: Into<String>,
    {
        let mut entries = HashMap::new();

        for (key, origin) in pairs {
            let entry = PlatformEntry::new(key, origin)?;
            if entries.contains_key(entry.key()) {
                return Err(RegistryError::DuplicateKey(entry.key().to_string()));
            }
            entries.insert(entry.key().to_string(), entry);
        }

        let mut resolution_order: Vec<String> = entries.keys().cloned().collect();
        resolution_order.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        tracing::debug!(platforms = entries.len(), "Platform registry built");

        Ok(Self {
            entries,
            resolution_order,
        })
    }

    /// Build a registry from platform configs (rules are ignored here).
    pub fn from_config(platforms: &[PlatformConfig]) -> Result<Self, RegistryError> {
        Self::new(
            platforms
                .iter()
                .map(|p| (p.key.as_str(), p.origin.as_str())),
        )
    }

    /// The built-in platform table.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_config(&builtin_platforms())
    }

    /// Look up a platform by key.
    pub fn lookup(&self, key: &str) -> Option<&PlatformEntry> {
        self.entries.get(key)
    }

    /// Upstream origin for a key.
    pub fn origin_for(&self, key: &str) -> Option<&str> {
        self.lookup(key).map(PlatformEntry::origin)
    }

    /// All registered keys.
    pub fn all_keys(&self) -> BTreeSet<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Entries sorted by key.
    pub fn entries(&self) -> Vec<&PlatformEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by(|a, b| a.key().cmp(b.key()));
        entries
    }

    /// Find the platform whose routing prefix starts `path`.
    ///
    /// When prefixes overlap (`/pypi/` and `/pypi/files/`) the longest wins.
    pub fn resolve(&self, path: &str) -> Option<&PlatformEntry> {
        self.resolution_order
            .iter()
            .find(|key| match_prefix(path, key).is_some())
            .and_then(|key| self.entries.get(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
