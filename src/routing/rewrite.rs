//! Path rewriting.
//!
//! # Responsibilities
//! - Strip the client-facing routing prefix of a platform
//! - Apply the platform's structural rule to the remainder
//! - Pair the rewritten path with the platform origin
//!
//! # Design Decisions
//! - Unknown platform key = identity, never an error
//! - Never partially strip: the prefix matches exactly or not at all
//! - Rules are a closed enum, matched exhaustively
//! - Query strings and fragments are carried through untouched

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::PlatformConfig;
use crate::routing::platform::{match_prefix, PlatformEntry};
use crate::routing::{Registry, RegistryError};

/// Structural rewrite applied after the routing prefix is stripped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RewriteRule {
    /// Forward the stripped path as-is.
    #[default]
    Identity,
    /// Inject a fixed API namespace in front of the path.
    ///
    /// `/` → `{namespace}`, `/?q=x` → `{namespace}?q=x`, `/a/b` → `{namespace}/a/b`.
    ApiNamespace { namespace: String },
}

impl RewriteRule {
    /// Apply the rule to a path that already had its routing prefix stripped.
    pub fn apply<'a>(&self, remainder: Cow<'a, str>) -> Cow<'a, str> {
        match self {
            RewriteRule::Identity => remainder,
            RewriteRule::ApiNamespace { namespace } => {
                if remainder.is_empty() || remainder == "/" {
                    Cow::Owned(namespace.clone())
                } else if remainder.starts_with("/?") {
                    Cow::Owned(format!("{}{}", namespace, &remainder[1..]))
                } else if remainder.starts_with('/') {
                    Cow::Owned(format!("{}{}", namespace, remainder))
                } else {
                    // Not an absolute path; there is nothing safe to inject into.
                    remainder
                }
            }
        }
    }

    fn validate(&self, key: &str) -> Result<(), RegistryError> {
        match self {
            RewriteRule::Identity => Ok(()),
            RewriteRule::ApiNamespace { namespace } => {
                let well_formed = namespace.len() > 1
                    && namespace.starts_with('/')
                    && !namespace.ends_with('/')
                    && !namespace.contains(['?', '#']);
                if well_formed {
                    Ok(())
                } else {
                    Err(RegistryError::InvalidRule {
                        key: key.to_string(),
                        reason: format!(
                            "namespace {:?} must start with '/', not end with '/' and carry no query or fragment",
                            namespace
                        ),
                    })
                }
            }
        }
    }
}

/// Strip the routing prefix of `key` from `path`.
///
/// Returns `path` untouched when it does not start with the prefix.
pub fn strip_prefix<'a>(path: &'a str, key: &str) -> &'a str {
    match match_prefix(path, key) {
        // Keep the prefix's trailing '/' as the leading '/' of the remainder,
        // unless the remainder already brings its own.
        Some(len) if path[len..].starts_with('/') => &path[len..],
        Some(len) => &path[len - 1..],
        None => path,
    }
}

/// A resolved upstream request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget<'a> {
    pub platform: &'a PlatformEntry,
    pub path: Cow<'a, str>,
}

impl UpstreamTarget<'_> {
    /// `origin + path`.
    pub fn url(&self) -> String {
        format!("{}{}", self.platform.origin(), self.path)
    }
}

/// Rewrites client paths into upstream paths.
#[derive(Debug, Clone)]
pub struct RewriteEngine {
    registry: Arc<Registry>,
    rules: HashMap<String, RewriteRule>,
}

impl RewriteEngine {
    /// Create an engine over `registry` with a table of structural rules.
    ///
    /// Every rule must target a registered platform.
    pub fn new(
        registry: Arc<Registry>,
        rules: impl IntoIterator<Item = (String, RewriteRule)>,
    ) -> Result<Self, RegistryError> {
        let mut table = HashMap::new();

        for (key, rule) in rules {
            if registry.lookup(&key).is_none() {
                return Err(RegistryError::UnknownRuleTarget(key));
            }
            rule.validate(&key)?;
            if rule != RewriteRule::Identity {
                table.insert(key, rule);
            }
        }

        Ok(Self {
            registry,
            rules: table,
        })
    }

    /// Build the registry and rule table from platform configs.
    pub fn from_config(platforms: &[PlatformConfig]) -> Result<Self, RegistryError> {
        let registry = Arc::new(Registry::from_config(platforms)?);
        Self::new(
            registry,
            platforms.iter().map(|p| (p.key.clone(), p.rule.clone())),
        )
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The structural rule registered for `key`.
    pub fn rule_for(&self, key: &str) -> &RewriteRule {
        static IDENTITY: RewriteRule = RewriteRule::Identity;
        self.rules.get(key).unwrap_or(&IDENTITY)
    }

    /// Rewrite a client path addressed to platform `key`.
    ///
    /// Unregistered keys leave the path unchanged.
    pub fn rewrite<'a>(&self, path: &'a str, key: &str) -> Cow<'a, str> {
        if self.registry.lookup(key).is_none() {
            return Cow::Borrowed(path);
        }

        let stripped = strip_prefix(path, key);
        self.rule_for(key).apply(Cow::Borrowed(stripped))
    }

    /// Resolve the platform from the path itself and rewrite it.
    pub fn route<'a>(&'a self, path: &'a str) -> Option<UpstreamTarget<'a>> {
        let platform = self.registry.resolve(path)?;
        let path = self.rewrite(path, platform.key());
        Some(UpstreamTarget { platform, path })
    }

    /// Full upstream URL for `path` on platform `key`.
    pub fn upstream_url(&self, path: &str, key: &str) -> Option<String> {
        let origin = self.registry.origin_for(key)?;
        Some(format!("{}{}", origin, self.rewrite(path, key)))
    }
}
