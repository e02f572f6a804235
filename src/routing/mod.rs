//! Routing subsystem: platform registry and path rewriting.
//!
//! # Data Flow
//! ```text
//! Incoming request path (e.g. /cr/ghcr/v2/library/nginx/manifests/latest)
//!     → registry.rs (resolve platform by longest routing prefix)
//!     → rewrite.rs (strip prefix, apply structural rule)
//!     → Return: (origin, upstream path) or NoMatch
//!
//! Table Compilation (at startup):
//!     builtin.rs table + [[platforms.custom]]
//!     → Validate keys, origins and rules
//!     → Freeze as immutable Registry + RewriteEngine
//! ```
//!
//! # Design Decisions
//! - Tables compiled at startup, immutable at runtime
//! - No regex in hot path (literal prefix comparison only)
//! - Deterministic: same input always yields the same upstream target
//! - Longest routing prefix wins when prefixes overlap

pub mod builtin;
pub mod platform;
pub mod registry;
pub mod rewrite;

use thiserror::Error;

pub use platform::{is_valid_key, routing_prefix, PlatformEntry};
pub use registry::Registry;
pub use rewrite::{RewriteEngine, RewriteRule, UpstreamTarget};

/// Errors raised while building the platform tables.
///
/// All of them are fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid platform key {0:?}: expected [a-z0-9]+(-[a-z0-9]+)*")]
    InvalidKey(String),

    #[error("invalid origin {origin:?} for platform '{key}': {reason}")]
    InvalidOrigin {
        key: String,
        origin: String,
        reason: String,
    },

    #[error("duplicate platform key '{0}'")]
    DuplicateKey(String),

    #[error("rewrite rule targets unknown platform '{0}'")]
    UnknownRuleTarget(String),

    #[error("invalid rewrite rule for platform '{key}': {reason}")]
    InvalidRule { key: String, reason: String },
}
