//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::builtin::builtin_platforms;
use crate::routing::RewriteRule;

/// Root configuration for the registry proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration for upstream fetches.
    pub retries: RetryConfig,

    /// Response caching headers.
    pub cache: CacheConfig,

    /// Method, origin and path policy.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Upstream platform table.
    pub platforms: PlatformsConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent in-flight requests (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, first one included.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 8000,
        }
    }
}

/// Cache header configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// `max-age` advertised on successful responses, in seconds. 0 disables the header.
    pub max_age_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 1800, // 30 minutes
        }
    }
}

/// Request policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// HTTP methods accepted from clients.
    pub allowed_methods: Vec<String>,

    /// CORS origins; `*` allows any.
    pub allowed_origins: Vec<String>,

    /// Maximum length of path + query in bytes.
    pub max_path_length: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_methods: vec!["GET".to_string(), "HEAD".to_string()],
            allowed_origins: vec!["*".to_string()],
            max_path_length: 2048,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Upstream platform table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlatformsConfig {
    /// Serve the built-in platform table.
    pub builtin: bool,

    /// Additional platforms. An entry replaces the built-in platform with the same key.
    pub custom: Vec<PlatformConfig>,
}

impl Default for PlatformsConfig {
    fn default() -> Self {
        Self {
            builtin: true,
            custom: Vec::new(),
        }
    }
}

impl PlatformsConfig {
    /// The effective platform list: built-ins (unless disabled) merged with custom entries.
    pub fn resolved(&self) -> Vec<PlatformConfig> {
        let mut platforms: Vec<PlatformConfig> = if self.builtin {
            builtin_platforms()
                .into_iter()
                .filter(|b| !self.custom.iter().any(|c| c.key == b.key))
                .collect()
        } else {
            Vec::new()
        };
        platforms.extend(self.custom.iter().cloned());
        platforms
    }
}

/// A single upstream platform.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlatformConfig {
    /// Platform key, e.g. "cr-ghcr" (served under /cr/ghcr/).
    pub key: String,

    /// Upstream origin, e.g. "https://ghcr.io".
    pub origin: String,

    /// Structural rewrite applied after the prefix is stripped.
    #[serde(default)]
    pub rule: RewriteRule,
}
