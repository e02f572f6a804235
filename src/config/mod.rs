//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, platform table included)
//!     → ProxyConfig (validated, immutable)
//!     → platform table frozen into the routing subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CacheConfig, ListenerConfig, LogFormat, ObservabilityConfig, PlatformConfig,
    PlatformsConfig, ProxyConfig, RetryConfig, SecurityConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
