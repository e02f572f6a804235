//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts >= 1)
//! - Validate the platform table (keys, origins, rules, duplicates)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::routing::{RegistryError, RewriteEngine};

/// A single semantic problem in the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("retries.base_delay_ms ({base}) exceeds retries.max_delay_ms ({max})")]
    BackoffRange { base: u64, max: u64 },

    #[error("security.allowed_methods: invalid HTTP method {0:?}")]
    InvalidMethod(String),

    #[error("observability.log_level: unknown level {0:?}")]
    InvalidLogLevel(String),

    #[error("platforms.custom: duplicate key '{0}'")]
    DuplicatePlatform(String),

    #[error("platforms: {0}")]
    Platform(#[from] RegistryError),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero("listener.max_connections"));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::Zero("retries.max_attempts"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::BackoffRange {
            base: config.retries.base_delay_ms,
            max: config.retries.max_delay_ms,
        });
    }

    for method in &config.security.allowed_methods {
        if Method::from_str(method).is_err() {
            errors.push(ValidationError::InvalidMethod(method.clone()));
        }
    }
    if config.security.max_path_length == 0 {
        errors.push(ValidationError::Zero("security.max_path_length"));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        errors.push(ValidationError::InvalidLogLevel(config.observability.log_level.clone()));
    }
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let mut seen = HashSet::new();
    for platform in &config.platforms.custom {
        if !seen.insert(platform.key.as_str()) {
            errors.push(ValidationError::DuplicatePlatform(platform.key.clone()));
        }
    }
    // Duplicates are already reported above; building the tables reports the rest.
    if seen.len() == config.platforms.custom.len() {
        if let Err(e) = RewriteEngine::from_config(&config.platforms.resolved()) {
            errors.push(ValidationError::Platform(e));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
