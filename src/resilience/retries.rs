//! Retry logic.
//!
//! # Responsibilities
//! - Determine if an upstream attempt is retryable (idempotent methods only)
//! - Bound the number of attempts per request
//!
//! # Design Decisions
//! - Never retry POST/PATCH (non-idempotent)
//! - Connection errors and timeouts always retryable
//! - Only gateway-style 5xx (502, 503, 504) are retried; a 500 is an answer

use axum::http::{Method, StatusCode};

use crate::config::RetryConfig;

/// Returns true if an attempt that ended this way may be retried.
///
/// `status` is `None` when no response was received.
pub fn is_retryable(method: &Method, status: Option<StatusCode>, network_error: bool) -> bool {
    if !method.is_idempotent() {
        return false;
    }

    if network_error {
        return true;
    }

    matches!(
        status,
        Some(StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT)
    )
}

/// Total number of attempts allowed for a request.
pub fn max_attempts(config: &RetryConfig, method: &Method) -> u32 {
    if config.enabled && method.is_idempotent() {
        config.max_attempts.max(1)
    } else {
        1
    }
}
