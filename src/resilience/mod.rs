//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Upstream attempt fails (connect error, timeout, 502/503/504)
//!     → retries.rs (retryable? attempts left?)
//!     → backoff.rs (exponential delay + jitter)
//!     → next attempt against the same upstream URL
//! ```
//!
//! # Design Decisions
//! - Per-request timeout is enforced by the HTTP layer, upstream timeouts by the client
//! - Jittered backoff prevents thundering herd on a recovering registry

pub mod backoff;
pub mod retries;
