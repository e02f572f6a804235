//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (method allow-list, URI length)
//!     → Pass to routing
//!     → limits.rs (CORS origin for the response)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any policy failure
//! - No trust in client input

pub mod limits;

pub use limits::{PolicyViolation, RequestPolicy};
