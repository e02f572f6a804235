//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, upstream headers)
//!     → [security policy check]
//!     → [routing engine resolves platform + rewrites path]
//!     → [reqwest forwards to origin + path, with retries]
//!     → response.rs (strip hop-by-hop, cache + CORS headers, stream body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
