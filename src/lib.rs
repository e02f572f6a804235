//! Registry proxy library.
//!
//! Fronts package and artifact registries (source hosts, language indexes, OS
//! mirrors, container registries) behind one path namespace:
//! `/{platform}/{path}` is forwarded to `{origin}{rewritten path}`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{PlatformEntry, Registry, RewriteEngine, RewriteRule};
