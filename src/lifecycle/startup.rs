//! Startup orchestration.
//!
//! # Responsibilities
//! - Freeze the platform table into the routing engine
//! - Initialize subsystems in dependency order
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener starts last (traffic only when ready)

use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{ConfigError, ProxyConfig};
use crate::http::HttpServer;
use crate::lifecycle::{signals::shutdown_signal, Shutdown};
use crate::observability::metrics;
use crate::routing::{RegistryError, RewriteEngine};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("platform table error: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid address: {0}")]
    Address(#[from] AddrParseError),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the immutable routing engine from the configured platform table.
pub fn build_engine(config: &ProxyConfig) -> Result<Arc<RewriteEngine>, RegistryError> {
    let platforms = config.platforms.resolved();
    let engine = RewriteEngine::from_config(&platforms)?;

    tracing::info!(
        platforms = engine.registry().len(),
        builtin = config.platforms.builtin,
        custom = config.platforms.custom.len(),
        "Platform table loaded"
    );

    Ok(Arc::new(engine))
}

/// Start the proxy and serve until SIGINT/SIGTERM.
pub async fn run(config: ProxyConfig) -> Result<(), StartupError> {
    let engine = build_engine(&config)?;
    let server = HttpServer::new(config.clone(), engine)?;

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        max_connections = config.listener.max_connections,
        request_timeout_secs = config.timeouts.request_secs,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;
    Ok(())
}
