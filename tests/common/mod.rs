//! Shared utilities for integration tests.

use std::net::SocketAddr;

use axum::http::{Method, Uri};
use axum::Router;
use registry_proxy::config::{PlatformConfig, ProxyConfig};
use registry_proxy::lifecycle::{build_engine, Shutdown};
use registry_proxy::{HttpServer, RewriteRule};
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral local port.
#[allow(dead_code)]
pub async fn start_upstream(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// An upstream that answers every request with `"{method} {path?query}"`.
#[allow(dead_code)]
pub async fn start_echo_upstream() -> SocketAddr {
    start_upstream(Router::new().fallback(|method: Method, uri: Uri| async move {
        format!("{} {}", method, uri)
    }))
    .await
}

/// A local address nothing listens on.
#[allow(dead_code)]
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A platform entry pointing at a local upstream.
#[allow(dead_code)]
pub fn local_platform(key: &str, upstream: SocketAddr, rule: RewriteRule) -> PlatformConfig {
    PlatformConfig {
        key: key.to_string(),
        origin: format!("http://{}", upstream),
        rule,
    }
}

/// Proxy config with fast retries and the given custom platforms.
pub fn proxy_config(platforms: Vec<PlatformConfig>) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.retries.base_delay_ms = 10;
    config.retries.max_delay_ms = 50;
    config.platforms.custom = platforms;
    config
}

/// Build the proxy server for `config`.
pub fn build_server(config: ProxyConfig) -> HttpServer {
    let engine = build_engine(&config).unwrap();
    HttpServer::new(config, engine).unwrap()
}

/// Start the proxy on an ephemeral port. Trigger the returned handle to stop it.
#[allow(dead_code)]
pub async fn start_proxy(config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let server = build_server(config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// HTTP client that bypasses environment proxies and connection reuse.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
