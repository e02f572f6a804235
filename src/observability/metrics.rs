//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by platform, method, status
//! - `proxy_request_duration_seconds` (histogram): latency by platform
//! - `proxy_upstream_retries_total` (counter): retried upstream attempts by platform
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Unknown platforms are labelled `none` to bound cardinality

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished client request.
pub fn record_request(platform: &str, method: &str, status: u16, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "platform" => platform.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "proxy_request_duration_seconds",
        "platform" => platform.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record a retried upstream attempt.
pub fn record_retry(platform: &str) {
    metrics::counter!("proxy_upstream_retries_total", "platform" => platform.to_string())
        .increment(1);
}
