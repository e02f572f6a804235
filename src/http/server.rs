//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler
//! - Wire up middleware (tracing, request ID, timeout, concurrency limit)
//! - Enforce the request policy
//! - Resolve the platform and rewrite the path through the routing engine
//! - Forward requests to the upstream registry with retries
//! - Observability (metrics, correlation IDs)

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{CacheConfig, ProxyConfig, RetryConfig};
use crate::http::request::{request_id, upstream_headers, MakeRequestUuidV4};
use crate::http::response::{error_response, from_upstream};
use crate::observability::metrics;
use crate::resilience::backoff::backoff_for;
use crate::resilience::retries::{is_retryable, max_attempts};
use crate::routing::RewriteEngine;
use crate::security::{PolicyViolation, RequestPolicy};

/// Largest request body buffered for forwarding.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RewriteEngine>,
    pub client: reqwest::Client,
    pub policy: Arc<RequestPolicy>,
    pub retry_config: RetryConfig,
    pub cache_config: CacheConfig,
}

/// HTTP server for the registry proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    platforms: usize,
}

impl HttpServer {
    /// Create a new HTTP server over a frozen routing engine.
    pub fn new(config: ProxyConfig, engine: Arc<RewriteEngine>) -> Result<Self, reqwest::Error> {
        // Bodies may stream past request_secs; only connection setup is bounded here.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;
        let platforms = engine.registry().len();

        let state = AppState {
            engine,
            client,
            policy: Arc::new(RequestPolicy::from_config(&config.security)),
            retry_config: config.retries.clone(),
            cache_config: config.cache.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            platforms,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                    .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections)),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            platforms = self.platforms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for in-process use (tests, embedding).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Checks policy, resolves the platform, rewrites the path and forwards upstream.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .to_string();
    let cors = state.policy.cors_origin(request.headers().get(header::ORIGIN));

    // 1. Request policy
    if let Err(violation) = state.policy.check(&method, &path) {
        tracing::warn!(request_id = %request_id, method = %method, error = %violation, "Request rejected");
        metrics::record_request("none", method.as_str(), violation.status().as_u16(), start_time);

        let mut response = error_response(violation.status(), violation.to_string(), cors);
        if matches!(violation, PolicyViolation::MethodNotAllowed(_)) {
            if let Ok(allow) = state.policy.allow_header().parse() {
                response.headers_mut().insert(header::ALLOW, allow);
            }
        }
        return response;
    }

    // 2. Resolve platform and rewrite
    let Some(target) = state.engine.route(&path) else {
        tracing::warn!(request_id = %request_id, path = %path, "Unknown platform");
        metrics::record_request("none", method.as_str(), 404, start_time);
        return error_response(StatusCode::NOT_FOUND, "Unknown platform", cors);
    };
    let platform = target.platform.key().to_string();
    let url = target.url();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        platform = %platform,
        path = %path,
        upstream = %url,
        "Proxying request"
    );

    // 3. Buffer body (only methods that carry one)
    let (parts, body) = request.into_parts();
    let body = if method == Method::GET || method == Method::HEAD {
        Bytes::new()
    } else {
        match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(_) => {
                metrics::record_request(&platform, method.as_str(), 413, start_time);
                return error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large", cors);
            }
        }
    };

    // 4. Forward
    let headers = upstream_headers(&parts.headers);
    match forward(&state, &method, &url, headers, body, &request_id, &platform).await {
        Ok(upstream) => {
            let status = upstream.status();
            metrics::record_request(&platform, method.as_str(), status.as_u16(), start_time);
            from_upstream(upstream, &state.cache_config, cors)
        }
        Err(e) => {
            let status = if e.is_timeout() {
                StatusCode::GATEWAY_TIMEOUT
            } else {
                StatusCode::BAD_GATEWAY
            };
            tracing::error!(request_id = %request_id, platform = %platform, error = %e, "Upstream error");
            metrics::record_request(&platform, method.as_str(), status.as_u16(), start_time);
            error_response(status, "Upstream request failed", cors)
        }
    }
}

/// Send the request upstream, retrying per the retry configuration.
async fn forward(
    state: &AppState,
    method: &Method,
    url: &str,
    headers: HeaderMap,
    body: Bytes,
    request_id: &str,
    platform: &str,
) -> Result<reqwest::Response, reqwest::Error> {
    let max_attempts = max_attempts(&state.retry_config, method);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let mut builder = state
            .client
            .request(method.clone(), url)
            .headers(headers.clone());
        if !body.is_empty() {
            builder = builder.body(body.clone());
        }
        let result = builder.send().await;

        let retryable = match &result {
            Ok(response) => is_retryable(method, Some(response.status()), false),
            Err(e) => is_retryable(method, None, e.is_connect() || e.is_timeout()),
        };
        if attempt >= max_attempts || !retryable {
            return result;
        }

        let delay = backoff_for(&state.retry_config, attempt);
        match &result {
            Ok(response) => tracing::info!(
                request_id = %request_id,
                attempt,
                delay = ?delay,
                status = %response.status(),
                "Retrying request"
            ),
            Err(e) => tracing::info!(
                request_id = %request_id,
                attempt,
                delay = ?delay,
                error = %e,
                "Retrying after network error"
            ),
        }
        metrics::record_retry(platform);
        tokio::time::sleep(delay).await;
    }
}
