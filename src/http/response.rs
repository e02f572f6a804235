//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn an upstream response into a client response
//! - Add/remove headers (hop-by-hop, Cache-Control, CORS)
//! - Handle response streaming efficiently
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Hop-by-hop headers stripped automatically
//! - Only successful responses are marked cacheable

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::CacheConfig;

static HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP.iter()) {
        headers.remove(name);
    }
}

/// `Cache-Control` value for a response, if it should carry one.
pub fn cache_control(status: StatusCode, config: &CacheConfig) -> Option<HeaderValue> {
    if !status.is_success() || config.max_age_secs == 0 {
        return None;
    }
    HeaderValue::from_str(&format!("public, max-age={}", config.max_age_secs)).ok()
}

/// Build the client response from an upstream response, streaming its body.
pub fn from_upstream(
    upstream: reqwest::Response,
    cache: &CacheConfig,
    cors: Option<HeaderValue>,
) -> Response {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    strip_hop_by_hop(&mut headers);

    if let Some(value) = cache_control(status, cache) {
        headers.insert(header::CACHE_CONTROL, value);
    }

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    with_cors(response, cors)
}

/// A short plain-text error response generated by the proxy itself.
pub fn error_response(status: StatusCode, message: impl Into<String>, cors: Option<HeaderValue>) -> Response {
    with_cors((status, message.into()).into_response(), cors)
}

fn with_cors(mut response: Response, cors: Option<HeaderValue>) -> Response {
    if let Some(origin) = cors {
        response
            .headers_mut()
            .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    }
    response
}
