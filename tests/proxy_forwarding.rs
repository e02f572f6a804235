//! End-to-end forwarding tests against local mock upstreams.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::Router;
use registry_proxy::RewriteRule;

mod common;

#[tokio::test]
async fn test_forwards_rewritten_path() {
    let upstream = common::start_echo_upstream().await;
    let config = common::proxy_config(vec![common::local_platform(
        "local",
        upstream,
        RewriteRule::Identity,
    )]);
    let (proxy, shutdown) = common::start_proxy(config).await;

    let res = common::client()
        .get(format!("http://{}/local/user/repo/file.txt?ref=main", proxy))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["cache-control"], "public, max-age=1800");
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "GET /user/repo/file.txt?ref=main");

    shutdown.trigger();
}

#[tokio::test]
async fn test_api_namespace_rule_and_longest_prefix() {
    let upstream = common::start_echo_upstream().await;
    let config = common::proxy_config(vec![
        common::local_platform("local", upstream, RewriteRule::Identity),
        common::local_platform(
            "local-api",
            upstream,
            RewriteRule::ApiNamespace {
                namespace: "/api/v1/crates".into(),
            },
        ),
    ]);
    let (proxy, shutdown) = common::start_proxy(config).await;
    let client = common::client();

    let cases = [
        ("/local/api/?q=serde", "GET /api/v1/crates?q=serde"),
        ("/local/api/", "GET /api/v1/crates"),
        ("/local/api/serde/1.0.0/download", "GET /api/v1/crates/serde/1.0.0/download"),
        ("/local/apix/serde", "GET /apix/serde"),
    ];
    for (path, expected) in cases {
        let res = client
            .get(format!("http://{}{}", proxy, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200, "{path}");
        assert_eq!(res.text().await.unwrap(), expected, "{path}");
    }

    shutdown.trigger();
}

#[tokio::test]
async fn test_head_request_forwarded() {
    let upstream = common::start_echo_upstream().await;
    let config = common::proxy_config(vec![common::local_platform(
        "local",
        upstream,
        RewriteRule::Identity,
    )]);
    let (proxy, shutdown) = common::start_proxy(config).await;

    let res = common::client()
        .head(format!("http://{}/local/pkg.tgz", proxy))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_propagated_upstream() {
    let upstream = common::start_upstream(Router::new().fallback(|headers: HeaderMap| async move {
        headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("missing")
            .to_string()
    }))
    .await;
    let config = common::proxy_config(vec![common::local_platform(
        "local",
        upstream,
        RewriteRule::Identity,
    )]);
    let (proxy, shutdown) = common::start_proxy(config).await;

    let res = common::client()
        .get(format!("http://{}/local/x", proxy))
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();

    assert_eq!(res.headers()["x-request-id"], "req-42");
    assert_eq!(res.text().await.unwrap(), "req-42");

    shutdown.trigger();
}

#[tokio::test]
async fn test_retry_on_unavailable_upstream() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let upstream = common::start_upstream(Router::new().fallback(move || {
        let cc = cc.clone();
        async move {
            if cc.fetch_add(1, Ordering::SeqCst) < 2 {
                (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
            } else {
                (StatusCode::OK, "Success")
            }
        }
    }))
    .await;
    let config = common::proxy_config(vec![common::local_platform(
        "local",
        upstream,
        RewriteRule::Identity,
    )]);
    let (proxy, shutdown) = common::start_proxy(config).await;

    let res = common::client()
        .get(format!("http://{}/local/flaky", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200, "Should eventually succeed after retries");
    assert_eq!(call_count.load(Ordering::SeqCst), 3);
    assert_eq!(res.text().await.unwrap(), "Success");

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_errors_not_cached() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let upstream = common::start_upstream(Router::new().fallback(move || {
        cc.fetch_add(1, Ordering::SeqCst);
        async { (StatusCode::NOT_FOUND, "no such package") }
    }))
    .await;
    let config = common::proxy_config(vec![common::local_platform(
        "local",
        upstream,
        RewriteRule::Identity,
    )]);
    let (proxy, shutdown) = common::start_proxy(config).await;

    let res = common::client()
        .get(format!("http://{}/local/missing", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 404);
    assert!(!res.headers().contains_key("cache-control"));
    assert_eq!(call_count.load(Ordering::SeqCst), 1, "404 must not be retried");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let dead = common::closed_port().await;
    let config = common::proxy_config(vec![common::local_platform(
        "dead",
        dead,
        RewriteRule::Identity,
    )]);
    let (proxy, shutdown) = common::start_proxy(config).await;

    let res = common::client()
        .get(format!("http://{}/dead/anything", proxy))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);

    shutdown.trigger();
}
