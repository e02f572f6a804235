//! In-process checks of the request policy and platform resolution.
//! None of these requests reach an upstream.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use registry_proxy::config::SecurityConfig;

mod common;

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_unknown_platform_is_not_found() {
    let router = common::build_server(common::proxy_config(Vec::new())).router();

    for uri in ["/unknown/test/path", "/", "/gh", "/cr/unknown/v2/"] {
        let res = router.clone().oneshot(request("GET", uri)).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(res.headers().contains_key("x-request-id"));
    }
}

#[tokio::test]
async fn test_method_not_allowed() {
    let router = common::build_server(common::proxy_config(Vec::new())).router();

    for method in ["POST", "PUT", "DELETE", "OPTIONS"] {
        let res = router
            .clone()
            .oneshot(request(method, "/gh/user/repo.git"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(res.headers()[header::ALLOW], "GET, HEAD");
    }
}

#[tokio::test]
async fn test_uri_too_long() {
    let router = common::build_server(common::proxy_config(Vec::new())).router();

    let uri = format!("/gh/{}", "a".repeat(2048));
    let res = router.oneshot(request("GET", &uri)).await.unwrap();
    assert_eq!(res.status(), StatusCode::URI_TOO_LONG);
}

#[tokio::test]
async fn test_restricted_cors_origin() {
    let mut config = common::proxy_config(Vec::new());
    config.security = SecurityConfig {
        allowed_origins: vec!["https://app.example.com".into()],
        ..SecurityConfig::default()
    };
    let router = common::build_server(config).router();

    let allowed = Request::builder()
        .uri("/unknown/x")
        .header(header::ORIGIN, "https://app.example.com")
        .body(Body::empty())
        .unwrap();
    let res = router.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        res.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example.com"
    );

    let other = Request::builder()
        .uri("/unknown/x")
        .header(header::ORIGIN, "https://other.example.com")
        .body(Body::empty())
        .unwrap();
    let res = router.oneshot(other).await.unwrap();
    assert!(!res.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}
