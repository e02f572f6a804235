//! Request policy: methods, URI length, CORS origins.
//!
//! # Responsibilities
//! - Reject methods outside the configured allow-list
//! - Enforce maximum path + query length
//! - Decide the `Access-Control-Allow-Origin` value for a request
//!
//! # Design Decisions
//! - Checks run before platform resolution (early rejection)
//! - Return 405 Method Not Allowed or 414 URI Too Long

use std::str::FromStr;

use axum::http::{HeaderValue, Method, StatusCode};

use crate::config::SecurityConfig;

/// Why a request was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    MethodNotAllowed(Method),
    UriTooLong { length: usize, max: usize },
}

impl PolicyViolation {
    pub fn status(&self) -> StatusCode {
        match self {
            PolicyViolation::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            PolicyViolation::UriTooLong { .. } => StatusCode::URI_TOO_LONG,
        }
    }
}

impl std::fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyViolation::MethodNotAllowed(m) => write!(f, "Method {} not allowed", m),
            PolicyViolation::UriTooLong { length, max } => {
                write!(f, "Path length {} exceeds maximum of {}", length, max)
            }
        }
    }
}

/// Compiled request policy.
#[derive(Debug, Clone)]
pub struct RequestPolicy {
    allowed_methods: Vec<Method>,
    allowed_origins: Vec<String>,
    max_path_length: usize,
}

impl RequestPolicy {
    /// Compile the policy. Methods that fail to parse are skipped; validation reports them.
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self {
            allowed_methods: config
                .allowed_methods
                .iter()
                .filter_map(|m| Method::from_str(m).ok())
                .collect(),
            allowed_origins: config.allowed_origins.clone(),
            max_path_length: config.max_path_length,
        }
    }

    /// Check method and path + query length.
    pub fn check(&self, method: &Method, path_and_query: &str) -> Result<(), PolicyViolation> {
        if !self.allowed_methods.contains(method) {
            return Err(PolicyViolation::MethodNotAllowed(method.clone()));
        }
        if path_and_query.len() > self.max_path_length {
            return Err(PolicyViolation::UriTooLong {
                length: path_and_query.len(),
                max: self.max_path_length,
            });
        }
        Ok(())
    }

    /// Value for the `Allow` header.
    pub fn allow_header(&self) -> String {
        self.allowed_methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `Access-Control-Allow-Origin` for a request carrying `origin`.
    pub fn cors_origin(&self, origin: Option<&HeaderValue>) -> Option<HeaderValue> {
        if self.allowed_origins.iter().any(|o| o == "*") {
            return Some(HeaderValue::from_static("*"));
        }
        let origin = origin?;
        let requested = origin.to_str().ok()?;
        self.allowed_origins
            .iter()
            .any(|o| o == requested)
            .then(|| origin.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RequestPolicy {
        RequestPolicy::from_config(&SecurityConfig::default())
    }

    #[test]
    fn test_default_methods() {
        let policy = policy();
        assert!(policy.check(&Method::GET, "/gh/user/repo").is_ok());
        assert!(policy.check(&Method::HEAD, "/gh/user/repo").is_ok());
        assert_eq!(
            policy.check(&Method::POST, "/gh/user/repo"),
            Err(PolicyViolation::MethodNotAllowed(Method::POST))
        );
        assert_eq!(policy.allow_header(), "GET, HEAD");
    }

    #[test]
    fn test_path_length() {
        let policy = policy();
        let ok = format!("/{}", "a".repeat(2047));
        let long = format!("/{}", "a".repeat(2048));
        assert!(policy.check(&Method::GET, &ok).is_ok());

        let err = policy.check(&Method::GET, &long).unwrap_err();
        assert_eq!(err, PolicyViolation::UriTooLong { length: 2049, max: 2048 });
        assert_eq!(err.status(), StatusCode::URI_TOO_LONG);
    }

    #[test]
    fn test_cors_origin() {
        assert_eq!(policy().cors_origin(None), Some(HeaderValue::from_static("*")));

        let policy = RequestPolicy::from_config(&SecurityConfig {
            allowed_origins: vec!["https://app.example.com".into()],
            ..SecurityConfig::default()
        });
        let allowed = HeaderValue::from_static("https://app.example.com");
        let other = HeaderValue::from_static("https://evil.example.com");
        assert_eq!(policy.cors_origin(Some(&allowed)), Some(allowed.clone()));
        assert_eq!(policy.cors_origin(Some(&other)), None);
        assert_eq!(policy.cors_origin(None), None);
    }
}
