//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ProxyConfig, ConfigError> {
    let config: ProxyConfig = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RewriteRule;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.retries.max_attempts, 3);
        assert_eq!(config.cache.max_age_secs, 1800);
        assert_eq!(config.security.allowed_methods, vec!["GET", "HEAD"]);
        assert_eq!(config.security.max_path_length, 2048);
        assert!(config.platforms.builtin);
    }

    #[test]
    fn test_full_file() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [retries]
            enabled = false

            [observability]
            log_format = "json"

            [platforms]
            builtin = false

            [[platforms.custom]]
            key = "hex"
            origin = "https://hex.pm"
            rule = { kind = "api-namespace", namespace = "/api/packages" }

            [[platforms.custom]]
            key = "cr-local"
            origin = "http://127.0.0.1:5000"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.listener.max_connections, 10_000);
        assert!(!config.retries.enabled);
        assert_eq!(config.observability.log_format, crate::config::LogFormat::Json);
        assert_eq!(config.platforms.custom.len(), 2);
        assert_eq!(
            config.platforms.custom[0].rule,
            RewriteRule::ApiNamespace { namespace: "/api/packages".into() }
        );
        assert_eq!(config.platforms.custom[1].rule, RewriteRule::Identity);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[listener\nbind_address = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_config("[timeouts]\nrequest_secs = 0\nconnect_secs = 0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: timeouts.connect_secs must be greater than zero, timeouts.request_secs must be greater than zero"
        );
    }

    #[test]
    fn test_sample_config() {
        let config = parse_config(include_str!("../../registry-proxy.toml")).unwrap();
        let platforms = config.platforms.resolved();

        let crates = platforms.iter().find(|p| p.key == "crates").unwrap();
        assert_eq!(crates.origin, "https://crates-mirror.example.com");
        assert!(platforms.iter().any(|p| p.key == "internal"));
        assert!(platforms.iter().any(|p| p.key == "gh"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/registry-proxy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
