//! # Configuration
//!
//! Application configuration is loaded from environment variables (with
//! `.env` support), plus an optional `config/backends.toml` holding backend
//! base URLs. Environment variables win over the file.

use gate_stripe::{WebhookConfig, WebhookError};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REGION: &str = "ca-central-1";

/// Configuration errors, all fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("invalid socket address: {0}")]
    Address(String),

    #[error("failed to parse {path}: {message}")]
    File { path: String, message: String },

    #[error(transparent)]
    Webhook(#[from] WebhookError),
}

/// Base URLs of the five backend services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEndpoints {
    pub auth: String,
    pub product: String,
    pub order: String,
    pub payment: String,
    pub reminder: String,
}

impl Default for BackendEndpoints {
    fn default() -> Self {
        Self {
            auth: "http://localhost:50051".to_string(),
            product: "http://localhost:50052".to_string(),
            order: "http://localhost:50053".to_string(),
            payment: "http://localhost:50054".to_string(),
            reminder: "http://localhost:50055".to_string(),
        }
    }
}

/// `[backends]` table of `config/backends.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendOverrides {
    pub auth: Option<String>,
    pub product: Option<String>,
    pub order: Option<String>,
    pub payment: Option<String>,
    pub reminder: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BackendsFile {
    #[serde(default)]
    backends: BackendOverrides,
}

/// S3 bucket used for uploads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT`; anything but `json` means pretty
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Backend base URLs
    pub backends: BackendEndpoints,
    /// Per-call backend deadline
    pub backend_timeout: Duration,
    /// Stripe webhook settings
    pub webhook: WebhookConfig,
    /// Upload bucket
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load from environment variables and `config/backends.toml`
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let file = load_backend_overrides()?;
        Self::from_lookup(|key| std::env::var(key).ok(), file)
    }

    /// Build from a variable lookup and file overrides
    pub fn from_lookup<F>(var: F, file: BackendOverrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
            })?,
            None => 8080,
        };

        let backend_timeout = match var("BACKEND_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "BACKEND_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let defaults = BackendEndpoints::default();
        let endpoint = |key: &'static str, from_file: Option<String>, fallback: String| {
            let raw = var(key).or(from_file).unwrap_or(fallback);
            normalize_base_url(&raw).ok_or(ConfigError::Invalid { key, value: raw })
        };
        let backends = BackendEndpoints {
            auth: endpoint("AUTH_SERVICE_URL", file.auth, defaults.auth)?,
            product: endpoint("PRODUCT_SERVICE_URL", file.product, defaults.product)?,
            order: endpoint("ORDER_SERVICE_URL", file.order, defaults.order)?,
            payment: endpoint("PAYMENT_SERVICE_URL", file.payment, defaults.payment)?,
            reminder: endpoint("REMINDER_SERVICE_URL", file.reminder, defaults.reminder)?,
        };

        let storage = StorageConfig {
            bucket: var("S3_BUCKET_NAME")
                .filter(|b| !b.trim().is_empty())
                .ok_or(ConfigError::Missing("S3_BUCKET_NAME"))?,
            region: var("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
        };

        let config = Self {
            host,
            port,
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            backends,
            backend_timeout,
            webhook: WebhookConfig::from_lookup(&var)?,
            storage,
        };
        config.socket_addr()?;
        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Address(addr))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Trim, drop trailing slashes and default the scheme to `http://`
fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.contains("://") {
        let valid = trimmed.starts_with("http://") || trimmed.starts_with("https://");
        valid.then(|| trimmed.to_string())
    } else {
        Some(format!("http://{}", trimmed))
    }
}

/// Load backend URLs from the first `config/backends.toml` found
fn load_backend_overrides() -> Result<BackendOverrides, ConfigError> {
    let config_paths = [
        "config/backends.toml",
        "../config/backends.toml",
        "../../config/backends.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            return parse_backends_file(path, &content);
        }
    }

    Ok(BackendOverrides::default())
}

fn parse_backends_file(path: &str, content: &str) -> Result<BackendOverrides, ConfigError> {
    let file: BackendsFile = toml::from_str(content).map_err(|e| ConfigError::File {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    Ok(file.backends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let mut vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        vars.entry("STRIPE_WEBHOOK_SECRET".into())
            .or_insert_with(|| "whsec_test".into());
        vars.entry("S3_BUCKET_NAME".into())
            .or_insert_with(|| "uploads".into());
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::from_lookup(lookup(&[]), BackendOverrides::default()).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.backend_timeout, Duration::from_secs(10));
        assert_eq!(config.backends, BackendEndpoints::default());
        assert_eq!(config.storage.region, "ca-central-1");
        assert!(!config.webhook.persist_charge_succeeded);
        assert!(!config.is_production());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = parse_backends_file(
            "inline",
            r#"
            [backends]
            order = "orders.internal:9000/"
            payment = "https://payments.internal"
            "#,
        )
        .unwrap();
        let config = AppConfig::from_lookup(
            lookup(&[("ORDER_SERVICE_URL", "http://override:1")]),
            file,
        )
        .unwrap();
        assert_eq!(config.backends.order, "http://override:1");
        assert_eq!(config.backends.payment, "https://payments.internal");
        assert_eq!(config.backends.auth, "http://localhost:50051");
    }

    #[test]
    fn test_invalid_values_fail() {
        let cases = [
            ("PORT", "eighty"),
            ("BACKEND_TIMEOUT_SECS", "0"),
            ("BACKEND_TIMEOUT_SECS", "soon"),
            ("AUTH_SERVICE_URL", "grpc://auth"),
            ("HOST", "not a host"),
            ("STRIPE_WEBHOOK_SECRET", "sk_live_123"),
        ];
        for (key, value) in cases {
            let result =
                AppConfig::from_lookup(lookup(&[(key, value)]), BackendOverrides::default());
            assert!(result.is_err(), "{}={} should be rejected", key, value);
        }
    }

    #[test]
    fn test_missing_bucket() {
        let result = AppConfig::from_lookup(
            lookup(&[("S3_BUCKET_NAME", " ")]),
            BackendOverrides::default(),
        );
        assert!(matches!(result, Err(ConfigError::Missing("S3_BUCKET_NAME"))));
    }

    #[test]
    fn test_malformed_file() {
        assert!(matches!(
            parse_backends_file("config/backends.toml", "[backends\nauth ="),
            Err(ConfigError::File { .. })
        ));
    }

    #[test]
    fn test_socket_addr() {
        let vars = lookup(&[("HOST", "0.0.0.0"), ("PORT", "3000")]);
        let mut config = AppConfig::from_lookup(vars, BackendOverrides::default()).unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:3000");
        config.environment = "production".into();
        assert!(config.is_production());
    }
}
