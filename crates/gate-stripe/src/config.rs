//! # Webhook Configuration
//!
//! Configuration for Stripe webhook ingestion.
//! The signing secret is loaded from the environment.

use crate::signature::WebhookError;

/// Largest webhook body accepted, in bytes
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Allowed clock skew between Stripe's timestamp and ours
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Stripe webhook configuration
#[derive(Clone)]
pub struct WebhookConfig {
    /// Webhook signing secret (whsec_...)
    pub webhook_secret: String,

    /// Timestamp tolerance in seconds
    pub tolerance_secs: i64,

    /// Body size cap enforced before verification
    pub max_body_bytes: usize,

    /// Write a payment record for `charge.succeeded` events
    pub persist_charge_succeeded: bool,
}

impl WebhookConfig {
    /// Load configuration through a variable lookup (usually the process env).
    ///
    /// Required:
    /// - `STRIPE_WEBHOOK_SECRET`
    ///
    /// Optional:
    /// - `STRIPE_PERSIST_CHARGE_SUCCEEDED` (default `false`)
    pub fn from_lookup<F>(var: F) -> Result<Self, WebhookError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let webhook_secret = var("STRIPE_WEBHOOK_SECRET").ok_or_else(|| {
            WebhookError::Configuration("STRIPE_WEBHOOK_SECRET not set".to_string())
        })?;

        let persist_charge_succeeded = match var("STRIPE_PERSIST_CHARGE_SUCCEEDED") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                WebhookError::Configuration(format!(
                    "STRIPE_PERSIST_CHARGE_SUCCEEDED must be true or false, got {:?}",
                    raw
                ))
            })?,
            None => false,
        };

        Ok(Self::new(webhook_secret)?.with_charge_persistence(persist_charge_succeeded))
    }

    /// Create config with an explicit secret
    pub fn new(webhook_secret: impl Into<String>) -> Result<Self, WebhookError> {
        let webhook_secret = webhook_secret.into();
        if !webhook_secret.starts_with("whsec_") {
            return Err(WebhookError::Configuration(
                "STRIPE_WEBHOOK_SECRET must start with whsec_".to_string(),
            ));
        }

        Ok(Self {
            webhook_secret,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            max_body_bytes: MAX_BODY_BYTES,
            persist_charge_succeeded: false,
        })
    }

    /// Builder: toggle persistence of `charge.succeeded`
    pub fn with_charge_persistence(mut self, enabled: bool) -> Self {
        self.persist_charge_succeeded = enabled;
        self
    }
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("webhook_secret", &"whsec_***")
            .field("tolerance_secs", &self.tolerance_secs)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("persist_charge_succeeded", &self.persist_charge_succeeded)
            .finish()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
