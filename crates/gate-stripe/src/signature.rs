//! # Webhook Signature Verification
//!
//! Stripe signs `"<t>.<body>"` with HMAC-SHA256 and sends
//! `Stripe-Signature: t=<unix>,v1=<hex>[,v1=<hex>...]`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Webhook verification and parsing errors
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing Stripe-Signature header")]
    MissingSignature,

    #[error("malformed signature header: {0}")]
    MalformedSignature(String),

    #[error("timestamp outside tolerance")]
    StaleTimestamp,

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("invalid signing key")]
    InvalidKey,

    #[error("failed to parse webhook: {0}")]
    MalformedEvent(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Parsed `Stripe-Signature` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub signatures: Vec<String>,
}

pub fn parse_signature_header(header: &str) -> Result<SignatureHeader, WebhookError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        WebhookError::MalformedSignature("missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(WebhookError::MalformedSignature(
            "no v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

/// Hex HMAC-SHA256 of `"<timestamp>.<payload>"`
pub fn compute_signature(
    secret: &str,
    timestamp: i64,
    payload: &[u8],
) -> Result<String, WebhookError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::InvalidKey)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build a `Stripe-Signature` header value for `payload`
pub fn sign_payload(
    secret: &str,
    timestamp: i64,
    payload: &[u8],
) -> Result<String, WebhookError> {
    let signature = compute_signature(secret, timestamp, payload)?;
    Ok(format!("t={},v1={}", timestamp, signature))
}

/// Verify `header` against `payload` at time `now` (unix seconds)
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    header: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), WebhookError> {
    let parsed = parse_signature_header(header)?;

    // Header timestamps are attacker-controlled; compare without subtracting
    if now.abs_diff(parsed.timestamp) > tolerance_secs.unsigned_abs() {
        return Err(WebhookError::StaleTimestamp);
    }

    let expected = compute_signature(secret, parsed.timestamp, payload)?;
    let valid = parsed
        .signatures
        .iter()
        .any(|sig| constant_time_compare(sig, &expected));

    if valid {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}
