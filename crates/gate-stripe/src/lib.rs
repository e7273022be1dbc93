//! # gate-stripe
//!
//! Stripe webhook ingestion for the edge gateway.
//!
//! Incoming webhooks are verified against the `Stripe-Signature` header,
//! parsed into typed events and normalized into payment records that are
//! written through the payment backend.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gate_stripe::{WebhookConfig, WebhookIngester};
//!
//! let ingester = WebhookIngester::new(WebhookConfig::from_env()?, payments);
//!
//! // In your webhook endpoint:
//! let event = ingester.verify(&body, signature)?;
//! ingester.ingest(&event).await;
//! ```

pub mod config;
pub mod signature;
pub mod webhook;

// Re-exports
pub use config::{WebhookConfig, MAX_BODY_BYTES};
pub use signature::{sign_payload, verify_signature, WebhookError};
pub use webhook::{
    parse_event, plan, EventKind, EventObject, IngestOutcome, SkipReason, StripeEvent,
    WebhookIngester,
};
