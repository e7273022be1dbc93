//! # Stripe Webhook Ingestion
//!
//! Verified events are normalized into a [`NormalizedPaymentRecord`] and
//! written through `payment.PaymentService/StorePayment`.
//!
//! ```text
//! body ──▶ verify ──▶ StripeEvent ──▶ plan() ──▶ record ──▶ StorePayment
//!                                       │
//!                                       └──▶ Skip (logged, no write)
//! ```
//!
//! Event objects are parsed leniently: a field with the wrong JSON type
//! reads as absent instead of failing the whole event.

use crate::config::WebhookConfig;
use crate::signature::{verify_signature, WebhookError};
use chrono::Utc;
use gate_core::payment::from_minor_units;
use gate_core::{NormalizedPaymentRecord, PaymentClient, PaymentStatus};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Verified Stripe event envelope
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,

    #[serde(rename = "type")]
    pub event_type: String,

    #[serde(default)]
    pub data: EventData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    #[serde(default, deserialize_with = "lenient_object")]
    pub object: EventObject,
}

/// The fields of `data.object` the gateway reads
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventObject {
    #[serde(default, deserialize_with = "lenient_string")]
    pub client_reference_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub customer: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub receipt_url: Option<String>,

    /// Checkout sessions, minor units
    #[serde(default, deserialize_with = "lenient_number")]
    pub amount_total: Option<f64>,

    /// Charges, minor units
    #[serde(default, deserialize_with = "lenient_number")]
    pub amount: Option<f64>,

    #[serde(default, deserialize_with = "lenient_metadata")]
    pub metadata: BTreeMap<String, String>,
}

impl EventObject {
    fn meta(&self, key: &str) -> Option<String> {
        self.metadata.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(value.as_str().filter(|s| !s.is_empty()).map(String::from))
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(Value::deserialize(d)?.as_f64())
}

fn lenient_metadata<'de, D>(d: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(d)?;
    Ok(value
        .as_object()
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default())
}

fn lenient_object<'de, D: Deserializer<'de>>(d: D) -> Result<EventObject, D::Error> {
    let value = Value::deserialize(d)?;
    if value.is_object() {
        Ok(serde_json::from_value(value).unwrap_or_default())
    } else {
        Ok(EventObject::default())
    }
}

/// Event types the gateway acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    PaymentFailed,
    ChargeSucceeded,
    CheckoutCompleted,
    CheckoutExpired,
    Other(String),
}

impl EventKind {
    pub fn parse(event_type: &str) -> Self {
        match event_type {
            "checkout.session.async_payment_failed" => EventKind::PaymentFailed,
            "charge.succeeded" => EventKind::ChargeSucceeded,
            "checkout.session.completed" => EventKind::CheckoutCompleted,
            "checkout.session.expired" => EventKind::CheckoutExpired,
            other => EventKind::Other(other.to_string()),
        }
    }
}

/// Why a verified event produced no write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingOrderId,
    MissingCustomerId,
    ChargePersistenceDisabled,
    Unhandled(String),
}

/// Result of ingesting one verified event
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Stored(NormalizedPaymentRecord),
    StoreFailed(NormalizedPaymentRecord),
    Skipped(SkipReason),
}

/// Parse a verified body into an event envelope
pub fn parse_event(payload: &[u8]) -> Result<StripeEvent, WebhookError> {
    serde_json::from_slice(payload).map_err(|e| WebhookError::MalformedEvent(e.to_string()))
}

/// Decide which record, if any, an event should produce
pub fn plan(
    event: &StripeEvent,
    config: &WebhookConfig,
) -> Result<NormalizedPaymentRecord, SkipReason> {
    let object = &event.data.object;

    // Failed and expired sessions are stored with the processor's raw amount;
    // completed checkouts and charges are converted from minor units
    let (order_id, customer_id, amount, status) = match EventKind::parse(&event.event_type) {
        EventKind::PaymentFailed => (
            object.client_reference_id.clone(),
            object.customer.clone(),
            object.amount_total,
            PaymentStatus::Failed,
        ),
        EventKind::CheckoutExpired => (
            object.client_reference_id.clone(),
            object.customer.clone(),
            object.amount_total,
            PaymentStatus::Expired,
        ),
        EventKind::CheckoutCompleted => (
            object.meta("order_id"),
            object.meta("customer_id"),
            object.amount_total.map(from_minor_units),
            object
                .status
                .as_deref()
                .map(PaymentStatus::from_processor)
                .unwrap_or(PaymentStatus::Completed),
        ),
        EventKind::ChargeSucceeded => {
            match &object.receipt_url {
                Some(url) => info!("Charge receipt for {}: {}", event.id, url),
                None => debug!("Charge {} carries no receipt_url", event.id),
            }
            if !config.persist_charge_succeeded {
                return Err(SkipReason::ChargePersistenceDisabled);
            }
            (
                object.meta("order_id"),
                object.customer.clone().or_else(|| object.meta("customer_id")),
                object.amount.map(from_minor_units),
                PaymentStatus::Succeeded,
            )
        }
        EventKind::Other(event_type) => return Err(SkipReason::Unhandled(event_type)),
    };

    let order_id = order_id.ok_or(SkipReason::MissingOrderId)?;
    let customer_id = customer_id.ok_or(SkipReason::MissingCustomerId)?;

    Ok(NormalizedPaymentRecord {
        transaction_id: event.id.clone(),
        order_id,
        customer_id,
        amount: amount.unwrap_or(0.0),
        status,
    })
}

/// Verifies, normalizes and stores Stripe webhook events
#[derive(Clone)]
pub struct WebhookIngester {
    config: WebhookConfig,
    payments: PaymentClient,
}

impl WebhookIngester {
    pub fn new(config: WebhookConfig, payments: PaymentClient) -> Self {
        Self { config, payments }
    }

    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    /// Check the signature, then parse the envelope
    pub fn verify(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<StripeEvent, WebhookError> {
        self.verify_at(payload, signature, Utc::now().timestamp())
    }

    pub fn verify_at(
        &self,
        payload: &[u8],
        signature: Option<&str>,
        now: i64,
    ) -> Result<StripeEvent, WebhookError> {
        let header = signature
            .filter(|s| !s.trim().is_empty())
            .ok_or(WebhookError::MissingSignature)?;
        verify_signature(
            &self.config.webhook_secret,
            payload,
            header,
            now,
            self.config.tolerance_secs,
        )?;
        parse_event(payload)
    }

    /// Write the record for a verified event. Failures are logged, never raised.
    #[instrument(skip(self, event), fields(event_id = %event.id, event_type = %event.event_type))]
    pub async fn ingest(&self, event: &StripeEvent) -> IngestOutcome {
        let record = match plan(event, &self.config) {
            Ok(record) => record,
            Err(SkipReason::Unhandled(event_type)) => {
                info!("Ignoring unhandled event type: {}", event_type);
                return IngestOutcome::Skipped(SkipReason::Unhandled(event_type));
            }
            Err(reason) => {
                warn!("Not storing payment for event {}: {:?}", event.id, reason);
                return IngestOutcome::Skipped(reason);
            }
        };

        match self.payments.store_payment(&record).await {
            Ok(reply) if reply.success => {
                info!(
                    "Stored payment: order={}, status={:?}, amount={}",
                    record.order_id, record.status, record.amount
                );
                IngestOutcome::Stored(record)
            }
            Ok(reply) => {
                warn!(
                    "Payment store rejected event {}: {:?}",
                    event.id,
                    reply.error.map(|e| e.message).or(reply.message)
                );
                IngestOutcome::StoreFailed(record)
            }
            Err(e) => {
                warn!("Failed to store payment for event {}: {}", event.id, e);
                IngestOutcome::StoreFailed(record)
            }
        }
    }
}
