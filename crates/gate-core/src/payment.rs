//! # Payment Backend Contract
//!
//! Lookups for clients, and the canonical record the webhook writes.

use crate::rpc::{call, BoxedChannel, RpcResult};
use serde::{Deserialize, Serialize};

/// Status stored for a payment record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Failed,
    Succeeded,
    Completed,
    Expired,
    /// Status string reported by the processor that we do not model
    #[serde(untagged)]
    Other(String),
}

impl PaymentStatus {
    /// Map a processor status string, keeping unknown values verbatim
    pub fn from_processor(value: &str) -> Self {
        match value {
            "failed" => PaymentStatus::Failed,
            "succeeded" => PaymentStatus::Succeeded,
            "completed" | "complete" => PaymentStatus::Completed,
            "expired" => PaymentStatus::Expired,
            other => PaymentStatus::Other(other.to_string()),
        }
    }
}

/// Canonical payment write, whatever webhook event produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedPaymentRecord {
    /// Processor event id; the payment store keys idempotency on it
    pub transaction_id: String,
    pub order_id: String,
    pub customer_id: String,
    /// Major currency units
    pub amount: f64,
    pub status: PaymentStatus,
}

/// Convert an amount in minor units (cents) to major units
pub fn from_minor_units(amount: f64) -> f64 {
    amount / 100.0
}

#[derive(Debug, Serialize)]
struct PaymentLookup<'a> {
    payment_id: &'a str,
    customer_id: &'a str,
}

#[derive(Debug, Serialize)]
struct PaymentByOrderLookup<'a> {
    order_id: &'a str,
    customer_id: &'a str,
}

/// Client for `payment.PaymentService`
#[derive(Clone)]
pub struct PaymentClient {
    channel: BoxedChannel,
}

impl PaymentClient {
    pub const SERVICE: &'static str = "payment.PaymentService";

    pub fn new(channel: BoxedChannel) -> Self {
        Self { channel }
    }

    pub async fn store_payment(&self, record: &NormalizedPaymentRecord) -> RpcResult {
        call(&*self.channel, "StorePayment", record).await
    }

    pub async fn get_payment(&self, payment_id: &str, customer_id: &str) -> RpcResult {
        let request = PaymentLookup {
            payment_id,
            customer_id,
        };
        call(&*self.channel, "GetPayment", &request).await
    }

    pub async fn get_payment_by_order(&self, order_id: &str, customer_id: &str) -> RpcResult {
        let request = PaymentByOrderLookup {
            order_id,
            customer_id,
        };
        call(&*self.channel, "GetPaymentByOrderID", &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_value(PaymentStatus::Expired).unwrap(), json!("expired"));
        assert_eq!(
            serde_json::to_value(PaymentStatus::from_processor("open")).unwrap(),
            json!("open")
        );
        assert_eq!(PaymentStatus::from_processor("complete"), PaymentStatus::Completed);
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(from_minor_units(1999.0), 19.99);
        assert_eq!(from_minor_units(0.0), 0.0);
    }
}
