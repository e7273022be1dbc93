//! # Backend RPC Contract
//!
//! Every backend reply satisfies the same envelope: `success`, an optional
//! `message`, an `error` present iff `success` is false, and the remaining
//! fields as payload. Calls go through an [`RpcChannel`], one per backend.
//!
//! ```text
//! ┌──────────────┐  invoke(method, json)  ┌─────────────────────────┐
//! │ OrderClient  │ ─────────────────────▶ │ RpcChannel (trait)      │
//! │ PaymentClient│                        │  ├── HttpChannel (api)  │
//! │ ...          │ ◀───────────────────── │  └── test doubles       │
//! └──────────────┘      BackendReply      └─────────────────────────┘
//! ```

use crate::error::{ErrorEnvelope, GatewayError, TransportError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Reply envelope shared by every backend call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendReply {
    #[serde(default)]
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,

    /// Everything else the backend returned
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl BackendReply {
    /// Successful reply with the given payload fields
    pub fn ok(payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        Self {
            success: true,
            message: None,
            error: None,
            payload,
        }
    }

    /// Failed reply carrying a structured error
    pub fn failure(error: ErrorEnvelope) -> Self {
        Self {
            success: false,
            message: Some(error.message.clone()),
            error: Some(error),
            payload: Map::new(),
        }
    }

    /// String payload field, if present and a string
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// Convert into the HTTP body on success, or the taxonomy error on failure.
    ///
    /// `fallback` is the message used when a failed reply carries neither an
    /// error nor a message.
    pub fn into_body(self, fallback: &str) -> Result<Map<String, Value>, GatewayError> {
        if self.success {
            let mut body = self.payload;
            body.insert("success".to_string(), Value::Bool(true));
            if let Some(message) = self.message.filter(|m| !m.is_empty()) {
                body.insert("message".to_string(), Value::String(message));
            }
            return Ok(body);
        }

        match self.error {
            Some(error) => Err(GatewayError::Backend(error)),
            None => Err(GatewayError::UnknownBackend(
                self.message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| fallback.to_string()),
            )),
        }
    }
}

/// One connection to one backend service
#[async_trait]
pub trait RpcChannel: Send + Sync {
    /// Fully qualified service name, e.g. `order.OrderService`
    fn service(&self) -> &str;

    /// Invoke a unary method with a JSON request
    async fn invoke(&self, method: &str, request: Value) -> Result<BackendReply, TransportError>;
}

/// Type alias for a shared channel (dynamic dispatch)
pub type BoxedChannel = Arc<dyn RpcChannel>;

/// Outcome of one backend call
pub type RpcResult = Result<BackendReply, TransportError>;

/// Serialize a typed request and invoke `method` on `channel`
pub async fn call<T: Serialize + ?Sized>(
    channel: &dyn RpcChannel,
    method: &str,
    request: &T,
) -> RpcResult {
    let body = serde_json::to_value(request).map_err(|e| TransportError::Encode {
        service: channel.service().to_string(),
        message: e.to_string(),
    })?;
    channel.invoke(method, body).await
}
