//! # Response Translation
//!
//! Turns backend replies into HTTP bodies and every [`GatewayError`] into the
//! `{type, message, details?}` envelope with the status its kind selects.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gate_core::{GatewayError, RpcResult};
use serde_json::{Map, Value};
use tracing::{error, warn};

/// HTTP-facing wrapper around [`GatewayError`]
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.status_code();
        if code >= 500 {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.to_envelope())).into_response()
    }
}

/// Handler result: a JSON body or a taxonomy error
pub type ApiResult = Result<Json<Value>, ApiError>;

/// Collapse a primary backend call into a body or a taxonomy error.
///
/// Transport detail is logged here and never reaches the client.
pub fn into_body(operation: &str, result: RpcResult) -> Result<Map<String, Value>, GatewayError> {
    match result {
        Ok(reply) => reply.into_body(&format!("Failed to {}", operation)),
        Err(e) => {
            error!("Backend call failed ({}): {}", operation, e);
            Err(GatewayError::Transport {
                operation: operation.to_string(),
            })
        }
    }
}

/// Render a primary backend call as the handler response
pub fn forward(operation: &str, result: RpcResult) -> ApiResult {
    Ok(Json(Value::Object(into_body(operation, result)?)))
}

/// Attach `field` from a secondary lookup; its failure leaves `body` untouched
pub fn merge_secondary(
    body: &mut Map<String, Value>,
    key: &str,
    secondary: RpcResult,
    field: &[&str],
) {
    let reply = match secondary {
        Ok(reply) if reply.success => reply,
        Ok(reply) => {
            warn!(
                "Secondary lookup for {} failed: {:?}",
                key,
                reply.error.map(|e| e.message).or(reply.message)
            );
            return;
        }
        Err(e) => {
            warn!("Secondary lookup for {} failed: {}", key, e);
            return;
        }
    };

    let mut value = Value::Object(reply.payload);
    for segment in field {
        value = match value {
            Value::Object(mut map) => match map.remove(*segment) {
                Some(next) => next,
                None => return,
            },
            _ => return,
        };
    }
    body.insert(key.to_string(), value);
}
