//! # Stripe Webhook Endpoint
//!
//! ```text
//! read (≤ max_body_bytes) ──▶ verify Stripe-Signature ──▶ ingest ──▶ 200
//!        │ overflow: 503            │ bad/missing: 400
//!        │ I/O: 500                 ▼
//!        ▼                        stop, no write
//!      stop
//! ```
//!
//! Once a request is authenticated it is always acknowledged with 200, even
//! when the payment write fails; the ingester logs the outcome.

use crate::respond::ApiError;
use crate::state::AppState;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use gate_core::{ErrorDetails, GatewayError};
use gate_stripe::WebhookError;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::json;
use tracing::{error, info, instrument, warn};

const SIGNATURE_HEADER: &str = "stripe-signature";

#[instrument(skip_all)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let payload = match read_body(body, state.webhook.config().max_body_bytes).await {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let event = match state.webhook.verify(&payload, signature) {
        Ok(event) => event,
        Err(e) => {
            let message = match e {
                // Same as the processor SDK's event construction failing: reject, not acknowledge
                WebhookError::MalformedEvent(_) => "Error parsing webhook payload",
                _ => "Error verifying webhook signature",
            };
            let mut details = ErrorDetails::new();
            details.insert("error".to_string(), e.to_string());
            return ApiError(GatewayError::Validation {
                message: message.to_string(),
                details,
            })
            .into_response();
        }
    };

    info!("Received webhook: type={}, id={}", event.event_type, event.id);
    let outcome = state.webhook.ingest(&event).await;
    info!("Webhook {} handled: {:?}", event.id, outcome);

    Json(json!({
        "success": true,
        "message": "Webhook processed successfully"
    }))
    .into_response()
}

/// Buffer the body, refusing anything past `limit` before it is verified
async fn read_body(body: Body, limit: usize) -> Result<Bytes, Response> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            warn!("Webhook body exceeds {} bytes", limit);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "type": "SERVICE_UNAVAILABLE",
                    "message": "Error reading request body"
                })),
            )
                .into_response())
        }
        Err(e) => {
            error!("Error reading webhook body: {}", e);
            Err(ApiError(GatewayError::Internal("Error reading request body".to_string()))
                .into_response())
        }
    }
}
