//! # Gateway Error Types
//!
//! The closed error taxonomy of the gateway. Every failure path (local
//! validation, backend business failure, backend transport failure, upload
//! failure) collapses into one [`ErrorKind`] before it reaches a client.
//! All gateway operations return `Result<T, GatewayError>`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;

/// Field → reason mapping carried by validation failures and backend errors
pub type ErrorDetails = BTreeMap<String, String>;

/// Abstract error kind, as seen on the wire and by HTTP clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Auth,
    NotFound,
    BadRequest,
    Conflict,
    Internal,
    /// Fallback for absent or unrecognised kinds
    Unknown,
}

/// Kind → HTTP status. Indexed by [`ErrorKind::index`].
const STATUS_TABLE: [u16; 7] = [400, 401, 404, 400, 409, 500, 400];

impl ErrorKind {
    /// Every kind, in table order
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Validation,
        ErrorKind::Auth,
        ErrorKind::NotFound,
        ErrorKind::BadRequest,
        ErrorKind::Conflict,
        ErrorKind::Internal,
        ErrorKind::Unknown,
    ];

    const fn index(self) -> usize {
        match self {
            ErrorKind::Validation => 0,
            ErrorKind::Auth => 1,
            ErrorKind::NotFound => 2,
            ErrorKind::BadRequest => 3,
            ErrorKind::Conflict => 4,
            ErrorKind::Internal => 5,
            ErrorKind::Unknown => 6,
        }
    }

    /// HTTP status for this kind
    pub const fn status_code(self) -> u16 {
        STATUS_TABLE[self.index()]
    }

    /// Wire name (`VALIDATION_ERROR`, `AUTH_ERROR`, ...)
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Auth => "AUTH_ERROR",
            ErrorKind::NotFound => "NOT_FOUND_ERROR",
            ErrorKind::BadRequest => "BAD_REQUEST_ERROR",
            ErrorKind::Conflict => "CONFLICT_ERROR",
            ErrorKind::Internal => "INTERNAL_ERROR",
            ErrorKind::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Parse a wire name. Anything outside the taxonomy becomes `Unknown`.
    pub fn from_wire(value: &str) -> Self {
        match value {
            "VALIDATION_ERROR" => ErrorKind::Validation,
            "AUTH_ERROR" => ErrorKind::Auth,
            "NOT_FOUND_ERROR" => ErrorKind::NotFound,
            "BAD_REQUEST_ERROR" => ErrorKind::BadRequest,
            "CONFLICT_ERROR" => ErrorKind::Conflict,
            "INTERNAL_ERROR" => ErrorKind::Internal,
            _ => ErrorKind::Unknown,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ErrorKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(ErrorKind::Unknown, ErrorKind::from_wire))
    }
}

/// Structured error, both as returned by backends and as rendered to clients.
///
/// Serializes as `{type, message, details?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "type", default = "unknown_kind")]
    pub kind: ErrorKind,

    #[serde(default)]
    pub message: String,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_details"
    )]
    pub details: Option<ErrorDetails>,
}

fn unknown_kind() -> ErrorKind {
    ErrorKind::Unknown
}

impl ErrorEnvelope {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details
            .get_or_insert_with(ErrorDetails::new)
            .insert(key.into(), value.into());
        self
    }

    /// HTTP status selected by `kind`
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}

/// Backends send details either as a map or as a list of `{key, value}` pairs.
#[derive(Deserialize)]
#[serde(untagged)]
enum DetailsWire {
    Map(ErrorDetails),
    Pairs(Vec<DetailPair>),
}

#[derive(Deserialize)]
struct DetailPair {
    key: String,
    #[serde(default)]
    value: String,
}

fn deserialize_details<'de, D>(deserializer: D) -> Result<Option<ErrorDetails>, D::Error>
where
    D: Deserializer<'de>,
{
    let wire = Option::<DetailsWire>::deserialize(deserializer)?;
    let details = match wire {
        None => return Ok(None),
        Some(DetailsWire::Map(map)) => map,
        Some(DetailsWire::Pairs(pairs)) => pairs.into_iter().map(|p| (p.key, p.value)).collect(),
    };
    Ok((!details.is_empty()).then_some(details))
}

/// Failure to reach a backend or to make sense of its reply.
///
/// The text is for logs only; clients see a generic `INTERNAL_ERROR`.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("backend {service} unreachable: {message}")]
    Unreachable { service: String, message: String },

    #[error("backend {service} timed out")]
    Timeout { service: String },

    #[error("backend {service} returned HTTP {status}")]
    Status { service: String, status: u16 },

    #[error("backend {service} sent an undecodable reply: {message}")]
    Decode { service: String, message: String },

    #[error("failed to encode request for {service}: {message}")]
    Encode { service: String, message: String },
}

/// Core error type for all gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Request failed local schema validation
    #[error("{message}")]
    Validation {
        message: String,
        details: ErrorDetails,
    },

    /// No usable credential, or the credential was rejected
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated, but the role is not allowed here
    #[error("{0}")]
    Forbidden(String),

    /// Backend answered with a business error
    #[error("{}: {}", .0.kind, .0.message)]
    Backend(ErrorEnvelope),

    /// Backend answered `success=false` without an error body
    #[error("unknown backend failure: {0}")]
    UnknownBackend(String),

    /// Backend could not be called; `operation` names what was attempted
    #[error("failed to {operation}")]
    Transport { operation: String },

    /// Object storage rejected the upload
    #[error("failed to upload file")]
    Upload,

    /// Any other gateway-side failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Validation failure carrying a single field reason
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut details = ErrorDetails::new();
        details.insert(field.into(), reason.into());
        GatewayError::Validation {
            message: "Invalid request format".to_string(),
            details,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Validation { .. } => ErrorKind::Validation,
            GatewayError::Unauthenticated(_) | GatewayError::Forbidden(_) => ErrorKind::Auth,
            GatewayError::Backend(envelope) => envelope.kind,
            GatewayError::UnknownBackend(_) => ErrorKind::Unknown,
            GatewayError::Transport { .. } | GatewayError::Upload | GatewayError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// HTTP status for this error, always via the taxonomy table
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Client-facing envelope. Never carries transport or storage error text.
    pub fn to_envelope(&self) -> ErrorEnvelope {
        match self {
            GatewayError::Validation { message, details } => ErrorEnvelope {
                kind: ErrorKind::Validation,
                message: message.clone(),
                details: (!details.is_empty()).then(|| details.clone()),
            },
            GatewayError::Backend(envelope) => envelope.clone(),
            GatewayError::UnknownBackend(message) => {
                ErrorEnvelope::new(ErrorKind::Unknown, message.clone())
            }
            GatewayError::Internal(_) => {
                ErrorEnvelope::new(ErrorKind::Internal, "Internal server error")
            }
            other => ErrorEnvelope::new(other.kind(), other.to_string()),
        }
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_table() {
        let expected = [
            (ErrorKind::Validation, 400),
            (ErrorKind::Auth, 401),
            (ErrorKind::NotFound, 404),
            (ErrorKind::BadRequest, 400),
            (ErrorKind::Conflict, 409),
            (ErrorKind::Internal, 500),
            (ErrorKind::Unknown, 400),
        ];
        for (kind, status) in expected {
            assert_eq!(kind.status_code(), status, "{kind}");
        }
    }

    #[test]
    fn test_wire_names_round_trip() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_wire(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_unrecognised_kind_is_unknown() {
        assert_eq!(ErrorKind::from_wire("RATE_LIMITED"), ErrorKind::Unknown);
        assert_eq!(ErrorKind::from_wire(""), ErrorKind::Unknown);
        assert_eq!(ErrorKind::from_wire("validation_error"), ErrorKind::Unknown);

        let envelope: ErrorEnvelope =
            serde_json::from_value(json!({"type": "TEAPOT", "message": "no"})).unwrap();
        assert_eq!(envelope.status_code(), 400);

        let envelope: ErrorEnvelope = serde_json::from_value(json!({"message": "no"})).unwrap();
        assert_eq!(envelope.kind, ErrorKind::Unknown);
    }

    #[test]
    fn test_details_as_map_or_pairs() {
        let from_map: ErrorEnvelope = serde_json::from_value(json!({
            "type": "VALIDATION_ERROR",
            "message": "bad",
            "details": {"price": "must be positive"}
        }))
        .unwrap();
        let from_pairs: ErrorEnvelope = serde_json::from_value(json!({
            "type": "VALIDATION_ERROR",
            "message": "bad",
            "details": [{"key": "price", "value": "must be positive"}]
        }))
        .unwrap();
        assert_eq!(from_map, from_pairs);
        assert_eq!(
            from_map.details.unwrap().get("price").map(String::as_str),
            Some("must be positive")
        );
    }

    #[test]
    fn test_envelope_serialization_shape() {
        let body = serde_json::to_value(ErrorEnvelope::new(ErrorKind::NotFound, "gone")).unwrap();
        assert_eq!(body, json!({"type": "NOT_FOUND_ERROR", "message": "gone"}));
    }

    #[test]
    fn test_transport_failure_does_not_leak() {
        let err = GatewayError::Transport {
            operation: "get product".to_string(),
        };
        let envelope = err.to_envelope();
        assert_eq!(envelope.kind, ErrorKind::Internal);
        assert_eq!(envelope.message, "failed to get product");
        assert!(envelope.details.is_none());
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_auth_variants_share_kind() {
        assert_eq!(GatewayError::Unauthenticated("x".into()).status_code(), 401);
        assert_eq!(GatewayError::Forbidden("x".into()).status_code(), 401);
    }
}
