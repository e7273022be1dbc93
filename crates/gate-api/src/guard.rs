//! # Authentication and Authorization
//!
//! Protected handlers take an [`Authorized<P>`] argument. The extractor
//! verifies the bearer token with the auth backend, checks the caller's role
//! against `P::ALLOWED`, and rejects before the handler body runs.
//!
//! ```text
//! Authorization: Bearer <token>
//!        │
//!        ▼
//! authenticate() ── VerifyToken ──▶ Principal ── rbac::authorize(P::ALLOWED) ──▶ handler
//!        │                                              │
//!        └──────────── 401 AUTH_ERROR ◀─────────────────┘
//! ```

use crate::respond::ApiError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use gate_core::rbac::{self, ADMIN_ONLY, ANY_ROLE, CUSTOMER_ONLY};
use gate_core::{AuthClient, GatewayError, GatewayResult, Principal, Role};
use std::marker::PhantomData;
use tracing::{debug, warn};

/// Compile-time role set for a route
pub trait AccessPolicy: Send + Sync + 'static {
    const ALLOWED: &'static [Role];
}

/// Admin callers only
pub struct AdminOnly;

/// Customer callers only; admins are not implicitly customers
pub struct CustomerOnly;

/// Any authenticated caller
pub struct AnyRole;

impl AccessPolicy for AdminOnly {
    const ALLOWED: &'static [Role] = ADMIN_ONLY;
}

impl AccessPolicy for CustomerOnly {
    const ALLOWED: &'static [Role] = CUSTOMER_ONLY;
}

impl AccessPolicy for AnyRole {
    const ALLOWED: &'static [Role] = ANY_ROLE;
}

/// A caller that passed authentication and the route's role check
pub struct Authorized<P: AccessPolicy> {
    pub principal: Principal,
    _policy: PhantomData<P>,
}

impl<P: AccessPolicy> FromRequestParts<AppState> for Authorized<P> {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| value.to_str().unwrap_or_default());

        let principal = authenticate(&state.auth, header).await?;
        rbac::authorize(Some(&principal), P::ALLOWED)?;

        Ok(Self {
            principal,
            _policy: PhantomData,
        })
    }
}

/// Resolve a bearer header into a [`Principal`] via `AuthService.VerifyToken`
pub async fn authenticate(auth: &AuthClient, header: Option<&str>) -> GatewayResult<Principal> {
    let header = header.ok_or_else(|| {
        GatewayError::Unauthenticated("Authorization header is missing".to_string())
    })?;
    let token = bearer_token(header)
        .ok_or_else(|| GatewayError::Unauthenticated("Invalid authorization header".to_string()))?;

    // No retry: a failed verification is final for this request
    let reply = auth.verify_token(token).await.map_err(|e| {
        warn!("Token verification call failed: {}", e);
        GatewayError::Unauthenticated("Failed to verify token".to_string())
    })?;

    if !reply.success {
        let message = reply
            .error
            .map(|e| e.message)
            .or(reply.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Invalid token".to_string());
        return Err(GatewayError::Unauthenticated(message));
    }

    let subject_id = reply
        .str_field("user_id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| GatewayError::Unauthenticated("Invalid token".to_string()))?;
    let role = reply
        .str_field("role")
        .and_then(Role::parse)
        .ok_or_else(|| GatewayError::Unauthenticated("Invalid token role".to_string()))?;

    debug!("User authenticated: user_id={}, role={}", subject_id, role);
    Ok(Principal::new(subject_id, role))
}

/// `Bearer <token>`, exactly two space-separated parts
fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gate_core::{BackendReply, ErrorEnvelope, ErrorKind, RpcChannel, TransportError};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubAuth {
        reply: Result<BackendReply, ()>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RpcChannel for StubAuth {
        fn service(&self) -> &str {
            AuthClient::SERVICE
        }

        async fn invoke(&self, _method: &str, _request: Value) -> Result<BackendReply, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(|_| TransportError::Timeout {
                service: AuthClient::SERVICE.to_string(),
            })
        }
    }

    fn client(reply: Result<BackendReply, ()>) -> (AuthClient, Arc<StubAuth>) {
        let stub = Arc::new(StubAuth {
            reply,
            calls: AtomicUsize::new(0),
        });
        (AuthClient::new(stub.clone()), stub)
    }

    fn message(err: GatewayError) -> String {
        assert_eq!(err.status_code(), 401);
        err.to_envelope().message
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer a b"), None);
        assert_eq!(bearer_token("Basic abc"), None);
    }

    #[tokio::test]
    async fn test_missing_and_malformed_headers_skip_backend() {
        let (auth, stub) = client(Ok(BackendReply::ok(json!({}))));
        let missing = message(authenticate(&auth, None).await.unwrap_err());
        let malformed = message(authenticate(&auth, Some("Token abc")).await.unwrap_err());
        assert_ne!(missing, malformed);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_token() {
        let (auth, _) = client(Ok(BackendReply::ok(json!({"user_id": "u-7", "role": "admin"}))));
        let principal = authenticate(&auth, Some("Bearer good")).await.unwrap();
        assert_eq!(principal.subject_id(), "u-7");
        assert_eq!(principal.role(), Role::Admin);
    }

    #[tokio::test]
    async fn test_rejected_token_uses_backend_message() {
        let (auth, _) = client(Ok(BackendReply::failure(ErrorEnvelope::new(
            ErrorKind::Auth,
            "Token expired",
        ))));
        let err = authenticate(&auth, Some("Bearer old")).await.unwrap_err();
        assert_eq!(message(err), "Token expired");
    }

    #[tokio::test]
    async fn test_transport_failure_is_generic() {
        let (auth, stub) = client(Err(()));
        let err = authenticate(&auth, Some("Bearer t")).await.unwrap_err();
        assert_eq!(message(err), "Failed to verify token");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_role_is_rejected() {
        let (auth, _) = client(Ok(BackendReply::ok(json!({"user_id": "u-1", "role": "pharmacist"}))));
        let err = authenticate(&auth, Some("Bearer t")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);
    }
}
