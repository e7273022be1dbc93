//! Public account endpoints

use crate::respond::{forward, ApiResult};
use crate::state::AppState;
use crate::translate::{validate_login, validate_register, JsonBody};
use axum::extract::State;
use gate_core::{LoginRequest, RegisterRequest};
use tracing::instrument;

#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> ApiResult {
    validate_register(&request)?;
    forward("register user", state.auth.register(&request).await)
}

#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult {
    validate_login(&request)?;
    forward("login", state.auth.login(&request).await)
}
