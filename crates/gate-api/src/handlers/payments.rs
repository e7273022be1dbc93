use crate::guard::{AnyRole, Authorized};
use crate::respond::{forward, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use tracing::instrument;

#[instrument(skip(state, auth), fields(role = %auth.principal.role()))]
pub async fn get_payment(
    State(state): State<AppState>,
    auth: Authorized<AnyRole>,
    Path(payment_id): Path<String>,
) -> ApiResult {
    let scope = auth.principal.owner_scope();
    forward(
        "get payment",
        state.payments.get_payment(&payment_id, &scope).await,
    )
}

#[instrument(skip(state, auth), fields(role = %auth.principal.role()))]
pub async fn get_payment_by_order(
    State(state): State<AppState>,
    auth: Authorized<AnyRole>,
    Path(order_id): Path<String>,
) -> ApiResult {
    let scope = auth.principal.owner_scope();
    forward(
        "get payment",
        state.payments.get_payment_by_order(&order_id, &scope).await,
    )
}
