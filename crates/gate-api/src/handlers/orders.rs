//! # Order Endpoints
//!
//! Customers act on their own orders. Admins reach every order through the
//! all-customers scope, either on the shared routes or under `/admin`.

use crate::guard::{AdminOnly, AnyRole, Authorized, CustomerOnly};
use crate::respond::{forward, into_body, merge_secondary, ApiResult};
use crate::state::AppState;
use crate::translate::{
    order_items, order_list_query, upload_attachment, validate_order_status, FormInput,
    JsonBody, OrderStatusBody,
};
use axum::extract::{Path, Query, State};
use axum::Json;
use gate_core::{
    ListCustomersOrdersRequest, OrderRef, PlaceOrderRequest, Principal,
    UpdateOrderStatusRequest, UploadPolicy,
};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, instrument};

/// Multipart: `items` holds the line items as embedded JSON, `prescription`
/// an optional scan
#[instrument(skip_all, fields(customer = %auth.principal.subject_id()))]
pub async fn place_order(
    State(state): State<AppState>,
    auth: Authorized<CustomerOnly>,
    form: FormInput,
) -> ApiResult {
    let items = order_items(form.text("items"))?;
    let prescription_url = upload_attachment(
        state.storage.as_ref(),
        UploadPolicy::PRESCRIPTIONS,
        "prescription",
        form.file("prescription"),
    )
    .await?;

    info!("Placing order with {} item(s)", items.len());
    let request = PlaceOrderRequest {
        customer_id: auth.principal.own_scope(),
        items,
        prescription_url,
    };
    forward("place order", state.orders.place_order(&request).await)
}

#[instrument(skip_all, fields(customer = %auth.principal.subject_id()))]
pub async fn list_customer_orders(
    State(state): State<AppState>,
    auth: Authorized<CustomerOnly>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let request = ListCustomersOrdersRequest {
        customer_id: auth.principal.own_scope(),
        query: order_list_query(&params),
    };
    forward("list orders", state.orders.list_customer_orders(&request).await)
}

#[instrument(skip(state, _auth, params))]
pub async fn list_all_orders(
    State(state): State<AppState>,
    _auth: Authorized<AdminOnly>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let query = order_list_query(&params);
    forward("list orders", state.orders.list_all_orders(&query).await)
}

#[instrument(skip(state, auth), fields(role = %auth.principal.role()))]
pub async fn get_order(
    State(state): State<AppState>,
    auth: Authorized<AnyRole>,
    Path(order_id): Path<String>,
) -> ApiResult {
    order_with_payment_status(&state, &auth.principal, order_id).await
}

#[instrument(skip(state, auth))]
pub async fn admin_get_order(
    State(state): State<AppState>,
    auth: Authorized<AdminOnly>,
    Path(order_id): Path<String>,
) -> ApiResult {
    order_with_payment_status(&state, &auth.principal, order_id).await
}

/// The order, plus `payment_status` when the payment backend knows it
async fn order_with_payment_status(
    state: &AppState,
    principal: &Principal,
    order_id: String,
) -> ApiResult {
    let order = OrderRef {
        order_id,
        customer_id: principal.owner_scope(),
    };
    let mut body = into_body("get order", state.orders.get_order(&order).await)?;

    let payment = state
        .payments
        .get_payment_by_order(&order.order_id, &order.customer_id)
        .await;
    merge_secondary(&mut body, "payment_status", payment, &["payment", "status"]);

    Ok(Json(Value::Object(body)))
}

#[instrument(skip(state, auth, body), fields(role = %auth.principal.role()))]
pub async fn update_order_status(
    State(state): State<AppState>,
    auth: Authorized<AnyRole>,
    Path(order_id): Path<String>,
    JsonBody(body): JsonBody<OrderStatusBody>,
) -> ApiResult {
    change_status(&state, &auth.principal, order_id, body).await
}

#[instrument(skip(state, auth, body))]
pub async fn admin_update_order_status(
    State(state): State<AppState>,
    auth: Authorized<AdminOnly>,
    Path(order_id): Path<String>,
    JsonBody(body): JsonBody<OrderStatusBody>,
) -> ApiResult {
    change_status(&state, &auth.principal, order_id, body).await
}

async fn change_status(
    state: &AppState,
    principal: &Principal,
    order_id: String,
    body: OrderStatusBody,
) -> ApiResult {
    validate_order_status(&body)?;
    let request = UpdateOrderStatusRequest {
        order_id,
        customer_id: principal.owner_scope(),
        status: body.status,
    };
    forward(
        "update order status",
        state.orders.update_order_status(&request).await,
    )
}

/// Fresh checkout URL for an unpaid order
#[instrument(skip(state, auth))]
pub async fn payment_link(
    State(state): State<AppState>,
    auth: Authorized<CustomerOnly>,
    Path(order_id): Path<String>,
) -> ApiResult {
    let request = OrderRef {
        order_id,
        customer_id: auth.principal.own_scope(),
    };
    forward(
        "generate payment url",
        state.orders.generate_payment_url(&request).await,
    )
}
