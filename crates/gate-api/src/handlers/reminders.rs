//! # Refill Reminder Endpoints
//!
//! Reminders always belong to the caller; a `customer_id` in the body is
//! never read.

use crate::guard::{AdminOnly, AnyRole, Authorized, CustomerOnly};
use crate::respond::{forward, ApiResult};
use crate::state::AppState;
use crate::translate::{
    validate_schedule_reminder, validate_update_reminder, JsonBody, ScheduleReminderBody,
    UpdateReminderBody,
};
use axum::extract::{Path, Query, State};
use gate_core::{
    ListCustomerRemindersRequest, ListQuery, ListReminderLogsRequest, ReminderRef,
    ScheduleReminderRequest, UpdateReminderRequest,
};
use std::collections::HashMap;
use tracing::instrument;

#[instrument(skip_all, fields(customer = %auth.principal.subject_id()))]
pub async fn schedule(
    State(state): State<AppState>,
    auth: Authorized<CustomerOnly>,
    JsonBody(body): JsonBody<ScheduleReminderBody>,
) -> ApiResult {
    validate_schedule_reminder(&body)?;
    let request = ScheduleReminderRequest {
        customer_id: auth.principal.own_scope(),
        order_id: body.order_id,
        product_id: body.product_id,
        reminder_date: body.reminder_date,
    };
    forward("schedule reminder", state.reminders.schedule(&request).await)
}

#[instrument(skip_all, fields(customer = %auth.principal.subject_id()))]
pub async fn list(
    State(state): State<AppState>,
    auth: Authorized<CustomerOnly>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let request = ListCustomerRemindersRequest {
        customer_id: auth.principal.own_scope(),
        query: ListQuery::from_params(&params, 0),
    };
    forward(
        "list reminders",
        state.reminders.list_for_customer(&request).await,
    )
}

#[instrument(skip(state, _auth, params))]
pub async fn list_all(
    State(state): State<AppState>,
    _auth: Authorized<AdminOnly>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let query = ListQuery::from_params(&params, 0);
    forward("list reminders", state.reminders.list_all(&query).await)
}

#[instrument(skip(state, auth, body))]
pub async fn update(
    State(state): State<AppState>,
    auth: Authorized<CustomerOnly>,
    Path(reminder_id): Path<String>,
    JsonBody(body): JsonBody<UpdateReminderBody>,
) -> ApiResult {
    validate_update_reminder(&body)?;
    let request = UpdateReminderRequest {
        customer_id: auth.principal.own_scope(),
        reminder_id,
        reminder_date: body.reminder_date,
    };
    forward("update reminder", state.reminders.update(&request).await)
}

#[instrument(skip(state, auth))]
pub async fn delete(
    State(state): State<AppState>,
    auth: Authorized<CustomerOnly>,
    Path(reminder_id): Path<String>,
) -> ApiResult {
    let request = ReminderRef {
        customer_id: auth.principal.own_scope(),
        reminder_id,
    };
    forward("delete reminder", state.reminders.delete(&request).await)
}

/// Flip a reminder between active and paused
#[instrument(skip(state, auth))]
pub async fn toggle(
    State(state): State<AppState>,
    auth: Authorized<CustomerOnly>,
    Path(reminder_id): Path<String>,
) -> ApiResult {
    let request = ReminderRef {
        customer_id: auth.principal.own_scope(),
        reminder_id,
    };
    forward("toggle reminder", state.reminders.toggle(&request).await)
}

#[instrument(skip(state, auth, params), fields(role = %auth.principal.role()))]
pub async fn logs(
    State(state): State<AppState>,
    auth: Authorized<AnyRole>,
    Path(reminder_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let request = ListReminderLogsRequest {
        customer_id: auth.principal.owner_scope(),
        reminder_id,
        query: ListQuery::from_params(&params, 0),
    };
    forward("list reminder logs", state.reminders.logs(&request).await)
}
