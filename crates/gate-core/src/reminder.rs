//! # Reminder Backend Contract

use crate::error::{GatewayError, GatewayResult};
use crate::query::ListQuery;
use crate::rpc::{call, BoxedChannel, RpcResult};
use chrono::{DateTime, NaiveDate};
use serde::Serialize;

/// Check a reminder date, accepting RFC 3339 timestamps or `YYYY-MM-DD`.
///
/// The value is forwarded as given; only its shape is checked here.
pub fn validate_reminder_date(value: &str) -> GatewayResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(GatewayError::invalid_field("reminder_date", "is required"));
    }
    if DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
    {
        return Ok(());
    }
    Err(GatewayError::invalid_field(
        "reminder_date",
        "must be an RFC 3339 timestamp or YYYY-MM-DD date",
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleReminderRequest {
    pub customer_id: String,
    pub order_id: String,
    pub product_id: String,
    pub reminder_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateReminderRequest {
    pub customer_id: String,
    pub reminder_id: String,
    pub reminder_date: String,
}

/// Reminder addressed on behalf of its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderRef {
    pub customer_id: String,
    pub reminder_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListCustomerRemindersRequest {
    pub customer_id: String,
    #[serde(flatten)]
    pub query: ListQuery,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListReminderLogsRequest {
    pub customer_id: String,
    pub reminder_id: String,
    #[serde(flatten)]
    pub query: ListQuery,
}

/// Client for `reminder.ReminderService`
#[derive(Clone)]
pub struct ReminderClient {
    channel: BoxedChannel,
}

impl ReminderClient {
    pub const SERVICE: &'static str = "reminder.ReminderService";

    pub fn new(channel: BoxedChannel) -> Self {
        Self { channel }
    }

    pub async fn schedule(&self, request: &ScheduleReminderRequest) -> RpcResult {
        call(&*self.channel, "ScheduleReminder", request).await
    }

    pub async fn list_all(&self, query: &ListQuery) -> RpcResult {
        call(&*self.channel, "ListReminders", query).await
    }

    pub async fn list_for_customer(&self, request: &ListCustomerRemindersRequest) -> RpcResult {
        call(&*self.channel, "ListCustomerReminders", request).await
    }

    pub async fn update(&self, request: &UpdateReminderRequest) -> RpcResult {
        call(&*self.channel, "UpdateReminder", request).await
    }

    pub async fn delete(&self, request: &ReminderRef) -> RpcResult {
        call(&*self.channel, "DeleteReminder", request).await
    }

    pub async fn toggle(&self, request: &ReminderRef) -> RpcResult {
        call(&*self.channel, "ToggleReminder", request).await
    }

    pub async fn logs(&self, request: &ListReminderLogsRequest) -> RpcResult {
        call(&*self.channel, "ListReminderLogs", request).await
    }
}
