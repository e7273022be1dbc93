//! # Order Backend Contract

use crate::rpc::{call, BoxedChannel, RpcResult};
use serde::{Deserialize, Serialize};

/// A line item in an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceOrderRequest {
    /// Always the caller's subject id
    pub customer_id: String,
    pub items: Vec<OrderItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescription_url: Option<String>,
}

/// Order lookup scoped to an owner (or the all-customers sentinel)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRef {
    pub order_id: String,
    pub customer_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOrderStatusRequest {
    pub order_id: String,
    pub customer_id: String,
    pub status: String,
}

/// Order listing parameters; orders filter on a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderListQuery {
    pub page: i32,
    pub limit: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sort_by: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sort_order: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filter: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filter_value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListCustomersOrdersRequest {
    pub customer_id: String,
    #[serde(flatten)]
    pub query: OrderListQuery,
}

/// Client for `order.OrderService`
#[derive(Clone)]
pub struct OrderClient {
    channel: BoxedChannel,
}

impl OrderClient {
    pub const SERVICE: &'static str = "order.OrderService";

    pub fn new(channel: BoxedChannel) -> Self {
        Self { channel }
    }

    pub async fn place_order(&self, request: &PlaceOrderRequest) -> RpcResult {
        call(&*self.channel, "PlaceOrder", request).await
    }

    pub async fn get_order(&self, request: &OrderRef) -> RpcResult {
        call(&*self.channel, "GetOrder", request).await
    }

    pub async fn list_customer_orders(&self, request: &ListCustomersOrdersRequest) -> RpcResult {
        call(&*self.channel, "ListCustomersOrders", request).await
    }

    pub async fn list_all_orders(&self, query: &OrderListQuery) -> RpcResult {
        call(&*self.channel, "ListAllOrders", query).await
    }

    pub async fn update_order_status(&self, request: &UpdateOrderStatusRequest) -> RpcResult {
        call(&*self.channel, "UpdateOrderStatus", request).await
    }

    pub async fn generate_payment_url(&self, request: &OrderRef) -> RpcResult {
        call(&*self.channel, "GenerateNewPaymentUrl", request).await
    }
}
