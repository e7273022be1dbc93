//! # Catalog Backend Contract
//!
//! Product and inventory calls forwarded to `product.ProductService`.

use crate::query::ListQuery;
use crate::rpc::{call, BoxedChannel, RpcResult};
use serde::Serialize;

/// Product fields sent on create and update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Only set on create; stock changes go through `UpdateStock`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
    pub requires_prescription: bool,
    /// Empty when no image was attached
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateProductRequest {
    pub product: ProductDraft,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateProductRequest {
    pub product_id: String,
    pub product: ProductDraft,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateStockRequest {
    pub product_id: String,
    pub quantity_change: i32,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListProductsRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search: String,
    #[serde(flatten)]
    pub query: ListQuery,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryLogsRequest {
    pub product_id: String,
    #[serde(flatten)]
    pub query: ListQuery,
}

#[derive(Debug, Serialize)]
struct ProductIdRequest<'a> {
    product_id: &'a str,
}

/// Client for `product.ProductService`
#[derive(Clone)]
pub struct CatalogClient {
    channel: BoxedChannel,
}

impl CatalogClient {
    pub const SERVICE: &'static str = "product.ProductService";

    pub fn new(channel: BoxedChannel) -> Self {
        Self { channel }
    }

    pub async fn create_product(&self, request: &CreateProductRequest) -> RpcResult {
        call(&*self.channel, "CreateProduct", request).await
    }

    pub async fn get_product(&self, product_id: &str) -> RpcResult {
        call(&*self.channel, "GetProduct", &ProductIdRequest { product_id }).await
    }

    pub async fn list_products(&self, request: &ListProductsRequest) -> RpcResult {
        call(&*self.channel, "ListProducts", request).await
    }

    pub async fn update_product(&self, request: &UpdateProductRequest) -> RpcResult {
        call(&*self.channel, "UpdateProduct", request).await
    }

    pub async fn delete_product(&self, product_id: &str) -> RpcResult {
        call(&*self.channel, "DeleteProduct", &ProductIdRequest { product_id }).await
    }

    pub async fn update_stock(&self, request: &UpdateStockRequest) -> RpcResult {
        call(&*self.channel, "UpdateStock", request).await
    }

    pub async fn inventory_logs(&self, request: &InventoryLogsRequest) -> RpcResult {
        call(&*self.channel, "GetInventoryLogs", request).await
    }
}
