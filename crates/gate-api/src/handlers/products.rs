//! # Product Endpoints
//!
//! Listing and lookup are public. Mutations require an admin and accept
//! either a multipart form (with an optional `image` file) or a JSON object.

use crate::guard::{AdminOnly, Authorized};
use crate::respond::{forward, ApiResult};
use crate::state::AppState;
use crate::translate::{
    product_draft, upload_attachment, validate_stock_update, FormInput, JsonBody, ProductForm,
    StockUpdateBody,
};
use axum::extract::{Path, Query, State};
use gate_core::{
    CreateProductRequest, InventoryLogsRequest, ListProductsRequest, ListQuery,
    UpdateProductRequest, UpdateStockRequest, UploadPolicy,
};
use std::collections::HashMap;
use tracing::{info, instrument};

#[instrument(skip(state, params))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let request = ListProductsRequest {
        search: params.get("search").cloned().unwrap_or_default(),
        query: ListQuery::from_params(&params, 0),
    };
    forward("list products", state.catalog.list_products(&request).await)
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult {
    forward("get product", state.catalog.get_product(&product_id).await)
}

#[instrument(skip_all, fields(admin = %auth.principal.subject_id()))]
pub async fn create_product(
    State(state): State<AppState>,
    auth: Authorized<AdminOnly>,
    form: FormInput,
) -> ApiResult {
    let mut product = product_draft(&form, ProductForm::Create)?;
    if let Some(url) = upload_attachment(
        state.storage.as_ref(),
        UploadPolicy::PRODUCT_IMAGES,
        "image",
        form.file("image"),
    )
    .await?
    {
        product.image_url = url;
    }

    info!("Creating product: {}", product.name);
    let request = CreateProductRequest { product };
    forward("create product", state.catalog.create_product(&request).await)
}

/// Without a new file, a form-supplied `image_url` keeps the current image
#[instrument(skip(state, auth, form), fields(admin = %auth.principal.subject_id()))]
pub async fn update_product(
    State(state): State<AppState>,
    auth: Authorized<AdminOnly>,
    Path(product_id): Path<String>,
    form: FormInput,
) -> ApiResult {
    let mut product = product_draft(&form, ProductForm::Update)?;
    product.image_url = match upload_attachment(
        state.storage.as_ref(),
        UploadPolicy::PRODUCT_IMAGES,
        "image",
        form.file("image"),
    )
    .await?
    {
        Some(url) => url,
        None => form.text("image_url").to_string(),
    };

    let request = UpdateProductRequest {
        product_id,
        product,
    };
    forward("update product", state.catalog.update_product(&request).await)
}

#[instrument(skip(state, _auth))]
pub async fn delete_product(
    State(state): State<AppState>,
    _auth: Authorized<AdminOnly>,
    Path(product_id): Path<String>,
) -> ApiResult {
    forward("delete product", state.catalog.delete_product(&product_id).await)
}

#[instrument(skip(state, _auth, body))]
pub async fn update_stock(
    State(state): State<AppState>,
    _auth: Authorized<AdminOnly>,
    Path(product_id): Path<String>,
    JsonBody(body): JsonBody<StockUpdateBody>,
) -> ApiResult {
    validate_stock_update(&body)?;
    let request = UpdateStockRequest {
        product_id,
        quantity_change: body.quantity_change,
        reason: body.reason,
    };
    forward("update stock", state.catalog.update_stock(&request).await)
}

#[instrument(skip(state, _auth, params))]
pub async fn inventory_logs(
    State(state): State<AppState>,
    _auth: Authorized<AdminOnly>,
    Path(product_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let request = InventoryLogsRequest {
        product_id,
        query: ListQuery::from_params(&params, 0),
    };
    forward("get inventory logs", state.catalog.inventory_logs(&request).await)
}
