//! # Request Translation
//!
//! Converts loosely-typed HTTP input (JSON bodies, multipart forms, query
//! strings) into typed backend requests. Every field violation in a request
//! is collected and reported together as one `VALIDATION_ERROR`.

use crate::respond::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use gate_core::{
    int_param, ErrorDetails, FileUpload, GatewayError, GatewayResult, LoginRequest,
    ObjectStorage, OrderItem, OrderListQuery, ProductDraft, RegisterRequest, UploadPolicy,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, error, instrument};

const INVALID_REQUEST: &str = "Invalid request format";

/// Accumulates field → reason pairs for one request
#[derive(Debug, Default)]
pub struct FieldErrors(ErrorDetails);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, reason: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| reason.into());
    }

    /// Record `field` as missing when `value` is blank
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "is required");
        }
    }

    pub fn finish(self) -> GatewayResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::Validation {
                message: INVALID_REQUEST.to_string(),
                details: self.0,
            })
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(GatewayError::invalid_field("body", rejection.body_text()))
    }
}

/// JSON body whose rejection is a `VALIDATION_ERROR` envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Text fields and file parts of a multipart form or JSON object body
#[derive(Debug, Default)]
pub struct FormInput {
    fields: HashMap<String, String>,
    files: HashMap<String, FileUpload>,
}

impl FormInput {
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map(|v| v.trim()).unwrap_or_default()
    }

    pub fn file(&self, name: &str) -> Option<&FileUpload> {
        self.files.get(name)
    }

    pub fn insert_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Flatten a JSON object: strings as-is, scalars as text, arrays and
    /// objects re-encoded as JSON, nulls dropped
    pub fn from_json(object: Map<String, Value>) -> Self {
        let mut form = FormInput::default();
        for (name, value) in object {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s,
                other => other.to_string(),
            };
            form.fields.insert(name, text);
        }
        form
    }

    async fn from_multipart(mut multipart: Multipart) -> GatewayResult<Self> {
        let mut form = FormInput::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| GatewayError::invalid_field("body", e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| GatewayError::invalid_field(name.clone(), e.body_text()))?;
                    // Browsers send an empty part for an unselected file input
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        FileUpload {
                            file_name,
                            content_type,
                            bytes: bytes.to_vec(),
                        },
                    );
                }
                None => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| GatewayError::invalid_field(name.clone(), e.body_text()))?;
                    form.fields.insert(name, text);
                }
            }
        }
        Ok(form)
    }
}

impl<S> FromRequest<S> for FormInput
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| GatewayError::invalid_field("body", e.body_text()))?;
            Ok(Self::from_multipart(multipart).await?)
        } else {
            let Json(object) = Json::<Map<String, Value>>::from_request(req, state).await?;
            Ok(Self::from_json(object))
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

pub fn validate_register(request: &RegisterRequest) -> GatewayResult<()> {
    let mut errors = FieldErrors::new();
    errors.require("email", &request.email);
    errors.require("password", &request.password);
    if !request.email.trim().is_empty() && !request.email.contains('@') {
        errors.add("email", "must be a valid email address");
    }
    errors.finish()
}

pub fn validate_login(request: &LoginRequest) -> GatewayResult<()> {
    let mut errors = FieldErrors::new();
    if request.email.trim().is_empty() && request.username.trim().is_empty() {
        errors.add("email", "email or username is required");
    }
    errors.require("password", &request.password);
    errors.finish()
}

// =============================================================================
// Products
// =============================================================================

/// Which product fields a form must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductForm {
    Create,
    Update,
}

/// Validate product form fields. `image_url` is filled in after upload.
pub fn product_draft(form: &FormInput, kind: ProductForm) -> GatewayResult<ProductDraft> {
    let mut errors = FieldErrors::new();
    errors.require("name", form.text("name"));
    errors.require("description", form.text("description"));

    let price = match form.text("price") {
        "" => {
            errors.add("price", "is required");
            0.0
        }
        raw => match raw.parse::<f64>() {
            Ok(price) if price.is_finite() && price > 0.0 => price,
            Ok(_) => {
                errors.add("price", "must be greater than 0");
                0.0
            }
            Err(_) => {
                errors.add("price", "must be a number");
                0.0
            }
        },
    };

    let stock = match kind {
        ProductForm::Update => None,
        ProductForm::Create => match form.text("stock") {
            "" => {
                errors.add("stock", "is required");
                None
            }
            raw => match raw.parse::<i32>() {
                Ok(stock) if stock > 0 => Some(stock),
                Ok(_) => {
                    errors.add("stock", "must be greater than 0");
                    None
                }
                Err(_) => {
                    errors.add("stock", "must be an integer");
                    None
                }
            },
        },
    };

    let requires_prescription = match form.text("requires_prescription") {
        "" => false,
        raw => parse_bool(raw).unwrap_or_else(|| {
            errors.add("requires_prescription", "must be true or false");
            false
        }),
    };

    errors.finish()?;
    Ok(ProductDraft {
        name: form.text("name").to_string(),
        description: form.text("description").to_string(),
        price,
        stock,
        requires_prescription,
        image_url: String::new(),
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StockUpdateBody {
    #[serde(default)]
    pub quantity_change: i32,
    #[serde(default)]
    pub reason: String,
}

pub fn validate_stock_update(body: &StockUpdateBody) -> GatewayResult<()> {
    let mut errors = FieldErrors::new();
    if body.quantity_change == 0 {
        errors.add("quantity_change", "must be non-zero");
    }
    errors.require("reason", &body.reason);
    errors.finish()
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum ItemsPayload {
    Bare(Vec<OrderItem>),
    Wrapped { items: Vec<OrderItem> },
}

/// Decode the embedded `items` JSON: a bare array or `{"items": [...]}`
pub fn order_items(raw: &str) -> GatewayResult<Vec<OrderItem>> {
    if raw.trim().is_empty() {
        return Err(GatewayError::invalid_field("items", "is required"));
    }

    let items = match serde_json::from_str::<ItemsPayload>(raw) {
        Ok(ItemsPayload::Bare(items)) | Ok(ItemsPayload::Wrapped { items }) => items,
        Err(_) => {
            return Err(GatewayError::invalid_field(
                "items",
                "must be a JSON array of order items",
            ))
        }
    };

    if items.is_empty() {
        return Err(GatewayError::invalid_field("items", "must not be empty"));
    }

    let mut errors = FieldErrors::new();
    for (i, item) in items.iter().enumerate() {
        errors.require(&format!("items[{}].product_id", i), &item.product_id);
        if item.quantity <= 0 {
            errors.add(format!("items[{}].quantity", i), "must be greater than 0");
        }
    }
    errors.finish()?;
    Ok(items)
}

/// Order listings page by 10 and filter on `filter`/`filter_value`
pub fn order_list_query(params: &HashMap<String, String>) -> OrderListQuery {
    let text = |key: &str| params.get(key).cloned().unwrap_or_default();
    OrderListQuery {
        page: int_param(params, "page", 1),
        limit: int_param(params, "limit", 10),
        sort_by: text("sort_by"),
        sort_order: text("sort_order"),
        filter: text("filter"),
        filter_value: text("filter_value"),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderStatusBody {
    #[serde(default)]
    pub status: String,
}

pub fn validate_order_status(body: &OrderStatusBody) -> GatewayResult<()> {
    let mut errors = FieldErrors::new();
    errors.require("status", &body.status);
    errors.finish()
}

// =============================================================================
// Reminders
// =============================================================================

/// Client-sent `customer_id` is ignored; the owner comes from the token
#[derive(Debug, Default, Deserialize)]
pub struct ScheduleReminderBody {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub reminder_date: String,
}

pub fn validate_schedule_reminder(body: &ScheduleReminderBody) -> GatewayResult<()> {
    let mut errors = FieldErrors::new();
    errors.require("order_id", &body.order_id);
    errors.require("product_id", &body.product_id);
    collect_date(&mut errors, &body.reminder_date);
    errors.finish()
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReminderBody {
    #[serde(default)]
    pub reminder_date: String,
}

pub fn validate_update_reminder(body: &UpdateReminderBody) -> GatewayResult<()> {
    let mut errors = FieldErrors::new();
    collect_date(&mut errors, &body.reminder_date);
    errors.finish()
}

fn collect_date(errors: &mut FieldErrors, value: &str) {
    if let Err(GatewayError::Validation { details, .. }) = gate_core::validate_reminder_date(value)
    {
        for (field, reason) in details {
            errors.add(field, reason);
        }
    }
}

// =============================================================================
// Uploads
// =============================================================================

/// Check the extension, then upload. Returns `None` when no file was sent.
#[instrument(skip(storage, file), fields(folder = policy.folder))]
pub async fn upload_attachment(
    storage: &dyn ObjectStorage,
    policy: UploadPolicy,
    field: &str,
    file: Option<&FileUpload>,
) -> GatewayResult<Option<String>> {
    let Some(file) = file else {
        return Ok(None);
    };

    if !policy.permits(&file.file_name) {
        return Err(GatewayError::invalid_field(
            field,
            format!(
                "invalid file type; allowed: {}",
                policy.allowed_extensions.join(", ")
            ),
        ));
    }

    match storage.upload(policy.folder, file).await {
        Ok(asset) => {
            debug!("Stored {} as {}", file.file_name, asset.key);
            Ok(Some(asset.url))
        }
        Err(e) => {
            error!("Upload of {} failed: {}", file.file_name, e);
            Err(GatewayError::Upload)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gate_core::{ErrorKind, StorageError, UploadedAsset};
    use serde_json::json;
    use std::sync::Mutex;

    fn form(pairs: &[(&str, &str)]) -> FormInput {
        let mut form = FormInput::default();
        for (k, v) in pairs {
            form.insert_text(*k, *v);
        }
        form
    }

    fn details(err: GatewayError) -> ErrorDetails {
        match err {
            GatewayError::Validation { details, .. } => details,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_product_create_collects_all_violations() {
        let err = product_draft(&form(&[("price", "-3"), ("stock", "x")]), ProductForm::Create)
            .unwrap_err();
        let details = details(err);
        assert_eq!(details.len(), 4);
        assert_eq!(details["name"], "is required");
        assert_eq!(details["price"], "must be greater than 0");
        assert_eq!(details["stock"], "must be an integer");
    }

    #[test]
    fn test_product_update_ignores_stock() {
        let draft = product_draft(
            &form(&[
                ("name", "Paracetamol"),
                ("description", "Pain relief"),
                ("price", "4.99"),
                ("requires_prescription", "true"),
            ]),
            ProductForm::Update,
        )
        .unwrap();
        assert_eq!(draft.stock, None);
        assert!(draft.requires_prescription);
        assert_eq!(draft.price, 4.99);
    }

    #[test]
    fn test_json_form_flattening() {
        let object = json!({"name": "A", "price": 2.5, "stock": 3, "flag": true, "gone": null})
            .as_object()
            .cloned()
            .unwrap();
        let form = FormInput::from_json(object);
        assert_eq!(form.text("price"), "2.5");
        assert_eq!(form.text("stock"), "3");
        assert_eq!(form.text("flag"), "true");
        assert!(!form.fields.contains_key("gone"));
    }

    #[test]
    fn test_order_items_shapes() {
        let bare = order_items(r#"[{"product_id": "p1", "quantity": 2}]"#).unwrap();
        let wrapped = order_items(r#"{"items": [{"product_id": "p1", "quantity": 2}]}"#).unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare[0].quantity, 2);
    }

    #[test]
    fn test_order_items_rejections() {
        for raw in ["", "not json", "[]", r#"{"items": []}"#, r#"{"product_id": "p1"}"#] {
            let err = order_items(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation, "input {raw:?}");
        }

        let err = order_items(r#"[{"product_id": "", "quantity": 0}]"#).unwrap_err();
        let details = details(err);
        assert!(details.contains_key("items[0].product_id"));
        assert!(details.contains_key("items[0].quantity"));
    }

    #[test]
    fn test_order_list_query_defaults() {
        let mut params = HashMap::new();
        params.insert("page".to_string(), "abc".to_string());
        params.insert("filter".to_string(), "status".to_string());
        params.insert("filter_value".to_string(), "pending".to_string());
        let query = order_list_query(&params);
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 10);
        assert_eq!(query.filter, "status");
        assert_eq!(query.filter_value, "pending");
        assert!(query.sort_by.is_empty());
    }

    #[test]
    fn test_auth_validation() {
        let register = RegisterRequest {
            email: "nobody".into(),
            ..Default::default()
        };
        let details = details(validate_register(&register).unwrap_err());
        assert!(details.contains_key("email"));
        assert!(details.contains_key("password"));

        let login = LoginRequest {
            username: "sam".into(),
            password: "pw".into(),
            ..Default::default()
        };
        assert!(validate_login(&login).is_ok());
    }

    #[test]
    fn test_reminder_and_stock_validation() {
        let body = ScheduleReminderBody {
            order_id: "o1".into(),
            product_id: "p1".into(),
            reminder_date: "tomorrow".into(),
        };
        assert!(details(validate_schedule_reminder(&body).unwrap_err()).contains_key("reminder_date"));

        let stock = StockUpdateBody {
            quantity_change: 0,
            reason: String::new(),
        };
        assert_eq!(details(validate_stock_update(&stock).unwrap_err()).len(), 2);
    }

    #[derive(Default)]
    struct RecordingStorage {
        uploads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ObjectStorage for RecordingStorage {
        async fn upload(&self, folder: &str, file: &FileUpload) -> Result<UploadedAsset, StorageError> {
            let key = format!("{}/{}", folder, file.file_name);
            self.uploads.lock().unwrap().push(key.clone());
            Ok(UploadedAsset {
                url: format!("https://bucket.example/{}", key),
                key,
            })
        }
    }

    fn upload(name: &str) -> FileUpload {
        FileUpload {
            file_name: name.into(),
            content_type: None,
            bytes: vec![0u8; 4],
        }
    }

    #[tokio::test]
    async fn test_disallowed_extensions_never_reach_storage() {
        let storage = RecordingStorage::default();
        for name in ["virus.exe", "notes.txt", "noextension"] {
            let err = upload_attachment(
                &storage,
                UploadPolicy::PRODUCT_IMAGES,
                "image",
                Some(&upload(name)),
            )
            .await
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert!(storage.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_allowed_upload_returns_url() {
        let storage = RecordingStorage::default();
        let url = upload_attachment(
            &storage,
            UploadPolicy::PRESCRIPTIONS,
            "prescription",
            Some(&upload("scan.JPG")),
        )
        .await
        .unwrap();
        assert_eq!(url.as_deref(), Some("https://bucket.example/prescriptions/scan.JPG"));

        let none = upload_attachment(&storage, UploadPolicy::PRESCRIPTIONS, "prescription", None)
            .await
            .unwrap();
        assert_eq!(none, None);
    }
}
