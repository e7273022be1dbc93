//! # gate-core
//!
//! Core types and backend contracts for the edge gateway.
//!
//! This crate provides:
//! - `ErrorKind`, `ErrorEnvelope` and `GatewayError`, the client-facing error taxonomy
//! - `Principal` and `Role`, plus `rbac::authorize` for route guards
//! - `RpcChannel` and one typed client per backend service
//! - `ObjectStorage` and `UploadPolicy` for file uploads
//!
//! ## Example
//!
//! ```rust,ignore
//! use gate_core::{OrderClient, OrderRef, Principal, Role};
//!
//! let orders = OrderClient::new(channel);
//! let caller = Principal::new("u-1", Role::Admin);
//! let reply = orders
//!     .get_order(&OrderRef { order_id: "o-1".into(), customer_id: caller.owner_scope() })
//!     .await?;
//! ```

pub mod auth;
pub mod catalog;
pub mod error;
pub mod order;
pub mod payment;
pub mod principal;
pub mod query;
pub mod rbac;
pub mod reminder;
pub mod rpc;
pub mod storage;

// Re-exports for convenience
pub use auth::{AuthClient, LoginRequest, RegisterRequest};
pub use catalog::{
    CatalogClient, CreateProductRequest, InventoryLogsRequest, ListProductsRequest, ProductDraft,
    UpdateProductRequest, UpdateStockRequest,
};
pub use error::{
    ErrorDetails, ErrorEnvelope, ErrorKind, GatewayError, GatewayResult, TransportError,
};
pub use order::{
    ListCustomersOrdersRequest, OrderClient, OrderItem, OrderListQuery, OrderRef,
    PlaceOrderRequest, UpdateOrderStatusRequest,
};
pub use payment::{NormalizedPaymentRecord, PaymentClient, PaymentStatus};
pub use principal::{Principal, Role, ALL_CUSTOMERS};
pub use query::{int_param, Filter, ListQuery};
pub use reminder::{
    validate_reminder_date, ListCustomerRemindersRequest, ListReminderLogsRequest,
    ReminderClient, ReminderRef, ScheduleReminderRequest, UpdateReminderRequest,
};
pub use rpc::{call, BackendReply, BoxedChannel, RpcChannel, RpcResult};
pub use storage::{
    BoxedStorage, FileUpload, ObjectStorage, StorageError, UploadPolicy, UploadedAsset,
};
