//! # Routes
//!
//! Axum router for the gateway. Every API route lives under `/api/v1`;
//! role checks are carried by each handler's [`crate::guard::Authorized`]
//! argument rather than by route-level middleware.

use crate::handlers::{self, auth, orders, payments, products, reminders, webhook};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Multipart uploads (product images, prescriptions)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Create the main application router
///
/// Routes (prefix `/api/v1`):
/// - Public:
///   - POST /auth/register, POST /auth/login
///   - GET  /products, GET /products/{id}
/// - Customer:
///   - POST /orders, GET /orders, POST /orders/{id}/payment-link
///   - POST /reminders, GET /reminders
///   - PUT | DELETE | PATCH /reminders/{id}
/// - Customer or admin:
///   - GET | PUT /orders/{id}
///   - GET /reminders/{id}/logs
///   - GET /payment/{id}, GET /payment/order/{id}
/// - Admin:
///   - POST /admin/products, PUT | DELETE /admin/products/{id}
///   - PUT /admin/products/{id}/stock, GET /admin/products/{id}/logs
///   - GET /admin/orders, GET | PUT /admin/orders/{id}
///   - GET /admin/reminders
/// - Stripe (signature-authenticated):
///   - POST /payment/webhook
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let product_routes = Router::new()
        .route("/", get(products::list_products))
        .route("/{product_id}", get(products::get_product));

    let order_routes = Router::new()
        .route(
            "/",
            post(orders::place_order).get(orders::list_customer_orders),
        )
        .route(
            "/{order_id}",
            get(orders::get_order).put(orders::update_order_status),
        )
        .route("/{order_id}/payment-link", post(orders::payment_link));

    let reminder_routes = Router::new()
        .route("/", post(reminders::schedule).get(reminders::list))
        .route(
            "/{reminder_id}",
            put(reminders::update)
                .delete(reminders::delete)
                .patch(reminders::toggle),
        )
        .route("/{reminder_id}/logs", get(reminders::logs));

    // Stripe posts here; the signature is the only credential
    let payment_routes = Router::new()
        .route("/webhook", post(webhook::stripe_webhook))
        .route("/order/{order_id}", get(payments::get_payment_by_order))
        .route("/{payment_id}", get(payments::get_payment));

    let admin_routes = Router::new()
        .route("/products", post(products::create_product))
        .route(
            "/products/{product_id}",
            put(products::update_product).delete(products::delete_product),
        )
        .route("/products/{product_id}/stock", put(products::update_stock))
        .route("/products/{product_id}/logs", get(products::inventory_logs))
        .route("/orders", get(orders::list_all_orders))
        .route(
            "/orders/{order_id}",
            get(orders::admin_get_order).put(orders::admin_update_order_status),
        )
        .route("/reminders", get(reminders::list_all));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/products", product_routes)
        .nest("/orders", order_routes)
        .nest("/reminders", reminder_routes)
        .nest("/payment", payment_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
