//! # gate-api
//!
//! HTTP edge for the pharmacy backends.
//!
//! This crate provides:
//! - Axum router, handlers and the auth/role extractor
//! - HTTP channels to the backend services
//! - S3 upload storage
//! - The Stripe webhook endpoint
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/auth/{register,login}` | Accounts |
//! | GET | `/api/v1/products` | Product catalog |
//! | * | `/api/v1/orders` | Customer orders |
//! | * | `/api/v1/reminders` | Refill reminders |
//! | GET | `/api/v1/payment/{id}` | Payment lookup |
//! | * | `/api/v1/admin/...` | Admin catalog, orders, reminders |
//! | POST | `/api/v1/payment/webhook` | Stripe webhook |

pub mod channel;
pub mod config;
pub mod guard;
pub mod handlers;
pub mod respond;
pub mod routes;
pub mod state;
pub mod storage;
pub mod translate;

pub use config::{AppConfig, ConfigError};
pub use respond::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::{AppState, Backends};
