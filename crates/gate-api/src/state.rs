//! # Application State
//!
//! Shared, read-only state for the Axum application: one typed client per
//! backend, the upload store and the webhook ingester.

use crate::channel::{build_client, HttpChannel};
use crate::config::{AppConfig, BackendEndpoints};
use crate::storage::S3ObjectStorage;
use gate_core::{
    AuthClient, BoxedChannel, BoxedStorage, CatalogClient, OrderClient, PaymentClient,
    ReminderClient,
};
use gate_stripe::{WebhookConfig, WebhookIngester};
use std::sync::Arc;
use std::time::Duration;

/// One channel per backend service
#[derive(Clone)]
pub struct Backends {
    pub auth: BoxedChannel,
    pub product: BoxedChannel,
    pub order: BoxedChannel,
    pub payment: BoxedChannel,
    pub reminder: BoxedChannel,
}

impl Backends {
    /// HTTP channels sharing one client and timeout
    pub fn http(endpoints: &BackendEndpoints, timeout: Duration) -> reqwest::Result<Self> {
        let client = build_client(timeout)?;
        let channel = |base: &str, service: &str| -> BoxedChannel {
            Arc::new(HttpChannel::new(client.clone(), base, service))
        };

        Ok(Self {
            auth: channel(&endpoints.auth, AuthClient::SERVICE),
            product: channel(&endpoints.product, CatalogClient::SERVICE),
            order: channel(&endpoints.order, OrderClient::SERVICE),
            payment: channel(&endpoints.payment, PaymentClient::SERVICE),
            reminder: channel(&endpoints.reminder, ReminderClient::SERVICE),
        })
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthClient,
    pub catalog: CatalogClient,
    pub orders: OrderClient,
    pub payments: PaymentClient,
    pub reminders: ReminderClient,
    /// Upload store for product images and prescriptions
    pub storage: BoxedStorage,
    /// Stripe webhook ingestion
    pub webhook: Arc<WebhookIngester>,
}

impl AppState {
    /// Create state from configuration: HTTP backends and S3 storage
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let backends = Backends::http(&config.backends, config.backend_timeout)
            .map_err(|e| anyhow::anyhow!("Failed to build backend client: {}", e))?;
        let storage = S3ObjectStorage::from_config(&config.storage).await;

        Ok(Self::with_backends(
            backends,
            Arc::new(storage),
            config.webhook.clone(),
        ))
    }

    /// Assemble state from explicit channels and storage
    pub fn with_backends(backends: Backends, storage: BoxedStorage, webhook: WebhookConfig) -> Self {
        let payments = PaymentClient::new(backends.payment);
        Self {
            auth: AuthClient::new(backends.auth),
            catalog: CatalogClient::new(backends.product),
            orders: OrderClient::new(backends.order),
            webhook: Arc::new(WebhookIngester::new(webhook, payments.clone())),
            payments,
            reminders: ReminderClient::new(backends.reminder),
            storage,
        }
    }
}
