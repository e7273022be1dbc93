//! # Edge Gateway
//!
//! HTTP edge for the pharmacy backends.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export S3_BUCKET_NAME=pharma-uploads
//! export ORDER_SERVICE_URL=http://orders.internal:50053
//!
//! # Run the server
//! edge-gateway
//! ```

use gate_api::{config::LogFormat, routes, AppConfig, AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(filter);
    match LogFormat::from_env() {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }

    print_banner();

    let config = AppConfig::from_env()?;
    let addr = config.socket_addr()?;

    info!("Environment: {}", config.environment);
    info!("Backends: {:?}", config.backends);
    info!("Backend timeout: {:?}", config.backend_timeout);

    let state = AppState::new(&config).await?;
    let app = routes::create_router(state);

    info!("🚀 Edge gateway starting on http://{}", addr);
    if !config.is_production() {
        info!("📝 Health: http://{}/health", addr);
        info!("🔔 Webhook: POST http://{}/api/v1/payment/webhook", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  Edge Gateway
  ━━━━━━━━━━━━━━━━━━━━━━━
  Auth, RBAC and webhooks at the edge
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
