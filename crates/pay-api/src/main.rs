//! # pay-intake
//!
//! Pricing and order-intake server in front of Razorpay.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export RAZORPAY_KEY_ID=rzp_test_...
//! export RAZORPAY_KEY_SECRET=...
//! export RAZORPAY_WEBHOOK_SECRET=...
//! export TURSO_DATABASE_URL=libsql://...
//! export TURSO_AUTH_TOKEN=...
//!
//! # Run the server
//! pay-intake
//! ```

use pay_api::{
    routes,
    state::{AppConfig, AppState},
};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_tracing(config.json_logs);

    print_banner();

    // Initialize application state
    let state = AppState::from_config(config)?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment gateway: {}", state.gateway.provider_name());
    info!("Pricing store: {}", state.store.backend_name());

    // A broken store only degrades pricing and enrollment recording
    match state.store.ensure_schema().await {
        Ok(()) => info!("Store schema ready"),
        Err(e) => error!("Store initialization failed: {}", e),
    }

    let app = routes::create_router(state);

    info!("🚀 pay-intake starting on http://{}", addr);

    if !is_prod {
        info!("💰 Pricing: GET http://{}/api/pricing", addr);
        info!("🧾 Orders: POST http://{}/create_order", addr);
        info!("🔔 Webhook: POST http://{}/webhook/razorpay", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn print_banner() {
    println!(
        r#"
  pay-intake
  ━━━━━━━━━━━━━━━━━━━━━━━
  Pricing and order intake
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
