//! # flower-shop
//!
//! Storefront backend for Salone New Flower.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export EMAIL_USER=shop@gmail.com
//! export EMAIL_PASS=app-password
//!
//! # Run the server
//! flower-shop
//! ```

use shop_api::{routes, AppConfig, AppState, LogFormat};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing(format: LogFormat) {
    let (pretty, json) = match format {
        LogFormat::Pretty => (Some(fmt::layer()), None),
        LogFormat::Json => (None, Some(fmt::layer().json())),
    };

    tracing_subscriber::registry()
        .with(pretty)
        .with(json)
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    // Initialize logging
    init_tracing(config.log_format);

    let addr = config.socket_addr()?;
    let is_prod = config.is_production();

    if !is_prod {
        print_banner();
    }

    // Initialize application state
    let state = AppState::from_config(config)?;

    info!("Environment: {}", state.config.environment);
    info!("CORS origin: {}", state.config.cors_origin);
    info!("Payment provider: {}", state.payments.provider_name());
    if let Some(dir) = &state.config.static_dir {
        info!("Serving static files from {}", dir.display());
    }

    // Create router
    let app = routes::create_router(state);

    info!("🌸 flower-shop starting on http://{}", addr);

    if !is_prod {
        info!("💳 Checkout: POST http://{}/create-checkout-session", addr);
        info!("✉️  Mail: POST http://{}/send-purchase | /send-reservation | /send-email", addr);
        info!("🔔 Webhook: POST http://{}/webhook", addr);
        info!("📦 Data: GET http://{}/api/data", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  🌸 Salone New Flower 🌸
  ━━━━━━━━━━━━━━━━━━━━━━━
  Storefront backend
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
