//! # PayPal Checkout RS
//!
//! HTTP front for PayPal Checkout V2 orders and payments.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables (or provide config/paypal.toml)
//! export PAYPAL_CLIENT_ID=...
//! export PAYPAL_CLIENT_SECRET=...
//! export PAYPAL_MODE=sandbox
//!
//! # Run the server
//! paypal-checkout
//! ```

use checkout_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.gateway.provider_name());
    info!("Currency: {}", state.currency);

    let app = routes::create_router(state);

    info!("PayPal Checkout starting on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Create order: POST http://{}/api/v2/orders", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  PayPal Checkout RS
  ━━━━━━━━━━━━━━━━━━
  Checkout V2 orders and payments
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
