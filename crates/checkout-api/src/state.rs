//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the checkout gateway and server configuration.

use checkout_core::{BoxedCheckoutGateway, Currency};
use checkout_paypal::{PayPalCheckout, PayPalConfig};
use std::net::SocketAddr;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Allowed CORS origins (any origin when empty)
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Checkout gateway
    pub gateway: BoxedCheckoutGateway,
    /// Currency decimal amounts in requests are expressed in
    pub currency: Currency,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState backed by PayPal
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let paypal_config = load_paypal_config()?;

        if paypal_config.is_live() && !config.is_production() {
            tracing::warn!("PayPal is in live mode outside production");
        }

        let currency = paypal_config.currency;
        let paypal = PayPalCheckout::new(paypal_config)
            .map_err(|e| anyhow::anyhow!("Failed to initialize PayPal: {}", e))?;

        Ok(Self::with_gateway(Arc::new(paypal), currency, config))
    }

    /// Create state around an existing gateway
    pub fn with_gateway(
        gateway: BoxedCheckoutGateway,
        currency: Currency,
        config: AppConfig,
    ) -> Self {
        Self {
            gateway,
            currency,
            config,
        }
    }
}

/// Split a comma-separated origin list, dropping blanks
fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load PayPal config from `config/paypal.toml`, falling back to env vars
fn load_paypal_config() -> anyhow::Result<PayPalConfig> {
    let config_paths = [
        "config/paypal.toml",
        "../config/paypal.toml",
        "../../config/paypal.toml",
    ];

    for path in config_paths {
        if std::path::Path::new(path).exists() {
            let config = PayPalConfig::from_toml_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path, e))?;
            tracing::info!("Loaded PayPal config from {}", path);
            return Ok(config);
        }
    }

    tracing::info!("No config/paypal.toml found, reading PayPal config from environment");
    PayPalConfig::from_env().map_err(|e| anyhow::anyhow!("{}", e))
}
