//! # PayPal Configuration
//!
//! Configuration management for the PayPal integration.
//! Loaded from `config/paypal.toml` or from environment variables.

use crate::environment::Environment;
use checkout_core::{Currency, PaymentError, PaymentResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Where the payer lands on the PayPal site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LandingPage {
    Login,
    Billing,
    NoPreference,
}

impl Default for LandingPage {
    fn default() -> Self {
        LandingPage::Billing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingPreference {
    GetFromFile,
    NoShipping,
    SetProvidedAddress,
}

impl Default for ShippingPreference {
    fn default() -> Self {
        ShippingPreference::NoShipping
    }
}

/// Label of the final button on the PayPal review page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserAction {
    Continue,
    PayNow,
}

impl Default for UserAction {
    fn default() -> Self {
        UserAction::PayNow
    }
}

/// PayPal REST configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct PayPalConfig {
    /// sandbox or live
    #[serde(default)]
    pub mode: Environment,

    /// API base URL override (for testing/mocking)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    pub client_id: String,

    pub client_secret: String,

    /// Currency every order is charged in
    #[serde(default)]
    pub currency: Currency,

    /// REST API version
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,

    /// BCP-47 locale of the checkout pages (e.g. "it-IT")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    #[serde(default)]
    pub landing_page: LandingPage,

    #[serde(default)]
    pub shipping_preference: ShippingPreference,

    #[serde(default)]
    pub user_action: UserAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,

    /// Sent as `PayPal-Partner-Attribution-Id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_attribution_id: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Log a human-readable summary of every response
    #[serde(default)]
    pub debug: bool,
}

fn default_version() -> String {
    "v2".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl PayPalConfig {
    /// Create config with explicit credentials and sandbox defaults
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            mode: Environment::Sandbox,
            endpoint: None,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            currency: Currency::default(),
            version: default_version(),
            brand_name: None,
            locale: None,
            landing_page: LandingPage::default(),
            shipping_preference: ShippingPreference::default(),
            user_action: UserAction::default(),
            return_url: None,
            cancel_url: None,
            partner_attribution_id: None,
            timeout_secs: default_timeout_secs(),
            debug: false,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `PAYPAL_CLIENT_ID`
    /// - `PAYPAL_CLIENT_SECRET`
    ///
    /// Optional: `PAYPAL_MODE`, `PAYPAL_ENDPOINT`, `PAYPAL_CURRENCY`,
    /// `PAYPAL_API_VERSION`, `PAYPAL_BRAND_NAME`, `PAYPAL_LOCALE`,
    /// `PAYPAL_LANDING_PAGE`, `PAYPAL_SHIPPING_PREFERENCE`,
    /// `PAYPAL_USER_ACTION`, `PAYPAL_RETURN_URL`, `PAYPAL_CANCEL_URL`,
    /// `PAYPAL_PARTNER_ATTRIBUTION_ID`, `PAYPAL_TIMEOUT_SECS`, `PAYPAL_DEBUG`
    pub fn from_env() -> PaymentResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let client_id = required_var("PAYPAL_CLIENT_ID")?;
        let client_secret = required_var("PAYPAL_CLIENT_SECRET")?;

        let mut config = Self::new(client_id, client_secret);

        if let Some(mode) = optional_var("PAYPAL_MODE") {
            config.mode = mode.parse()?;
        }
        if let Some(currency) = optional_var("PAYPAL_CURRENCY") {
            config.currency = currency.parse()?;
        }
        if let Some(version) = optional_var("PAYPAL_API_VERSION") {
            config.version = version;
        }
        if let Some(value) = optional_var("PAYPAL_LANDING_PAGE") {
            config.landing_page = parse_upper("PAYPAL_LANDING_PAGE", &value)?;
        }
        if let Some(value) = optional_var("PAYPAL_SHIPPING_PREFERENCE") {
            config.shipping_preference = parse_upper("PAYPAL_SHIPPING_PREFERENCE", &value)?;
        }
        if let Some(value) = optional_var("PAYPAL_USER_ACTION") {
            config.user_action = parse_upper("PAYPAL_USER_ACTION", &value)?;
        }
        if let Some(timeout) = optional_var("PAYPAL_TIMEOUT_SECS") {
            config.timeout_secs = timeout.parse().map_err(|_| {
                PaymentError::Configuration(format!(
                    "PAYPAL_TIMEOUT_SECS is not a number: {}",
                    timeout
                ))
            })?;
        }
        config.endpoint = optional_var("PAYPAL_ENDPOINT");
        config.brand_name = optional_var("PAYPAL_BRAND_NAME");
        config.locale = optional_var("PAYPAL_LOCALE");
        config.return_url = optional_var("PAYPAL_RETURN_URL");
        config.cancel_url = optional_var("PAYPAL_CANCEL_URL");
        config.partner_attribution_id = optional_var("PAYPAL_PARTNER_ATTRIBUTION_ID");
        config.debug = optional_var("PAYPAL_DEBUG")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document
    pub fn from_toml(toml_str: &str) -> PaymentResult<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| PaymentError::Configuration(format!("invalid PayPal config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn from_toml_file(path: impl AsRef<Path>) -> PaymentResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PaymentError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> PaymentResult<()> {
        if self.client_id.trim().is_empty() {
            return Err(PaymentError::Configuration(
                "PayPal client_id is empty".to_string(),
            ));
        }
        if self.client_secret.trim().is_empty() {
            return Err(PaymentError::Configuration(
                "PayPal client_secret is empty".to_string(),
            ));
        }
        if self.version != "v2" {
            return Err(PaymentError::Configuration(format!(
                "only Checkout API v2 is supported, got '{}'",
                self.version
            )));
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
                return Err(PaymentError::Configuration(format!(
                    "PayPal endpoint must be an http(s) URL: {}",
                    endpoint
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(PaymentError::Configuration(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// REST base URL, without trailing slash
    pub fn api_base_url(&self) -> String {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.mode.base_url())
            .trim_end_matches('/')
            .to_string()
    }

    pub fn is_live(&self) -> bool {
        self.mode == Environment::Live
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    pub fn with_mode(mut self, mode: Environment) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_brand(mut self, brand_name: impl Into<String>, locale: impl Into<String>) -> Self {
        self.brand_name = Some(brand_name.into());
        self.locale = Some(locale.into());
        self
    }

    pub fn with_redirect_urls(
        mut self,
        return_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        self.return_url = Some(return_url.into());
        self.cancel_url = Some(cancel_url.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl std::fmt::Debug for PayPalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayPalConfig")
            .field("mode", &self.mode)
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("currency", &self.currency)
            .field("version", &self.version)
            .field("brand_name", &self.brand_name)
            .field("locale", &self.locale)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

fn required_var(name: &str) -> PaymentResult<String> {
    optional_var(name).ok_or_else(|| PaymentError::Configuration(format!("{} not set", name)))
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_upper<T: DeserializeOwned>(name: &str, raw: &str) -> PaymentResult<T> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_ascii_uppercase()))
        .map_err(|_| PaymentError::Configuration(format!("invalid value for {}: {}", name, raw)))
}
