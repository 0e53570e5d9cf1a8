//! PayPal environments (sandbox or production).

use checkout_core::PaymentError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Sandbox,
    #[serde(alias = "production")]
    Live,
}

impl Environment {
    /// REST API base URL
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://api-m.sandbox.paypal.com",
            Environment::Live => "https://api-m.paypal.com",
        }
    }

    /// Website base URL (approval pages)
    pub fn web_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://www.sandbox.paypal.com",
            Environment::Live => "https://www.paypal.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Live => "live",
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::Sandbox
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "live" | "production" => Ok(Environment::Live),
            other => Err(PaymentError::Configuration(format!(
                "unknown PayPal mode '{}', expected sandbox or live",
                other
            ))),
        }
    }
}
