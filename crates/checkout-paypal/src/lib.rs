//! # checkout-paypal
//!
//! PayPal Checkout V2 gateway for paypal-checkout-rs.
//!
//! `PayPalCheckout` implements `CheckoutGateway` on top of the PayPal REST
//! API:
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | `create_order` | `POST /v2/checkout/orders` |
//! | `get_order` | `GET /v2/checkout/orders/{id}` |
//! | `capture_order` | `POST /v2/checkout/orders/{id}/capture` |
//! | `authorize_order` | `POST /v2/checkout/orders/{id}/authorize` |
//! | `capture_authorization` | `POST /v2/payments/authorizations/{id}/capture` |
//! | `refund_capture` | `POST /v2/payments/captures/{id}/refund` |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_paypal::PayPalCheckout;
//! use checkout_core::{CheckoutGateway, Currency, Intent, Order, Price};
//!
//! // Reads PAYPAL_CLIENT_ID, PAYPAL_CLIENT_SECRET, PAYPAL_MODE, ...
//! let paypal = PayPalCheckout::from_env()?;
//!
//! let order = Order::new(Intent::Capture, "Visura", Price::new(12.50, Currency::EUR));
//! let created = paypal.create_order(&order).await?;
//!
//! // Redirect the payer to created.result.approve_url(), then:
//! let captured = paypal.capture_order(&created.result.id).await?;
//! ```

pub mod auth;
pub mod body;
pub mod checkout;
pub mod config;
pub mod debug;
pub mod environment;
pub mod http;
pub mod requests;

// Re-exports
pub use auth::{AccessToken, TokenCache};
pub use body::{
    build_capture_body, build_minimum_request_body, build_refund_body, build_request_body,
};
pub use checkout::PayPalCheckout;
pub use config::{LandingPage, PayPalConfig, ShippingPreference, UserAction};
pub use environment::Environment;
pub use http::{PayPalHttpClient, PayPalRequest, PayPalResponse, Verb};
