//! # checkout-core
//!
//! Core types and traits for the paypal-checkout engine.
//!
//! This crate provides:
//! - `CheckoutGateway` trait for the six Checkout V2 operations
//! - `Order`, `LineItem`, and `AmountBreakdown` for application order data
//! - `Price` and `Currency` with exact minor-unit arithmetic
//! - `OrderResource`, `PaymentResource`, and `ApiResponse` for responses
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{CheckoutGateway, Currency, Intent, Order, Price};
//!
//! let order = Order::new(Intent::Capture, "Visura catastale", Price::new(12.50, Currency::EUR))
//!     .with_custom_id("2024/118");
//!
//! let response = gateway.create_order(&order).await?;
//!
//! // Redirect the payer to the approval page
//! let approve = response.result.approve_url();
//! ```

pub mod error;
pub mod gateway;
pub mod money;
pub mod order;
pub mod resource;

// Re-exports for convenience
pub use error::{ErrorDetail, PaymentError, PaymentResult};
pub use gateway::{validate_resource_id, BoxedCheckoutGateway, CheckoutGateway};
pub use money::{Currency, Price};
pub use order::{
    AmountBreakdown, CaptureRequest, Intent, ItemCategory, LineItem, Order, RefundRequest,
};
pub use resource::{
    ApiResponse, LinkDescription, Money, OrderResource, OrderStatus, PaymentCollection,
    PaymentResource, PurchaseUnitResource,
};
