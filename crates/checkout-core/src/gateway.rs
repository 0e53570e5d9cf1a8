//! # Checkout Gateway Trait
//!
//! The six Checkout V2 operations, as a trait the HTTP layer talks to.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  CheckoutGateway (trait)                    │
//! │  ├── create_order()          ├── capture_authorization()    │
//! │  ├── get_order()             ├── refund_capture()           │
//! │  ├── capture_order()         └── provider_name()            │
//! │  └── authorize_order()                                      │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                            │
//!                  ┌─────────┴─────────┐
//!                  │   PayPalCheckout  │
//!                  └───────────────────┘
//! ```

use crate::error::{PaymentError, PaymentResult};
use crate::order::{CaptureRequest, Order, RefundRequest};
use crate::resource::{ApiResponse, OrderResource, PaymentResource};
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for checkout providers.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Create an order from application order data.
    async fn create_order(&self, order: &Order) -> PaymentResult<ApiResponse<OrderResource>>;

    /// Fetch an order by id.
    async fn get_order(&self, order_id: &str) -> PaymentResult<ApiResponse<OrderResource>>;

    /// Capture the payment of an approved `CAPTURE` order.
    async fn capture_order(&self, order_id: &str) -> PaymentResult<ApiResponse<OrderResource>>;

    /// Authorize an approved `AUTHORIZE` order, placing a hold on the funds.
    async fn authorize_order(&self, order_id: &str) -> PaymentResult<ApiResponse<OrderResource>>;

    /// Capture a previously created authorization.
    async fn capture_authorization(
        &self,
        authorization_id: &str,
        request: &CaptureRequest,
    ) -> PaymentResult<ApiResponse<PaymentResource>>;

    /// Refund a capture, fully or partially.
    async fn refund_capture(
        &self,
        capture_id: &str,
        request: &RefundRequest,
    ) -> PaymentResult<ApiResponse<PaymentResource>>;

    /// Get the provider name (for logging and routing).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedCheckoutGateway = Arc<dyn CheckoutGateway>;

/// Reject ids that are empty or hold anything besides ASCII letters,
/// digits, `-` and `_`. Ids become a single URL path segment, so `.`
/// and `..` must not get through.
pub fn validate_resource_id(kind: &str, id: &str) -> PaymentResult<()> {
    if id.is_empty() {
        return Err(PaymentError::InvalidRequest(format!("{} id is empty", kind)));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(PaymentError::InvalidRequest(format!(
            "{} id contains invalid characters: {}",
            kind, id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_resource_id() {
        assert!(validate_resource_id("order", "5O190127TN364715T").is_ok());
        assert!(validate_resource_id("order", "").is_err());
        assert!(validate_resource_id("order", "   ").is_err());
        assert!(validate_resource_id("capture", "abc/../refund").is_err());
        assert!(validate_resource_id("capture", "abc?x=1").is_err());
        assert!(validate_resource_id("capture", "abc def").is_err());
        assert!(validate_resource_id("order", ".").is_err());
        assert!(validate_resource_id("order", "..").is_err());
        assert!(validate_resource_id("order", "a.b").is_err());
        assert!(validate_resource_id("order", "ord%2F1").is_err());
        assert!(validate_resource_id("authorization", "AUTH_1-x").is_ok());
    }
}
