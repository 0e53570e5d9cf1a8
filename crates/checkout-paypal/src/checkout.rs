//! # PayPal Checkout
//!
//! The `CheckoutGateway` implementation backed by the PayPal REST API.
//! Builds request bodies, hands them to `PayPalHttpClient` and parses the
//! responses.

use crate::body::{build_capture_body, build_refund_body, build_request_body};
use crate::config::PayPalConfig;
use crate::debug::{describe_authorize_order, describe_capture_order, describe_order, describe_payment};
use crate::http::PayPalHttpClient;
use crate::requests;
use async_trait::async_trait;
use checkout_core::{
    ApiResponse, CaptureRequest, CheckoutGateway, Order, OrderResource, PaymentResource,
    PaymentResult, RefundRequest,
};
use std::path::Path;
use tracing::{debug, info, instrument};

/// PayPal Checkout V2 gateway
pub struct PayPalCheckout {
    client: PayPalHttpClient,
}

impl PayPalCheckout {
    /// Create a new gateway; fails on invalid configuration
    pub fn new(config: PayPalConfig) -> PaymentResult<Self> {
        config.validate()?;
        debug!(
            "PayPal checkout configured: mode={}, base_url={}, currency={}",
            config.mode,
            config.api_base_url(),
            config.currency
        );
        Ok(Self {
            client: PayPalHttpClient::new(config)?,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(PayPalConfig::from_env()?)
    }

    /// Create from a TOML config file
    pub fn from_config_file(path: impl AsRef<Path>) -> PaymentResult<Self> {
        Self::new(PayPalConfig::from_toml_file(path)?)
    }

    pub fn config(&self) -> &PayPalConfig {
        self.client.config()
    }

    fn debug_enabled(&self) -> bool {
        self.config().debug
    }
}

#[async_trait]
impl CheckoutGateway for PayPalCheckout {
    #[instrument(skip(self, order), fields(reference_id = %order.reference_id, intent = order.intent.as_str()))]
    async fn create_order(&self, order: &Order) -> PaymentResult<ApiResponse<OrderResource>> {
        let body = build_request_body(order, self.config())?;
        let response = self
            .client
            .execute(requests::orders_create(body))
            .await?
            .into_api_response::<OrderResource>()?;

        info!(
            "Created PayPal order: id={}, status={}, amount={}",
            response.result.id,
            response.result.status,
            order.amount()?.display()
        );
        if self.debug_enabled() {
            info!("\n{}", describe_order(&response));
        }
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn get_order(&self, order_id: &str) -> PaymentResult<ApiResponse<OrderResource>> {
        let response = self
            .client
            .execute(requests::orders_get(order_id)?)
            .await?
            .into_api_response::<OrderResource>()?;

        debug!("Fetched PayPal order: id={}, status={}", response.result.id, response.result.status);
        if self.debug_enabled() {
            info!("\n{}", describe_order(&response));
        }
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn capture_order(&self, order_id: &str) -> PaymentResult<ApiResponse<OrderResource>> {
        let response = self
            .client
            .execute(requests::orders_capture(order_id)?)
            .await?
            .into_api_response::<OrderResource>()?;

        info!(
            "Captured PayPal order: id={}, status={}, captures={:?}",
            response.result.id,
            response.result.status,
            response.result.capture_ids()
        );
        if self.debug_enabled() {
            info!("\n{}", describe_capture_order(&response));
        }
        Ok(response)
    }

    #[instrument(skip(self))]
    async fn authorize_order(&self, order_id: &str) -> PaymentResult<ApiResponse<OrderResource>> {
        let response = self
            .client
            .execute(requests::orders_authorize(order_id)?)
            .await?
            .into_api_response::<OrderResource>()?;

        info!(
            "Authorized PayPal order: id={}, status={}, authorization={:?}",
            response.result.id,
            response.result.status,
            response.result.first_authorization().map(|a| a.id.as_str())
        );
        if self.debug_enabled() {
            info!("\n{}", describe_authorize_order(&response));
        }
        Ok(response)
    }

    #[instrument(skip(self, request))]
    async fn capture_authorization(
        &self,
        authorization_id: &str,
        request: &CaptureRequest,
    ) -> PaymentResult<ApiResponse<PaymentResource>> {
        let body = build_capture_body(request, self.config().currency)?;
        let response = self
            .client
            .execute(requests::authorizations_capture(authorization_id, body)?)
            .await?
            .into_api_response::<PaymentResource>()?;

        info!(
            "Captured PayPal authorization: capture_id={}, status={}",
            response.result.id, response.result.status
        );
        if self.debug_enabled() {
            info!("\n{}", describe_payment("Capture", &response));
        }
        Ok(response)
    }

    #[instrument(skip(self, request))]
    async fn refund_capture(
        &self,
        capture_id: &str,
        request: &RefundRequest,
    ) -> PaymentResult<ApiResponse<PaymentResource>> {
        let body = build_refund_body(request, self.config().currency)?;
        let response = self
            .client
            .execute(requests::captures_refund(capture_id, body)?)
            .await?
            .into_api_response::<PaymentResource>()?;

        info!(
            "Refunded PayPal capture: refund_id={}, status={}",
            response.result.id, response.result.status
        );
        if self.debug_enabled() {
            info!("\n{}", describe_payment("Refund", &response));
        }
        Ok(response)
    }

    fn provider_name(&self) -> &'static str {
        "paypal"
    }
}
