//! # Request Handlers
//!
//! Axum request handlers for the checkout API.
//! Each handler forwards to the gateway and passes PayPal's status through.

use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use checkout_core::{
    AmountBreakdown, CaptureRequest, Currency, Intent, ItemCategory, LineItem, Order,
    OrderResource, PaymentError, PaymentResource, Price, RefundRequest,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create order request (decimal amounts in the configured currency)
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub intent: Intent,
    /// Purchase token (generated when absent)
    #[serde(default)]
    pub reference_id: Option<String>,
    pub description: String,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub invoice_id: Option<String>,
    pub total: f64,
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping: Option<f64>,
    #[serde(default)]
    pub handling: Option<f64>,
    #[serde(default)]
    pub discount: Option<f64>,
}

/// Item in a create order request
#[derive(Debug, Deserialize)]
pub struct OrderItem {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub unit_amount: f64,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category: ItemCategory,
}

fn default_quantity() -> u32 {
    1
}

/// Optional body of `POST /authorizations/{id}/capture`
#[derive(Debug, Default, Deserialize)]
pub struct CaptureAuthorizationBody {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub note_to_payer: Option<String>,
    #[serde(default)]
    pub final_capture: Option<bool>,
}

/// Optional body of `POST /captures/{id}/refund`
#[derive(Debug, Default, Deserialize)]
pub struct RefundBody {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub invoice_id: Option<String>,
    #[serde(default)]
    pub note_to_payer: Option<String>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
            debug_id: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn payment_error_to_response(err: PaymentError) -> ApiError {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.to_string(), code);
    if let PaymentError::Api { details, debug_id, .. } = &err {
        response.debug_id = debug_id.clone();
        if !details.is_empty() {
            let issues: Vec<&str> = details.iter().map(|d| d.issue.as_str()).collect();
            response = response.with_details(issues.join(", "));
        }
    }
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(message, 400)),
    )
}

/// Parse an optional JSON body; an empty body yields the default
fn optional_json<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        let (status, Json(response)) = bad_request("Invalid JSON body");
        (status, Json(response.with_details(e.to_string())))
    })
}

fn with_status<T: Serialize>(status_code: u16, result: T) -> (StatusCode, Json<T>) {
    (
        StatusCode::from_u16(status_code).unwrap_or(StatusCode::OK),
        Json(result),
    )
}

impl CreateOrderRequest {
    /// Build the core order, prices in `currency`
    pub fn into_order(self, currency: Currency) -> Result<Order, PaymentError> {
        let price = |amount: f64| Price::parse(amount, currency);

        let mut order = Order::new(self.intent, self.description, price(self.total)?);
        if let Some(reference_id) = self.reference_id {
            order.reference_id = reference_id;
        }
        order.custom_id = self.custom_id;
        order.invoice_id = self.invoice_id;
        order.subtotal = self.subtotal.map(price).transpose()?;

        for item in self.items {
            let mut line = LineItem::new(item.name, price(item.unit_amount)?, item.quantity)
                .with_category(item.category);
            line.sku = item.sku;
            line.tax = item.tax.map(price).transpose()?;
            order.add_item(line);
        }

        let mut breakdown = AmountBreakdown {
            shipping: self.shipping.map(price).transpose()?,
            handling: self.handling.map(price).transpose()?,
            discount: self.discount.map(price).transpose()?,
            ..Default::default()
        };
        let has_extras =
            breakdown.shipping.is_some() || breakdown.handling.is_some() || breakdown.discount.is_some();

        if !order.items.is_empty() {
            let mut item_total = Price::zero(currency);
            let mut tax_total = Price::zero(currency);
            for line in &order.items {
                item_total = item_total.checked_add(&line.total()?)?;
                tax_total = tax_total.checked_add(&line.tax_total()?)?;
            }
            breakdown.item_total = Some(item_total);
            if order.items.iter().any(|i| i.tax.is_some()) {
                breakdown.tax_total = Some(tax_total);
            }
            order.breakdown = Some(breakdown);
        } else if has_extras {
            // Without items the goods are whatever the extras leave of the amount
            let mut item_total = order.amount()?;
            for extra in [breakdown.shipping, breakdown.handling].into_iter().flatten() {
                item_total = item_total.checked_sub(&extra)?;
            }
            if let Some(discount) = breakdown.discount {
                item_total = item_total.checked_add(&discount)?;
            }
            if item_total.amount < 0 {
                return Err(PaymentError::invalid_price(format!(
                    "shipping and handling exceed the order amount by {}",
                    Price::from_minor(-item_total.amount, currency).value_string()
                )));
            }
            breakdown.item_total = Some(item_total);
            order.breakdown = Some(breakdown);
        }

        Ok(order)
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "paypal-checkout",
        "provider": state.gateway.provider_name(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create an order
#[instrument(skip(state, request), fields(items = request.items.len()))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResource>), ApiError> {
    let order = request
        .into_order(state.currency)
        .map_err(payment_error_to_response)?;

    info!(
        "Creating order: reference_id={}, intent={}, items={}",
        order.reference_id,
        order.intent.as_str(),
        order.item_count()
    );

    let response = state.gateway.create_order(&order).await.map_err(|e| {
        error!("Failed to create order: {}", e);
        payment_error_to_response(e)
    })?;

    Ok(with_status(response.status_code, response.result))
}

/// Fetch an order
#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<(StatusCode, Json<OrderResource>), ApiError> {
    let response = state
        .gateway
        .get_order(&order_id)
        .await
        .map_err(payment_error_to_response)?;

    Ok(with_status(response.status_code, response.result))
}

/// Capture an approved order
#[instrument(skip(state))]
pub async fn capture_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<(StatusCode, Json<OrderResource>), ApiError> {
    let response = state.gateway.capture_order(&order_id).await.map_err(|e| {
        error!("Failed to capture order {}: {}", order_id, e);
        payment_error_to_response(e)
    })?;

    Ok(with_status(response.status_code, response.result))
}

/// Authorize an approved order
#[instrument(skip(state))]
pub async fn authorize_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<(StatusCode, Json<OrderResource>), ApiError> {
    let response = state.gateway.authorize_order(&order_id).await.map_err(|e| {
        error!("Failed to authorize order {}: {}", order_id, e);
        payment_error_to_response(e)
    })?;

    Ok(with_status(response.status_code, response.result))
}

/// Capture an authorization (full capture when the body is empty)
#[instrument(skip(state, body))]
pub async fn capture_authorization(
    State(state): State<AppState>,
    Path(authorization_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<PaymentResource>), ApiError> {
    let body: CaptureAuthorizationBody = optional_json(&body)?;
    let request = CaptureRequest {
        amount: body
            .amount
            .map(|a| Price::parse(a, state.currency))
            .transpose()
            .map_err(payment_error_to_response)?,
        invoice_id: body.invoice_id,
        note_to_payer: body.note_to_payer,
        final_capture: body.final_capture,
    };

    let response = state
        .gateway
        .capture_authorization(&authorization_id, &request)
        .await
        .map_err(|e| {
            error!("Failed to capture authorization {}: {}", authorization_id, e);
            payment_error_to_response(e)
        })?;

    Ok(with_status(response.status_code, response.result))
}

/// Refund a capture (full refund when the body is empty)
#[instrument(skip(state, body))]
pub async fn refund_capture(
    State(state): State<AppState>,
    Path(capture_id): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<PaymentResource>), ApiError> {
    let body: RefundBody = optional_json(&body)?;
    let request = RefundRequest {
        amount: body
            .amount
            .map(|a| Price::parse(a, state.currency))
            .transpose()
            .map_err(payment_error_to_response)?,
        invoice_id: body.invoice_id,
        note_to_payer: body.note_to_payer,
    };

    let response = state
        .gateway
        .refund_capture(&capture_id, &request)
        .await
        .map_err(|e| {
            error!("Failed to refund capture {}: {}", capture_id, e);
            payment_error_to_response(e)
        })?;

    info!("Refunded capture {}: refund_id={}", capture_id, response.result.id);

    Ok(with_status(response.status_code, response.result))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> CreateOrderRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_into_order_plain() {
        let order = request(serde_json::json!({
            "description": "Visura",
            "reference_id": "tok_1",
            "custom_id": "118",
            "total": 10.0,
            "subtotal": 2.5
        }))
        .into_order(Currency::EUR)
        .unwrap();

        assert_eq!(order.intent, Intent::Capture);
        assert_eq!(order.reference_id, "tok_1");
        assert_eq!(order.amount().unwrap().value_string(), "12.50");
        assert!(order.breakdown.is_none());
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_into_order_with_items_builds_breakdown() {
        let order = request(serde_json::json!({
            "intent": "AUTHORIZE",
            "description": "Cart",
            "total": 27.4,
            "items": [
                { "name": "Mug", "quantity": 2, "unit_amount": 10.0, "tax": 2.2 },
                { "name": "Sticker", "unit_amount": 1.0 }
            ],
            "shipping": 2.0
        }))
        .into_order(Currency::EUR)
        .unwrap();

        let breakdown = order.breakdown.as_ref().unwrap();
        assert_eq!(breakdown.item_total, Some(Price::new(21.0, Currency::EUR)));
        assert_eq!(breakdown.tax_total, Some(Price::new(4.4, Currency::EUR)));
        assert_eq!(breakdown.shipping, Some(Price::new(2.0, Currency::EUR)));
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_into_order_extras_without_items() {
        let order = request(serde_json::json!({
            "description": "Visura",
            "total": 12.0,
            "shipping": 2.0,
            "handling": 0.5,
            "discount": 1.0
        }))
        .into_order(Currency::EUR)
        .unwrap();

        let breakdown = order.breakdown.as_ref().unwrap();
        assert_eq!(breakdown.item_total, Some(Price::new(10.5, Currency::EUR)));
        assert_eq!(breakdown.net(Currency::EUR).unwrap(), order.amount().unwrap());
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_into_order_extras_exceeding_amount() {
        let err = request(serde_json::json!({
            "description": "Visura",
            "total": 1.0,
            "shipping": 3.0
        }))
        .into_order(Currency::EUR)
        .unwrap_err();
        assert!(matches!(err, PaymentError::InvalidPrice { .. }));
    }

    #[test]
    fn test_into_order_rounds_half_cents_up() {
        let order = request(serde_json::json!({
            "description": "Visura",
            "total": 1.005,
            "subtotal": 2.675
        }))
        .into_order(Currency::EUR)
        .unwrap();
        assert_eq!(order.total.value_string(), "1.01");
        assert_eq!(order.amount().unwrap().value_string(), "3.69");
    }

    #[test]
    fn test_optional_json() {
        let empty: RefundBody = optional_json(&Bytes::new()).unwrap();
        assert!(empty.amount.is_none());

        let partial: RefundBody = optional_json(&Bytes::from_static(br#"{"amount": 5.5}"#)).unwrap();
        assert_eq!(partial.amount, Some(5.5));

        let err = optional_json::<RefundBody>(&Bytes::from_static(b"{nope")).unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_api_error_carries_debug_id() {
        let (status, Json(body)) = payment_error_to_response(PaymentError::Api {
            status: 422,
            name: "UNPROCESSABLE_ENTITY".into(),
            message: "The requested action could not be performed".into(),
            debug_id: Some("abc".into()),
            details: vec![checkout_core::ErrorDetail {
                field: None,
                value: None,
                location: None,
                issue: "ORDER_NOT_APPROVED".into(),
                description: None,
            }],
        });
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.debug_id.as_deref(), Some("abc"));
        assert_eq!(body.details.as_deref(), Some("ORDER_NOT_APPROVED"));
    }
}
