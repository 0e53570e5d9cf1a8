//! Request builders for the six Checkout V2 calls.

use crate::http::{PayPalRequest, Verb};
use checkout_core::{validate_resource_id, PaymentResult};
use serde_json::{json, Value};
use uuid::Uuid;

const ORDERS_PATH: &str = "/v2/checkout/orders";
const AUTHORIZATIONS_PATH: &str = "/v2/payments/authorizations";
const CAPTURES_PATH: &str = "/v2/payments/captures";

const PREFER_REPRESENTATION: &str = "return=representation";

fn request_id() -> String {
    Uuid::new_v4().to_string()
}

/// `POST /v2/checkout/orders`
pub fn orders_create(body: Value) -> PayPalRequest {
    PayPalRequest::new(Verb::Post, ORDERS_PATH)
        .header("Prefer", PREFER_REPRESENTATION)
        .header("PayPal-Request-Id", request_id())
        .body(body)
}

/// `GET /v2/checkout/orders/{id}`
pub fn orders_get(order_id: &str) -> PaymentResult<PayPalRequest> {
    validate_resource_id("order", order_id)?;
    Ok(PayPalRequest::new(
        Verb::Get,
        format!("{}/{}", ORDERS_PATH, order_id),
    ))
}

/// `POST /v2/checkout/orders/{id}/capture`
pub fn orders_capture(order_id: &str) -> PaymentResult<PayPalRequest> {
    validate_resource_id("order", order_id)?;
    Ok(PayPalRequest::new(
        Verb::Post,
        format!("{}/{}/capture", ORDERS_PATH, order_id),
    )
    .header("Prefer", PREFER_REPRESENTATION)
    .body(json!({})))
}

/// `POST /v2/checkout/orders/{id}/authorize`
pub fn orders_authorize(order_id: &str) -> PaymentResult<PayPalRequest> {
    validate_resource_id("order", order_id)?;
    Ok(PayPalRequest::new(
        Verb::Post,
        format!("{}/{}/authorize", ORDERS_PATH, order_id),
    )
    .header("Prefer", PREFER_REPRESENTATION)
    .body(json!({})))
}

/// `POST /v2/payments/authorizations/{id}/capture`
pub fn authorizations_capture(authorization_id: &str, body: Value) -> PaymentResult<PayPalRequest> {
    validate_resource_id("authorization", authorization_id)?;
    Ok(PayPalRequest::new(
        Verb::Post,
        format!("{}/{}/capture", AUTHORIZATIONS_PATH, authorization_id),
    )
    .header("Prefer", PREFER_REPRESENTATION)
    .header("PayPal-Request-Id", request_id())
    .body(body))
}

/// `POST /v2/payments/captures/{id}/refund`
pub fn captures_refund(capture_id: &str, body: Value) -> PaymentResult<PayPalRequest> {
    validate_resource_id("capture", capture_id)?;
    Ok(PayPalRequest::new(
        Verb::Post,
        format!("{}/{}/refund", CAPTURES_PATH, capture_id),
    )
    .header("Prefer", PREFER_REPRESENTATION)
    .header("PayPal-Request-Id", request_id())
    .body(body))
}
