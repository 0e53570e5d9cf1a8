//! # Request Bodies
//!
//! Maps application orders into PayPal's Checkout V2 request schema.
//! Every function here is pure: same order and config, same JSON.

use crate::config::{LandingPage, PayPalConfig, ShippingPreference, UserAction};
use checkout_core::{
    AmountBreakdown, CaptureRequest, Currency, Intent, ItemCategory, LineItem, Money, Order,
    PaymentError, PaymentResult, Price, RefundRequest,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Build the `POST /v2/checkout/orders` body for an order
pub fn build_request_body(order: &Order, config: &PayPalConfig) -> PaymentResult<Value> {
    ensure_currency(order.prices().iter(), config.currency)?;
    order.validate()?;

    let amount = order.amount()?;

    let body = CreateOrderBody {
        intent: order.intent,
        application_context: application_context(config),
        purchase_units: vec![PurchaseUnitBody {
            reference_id: Some(order.reference_id.clone()),
            description: Some(order.description.clone()),
            custom_id: order.custom_id.clone(),
            invoice_id: order.invoice_id.clone(),
            amount: AmountBody {
                currency_code: amount.currency.as_str(),
                value: amount.value_string(),
                breakdown: order.breakdown.as_ref().map(breakdown_body),
            },
            items: order.items.iter().map(item_body).collect(),
        }],
    };

    Ok(serde_json::to_value(body)?)
}

/// Minimal create body: intent, redirect URLs and a single amount
pub fn build_minimum_request_body(
    intent: Intent,
    amount: Price,
    config: &PayPalConfig,
) -> PaymentResult<Value> {
    ensure_currency(std::iter::once(&amount), config.currency)?;
    if !amount.is_positive() {
        return Err(PaymentError::invalid_price("amount must be positive"));
    }

    let body = CreateOrderBody {
        intent,
        application_context: ApplicationContext {
            return_url: config.return_url.clone(),
            cancel_url: config.cancel_url.clone(),
            ..Default::default()
        },
        purchase_units: vec![PurchaseUnitBody {
            amount: AmountBody {
                currency_code: amount.currency.as_str(),
                value: amount.value_string(),
                breakdown: None,
            },
            ..Default::default()
        }],
    };

    Ok(serde_json::to_value(body)?)
}

/// Body of an authorization capture; `{}` captures the full amount
pub fn build_capture_body(request: &CaptureRequest, currency: Currency) -> PaymentResult<Value> {
    if let Some(amount) = &request.amount {
        check_payment_amount(amount, currency)?;
    }
    let body = CaptureBody {
        amount: request.amount.as_ref().map(money),
        invoice_id: request.invoice_id.clone(),
        note_to_payer: request.note_to_payer.clone(),
        final_capture: request.final_capture,
    };
    Ok(serde_json::to_value(body)?)
}

/// Body of a capture refund; `{}` refunds the full capture
pub fn build_refund_body(request: &RefundRequest, currency: Currency) -> PaymentResult<Value> {
    if let Some(amount) = &request.amount {
        check_payment_amount(amount, currency)?;
    }
    let body = RefundBody {
        amount: request.amount.as_ref().map(money),
        invoice_id: request.invoice_id.clone(),
        note_to_payer: request.note_to_payer.clone(),
    };
    Ok(serde_json::to_value(body)?)
}

fn ensure_currency<'a>(
    mut prices: impl Iterator<Item = &'a Price>,
    expected: Currency,
) -> PaymentResult<()> {
    match prices.find(|p| p.currency != expected) {
        Some(price) => Err(PaymentError::UnsupportedCurrency {
            currency: format!("{} (account is configured for {})", price.currency, expected),
        }),
        None => Ok(()),
    }
}

fn check_payment_amount(amount: &Price, currency: Currency) -> PaymentResult<()> {
    ensure_currency(std::iter::once(amount), currency)?;
    if !amount.is_positive() {
        return Err(PaymentError::invalid_price("amount must be positive"));
    }
    Ok(())
}

fn money(price: &Price) -> Money {
    Money {
        currency_code: price.currency.as_str().to_string(),
        value: price.value_string(),
    }
}

fn application_context(config: &PayPalConfig) -> ApplicationContext {
    ApplicationContext {
        brand_name: config.brand_name.clone(),
        locale: config.locale.clone(),
        landing_page: Some(config.landing_page),
        shipping_preference: Some(config.shipping_preference),
        user_action: Some(config.user_action),
        return_url: config.return_url.clone(),
        cancel_url: config.cancel_url.clone(),
    }
}

fn breakdown_body(breakdown: &AmountBreakdown) -> BTreeMap<&'static str, Money> {
    breakdown
        .entries()
        .into_iter()
        .map(|(name, price)| (name, money(&price)))
        .collect()
}

fn item_body(item: &LineItem) -> ItemBody {
    ItemBody {
        name: item.name.clone(),
        description: item.description.clone(),
        sku: item.sku.clone(),
        // PayPal wants the quantity as a string
        quantity: item.quantity.to_string(),
        unit_amount: money(&item.unit_amount),
        tax: item.tax.as_ref().map(money),
        category: item.category,
    }
}

// =============================================================================
// PayPal Request Types
// =============================================================================

#[derive(Debug, Serialize)]
struct CreateOrderBody {
    intent: Intent,
    application_context: ApplicationContext,
    purchase_units: Vec<PurchaseUnitBody>,
}

#[derive(Debug, Default, Serialize)]
struct ApplicationContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    landing_page: Option<LandingPage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    shipping_preference: Option<ShippingPreference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_action: Option<UserAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cancel_url: Option<String>,
}

#[derive(Debug, Default, Serialize)]
struct PurchaseUnitBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    reference_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invoice_id: Option<String>,
    amount: AmountBody,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    items: Vec<ItemBody>,
}

#[derive(Debug, Default, Serialize)]
struct AmountBody {
    currency_code: &'static str,
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    breakdown: Option<BTreeMap<&'static str, Money>>,
}

#[derive(Debug, Serialize)]
struct ItemBody {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sku: Option<String>,
    quantity: String,
    unit_amount: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    tax: Option<Money>,
    category: ItemCategory,
}

#[derive(Debug, Serialize)]
struct CaptureBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invoice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note_to_payer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    final_capture: Option<bool>,
}

#[derive(Debug, Serialize)]
struct RefundBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invoice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note_to_payer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eur(amount: f64) -> Price {
        Price::new(amount, Currency::EUR)
    }

    fn config() -> PayPalConfig {
        PayPalConfig::new("id", "secret")
            .with_currency(Currency::EUR)
            .with_brand("STEF@N MCDS S.a.s.", "it-IT")
    }

    #[test]
    fn test_build_request_body() {
        let order = Order::new(Intent::Capture, "Visura catastale", eur(10.0))
            .with_reference_id("tok_8f1c")
            .with_custom_id("2024/118")
            .with_subtotal(eur(2.5));

        let body = build_request_body(&order, &config()).unwrap();

        assert_eq!(
            body,
            json!({
                "intent": "CAPTURE",
                "application_context": {
                    "brand_name": "STEF@N MCDS S.a.s.",
                    "locale": "it-IT",
                    "landing_page": "BILLING",
                    "shipping_preference": "NO_SHIPPING",
                    "user_action": "PAY_NOW"
                },
                "purchase_units": [{
                    "reference_id": "tok_8f1c",
                    "description": "Visura catastale",
                    "custom_id": "2024/118",
                    "amount": { "currency_code": "EUR", "value": "12.50" }
                }]
            })
        );
    }

    #[test]
    fn test_large_amounts_have_no_grouping() {
        let order = Order::new(Intent::Authorize, "Perizia", eur(1234.5));
        let body = build_request_body(&order, &config()).unwrap();
        assert_eq!(body["intent"], "AUTHORIZE");
        assert_eq!(body["purchase_units"][0]["amount"]["value"], "1234.50");
    }

    #[test]
    fn test_items_and_breakdown() {
        let mut order = Order::new(Intent::Capture, "Cart", eur(26.0)).with_breakdown(
            AmountBreakdown {
                item_total: Some(eur(20.0)),
                tax_total: Some(eur(4.4)),
                shipping: Some(eur(1.6)),
                ..Default::default()
            },
        );
        order.add_item(
            LineItem::new("Mug", eur(10.0), 2)
                .with_sku("MUG-01")
                .with_tax(eur(2.2))
                .with_category(ItemCategory::PhysicalGoods),
        );

        let body = build_request_body(&order, &config()).unwrap();
        let unit = &body["purchase_units"][0];

        assert_eq!(unit["amount"]["value"], "26.00");
        assert_eq!(unit["amount"]["breakdown"]["item_total"]["value"], "20.00");
        assert_eq!(unit["amount"]["breakdown"]["tax_total"]["value"], "4.40");
        assert_eq!(unit["amount"]["breakdown"]["shipping"]["value"], "1.60");
        assert!(unit["amount"]["breakdown"].get("discount").is_none());
        assert_eq!(
            unit["items"][0],
            json!({
                "name": "Mug",
                "sku": "MUG-01",
                "quantity": "2",
                "unit_amount": { "currency_code": "EUR", "value": "10.00" },
                "tax": { "currency_code": "EUR", "value": "2.20" },
                "category": "PHYSICAL_GOODS"
            })
        );
    }

    #[test]
    fn test_currency_must_match_config() {
        let order = Order::new(Intent::Capture, "Visura", Price::new(10.0, Currency::USD));
        assert!(matches!(
            build_request_body(&order, &config()),
            Err(PaymentError::UnsupportedCurrency { .. })
        ));
    }

    #[test]
    fn test_invalid_order_rejected() {
        let order = Order::new(Intent::Capture, "", eur(10.0));
        assert!(matches!(
            build_request_body(&order, &config()),
            Err(PaymentError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_redirect_urls_are_included() {
        let config = config().with_redirect_urls("https://shop.example/return", "https://shop.example/cancel");
        let order = Order::new(Intent::Capture, "Visura", eur(1.0));
        let body = build_request_body(&order, &config).unwrap();
        assert_eq!(body["application_context"]["return_url"], "https://shop.example/return");
        assert_eq!(body["application_context"]["cancel_url"], "https://shop.example/cancel");
    }

    #[test]
    fn test_minimum_request_body() {
        let config = PayPalConfig::new("id", "secret")
            .with_redirect_urls("https://example.com/return", "https://example.com/cancel");
        let body = build_minimum_request_body(
            Intent::Authorize,
            Price::new(220.0, Currency::USD),
            &config,
        )
        .unwrap();

        assert_eq!(
            body,
            json!({
                "intent": "AUTHORIZE",
                "application_context": {
                    "return_url": "https://example.com/return",
                    "cancel_url": "https://example.com/cancel"
                },
                "purchase_units": [{
                    "amount": { "currency_code": "USD", "value": "220.00" }
                }]
            })
        );
    }

    #[test]
    fn test_full_capture_and_refund_bodies_are_empty() {
        assert_eq!(
            build_capture_body(&CaptureRequest::full(), Currency::EUR).unwrap(),
            json!({})
        );
        assert_eq!(
            build_refund_body(&RefundRequest::full(), Currency::EUR).unwrap(),
            json!({})
        );
    }

    #[test]
    fn test_partial_refund_body() {
        let request = RefundRequest {
            amount: Some(eur(5.0)),
            note_to_payer: Some("Partial refund".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_refund_body(&request, Currency::EUR).unwrap(),
            json!({
                "amount": { "currency_code": "EUR", "value": "5.00" },
                "note_to_payer": "Partial refund"
            })
        );

        let wrong = RefundRequest::partial(Price::new(5.0, Currency::USD));
        assert!(build_refund_body(&wrong, Currency::EUR).is_err());

        let negative = CaptureRequest::partial(eur(-1.0));
        assert!(matches!(
            build_capture_body(&negative, Currency::EUR),
            Err(PaymentError::InvalidPrice { .. })
        ));
    }
}
