//! # Order Types
//!
//! The application-side order that gets mapped into a PayPal
//! `purchase_units` entry, plus the bodies for payment captures and refunds.

use crate::error::{PaymentError, PaymentResult};
use crate::money::{Currency, Price};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

const MAX_DESCRIPTION_LEN: usize = 127;
const MAX_REFERENCE_ID_LEN: usize = 256;
const MAX_CUSTOM_ID_LEN: usize = 127;
const MAX_INVOICE_ID_LEN: usize = 127;
const MAX_ITEM_NAME_LEN: usize = 127;

/// What happens to the funds once the payer approves the order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    /// Capture immediately after approval
    Capture,
    /// Place a hold, capture later through the authorization
    Authorize,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Capture => "CAPTURE",
            Intent::Authorize => "AUTHORIZE",
        }
    }
}

impl Default for Intent {
    fn default() -> Self {
        Intent::Capture
    }
}

/// Item category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCategory {
    DigitalGoods,
    PhysicalGoods,
    Donation,
}

impl Default for ItemCategory {
    fn default() -> Self {
        ItemCategory::DigitalGoods
    }
}

/// A line item in an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    pub quantity: u32,

    /// Price of a single unit, before tax
    pub unit_amount: Price,

    /// Tax of a single unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Price>,

    #[serde(default)]
    pub category: ItemCategory,
}

impl LineItem {
    pub fn new(name: impl Into<String>, unit_amount: Price, quantity: u32) -> Self {
        Self {
            name: name.into(),
            description: None,
            sku: None,
            quantity,
            unit_amount,
            tax: None,
            category: ItemCategory::default(),
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_tax(mut self, tax: Price) -> Self {
        self.tax = Some(tax);
        self
    }

    pub fn with_category(mut self, category: ItemCategory) -> Self {
        self.category = category;
        self
    }

    /// Unit amount times quantity
    pub fn total(&self) -> PaymentResult<Price> {
        self.unit_amount.times(self.quantity)
    }

    /// Tax times quantity (zero when no tax is set)
    pub fn tax_total(&self) -> PaymentResult<Price> {
        match self.tax {
            Some(tax) => tax.times(self.quantity),
            None => Ok(Price::zero(self.unit_amount.currency)),
        }
    }
}

/// Breakdown of the order amount
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountBreakdown {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_total: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handling: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_total: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_discount: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Price>,
}

impl AmountBreakdown {
    /// Named entries, in PayPal's field order
    pub fn entries(&self) -> Vec<(&'static str, Price)> {
        [
            ("item_total", self.item_total),
            ("shipping", self.shipping),
            ("handling", self.handling),
            ("tax_total", self.tax_total),
            ("insurance", self.insurance),
            ("shipping_discount", self.shipping_discount),
            ("discount", self.discount),
        ]
        .into_iter()
        .filter_map(|(name, price)| price.map(|p| (name, p)))
        .collect()
    }

    /// item_total + shipping + handling + tax_total + insurance
    /// - shipping_discount - discount
    pub fn net(&self, currency: Currency) -> PaymentResult<Price> {
        let mut net = Price::zero(currency);
        for (name, price) in self.entries() {
            net = match name {
                "shipping_discount" | "discount" => net.checked_sub(&price)?,
                _ => net.checked_add(&price)?,
            };
        }
        Ok(net)
    }
}

/// An order to be sent to PayPal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub intent: Intent,

    /// Purchase token, sent as `reference_id`
    pub reference_id: String,

    /// Order category, sent as the purchase unit description
    pub description: String,

    /// External document number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,

    pub total: Price,

    /// Added to `total` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<Price>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<LineItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<AmountBreakdown>,

    /// Custom metadata (kept locally, never sent)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Order {
    /// Create a new order with a generated reference id
    pub fn new(intent: Intent, description: impl Into<String>, total: Price) -> Self {
        Self {
            intent,
            reference_id: Uuid::new_v4().to_string(),
            description: description.into(),
            custom_id: None,
            invoice_id: None,
            total,
            subtotal: None,
            items: Vec::new(),
            breakdown: None,
            metadata: HashMap::new(),
        }
    }

    pub fn currency(&self) -> Currency {
        self.total.currency
    }

    /// Amount charged: `total + subtotal`, or `total` alone
    pub fn amount(&self) -> PaymentResult<Price> {
        match &self.subtotal {
            Some(subtotal) => self.total.checked_add(subtotal),
            None => Ok(self.total),
        }
    }

    pub fn with_reference_id(mut self, reference_id: impl Into<String>) -> Self {
        self.reference_id = reference_id.into();
        self
    }

    pub fn with_custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom_id = Some(custom_id.into());
        self
    }

    pub fn with_invoice_id(mut self, invoice_id: impl Into<String>) -> Self {
        self.invoice_id = Some(invoice_id.into());
        self
    }

    pub fn with_subtotal(mut self, subtotal: Price) -> Self {
        self.subtotal = Some(subtotal);
        self
    }

    pub fn with_breakdown(mut self, breakdown: AmountBreakdown) -> Self {
        self.breakdown = Some(breakdown);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn add_item(&mut self, item: LineItem) {
        self.items.push(item);
    }

    /// Item count (sum of quantities)
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Check the order against PayPal's purchase unit rules
    pub fn validate(&self) -> PaymentResult<()> {
        let currency = self.currency();
        let amount = self.amount()?;

        if !amount.is_positive() {
            return Err(PaymentError::invalid_price(format!(
                "order amount must be positive, got {}",
                amount.value_string()
            )));
        }

        check_text("description", &self.description, MAX_DESCRIPTION_LEN)?;
        check_text("reference_id", &self.reference_id, MAX_REFERENCE_ID_LEN)?;
        if let Some(custom_id) = &self.custom_id {
            check_text("custom_id", custom_id, MAX_CUSTOM_ID_LEN)?;
        }
        if let Some(invoice_id) = &self.invoice_id {
            check_text("invoice_id", invoice_id, MAX_INVOICE_ID_LEN)?;
        }

        let mut item_total = Price::zero(currency);
        let mut item_tax = Price::zero(currency);
        let mut any_tax = false;
        for item in &self.items {
            check_text("item name", &item.name, MAX_ITEM_NAME_LEN)?;
            if item.quantity == 0 {
                return Err(PaymentError::InvalidRequest(format!(
                    "item '{}' has zero quantity",
                    item.name
                )));
            }
            item_total = item_total.checked_add(&item.total()?)?;
            if item.tax.is_some() {
                any_tax = true;
                item_tax = item_tax.checked_add(&item.tax_total()?)?;
            }
        }

        if let Some(breakdown) = &self.breakdown {
            let net = breakdown.net(currency)?;
            if net != amount {
                return Err(PaymentError::invalid_price(format!(
                    "breakdown adds up to {}, order amount is {}",
                    net.value_string(),
                    amount.value_string()
                )));
            }
        }

        if !self.items.is_empty() {
            let declared = self
                .breakdown
                .as_ref()
                .and_then(|b| b.item_total)
                .ok_or_else(|| {
                    PaymentError::invalid_price("items require breakdown.item_total")
                })?;
            if declared != item_total {
                return Err(PaymentError::invalid_price(format!(
                    "item_total is {}, items add up to {}",
                    declared.value_string(),
                    item_total.value_string()
                )));
            }
            if any_tax {
                let declared_tax = self
                    .breakdown
                    .as_ref()
                    .and_then(|b| b.tax_total)
                    .unwrap_or(Price::zero(currency));
                if declared_tax != item_tax {
                    return Err(PaymentError::invalid_price(format!(
                        "tax_total is {}, item taxes add up to {}",
                        declared_tax.value_string(),
                        item_tax.value_string()
                    )));
                }
            }
        }

        Ok(())
    }

    /// Every price carried by the order, for currency checks
    pub fn prices(&self) -> Vec<Price> {
        let mut prices = vec![self.total];
        prices.extend(self.subtotal);
        for item in &self.items {
            prices.push(item.unit_amount);
            prices.extend(item.tax);
        }
        if let Some(breakdown) = &self.breakdown {
            prices.extend(breakdown.entries().into_iter().map(|(_, p)| p));
        }
        prices
    }
}

fn check_text(field: &str, value: &str, max: usize) -> PaymentResult<()> {
    if value.trim().is_empty() {
        return Err(PaymentError::InvalidRequest(format!("{} is empty", field)));
    }
    if value.chars().count() > max {
        return Err(PaymentError::InvalidRequest(format!(
            "{} exceeds {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Body of an authorization capture. All `None` captures the full amount.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_to_payer: Option<String>,
    /// Whether this is the last capture against the authorization
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_capture: Option<bool>,
}

impl CaptureRequest {
    pub fn full() -> Self {
        Self::default()
    }

    pub fn partial(amount: Price) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }
}

/// Body of a capture refund. All `None` refunds the full capture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefundRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_to_payer: Option<String>,
}

impl RefundRequest {
    pub fn full() -> Self {
        Self::default()
    }

    pub fn partial(amount: Price) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eur(amount: f64) -> Price {
        Price::new(amount, Currency::EUR)
    }

    #[test]
    fn test_amount_adds_subtotal() {
        let order = Order::new(Intent::Capture, "Visura", eur(10.10)).with_subtotal(eur(2.2));
        assert_eq!(order.amount().unwrap().value_string(), "12.30");

        let plain = Order::new(Intent::Capture, "Visura", eur(10.0));
        assert_eq!(plain.amount().unwrap().value_string(), "10.00");
    }

    #[test]
    fn test_new_order_generates_reference_id() {
        let a = Order::new(Intent::Capture, "A", eur(1.0));
        let b = Order::new(Intent::Capture, "A", eur(1.0));
        assert_ne!(a.reference_id, b.reference_id);
        assert!(Uuid::parse_str(&a.reference_id).is_ok());
    }

    #[test]
    fn test_validate_rejects_non_positive_amount() {
        let order = Order::new(Intent::Capture, "Visura", eur(0.0));
        assert!(matches!(
            order.validate(),
            Err(PaymentError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_or_long_description() {
        let order = Order::new(Intent::Capture, "  ", eur(5.0));
        assert!(matches!(order.validate(), Err(PaymentError::InvalidRequest(_))));

        let order = Order::new(Intent::Capture, "x".repeat(128), eur(5.0));
        assert!(matches!(order.validate(), Err(PaymentError::InvalidRequest(_))));
    }

    #[test]
    fn test_items_require_matching_item_total() {
        let mut order = Order::new(Intent::Capture, "Cart", eur(30.0));
        order.add_item(LineItem::new("Book", eur(10.0), 3));
        assert!(matches!(
            order.validate(),
            Err(PaymentError::InvalidPrice { .. })
        ));

        let order = order.with_breakdown(AmountBreakdown {
            item_total: Some(eur(30.0)),
            ..Default::default()
        });
        assert!(order.validate().is_ok());
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_item_count_does_not_overflow() {
        let mut order = Order::new(Intent::Capture, "Bulk", eur(1.0));
        order.add_item(LineItem::new("A", eur(0.01), u32::MAX));
        order.add_item(LineItem::new("B", eur(0.01), 1));
        assert_eq!(order.item_count(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_validate_id_lengths() {
        let ok = Order::new(Intent::Capture, "Visura", eur(5.0))
            .with_reference_id("r".repeat(256))
            .with_custom_id("c".repeat(127))
            .with_invoice_id("i".repeat(127));
        assert!(ok.validate().is_ok());

        let long_reference = ok.clone().with_reference_id("r".repeat(257));
        assert!(matches!(long_reference.validate(), Err(PaymentError::InvalidRequest(_))));

        let long_custom = ok.clone().with_custom_id("c".repeat(128));
        assert!(matches!(long_custom.validate(), Err(PaymentError::InvalidRequest(_))));

        let long_invoice = ok.with_invoice_id("i".repeat(128));
        assert!(matches!(long_invoice.validate(), Err(PaymentError::InvalidRequest(_))));
    }

    #[test]
    fn test_breakdown_must_match_amount() {
        let breakdown = AmountBreakdown {
            item_total: Some(eur(20.0)),
            shipping: Some(eur(5.0)),
            discount: Some(eur(2.5)),
            ..Default::default()
        };
        assert_eq!(breakdown.net(Currency::EUR).unwrap(), eur(22.5));

        let ok = Order::new(Intent::Capture, "Cart", eur(22.5)).with_breakdown(breakdown.clone());
        assert!(ok.validate().is_ok());

        let bad = Order::new(Intent::Capture, "Cart", eur(25.0)).with_breakdown(breakdown);
        assert!(matches!(bad.validate(), Err(PaymentError::InvalidPrice { .. })));
    }

    #[test]
    fn test_item_tax_must_match_tax_total() {
        let mut order = Order::new(Intent::Capture, "Cart", eur(24.4)).with_breakdown(
            AmountBreakdown {
                item_total: Some(eur(20.0)),
                tax_total: Some(eur(4.4)),
                ..Default::default()
            },
        );
        order.add_item(LineItem::new("Mug", eur(10.0), 2).with_tax(eur(2.2)));
        assert!(order.validate().is_ok());

        order.breakdown.as_mut().unwrap().tax_total = Some(eur(4.0));
        order.total = eur(24.0);
        assert!(matches!(order.validate(), Err(PaymentError::InvalidPrice { .. })));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut order = Order::new(Intent::Capture, "Cart", eur(0.01)).with_breakdown(
            AmountBreakdown {
                item_total: Some(eur(0.01)),
                ..Default::default()
            },
        );
        order.add_item(LineItem::new("Ghost", eur(1.0), 0));
        assert!(matches!(order.validate(), Err(PaymentError::InvalidRequest(_))));
    }

    #[test]
    fn test_mixed_currency_rejected() {
        let order = Order::new(Intent::Capture, "Visura", eur(10.0))
            .with_subtotal(Price::new(1.0, Currency::USD));
        assert!(matches!(
            order.validate(),
            Err(PaymentError::UnsupportedCurrency { .. })
        ));
    }

    #[test]
    fn test_intent_serialization() {
        assert_eq!(serde_json::to_string(&Intent::Authorize).unwrap(), "\"AUTHORIZE\"");
        assert_eq!(
            serde_json::to_string(&ItemCategory::PhysicalGoods).unwrap(),
            "\"PHYSICAL_GOODS\""
        );
    }
}
