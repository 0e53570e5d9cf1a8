//! # Response Resources
//!
//! Typed views over the JSON PayPal returns for orders, captures,
//! authorizations and refunds. Fields we don't model are kept in `extra`
//! so a resource can be re-serialized without loss.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// HATEOAS link attached to every PayPal resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDescription {
    pub href: String,
    pub rel: String,
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".to_string()
}

/// Wire money type (`{"currency_code": "EUR", "value": "10.00"}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub currency_code: String,
    pub value: String,
}

/// Order lifecycle status, as reported by PayPal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Saved,
    Approved,
    Voided,
    Completed,
    PayerActionRequired,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Saved => "SAVED",
            OrderStatus::Approved => "APPROVED",
            OrderStatus::Voided => "VOIDED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::PayerActionRequired => "PAYER_ACTION_REQUIRED",
            OrderStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capture, authorization or refund
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResource {
    pub id: String,

    /// COMPLETED, PENDING, CREATED, CAPTURED, ... (depends on the kind)
    #[serde(default)]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_capture: Option<bool>,

    #[serde(default)]
    pub links: Vec<LinkDescription>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PaymentResource {
    pub fn link(&self, rel: &str) -> Option<&LinkDescription> {
        self.links.iter().find(|l| l.rel == rel)
    }
}

/// Payments made against a purchase unit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentCollection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captures: Vec<PaymentResource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorizations: Vec<PaymentResource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub refunds: Vec<PaymentResource>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseUnitResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payments: Option<PaymentCollection>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A Checkout V2 order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResource {
    pub id: String,

    pub status: OrderStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,

    #[serde(default)]
    pub purchase_units: Vec<PurchaseUnitResource>,

    #[serde(default)]
    pub links: Vec<LinkDescription>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OrderResource {
    /// Find a link by relation name
    pub fn link(&self, rel: &str) -> Option<&LinkDescription> {
        self.links.iter().find(|l| l.rel == rel)
    }

    /// URL to send the payer to for approval
    pub fn approve_url(&self) -> Option<&str> {
        self.link("approve")
            .or_else(|| self.link("payer-action"))
            .map(|l| l.href.as_str())
    }

    fn payments(&self) -> impl Iterator<Item = &PaymentCollection> {
        self.purchase_units
            .iter()
            .filter_map(|unit| unit.payments.as_ref())
    }

    /// Ids of every capture across all purchase units
    pub fn capture_ids(&self) -> Vec<&str> {
        self.payments()
            .flat_map(|p| p.captures.iter())
            .map(|c| c.id.as_str())
            .collect()
    }

    /// The authorization created by an authorize call
    pub fn first_authorization(&self) -> Option<&PaymentResource> {
        self.payments().flat_map(|p| p.authorizations.iter()).next()
    }
}

/// Response of an executed request: status, headers and the parsed body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status_code: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub result: T,
}

impl<T> ApiResponse<T> {
    pub fn new(status_code: u16, result: T) -> Self {
        Self {
            status_code,
            headers: HashMap::new(),
            result,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Header lookup, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
