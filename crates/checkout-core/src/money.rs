//! # Money Types
//!
//! Currencies and prices for checkout orders.
//! All arithmetic happens in minor units (cents) so totals are exact.

use crate::error::{PaymentError, PaymentResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CAD,
    AUD,
    CHF,
    MXN,
}

impl Currency {
    /// Returns the ISO 4217 currency code, as PayPal expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::MXN => "MXN",
        }
    }

    /// Returns the number of decimal places for this currency
    /// (JPY has 0 decimals, the others have 2)
    pub fn decimal_places(&self) -> u8 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places() as u32)
    }

    /// Convert a decimal amount to the smallest currency unit (cents, etc.)
    ///
    /// Rounds half away from zero on the shortest decimal form of `amount`,
    /// so `1.005` becomes 101 cents even though the float sits just below it.
    pub fn to_smallest_unit(&self, amount: f64) -> PaymentResult<i64> {
        let decimal = Decimal::from_str(&amount.to_string())
            .map_err(|_| PaymentError::invalid_price(format!("{} is not a valid amount", amount)))?;
        decimal
            .round_dp_with_strategy(
                self.decimal_places() as u32,
                RoundingStrategy::MidpointAwayFromZero,
            )
            .checked_mul(Decimal::from(self.minor_per_major()))
            .and_then(|minor| minor.to_i64())
            .ok_or_else(|| PaymentError::invalid_price(format!("{} is out of range", amount)))
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::USD
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "CAD" => Ok(Currency::CAD),
            "AUD" => Ok(Currency::AUD),
            "CHF" => Ok(Currency::CHF),
            "MXN" => Ok(Currency::MXN),
            other => Err(PaymentError::UnsupportedCurrency {
                currency: other.to_string(),
            }),
        }
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (cents for USD)
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Price {
    /// Create a new price from a decimal amount, rounded to minor units.
    /// Amounts that cannot be represented saturate; use [`Price::parse`]
    /// for untrusted input.
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self::parse(amount, currency).unwrap_or_else(|_| {
            let multiplier = currency.minor_per_major() as f64;
            Self::from_minor((amount * multiplier).round() as i64, currency)
        })
    }

    /// Create a price from a decimal amount, rejecting NaN, infinities
    /// and amounts beyond the minor-unit range
    pub fn parse(amount: f64, currency: Currency) -> PaymentResult<Self> {
        Ok(Self {
            amount: currency.to_smallest_unit(amount)?,
            currency,
        })
    }

    /// Create a price from smallest unit (cents)
    pub fn from_minor(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    pub fn zero(currency: Currency) -> Self {
        Self::from_minor(0, currency)
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    pub fn checked_add(&self, other: &Price) -> PaymentResult<Price> {
        self.ensure_same_currency(other)?;
        self.amount
            .checked_add(other.amount)
            .map(|amount| Price::from_minor(amount, self.currency))
            .ok_or_else(|| PaymentError::invalid_price("amount overflow"))
    }

    pub fn checked_sub(&self, other: &Price) -> PaymentResult<Price> {
        self.ensure_same_currency(other)?;
        self.amount
            .checked_sub(other.amount)
            .map(|amount| Price::from_minor(amount, self.currency))
            .ok_or_else(|| PaymentError::invalid_price("amount overflow"))
    }

    /// Multiply by a quantity
    pub fn times(&self, quantity: u32) -> PaymentResult<Price> {
        self.amount
            .checked_mul(quantity as i64)
            .map(|amount| Price::from_minor(amount, self.currency))
            .ok_or_else(|| PaymentError::invalid_price("amount overflow"))
    }

    fn ensure_same_currency(&self, other: &Price) -> PaymentResult<()> {
        if self.currency != other.currency {
            return Err(PaymentError::UnsupportedCurrency {
                currency: format!("{} mixed with {}", other.currency, self.currency),
            });
        }
        Ok(())
    }

    /// PayPal `value` field: fixed fraction digits, `.` separator,
    /// no thousands grouping (e.g. "1234.50", "500" for JPY)
    pub fn value_string(&self) -> String {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        let places = self.currency.decimal_places() as usize;
        if places == 0 {
            return format!("{}{}", sign, abs);
        }
        let per_major = self.currency.minor_per_major() as u64;
        format!(
            "{}{}.{:0width$}",
            sign,
            abs / per_major,
            abs % per_major,
            width = places
        )
    }

    /// Format for display (e.g., "$10.00")
    pub fn display(&self) -> String {
        let symbol = match self.currency {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::CAD => "C$",
            Currency::AUD => "A$",
            Currency::CHF => "CHF ",
            Currency::MXN => "MX$",
        };
        format!("{}{}", symbol, self.value_string())
    }
}
