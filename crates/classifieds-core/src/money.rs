//! Money type for listing prices.
//!
//! Uses cents-based integer representation so that a price typed as text
//! round-trips exactly, even though the listings table stores a decimal.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    CAD,
    USD,
    EUR,
    GBP,
    JPY,
}

impl Currency {
    /// Get the currency code (e.g., "CAD").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::CAD => "CAD",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
        }
    }

    /// Get the currency symbol (e.g., "CA$").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::CAD => "CA$",
            Currency::USD => "$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "CAD" => Some(Currency::CAD),
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Reasons a price string is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price is required")]
    Empty,
    #[error("price must be a number")]
    NotANumber,
    #[error("price must be greater than zero")]
    NotPositive,
    #[error("price is too large")]
    TooLarge,
}

/// Largest amount in minor units that survives conversion to `f64` exactly.
pub const MAX_AMOUNT_CENTS: i64 = (1 << 53) - 1;

/// A monetary value with currency.
///
/// Amounts are stored in the smallest unit of the currency (e.g., cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit (e.g., cents).
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from cents.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a Money value from a decimal amount.
    ///
    /// ```
    /// use classifieds_core::money::{Money, Currency};
    /// let price = Money::from_decimal(49.99, Currency::CAD);
    /// assert_eq!(price.amount_cents, 4999);
    /// ```
    pub fn from_decimal(amount: f64, currency: Currency) -> Self {
        let multiplier = 10_i64.pow(currency.decimal_places());
        let amount_cents = (amount * multiplier as f64).round() as i64;
        Self::new(amount_cents, currency)
    }

    /// Parse a user-entered price.
    ///
    /// Accepts plain decimals such as `600`, `600.5` or ` 19.99 `. The
    /// result must be positive once rounded to the currency's precision and
    /// at most [`MAX_AMOUNT_CENTS`] minor units.
    pub fn parse(text: &str, currency: Currency) -> Result<Self, PriceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PriceError::Empty);
        }
        let amount: f64 = text.parse().map_err(|_| PriceError::NotANumber)?;
        if !amount.is_finite() {
            return Err(PriceError::NotANumber);
        }
        let multiplier = 10_i64.pow(currency.decimal_places()) as f64;
        if (amount * multiplier).round() > MAX_AMOUNT_CENTS as f64 {
            return Err(PriceError::TooLarge);
        }
        let money = Self::from_decimal(amount, currency);
        if !money.is_positive() {
            return Err(PriceError::NotPositive);
        }
        Ok(money)
    }

    /// Check if this is positive.
    pub fn is_positive(&self) -> bool {
        self.amount_cents > 0
    }

    /// Convert to a decimal value.
    pub fn to_decimal(&self) -> f64 {
        let divisor = 10_i64.pow(self.currency.decimal_places());
        self.amount_cents as f64 / divisor as f64
    }

    /// Format as a display string (e.g., "CA$49.99").
    pub fn display(&self) -> String {
        format!("{}{}", self.currency.symbol(), self.display_amount())
    }

    /// Format as a display string without symbol (e.g., "49.99").
    pub fn display_amount(&self) -> String {
        let decimal = self.to_decimal();
        let places = self.currency.decimal_places() as usize;
        format!("{:.places$}", decimal)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}
