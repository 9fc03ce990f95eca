//! Type-safe price representation using decimal arithmetic.
//!
//! The catalog quotes every price in US dollars, so [`CurrencyCode`] only
//! matters for display. Amounts are never stored as floating point; the
//! [`Decimal`] is converted to a JSON number only at the wire boundary.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A monetary amount with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price in the store's default currency.
    #[must_use]
    pub fn usd(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::USD)
    }

    /// The amount rounded half-up to whole cents.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded();
        if rounded.is_sign_negative() && !rounded.is_zero() {
            write!(f, "-{}{:.2}", self.currency_code.symbol(), rounded.abs())
        } else {
            write!(f, "{}{:.2}", self.currency_code.symbol(), rounded.abs())
        }
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::usd(Decimal::new(10995, 2)).to_string(), "$109.95");
        assert_eq!(Price::usd(Decimal::from(10)).to_string(), "$10.00");
        assert_eq!(Price::usd(Decimal::ZERO).to_string(), "$0.00");
    }

    #[test]
    fn test_display_rounds_half_up() {
        // 8% of 109.95
        assert_eq!(Price::usd(Decimal::new(87960, 4)).to_string(), "$8.80");
        assert_eq!(Price::usd(Decimal::new(1005, 3)).to_string(), "$1.01");
    }

    #[test]
    fn test_display_other_currency() {
        let price = Price::new(Decimal::new(550, 2), CurrencyCode::GBP);
        assert_eq!(price.to_string(), "£5.50");
    }
}
