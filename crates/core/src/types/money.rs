//! Integer minor-unit money representation.
//!
//! All money-bearing fields hold an amount in cents (`i64`). Decimal strings
//! only appear at the boundaries: parsing admin input ("25.00" -> 2500) and
//! rendering API responses (2500 -> "25.00"). Arithmetic on cents is exact;
//! there is no floating point anywhere on a money path.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors from parsing a decimal money string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyParseError {
    #[error("not a valid decimal amount: {0}")]
    InvalidDecimal(String),
    #[error("amount has more than two decimal places: {0}")]
    TooPrecise(String),
    #[error("amount is negative: {0}")]
    Negative(String),
    #[error("amount out of range: {0}")]
    OutOfRange(String),
}

/// A non-negative monetary amount in cents.
///
/// Serializes as a fixed two-decimal string ("50.00") to match the API
/// response shape; deserializes from either a decimal string or a bare
/// number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    /// Create from a cent amount.
    #[must_use]
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount in cents (the payment provider's smallest currency unit).
    #[must_use]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Parse a decimal string like "25.00" or "9.5" into cents.
    ///
    /// # Errors
    ///
    /// Rejects non-decimal input, negative amounts, more than two decimal
    /// places, and amounts that overflow the cent range.
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let decimal: Decimal = s
            .trim()
            .parse()
            .map_err(|_| MoneyParseError::InvalidDecimal(s.to_string()))?;

        if decimal.is_sign_negative() {
            return Err(MoneyParseError::Negative(s.to_string()));
        }
        if decimal.scale() > 2 && decimal.normalize().scale() > 2 {
            return Err(MoneyParseError::TooPrecise(s.to_string()));
        }

        let cents = (decimal * Decimal::from(100))
            .normalize()
            .to_i64()
            .ok_or_else(|| MoneyParseError::OutOfRange(s.to_string()))?;

        Ok(Self(cents))
    }

    /// Multiply by a line-item quantity.
    #[must_use]
    pub const fn times(&self, quantity: i64) -> Self {
        Self(self.0 * quantity)
    }

    /// Saturating addition, for summing cart totals.
    #[must_use]
    pub const fn plus(&self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl std::fmt::Display for Money {
    /// Renders with exactly two decimal places, e.g. "50.00". Amounts on
    /// money paths are non-negative, but a raw `from_cents` value still
    /// formats sign-correctly.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(f64),
        }

        let raw = Raw::deserialize(deserializer)?;
        let text = match raw {
            Raw::Text(s) => s,
            // Admin forms occasionally send a bare JSON number; format it
            // to two decimals before the exact decimal parse.
            Raw::Number(n) => format!("{n:.2}"),
        };
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_decimal_string() {
        assert_eq!(Money::parse("25.00").unwrap(), Money::from_cents(2500));
        assert_eq!(Money::parse("0.99").unwrap(), Money::from_cents(99));
        assert_eq!(Money::parse("9.5").unwrap(), Money::from_cents(950));
        assert_eq!(Money::parse("120").unwrap(), Money::from_cents(12000));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            Money::parse("abc"),
            Err(MoneyParseError::InvalidDecimal(_))
        ));
        assert!(matches!(
            Money::parse("-1.00"),
            Err(MoneyParseError::Negative(_))
        ));
        assert!(matches!(
            Money::parse("1.005"),
            Err(MoneyParseError::TooPrecise(_))
        ));
    }

    #[test]
    fn trailing_zero_scale_is_accepted() {
        // "25.000" normalizes to scale 0, not an over-precise amount
        assert_eq!(Money::parse("25.000").unwrap(), Money::from_cents(2500));
    }

    #[test]
    fn displays_with_exactly_two_decimals() {
        assert_eq!(Money::from_cents(5000).to_string(), "50.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(950).to_string(), "9.50");
    }

    #[test]
    fn raw_negative_cents_keep_their_sign() {
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::from_cents(-2500).to_string(), "-25.00");
        assert!(Money::from_cents(i64::MIN).to_string().starts_with('-'));
    }

    #[test]
    fn line_total_arithmetic_is_exact() {
        // 3 * 19.99 = 59.97, a classic float-drift case
        let price = Money::parse("19.99").unwrap();
        assert_eq!(price.times(3).to_string(), "59.97");
        assert_eq!(
            price.times(2).plus(Money::parse("10.01").unwrap()),
            Money::from_cents(4999)
        );
    }

    #[test]
    fn serializes_as_two_decimal_string() {
        let json = serde_json::to_string(&Money::from_cents(2500)).unwrap();
        assert_eq!(json, "\"25.00\"");
    }

    #[test]
    fn deserializes_from_string_or_number() {
        let from_str: Money = serde_json::from_str("\"25.00\"").unwrap();
        let from_num: Money = serde_json::from_str("25").unwrap();
        assert_eq!(from_str, from_num);
    }
}
