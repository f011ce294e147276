//! Monetary amounts using decimal arithmetic.
//!
//! Prices are stored as `NUMERIC(12, 2)` and carried as [`rust_decimal::Decimal`]
//! so that line totals never pick up floating point error. The storefront
//! trades in a single currency, so no currency code travels with the amount.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when constructing a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// Amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// Amount has more than two decimal places.
    #[error("price cannot have more than {max} decimal places")]
    TooPrecise {
        /// Maximum number of decimal places.
        max: u32,
    },
    /// Amount does not fit in `NUMERIC(12, 2)`.
    #[error("price exceeds the maximum of {}", Price::MAX)]
    TooLarge,
    /// Input could not be parsed as a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A non-negative amount of money with at most two decimal places.
///
/// ```
/// use shopfront_core::Price;
///
/// let price = Price::parse("19.99").unwrap();
/// let line = price.checked_mul_qty(3).unwrap();
/// assert_eq!(line.to_string(), "$59.97");
/// assert!(Price::parse("-1").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Number of decimal places a price may carry.
    pub const SCALE: u32 = 2;

    /// Largest amount representable by the `NUMERIC(12, 2)` columns.
    pub const MAX: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

    /// Zero, at the same scale as every other price (`"0.00"` on the wire).
    pub const ZERO: Self = Self(Decimal::from_parts(0, 0, 0, false, Self::SCALE));

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] if the amount is negative, has more than two
    /// decimal places, or exceeds [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        let normalized = amount.normalize();
        if normalized.scale() > Self::SCALE {
            return Err(PriceError::TooPrecise { max: Self::SCALE });
        }
        if normalized > Self::MAX {
            return Err(PriceError::TooLarge);
        }
        let mut value = normalized;
        value.rescale(Self::SCALE);
        Ok(Self(value))
    }

    /// Parse a price from its decimal string form (e.g. `"12.50"`).
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Invalid`] for malformed input, otherwise the same
    /// errors as [`Price::new`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount: Decimal = s
            .trim()
            .parse()
            .map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }

    /// Create a price from an integer number of cents.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError`] if the amount is negative or too large.
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, Self::SCALE))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply a unit price by a quantity.
    ///
    /// Returns `None` for non-positive quantities or when the result exceeds
    /// [`Price::MAX`].
    #[must_use]
    pub fn checked_mul_qty(self, quantity: i32) -> Option<Self> {
        if quantity <= 0 {
            return None;
        }
        self.0
            .checked_mul(Decimal::from(quantity))
            .and_then(|amount| Self::new(amount).ok())
    }

    /// Multiply a unit price by a quantity, saturating at [`Price::MAX`].
    ///
    /// Non-positive quantities give zero.
    #[must_use]
    pub fn saturating_mul_qty(self, quantity: i32) -> Self {
        if quantity <= 0 {
            return Self::ZERO;
        }
        self.checked_mul_qty(quantity).unwrap_or(Self(Self::MAX))
    }

    /// Add two prices, returning `None` when the sum exceeds [`Price::MAX`].
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0
            .checked_add(other.0)
            .and_then(|amount| Self::new(amount).ok())
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

/// Sums saturate at [`Price::MAX`]. Use [`Price::checked_add`] where an
/// overflow must be reported.
impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, price| {
            acc.checked_add(price).unwrap_or(Self(Self::MAX))
        })
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_max_constant() {
        assert_eq!(Price::MAX.to_string(), "9999999999.99");
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(Price::parse("12.5").unwrap().to_string(), "$12.50");
        assert_eq!(Price::parse("0").unwrap().to_string(), "$0.00");
        assert_eq!(Price::parse("12.500").unwrap().to_string(), "$12.50");
    }

    #[test]
    fn test_rejections() {
        assert_eq!(Price::parse("-0.01"), Err(PriceError::Negative));
        assert_eq!(
            Price::parse("1.001"),
            Err(PriceError::TooPrecise { max: 2 })
        );
        assert_eq!(Price::parse("10000000000"), Err(PriceError::TooLarge));
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
    }

    #[test]
    fn test_from_cents() {
        assert_eq!(Price::from_cents(1999).unwrap(), Price::parse("19.99").unwrap());
        assert_eq!(Price::from_cents(-1), Err(PriceError::Negative));
    }

    #[test]
    fn test_arithmetic() {
        let unit = Price::parse("0.10").unwrap();
        assert_eq!(unit.checked_mul_qty(3).unwrap(), Price::parse("0.30").unwrap());
        assert!(unit.checked_mul_qty(0).is_none());
        assert!(unit.checked_mul_qty(-2).is_none());

        let sum = unit.checked_add(Price::parse("0.20").unwrap()).unwrap();
        assert_eq!(sum, Price::parse("0.30").unwrap());

        let max = Price::new(Price::MAX).unwrap();
        assert!(max.checked_add(Price::parse("0.01").unwrap()).is_none());
        assert!(max.checked_mul_qty(2).is_none());
    }

    #[test]
    fn test_saturating_mul_qty() {
        let unit = Price::parse("2.50").unwrap();
        assert_eq!(unit.saturating_mul_qty(4), Price::parse("10.00").unwrap());
        assert_eq!(unit.saturating_mul_qty(0), Price::ZERO);

        let yacht = Price::parse("9999999999.99").unwrap();
        assert_eq!(yacht.saturating_mul_qty(2).amount(), Price::MAX);
        assert_eq!(yacht.saturating_mul_qty(i32::MAX).amount(), Price::MAX);
    }

    #[test]
    fn test_sum() {
        let total: Price = ["1.10", "2.20", "3.30"]
            .into_iter()
            .map(|s| Price::parse(s).unwrap())
            .sum();
        assert_eq!(total, Price::parse("6.60").unwrap());

        let saturated: Price = [Price::new(Price::MAX).unwrap(), Price::parse("5").unwrap()]
            .into_iter()
            .sum();
        assert_eq!(saturated.amount(), Price::MAX);
    }

    #[test]
    fn test_serde() {
        let price = Price::parse("5.25").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"5.25\"");

        let from_number: Price = serde_json::from_str("5.25").unwrap();
        let from_string: Price = serde_json::from_str("\"5.25\"").unwrap();
        assert_eq!(from_number, price);
        assert_eq!(from_string, price);

        assert!(serde_json::from_str::<Price>("-3").is_err());
    }

    #[test]
    fn test_zero_keeps_scale() {
        assert_eq!(serde_json::to_string(&Price::ZERO).unwrap(), "\"0.00\"");
        assert_eq!(serde_json::to_string(&Price::default()).unwrap(), "\"0.00\"");
        assert_eq!(Price::ZERO, Price::parse("0").unwrap());

        let empty: Price = std::iter::empty().sum();
        assert_eq!(serde_json::to_string(&empty).unwrap(), "\"0.00\"");
    }
}
