//! Currency-agnostic price representation using decimal arithmetic.
//!
//! The storefront never knows which currency the backend prices in; it only
//! multiplies and sums. `f64` would drift on sums like `0.1 + 0.2`, so amounts
//! are carried as [`Decimal`].

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A monetary amount without a currency.
///
/// Deserializes from either a JSON number (`500`, `499.5`) or a numeric string
/// (`"500.00"`, as Postgres `NUMERIC` columns are often rendered). Serializes
/// as a JSON number, which is what the backend's order and product endpoints
/// expect.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

impl Price {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of currency units.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    /// Two decimal places, no currency symbol.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0.round_dp(2))
    }
}

impl core::str::FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<Decimal>().map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_number_and_string() {
        let from_number: Price = serde_json::from_str("500").unwrap();
        let from_string: Price = serde_json::from_str("\"500.00\"").unwrap();
        assert_eq!(from_number, Price::from_units(500));
        assert_eq!(from_number, from_string);

        let fractional: Price = serde_json::from_str("499.99").unwrap();
        assert_eq!(fractional.to_string(), "499.99");
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_value(Price::from_units(1000)).unwrap();
        assert!(json.is_number());
        assert_eq!(json.as_f64(), Some(1000.0));
    }

    #[test]
    fn test_times_and_sum() {
        let unit: Price = "0.10".parse().unwrap();
        let total: Price = [unit.times(1), unit.times(2)].into_iter().sum();
        assert_eq!(total, "0.30".parse().unwrap());
        assert_eq!(Price::from_units(500).times(2), Price::from_units(1000));
    }

    #[test]
    fn test_display_two_places() {
        assert_eq!(Price::from_units(1000).to_string(), "1000.00");
        assert_eq!(Price::ZERO.to_string(), "0.00");
        assert!(Price::ZERO.is_zero());
    }
}
