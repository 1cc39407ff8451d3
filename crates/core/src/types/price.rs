//! Type-safe VND price representation using decimal arithmetic.
//!
//! The storefront sells in Vietnamese dong only. VND has no minor unit in
//! practice, so the amount is the whole-dong value and display rounds to 0
//! decimal places.

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// ISO 4217 code for every price in the storefront.
pub const CURRENCY_CODE: &str = "VND";

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
}

/// A non-negative VND amount.
///
/// Serializes as a plain JSON number (`50000`), which is how the backend and
/// the guest cart storage represent prices.
///
/// ```
/// use ayanavita_core::Price;
///
/// let price = Price::from_dong(50_000);
/// assert_eq!(price.times(2).display(), "100.000 ₫");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole-dong amount.
    #[must_use]
    pub fn from_dong(dong: u64) -> Self {
        Self(Decimal::from(dong))
    }

    /// The zero price.
    #[must_use]
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units at this price.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display, e.g. `130.000 ₫`.
    #[must_use]
    pub fn display(&self) -> String {
        let whole = self.0.round_dp(0).trunc().normalize().abs().to_string();
        format!("{} ₫", group_thousands(&whole))
    }
}

/// Insert `.` between every group of three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.fract().is_zero()
            && let Some(whole) = self.0.to_i64()
        {
            return serializer.serialize_i64(whole);
        }
        match self.0.to_f64() {
            Some(value) => serializer.serialize_f64(value),
            None => serializer.serialize_str(&self.0.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::from_dong(0).display(), "0 ₫");
        assert_eq!(Price::from_dong(999).display(), "999 ₫");
        assert_eq!(Price::from_dong(130_000).display(), "130.000 ₫");
        assert_eq!(Price::from_dong(1_250_000).display(), "1.250.000 ₫");
    }

    #[test]
    fn test_display_rounds_fractional_dong() {
        let price = Price::new(Decimal::new(4_999_95, 1)).unwrap();
        assert_eq!(price.display(), "50.000 ₫");
    }

    #[test]
    fn test_negative_price_rejected() {
        let err = Price::new(Decimal::new(-1, 0)).unwrap_err();
        assert_eq!(err, PriceError::Negative(Decimal::new(-1, 0)));
    }

    #[test]
    fn test_sum_and_times() {
        let total: Price = [Price::from_dong(50_000).times(2), Price::from_dong(30_000)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_dong(130_000));
    }

    #[test]
    fn test_serializes_as_number() {
        assert_eq!(
            serde_json::to_string(&Price::from_dong(50_000)).unwrap(),
            "50000"
        );
        let price: Price = serde_json::from_str("30000").unwrap();
        assert_eq!(price, Price::from_dong(30_000));
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        assert!(serde_json::from_str::<Price>("-5").is_err());
    }
}
