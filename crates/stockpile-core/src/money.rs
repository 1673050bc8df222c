//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The REST API sends amounts as JSON numbers in major units:             │
//! │                                                                         │
//! │      { "totalAmount": 1049.95 }                                         │
//! │                                                                         │
//! │  Summing thousands of those as f64 drifts. We round ONCE on the way in  │
//! │  (to minor units) and do every sum, difference and comparison on i64.  │
//! │                                                                         │
//! │      wire f64 ──► Money(104995) ──► sums/diffs ──► wire f64 / display   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockpile_core::money::Money;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let line = price.multiply_quantity(3);
//! assert_eq!(line.cents(), 3297);
//!
//! // Wire amounts are parsed once, with rounding.
//! assert_eq!(Money::from_major(10.99).cents(), 1099);
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paisa, cents).
///
/// ## Wire Format
/// Serializes to and from a JSON number in MAJOR units (`12.5` ⇄ `Money(1250)`),
/// because that is what the backend speaks. Numeric strings (`"12.50"`) are
/// accepted on input as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from an amount in major units.
    ///
    /// Rounds half away from zero to the nearest cent. Non-finite input maps
    /// to zero.
    ///
    /// ## Example
    /// ```rust
    /// use stockpile_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(1000.0).cents(), 100000);
    /// assert_eq!(Money::from_major(-5.5).cents(), -550);
    /// assert_eq!(Money::from_major(f64::NAN).cents(), 0);
    /// ```
    pub fn from_major(amount: f64) -> Self {
        if !amount.is_finite() {
            return Money::zero();
        }
        Money((amount * 100.0).round() as i64)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -5.50, not -4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion, truncated toward zero.
    #[inline]
    pub const fn major_part(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value in major units as a float (for wire and spreadsheet output only).
    #[inline]
    pub fn as_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use stockpile_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    ///
    /// Saturates at the `i64` bounds; quantities come from the server.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Scales the amount by a ratio, rounding to the nearest cent.
    ///
    /// Used only for the named estimates in [`crate::metrics`]; exact
    /// arithmetic never goes through floats.
    pub fn scale(&self, ratio: f64) -> Money {
        Money::from_cents((self.0 as f64 * ratio).round() as i64)
    }

    /// Divides the amount evenly, rounding to the nearest cent.
    ///
    /// Returns zero for a zero divisor instead of panicking.
    pub fn divide_rounded(&self, divisor: i64) -> Money {
        if divisor == 0 {
            return Money::zero();
        }
        Money::from_cents((self.0 as f64 / divisor as f64).round() as i64)
    }

    /// Returns `self / other × 100`, or `0.0` when `other` is zero.
    pub fn percent_of(&self, other: Money) -> f64 {
        if other.is_zero() {
            return 0.0;
        }
        self.0 as f64 / other.0 as f64 * 100.0
    }

    /// Formats the amount with a currency code and thousands separators.
    ///
    /// ## Example
    /// ```rust
    /// use stockpile_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(123456789).display_with("PKR"), "PKR 1,234,567.89");
    /// assert_eq!(Money::from_cents(-550).display_with("PKR"), "-PKR 5.50");
    /// ```
    pub fn display_with(&self, currency: &str) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!(
            "{}{} {}.{:02}",
            sign,
            currency,
            group_thousands(self.major_part().unsigned_abs()),
            self.cents_part()
        )
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering without currency, e.g. `1049.95`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major_part().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Serde (major units on the wire)
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MajorUnits;

        impl<'de> Visitor<'de> for MajorUnits {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an amount in major currency units")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                Ok(Money::from_major(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                Ok(Money::from_cents(v.saturating_mul(100)))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                let v = i64::try_from(v).map_err(|_| E::custom("amount out of range"))?;
                self.visit_i64(v)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    return Ok(Money::zero());
                }
                trimmed
                    .parse::<f64>()
                    .map(Money::from_major)
                    .map_err(|_| E::custom(format!("invalid amount '{}'", v)))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Money, E> {
                Ok(Money::zero())
            }
        }

        deserializer.deserialize_any(MajorUnits)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major_part(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_rounds_once() {
        assert_eq!(Money::from_major(0.1 + 0.2).cents(), 30);
        assert_eq!(Money::from_major(12.5).cents(), 1250);
        assert_eq!(Money::from_major(-0.125).cents(), -13);
        assert_eq!(Money::from_major(f64::INFINITY).cents(), 0);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
        assert_eq!(Money::from_cents(100000).display_with("PKR"), "PKR 1,000.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);
        assert_eq!((-a).cents(), -1000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_oversized_quantities_saturate() {
        let price = Money::from_cents(1_000_000);
        assert_eq!(price.multiply_quantity(i64::MAX).cents(), i64::MAX);
        assert_eq!(price.multiply_quantity(i64::MIN).cents(), i64::MIN);
        assert_eq!((price * i64::MAX + price).cents(), i64::MAX);

        let total: Money = [Money::from_cents(i64::MAX), Money::from_cents(1)].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
    }

    #[test]
    fn test_guarded_division() {
        assert_eq!(Money::from_cents(1000).divide_rounded(3).cents(), 333);
        assert_eq!(Money::from_cents(1000).divide_rounded(0), Money::zero());
        assert_eq!(Money::from_cents(600).percent_of(Money::zero()), 0.0);
        assert!((Money::from_cents(600).percent_of(Money::from_cents(1000)) - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_scale_rounds_to_cent() {
        assert_eq!(Money::from_cents(1001).scale(0.18).cents(), 180);
        assert_eq!(Money::from_cents(-1000).scale(0.5).cents(), -500);
    }

    #[test]
    fn test_serde_major_units() {
        let m: Money = serde_json::from_str("1049.95").unwrap();
        assert_eq!(m.cents(), 104995);

        let m: Money = serde_json::from_str("250").unwrap();
        assert_eq!(m.cents(), 25000);

        let m: Money = serde_json::from_str("\"12.50\"").unwrap();
        assert_eq!(m.cents(), 1250);

        let m: Money = serde_json::from_str("null").unwrap();
        assert!(m.is_zero());

        assert!(serde_json::from_str::<Money>("\"abc\"").is_err());
        assert_eq!(serde_json::to_string(&Money::from_cents(1250)).unwrap(), "12.5");
    }
}
