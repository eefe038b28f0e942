//! # Money Module
//!
//! Provides the `Money` type for prices, revenue and commission.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  750.0 * (1 - 15/100)  = 637.5       (fine)                            │
//! │  0.1 + 0.2             = 0.30000000000000004                           │
//! │                                                                         │
//! │  Summing a quarter of discounted sales in f64 drifts, and the final    │
//! │  2-decimal rounding then depends on the order the sales were read.     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + exact scaled sums                       │
//! │    price (cents) × (10000 − discount bps)      → exact, 1/10000 cent   │
//! │    ... × commission bps                         → exact, 1/10^8 cent   │
//! │    one rounding step at the very end                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bespoke_core::money::Money;
//!
//! let price = Money::from_cents(75_000); // $750.00
//! let two: Money = price * 2;
//! assert_eq!(two.cents(), 150_000);
//! assert_eq!(price.to_string(), "$750.00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: arithmetic stays closed under subtraction even though
///   every stored price is non-negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as cents**: `{"sale_price": 75000}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ```rust
    /// use bespoke_core::money::Money;
    ///
    /// let price = Money::from_cents(63_750); // $637.50
    /// assert_eq!(price.cents(), 63_750);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from dollars and cents.
    ///
    /// ```rust
    /// use bespoke_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(750, 0).cents(), 75_000);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    ///
    /// For negative amounts, only the major unit should be negative.
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

    /// Returns the whole-dollar portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Rounds an exact scaled amount to whole cents, half-up.
    ///
    /// `scaled` is expressed in units of `1 / scale` cent. Used once per
    /// report total so that intermediate sums never lose precision.
    ///
    /// ```rust
    /// use bespoke_core::money::Money;
    ///
    /// // 12.345 cents at scale 1000 → 12 cents; 12.5 cents → 13 cents
    /// assert_eq!(Money::round_scaled(12_345, 1_000).cents(), 12);
    /// assert_eq!(Money::round_scaled(12_500, 1_000).cents(), 13);
    /// ```
    pub fn round_scaled(scaled: i128, scale: i128) -> Money {
        debug_assert!(scale > 0);
        let half = scale / 2;
        let rounded = if scaled >= 0 {
            (scaled + half) / scale
        } else {
            -((-scaled + half) / scale)
        };
        Money(rounded as i64)
    }

    /// Formats the value as a plain decimal string without the currency sign.
    ///
    /// ```rust
    /// use bespoke_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(6_375).to_decimal_string(), "63.75");
    /// ```
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$637.50`. For logs and the CLI table only.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
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
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
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
        let money = Money::from_cents(63_750);
        assert_eq!(money.cents(), 63_750);
        assert_eq!(money.dollars(), 637);
        assert_eq!(money.cents_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(63_750)), "$637.50");
        assert_eq!(format!("{}", Money::from_cents(6_375)), "$63.75");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_round_scaled_half_up() {
        assert_eq!(Money::round_scaled(49, 100).cents(), 0);
        assert_eq!(Money::round_scaled(50, 100).cents(), 1);
        assert_eq!(Money::round_scaled(150, 100).cents(), 2);
        assert_eq!(Money::round_scaled(250, 100).cents(), 3);
        assert_eq!(Money::round_scaled(-250, 100).cents(), -3);
        assert_eq!(Money::round_scaled(637_500_000, 10_000).cents(), 63_750);
    }

    #[test]
    fn test_serializes_as_cents() {
        let json = serde_json::to_string(&Money::from_cents(63_750)).unwrap();
        assert_eq!(json, "63750");
    }
}
