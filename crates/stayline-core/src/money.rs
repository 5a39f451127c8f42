//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A three-night stay at $99.99 repriced a few times drifts by cents.     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    9999 cents × 3 nights = 29997 cents, exactly, every time            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every monetary value in the system flows through this type: nightly rates,
//! item prices, invoice totals, tax amounts, payment amounts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: room to represent corrections without a separate type
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use stayline_core::money::Money;
    ///
    /// let rate = Money::from_cents(10000); // Represents $100.00
    /// assert_eq!(rate.cents(), 10000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use stayline_core::money::Money;
    ///
    /// let rate = Money::from_major_minor(100, 50); // $100.50
    /// assert_eq!(rate.cents(), 10050);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax for this amount, rounding half up to the minor unit.
    ///
    /// ## Implementation
    /// Integer math in i128: `(amount_cents * bps + 5000) / 10000`.
    /// The +5000 term rounds the half-cent boundary up, so repeated
    /// derivations of the same invoice can never drift by a cent.
    ///
    /// ## Example
    /// ```rust
    /// use stayline_core::money::Money;
    /// use stayline_core::types::TaxRate;
    ///
    /// let total = Money::from_cents(30000); // $300.00
    /// let rate = TaxRate::from_bps(1500);   // 15%
    ///
    /// let tax = total.calculate_tax(rate);
    /// assert_eq!(tax.cents(), 4500); // $45.00
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 prevents overflow on large amounts
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a night count.
    ///
    /// ## Example
    /// ```rust
    /// use stayline_core::money::Money;
    ///
    /// let nightly = Money::from_cents(10000); // $100.00
    /// let stay = nightly.multiply_nights(3);
    /// assert_eq!(stay.cents(), 30000); // $300.00
    /// ```
    #[inline]
    pub const fn multiply_nights(&self, nights: i64) -> Self {
        Money(self.0 * nights)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// This is for debugging and logs; presentation layers format for locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

/// Default money is zero.
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

/// Multiplication by i64 (for night counts).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, n: i64) -> Self {
        Money(self.0 * n)
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
        let money = Money::from_cents(10099);
        assert_eq!(money.cents(), 10099);
        assert_eq!(money.major(), 100);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(100, 0);
        assert_eq!(money.cents(), 10000);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(10099)), "100.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_tax_calculation_policy_rate() {
        // $300.00 at 15% = $45.00 exactly
        let amount = Money::from_cents(30000);
        let rate = TaxRate::from_bps(1500);
        let tax = amount.calculate_tax(rate);
        assert_eq!(tax.cents(), 4500);
    }

    #[test]
    fn test_tax_calculation_rounds_half_up() {
        // $0.03 at 15% = 0.45 cents → rounds to 0 cents
        assert_eq!(
            Money::from_cents(3).calculate_tax(TaxRate::from_bps(1500)).cents(),
            0
        );
        // $0.10 at 15% = 1.5 cents → rounds up to 2 cents
        assert_eq!(
            Money::from_cents(10).calculate_tax(TaxRate::from_bps(1500)).cents(),
            2
        );
        // $10.00 at 8.25% = 82.5 cents → rounds up to 83 cents
        assert_eq!(
            Money::from_cents(1000).calculate_tax(TaxRate::from_bps(825)).cents(),
            83
        );
    }

    #[test]
    fn test_multiply_nights() {
        let nightly = Money::from_cents(9999);
        let stay = nightly.multiply_nights(3);
        assert_eq!(stay.cents(), 29997);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
    }
}
