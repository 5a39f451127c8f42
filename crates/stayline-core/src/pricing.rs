//! # Stay Pricing
//!
//! Pure price calculation for a room-type stay.
//!
//! ## Contract
//! ```text
//! (check_in, check_out, nightly rate) ──► nights × rate, in integer cents
//!
//! nights = check_out − check_in, in whole days
//! nights < 1 ──► InvalidDateRange (never coerced to a one-night stay)
//! ```
//!
//! No I/O, deterministic, safe to unit-test exhaustively over date and
//! price combinations including leap-year boundaries.

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// Returns the number of nights between check-in and check-out.
///
/// ## Errors
/// `InvalidDateRange` when check-out is not strictly after check-in.
/// Same-day and inverted ranges are rejected at the boundary.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use stayline_core::pricing::nights;
///
/// let check_in = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// let check_out = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
/// assert_eq!(nights(check_in, check_out).unwrap(), 3);
/// ```
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> CoreResult<i64> {
    let nights = (check_out - check_in).num_days();
    if nights < 1 {
        return Err(CoreError::InvalidDateRange {
            check_in,
            check_out,
        });
    }
    Ok(nights)
}

/// Prices a stay: nightly rate × nights.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use stayline_core::money::Money;
/// use stayline_core::pricing::stay_price;
///
/// let check_in = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// let check_out = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
/// let price = stay_price(check_in, check_out, Money::from_cents(10000)).unwrap();
/// assert_eq!(price.cents(), 30000); // 3 nights at $100.00
/// ```
pub fn stay_price(
    check_in: NaiveDate,
    check_out: NaiveDate,
    nightly_rate: Money,
) -> CoreResult<Money> {
    let nights = nights(check_in, check_out)?;
    Ok(nightly_rate.multiply_nights(nights))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_nights_basic() {
        assert_eq!(nights(date(2025, 6, 1), date(2025, 6, 4)).unwrap(), 3);
        assert_eq!(nights(date(2025, 6, 1), date(2025, 6, 2)).unwrap(), 1);
    }

    #[test]
    fn test_nights_across_month_boundary() {
        assert_eq!(nights(date(2025, 1, 30), date(2025, 2, 2)).unwrap(), 3);
    }

    #[test]
    fn test_nights_leap_year() {
        // 2024 is a leap year: Feb 28 → Mar 1 spans Feb 29
        assert_eq!(nights(date(2024, 2, 28), date(2024, 3, 1)).unwrap(), 2);
        // 2025 is not: the same calendar span is one night shorter
        assert_eq!(nights(date(2025, 2, 28), date(2025, 3, 1)).unwrap(), 1);
        // Staying over the leap day itself
        assert_eq!(nights(date(2024, 2, 29), date(2024, 3, 1)).unwrap(), 1);
    }

    #[test]
    fn test_same_day_rejected() {
        let err = nights(date(2025, 6, 1), date(2025, 6, 1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = nights(date(2025, 6, 4), date(2025, 6, 1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_stay_price_scenario() {
        // The reference scenario: 2025-06-01 → 2025-06-04 at $100.00/night
        let price =
            stay_price(date(2025, 6, 1), date(2025, 6, 4), Money::from_cents(10000)).unwrap();
        assert_eq!(price.cents(), 30000);
    }

    #[test]
    fn test_stay_price_zero_rate() {
        // A zero nightly rate is a legal price (complimentary room type)
        let price = stay_price(date(2025, 6, 1), date(2025, 6, 3), Money::zero()).unwrap();
        assert!(price.is_zero());
    }

    #[test]
    fn test_stay_price_exact_cents() {
        // 3 nights at $99.99 is exactly $299.97, no drift
        let price =
            stay_price(date(2025, 6, 1), date(2025, 6, 4), Money::from_cents(9999)).unwrap();
        assert_eq!(price.cents(), 29997);
    }

    #[test]
    fn test_stay_price_rejects_invalid_range() {
        let err = stay_price(date(2025, 6, 4), date(2025, 6, 4), Money::from_cents(10000))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidDateRange { check_in, check_out }
                if check_in == date(2025, 6, 4) && check_out == date(2025, 6, 4)
        ));
    }
}
