//! # Money Module
//!
//! Rounding rules for monetary values.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                         │
//! │                                                                     │
//! │  In f64 arithmetic:                                                 │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                       │
//! │                                                                     │
//! │  OUR SOLUTION: rust_decimal::Decimal                                │
//! │    28.00 × 2 × 1.16 = 64.96, exactly                                │
//! │                                                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Where rounding happens
//!
//! Line totals are stored **unrounded**. Only document-level aggregates
//! (subtotal, tax total) are rounded to two decimal places, so per-line
//! rounding drift never accumulates into the stored total. This mirrors
//! the accounting behavior of the system this core settles against and
//! must not be "fixed" per line.
//!
//! Rounding is half-to-even (banker's rounding), which avoids the
//! systematic upward bias of always rounding 0.5 away from zero.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept on monetary aggregates.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a monetary aggregate to two decimal places, half to even.
///
/// ## Example
/// ```rust
/// use botica_core::money::round_money;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_money(dec!(8.965)), dec!(8.96)); // half to even
/// assert_eq!(round_money(dec!(8.975)), dec!(8.98));
/// assert_eq!(round_money(dec!(8.9612)), dec!(8.96));
/// ```
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_money_truncates_to_two_places() {
        assert_eq!(round_money(dec!(10.994)), dec!(10.99));
        assert_eq!(round_money(dec!(10.996)), dec!(11.00));
    }

    #[test]
    fn test_round_money_half_to_even() {
        // .5 at the third place rounds to the nearest even cent
        assert_eq!(round_money(dec!(0.125)), dec!(0.12));
        assert_eq!(round_money(dec!(0.135)), dec!(0.14));
        assert_eq!(round_money(dec!(-0.125)), dec!(-0.12));
    }

    #[test]
    fn test_round_money_exact_values_unchanged() {
        assert_eq!(round_money(dec!(56.00)), dec!(56.00));
        assert_eq!(round_money(dec!(0)), dec!(0));
    }
}
