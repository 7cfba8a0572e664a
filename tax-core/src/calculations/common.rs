//! Common utility functions for tax calculations.
//!
//! Rounding and clamping helpers shared by both regimes.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to the nearest whole unit.
///
/// Values exactly halfway between two units are rounded away from zero,
/// so 0.5 becomes 1.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_to_whole;
///
/// assert_eq!(round_to_whole(dec!(54600.49)), dec!(54600));
/// assert_eq!(round_to_whole(dec!(54600.50)), dec!(54601));
/// assert_eq!(round_to_whole(dec!(5200)), dec!(5200));
/// ```
pub fn round_to_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `value`, or zero when `value` is negative.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::floor_at_zero;
///
/// assert_eq!(floor_at_zero(dec!(100)), dec!(100));
/// assert_eq!(floor_at_zero(dec!(-100)), Decimal::ZERO);
/// ```
pub fn floor_at_zero(value: Decimal) -> Decimal {
    if value > Decimal::ZERO { value } else { Decimal::ZERO }
}
