//! Rounding and comparison helpers shared by the calculators.
//!
//! Calculations run on exact decimals; rounding to cents only happens when a
//! result is prepared for display.

use rust_decimal::Decimal;

/// Rounds a monetary value to cents, resolving midpoints away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use forfait_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(5087.4525)), dec!(5087.45));
/// assert_eq!(round_half_up(dec!(34745.2475)), dec!(34745.25));
/// assert_eq!(round_half_up(dec!(-0.005)), dec!(-0.01));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the larger of two values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use forfait_core::calculations::common::max;
///
/// assert_eq!(max(dec!(0), dec!(20585.00)), dec!(20585.00));
/// assert_eq!(max(dec!(0), dec!(-3415.00)), dec!(0));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}
