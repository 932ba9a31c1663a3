//! Tax and contribution engine for the Italian flat-rate ("forfettario") regime.
//!
//! The crate is split the same way the computation is: [`models`] holds the
//! policy snapshot, activity profiles and typed selections, while
//! [`calculations`] holds the two calculators that turn those into an
//! itemized breakdown.

pub mod calculations;
pub mod models;

pub use calculations::{
    CalculationError, CalculationInput, CalculationResult, ContributionBreakdown,
    CurrentPeriodCalculator, InputField, InputViolation, PriorPeriodInput, PriorPeriodReconciler,
    PriorPeriodResult,
};
pub use models::*;
