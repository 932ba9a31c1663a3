//! Flat-rate regime calculators.
//!
//! [`CurrentPeriodCalculator`] produces this period's breakdown and
//! [`PriorPeriodReconciler`] nets a past period's liabilities against what
//! was already paid. Both draw their contribution figures from the shared
//! [`contributions`] module so the two can never disagree on policy.

pub mod common;
pub mod contributions;
pub mod current_period;
pub mod error;
pub mod prior_period;

pub use contributions::{ContributionBreakdown, ContributionSchedule};
pub use current_period::{CalculationInput, CalculationResult, CurrentPeriodCalculator};
pub use error::{CalculationError, InputField, InputViolation};
pub use prior_period::{PriorPeriodInput, PriorPeriodReconciler, PriorPeriodResult};
