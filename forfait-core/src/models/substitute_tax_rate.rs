use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PolicyConstants;
use crate::calculations::{CalculationError, InputField, InputViolation};

/// Substitute tax rate selected by the taxpayer.
///
/// The numeric value comes from the active [`PolicyConstants`], so the same
/// selection stays meaningful across fiscal years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubstituteTaxRate {
    /// Start-up rate, 5% in 2024.
    Reduced,
    /// Ordinary rate, 15% in 2024.
    Standard,
}

impl SubstituteTaxRate {
    /// The rate as a fraction under `policy`.
    pub fn rate(
        &self,
        policy: &PolicyConstants,
    ) -> Decimal {
        match self {
            Self::Reduced => policy.reduced_substitute_rate,
            Self::Standard => policy.standard_substitute_rate,
        }
    }

    /// Converts a raw fractional rate into a selection.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::InvalidInput`] with
    /// [`InputViolation::RateNotAllowed`] when `rate` is not one of the
    /// policy's substitute rates.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use forfait_core::{PolicyConstants, SubstituteTaxRate};
    ///
    /// let policy = PolicyConstants::fiscal_year_2024();
    ///
    /// assert_eq!(
    ///     SubstituteTaxRate::from_rate(dec!(0.15), &policy),
    ///     Ok(SubstituteTaxRate::Standard)
    /// );
    /// assert!(SubstituteTaxRate::from_rate(dec!(0.10), &policy).is_err());
    /// ```
    pub fn from_rate(
        rate: Decimal,
        policy: &PolicyConstants,
    ) -> Result<Self, CalculationError> {
        if rate == policy.reduced_substitute_rate {
            Ok(Self::Reduced)
        } else if rate == policy.standard_substitute_rate {
            Ok(Self::Standard)
        } else {
            Err(CalculationError::InvalidInput {
                field: InputField::SubstituteTaxRate,
                violation: InputViolation::RateNotAllowed(rate),
            })
        }
    }

    /// Converts a whole-number percentage (`5`, `15`) into a selection.
    ///
    /// # Errors
    ///
    /// Same as [`SubstituteTaxRate::from_rate`].
    pub fn from_percent(
        percent: Decimal,
        policy: &PolicyConstants,
    ) -> Result<Self, CalculationError> {
        Self::from_rate(percent / Decimal::ONE_HUNDRED, policy)
            .map_err(|_| CalculationError::InvalidInput {
                field: InputField::SubstituteTaxRate,
                violation: InputViolation::RateNotAllowed(percent),
            })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reduced => "reduced",
            Self::Standard => "standard",
        }
    }

}
