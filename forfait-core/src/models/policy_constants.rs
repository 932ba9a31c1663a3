//! Fiscal-year policy parameters shared by every calculator.
//!
//! A [`PolicyConstants`] value is a read-only snapshot of the contribution
//! rates, thresholds and fees in force for one fiscal year. Calculators
//! borrow it immutably, so a single snapshot can back any number of
//! concurrent computations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a policy snapshot contains values outside their range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// The contribution threshold must be non-negative.
    #[error("contribution threshold must be non-negative, got {0}")]
    InvalidContributionThreshold(Decimal),

    /// The fixed contribution must be non-negative.
    #[error("fixed contribution must be non-negative, got {0}")]
    InvalidFixedContribution(Decimal),

    /// The variable contribution rate must be between 0 and 1.
    #[error("variable contribution rate must be between 0 and 1, got {0}")]
    InvalidVariableContributionRate(Decimal),

    /// The reduced contribution factor must be in (0, 1].
    #[error("reduced contribution factor must be greater than 0 and at most 1, got {0}")]
    InvalidReducedContributionFactor(Decimal),

    /// The separate management rate must be between 0 and 1.
    #[error("separate management rate must be between 0 and 1, got {0}")]
    InvalidSeparateManagementRate(Decimal),

    /// The chamber of commerce fee must be non-negative.
    #[error("chamber of commerce fee must be non-negative, got {0}")]
    InvalidChamberOfCommerceFee(Decimal),

    /// The deductible share of contributions must be between 0 and 1.
    #[error("income tax deduction share must be between 0 and 1, got {0}")]
    InvalidDeductionShare(Decimal),

    /// A substitute tax rate must be in (0, 1].
    #[error("substitute tax rate must be greater than 0 and at most 1, got {0}")]
    InvalidSubstituteTaxRate(Decimal),

    /// The reduced substitute rate must be strictly lower than the standard one.
    #[error("reduced substitute rate {reduced} must be lower than standard rate {standard}")]
    SubstituteRatesNotOrdered { reduced: Decimal, standard: Decimal },

    /// The fixed contribution must be split into at least one installment.
    #[error("installments per year must be at least 1, got {0}")]
    InvalidInstallmentsPerYear(u32),

    /// Two snapshots were registered for the same fiscal year.
    #[error("a policy for fiscal year {0} is already registered")]
    DuplicateFiscalYear(i32),
}

/// Contribution and tax parameters for one fiscal year.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use forfait_core::PolicyConstants;
///
/// let policy = PolicyConstants::fiscal_year_2024();
///
/// assert_eq!(policy.contribution_threshold, dec!(18415));
/// assert_eq!(policy.fixed_contribution_gross, dec!(4208));
/// assert_eq!(policy.validate(), Ok(()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConstants {
    /// Fiscal year this snapshot applies to.
    pub fiscal_year: i32,

    /// Taxable income above which the variable contribution rate applies.
    pub contribution_threshold: Decimal,

    /// Flat annual contribution owed by registered artisans and traders.
    pub fixed_contribution_gross: Decimal,

    /// Rate applied to taxable income exceeding [`Self::contribution_threshold`].
    pub variable_contribution_rate: Decimal,

    /// Multiplier applied to contributions when the reduction is claimed.
    ///
    /// For 2024 this is 0.65 (a 35% reduction).
    pub reduced_contribution_factor: Decimal,

    /// Contribution rate for the separate management scheme.
    pub separate_management_rate: Decimal,

    /// Annual chamber of commerce fee owed by registered traders.
    pub chamber_of_commerce_fee: Decimal,

    /// Fraction of contributions deducted from taxable income before the
    /// substitute tax is applied.
    pub income_tax_deduction_share: Decimal,

    /// Start-up substitute tax rate (5%).
    pub reduced_substitute_rate: Decimal,

    /// Ordinary substitute tax rate (15%).
    pub standard_substitute_rate: Decimal,

    /// Number of installments the fixed contribution is split into.
    pub installments_per_year: u32,
}

impl PolicyConstants {
    /// Policy parameters in force for fiscal year 2024.
    pub fn fiscal_year_2024() -> Self {
        Self {
            fiscal_year: 2024,
            contribution_threshold: Decimal::new(18_415, 0),
            fixed_contribution_gross: Decimal::new(4_208, 0),
            variable_contribution_rate: Decimal::new(24, 2),
            reduced_contribution_factor: Decimal::new(65, 2),
            separate_management_rate: Decimal::new(2_607, 4),
            chamber_of_commerce_fee: Decimal::new(50, 0),
            income_tax_deduction_share: Decimal::new(50, 2),
            reduced_substitute_rate: Decimal::new(5, 2),
            standard_substitute_rate: Decimal::new(15, 2),
            installments_per_year: 4,
        }
    }

    /// The set of substitute tax rates a taxpayer may select.
    pub fn substitute_tax_rates(&self) -> [Decimal; 2] {
        [self.reduced_substitute_rate, self.standard_substitute_rate]
    }

    /// Validates every parameter against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first [`PolicyError`] found, checking fields in
    /// declaration order.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use forfait_core::{PolicyConstants, PolicyError};
    ///
    /// let policy = PolicyConstants {
    ///     variable_contribution_rate: dec!(1.24),
    ///     ..PolicyConstants::fiscal_year_2024()
    /// };
    ///
    /// assert_eq!(
    ///     policy.validate(),
    ///     Err(PolicyError::InvalidVariableContributionRate(dec!(1.24)))
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.contribution_threshold < Decimal::ZERO {
            return Err(PolicyError::InvalidContributionThreshold(
                self.contribution_threshold,
            ));
        }
        if self.fixed_contribution_gross < Decimal::ZERO {
            return Err(PolicyError::InvalidFixedContribution(
                self.fixed_contribution_gross,
            ));
        }
        if !is_unit_interval(self.variable_contribution_rate) {
            return Err(PolicyError::InvalidVariableContributionRate(
                self.variable_contribution_rate,
            ));
        }
        if self.reduced_contribution_factor <= Decimal::ZERO
            || self.reduced_contribution_factor > Decimal::ONE
        {
            return Err(PolicyError::InvalidReducedContributionFactor(
                self.reduced_contribution_factor,
            ));
        }
        if !is_unit_interval(self.separate_management_rate) {
            return Err(PolicyError::InvalidSeparateManagementRate(
                self.separate_management_rate,
            ));
        }
        if self.chamber_of_commerce_fee < Decimal::ZERO {
            return Err(PolicyError::InvalidChamberOfCommerceFee(
                self.chamber_of_commerce_fee,
            ));
        }
        if !is_unit_interval(self.income_tax_deduction_share) {
            return Err(PolicyError::InvalidDeductionShare(
                self.income_tax_deduction_share,
            ));
        }
        for rate in self.substitute_tax_rates() {
            if rate <= Decimal::ZERO || rate > Decimal::ONE {
                return Err(PolicyError::InvalidSubstituteTaxRate(rate));
            }
        }
        if self.reduced_substitute_rate >= self.standard_substitute_rate {
            return Err(PolicyError::SubstituteRatesNotOrdered {
                reduced: self.reduced_substitute_rate,
                standard: self.standard_substitute_rate,
            });
        }
        if self.installments_per_year == 0 {
            return Err(PolicyError::InvalidInstallmentsPerYear(
                self.installments_per_year,
            ));
        }
        Ok(())
    }
}

impl Default for PolicyConstants {
    fn default() -> Self {
        Self::fiscal_year_2024()
    }
}

fn is_unit_interval(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}
