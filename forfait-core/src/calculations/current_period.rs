//! Current-period tax and contribution estimate.
//!
//! # Calculation Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Taxable income: revenue × profitability coefficient |
//! | 2    | Contributions for the selected regime (see [`super::contributions`]) |
//! | 3    | Chamber of commerce fee (registered traders only) |
//! | 4    | Taxable base: taxable income − contributions × deductible share |
//! | 5    | Substitute tax: taxable base × selected rate |
//! | 6    | Total burden: contributions + substitute tax + chamber fee |
//! | 7    | Net income: revenue − total burden |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use forfait_core::{
//!     CalculationInput, ContributionRegime, CurrentPeriodCalculator, PolicyConstants,
//!     SubstituteTaxRate,
//! };
//!
//! let policy = PolicyConstants::fiscal_year_2024();
//! let calculator = CurrentPeriodCalculator::new(&policy);
//!
//! let input = CalculationInput {
//!     revenue: dec!(50000),
//!     coefficient: dec!(0.78),
//!     regime: ContributionRegime::RegisteredTrader,
//!     has_reduction: false,
//!     substitute_tax_rate: SubstituteTaxRate::Standard,
//! };
//!
//! let result = calculator.calculate(&input).unwrap();
//!
//! assert_eq!(result.taxable_income, dec!(39000));
//! assert_eq!(result.contributions.total(), dec!(9148.40));
//! assert_eq!(result.substitute_tax, dec!(5163.87));
//! assert_eq!(result.total_tax_burden, dec!(14362.27));
//! assert_eq!(result.net_income, dec!(35637.73));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::round_half_up;
use crate::calculations::contributions::{ContributionBreakdown, ContributionSchedule};
use crate::calculations::error::{
    CalculationError, InputField, ensure_coefficient, ensure_non_negative,
};
use crate::models::{ContributionRegime, PolicyConstants, SubstituteTaxRate};

/// Inputs for a current-period estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Revenue invoiced so far. Must be non-negative.
    pub revenue: Decimal,

    /// Profitability coefficient of the activity, in (0, 1].
    pub coefficient: Decimal,

    pub regime: ContributionRegime,

    /// Whether the 35% contribution reduction is claimed.
    pub has_reduction: bool,

    pub substitute_tax_rate: SubstituteTaxRate,
}

/// Itemized current-period estimate.
///
/// Values are exact; call [`CalculationResult::rounded`] for a copy rounded
/// to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub revenue: Decimal,

    /// Revenue × coefficient.
    pub taxable_income: Decimal,

    pub contributions: ContributionBreakdown,

    /// Chamber of commerce fee; zero under separate management.
    pub chamber_fee: Decimal,

    /// Share of contributions subtracted from taxable income.
    pub deductible_contributions: Decimal,

    /// Base the substitute tax applies to, never below zero.
    pub taxable_base: Decimal,

    /// The selected rate as a fraction.
    pub substitute_tax_rate: Decimal,

    pub substitute_tax: Decimal,

    /// Contributions + substitute tax + chamber fee.
    pub total_tax_burden: Decimal,

    /// Revenue − total tax burden.
    pub net_income: Decimal,
}

impl CalculationResult {
    /// Copy with every monetary field rounded half-up to cents.
    ///
    /// Rounding happens field by field, so the rounded total can differ
    /// from the sum of rounded parts by a cent.
    pub fn rounded(&self) -> Self {
        Self {
            revenue: round_half_up(self.revenue),
            taxable_income: round_half_up(self.taxable_income),
            contributions: self.contributions.rounded(),
            chamber_fee: round_half_up(self.chamber_fee),
            deductible_contributions: round_half_up(self.deductible_contributions),
            taxable_base: round_half_up(self.taxable_base),
            substitute_tax_rate: self.substitute_tax_rate,
            substitute_tax: round_half_up(self.substitute_tax),
            total_tax_burden: round_half_up(self.total_tax_burden),
            net_income: round_half_up(self.net_income),
        }
    }
}

/// Calculator for the current period.
///
/// Borrows the policy snapshot; construct one per snapshot and reuse it for
/// any number of inputs.
#[derive(Debug, Clone, Copy)]
pub struct CurrentPeriodCalculator<'a> {
    policy: &'a PolicyConstants,
}

impl<'a> CurrentPeriodCalculator<'a> {
    pub fn new(policy: &'a PolicyConstants) -> Self {
        Self { policy }
    }

    /// Computes the full breakdown for `input`.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::InvalidPolicy`] if the policy snapshot is
    /// malformed, or [`CalculationError::InvalidInput`] if revenue is
    /// negative or the coefficient is outside (0, 1].
    pub fn calculate(
        &self,
        input: &CalculationInput,
    ) -> Result<CalculationResult, CalculationError> {
        self.policy.validate()?;
        ensure_non_negative(InputField::Revenue, input.revenue)?;
        ensure_coefficient(input.coefficient)?;

        let schedule = ContributionSchedule::new(self.policy);

        let taxable_income = input.revenue * input.coefficient;
        let contributions = schedule.breakdown(input.regime, taxable_income, input.has_reduction);
        let chamber_fee = schedule.chamber_fee(input.regime);

        let deductible_contributions = schedule.deductible_contributions(contributions.total());
        let taxable_base = schedule.taxable_base(taxable_income, deductible_contributions);

        let substitute_tax_rate = input.substitute_tax_rate.rate(self.policy);
        let substitute_tax = schedule.substitute_tax(taxable_base, substitute_tax_rate);

        let total_tax_burden = contributions.total() + substitute_tax + chamber_fee;
        let net_income = input.revenue - total_tax_burden;

        debug!(
            fiscal_year = self.policy.fiscal_year,
            regime = input.regime.as_str(),
            rate = input.substitute_tax_rate.as_str(),
            taxable_income = %taxable_income,
            contributions = %contributions.total(),
            substitute_tax = %substitute_tax,
            total_tax_burden = %total_tax_burden,
            "Computed current-period estimate"
        );

        Ok(CalculationResult {
            revenue: input.revenue,
            taxable_income,
            contributions,
            chamber_fee,
            deductible_contributions,
            taxable_base,
            substitute_tax_rate,
            substitute_tax,
            total_tax_burden,
            net_income,
        })
    }
}
