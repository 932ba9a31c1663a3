//! Prior-period reconciliation.
//!
//! Recomputes what a closed fiscal year should have cost and nets it
//! against what was paid during that year.
//!
//! # Fourth installment
//!
//! The fixed contribution is paid in quarterly installments, the last of
//! which falls due in the following calendar year. When it has been paid it
//! still belongs to the reconciled year, so one installment of the fixed
//! contribution (after any reduction) is added to the amount already paid.
//!
//! # Balances
//!
//! Both balances are `estimated − paid`: positive means an amount is still
//! owed, zero or negative means the year is covered and the excess is a
//! credit (see [`Balance`]).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::round_half_up;
use crate::calculations::contributions::{ContributionBreakdown, ContributionSchedule};
use crate::calculations::error::{
    CalculationError, InputField, ensure_coefficient, ensure_non_negative,
};
use crate::models::{Balance, ContributionRegime, PolicyConstants, SubstituteTaxRate};

/// Figures for the fiscal year being reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorPeriodInput {
    pub revenue: Decimal,
    pub coefficient: Decimal,
    pub substitute_tax_rate: SubstituteTaxRate,
    pub has_reduction: bool,

    /// Contribution regime of the reconciled year. Hosts that do not ask
    /// for it should pass [`ContributionRegime::RegisteredTrader`].
    pub regime: ContributionRegime,

    /// Contributions paid during the year (the first three installments).
    pub contributions_already_paid: Decimal,

    /// Whether the fourth installment, due the following year, was paid.
    pub fourth_installment_paid: bool,

    /// Substitute tax paid for the year.
    pub tax_already_paid: Decimal,
}

/// Estimated liabilities and the balances left after payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorPeriodResult {
    pub taxable_income: Decimal,
    pub contributions: ContributionBreakdown,
    pub estimated_contributions: Decimal,
    pub deductible_contributions: Decimal,
    pub taxable_base: Decimal,
    pub substitute_tax_rate: Decimal,
    pub estimated_tax: Decimal,
    pub contributions_already_paid: Decimal,

    /// Installment attributed to the year; zero when unpaid.
    pub fourth_installment_amount: Decimal,

    /// Contributions already paid plus the fourth installment.
    pub total_contributions_paid: Decimal,
    pub tax_already_paid: Decimal,

    /// Estimated contributions − total contributions paid.
    pub contribution_balance: Decimal,

    /// Estimated tax − tax already paid.
    pub tax_balance: Decimal,
}

impl PriorPeriodResult {
    pub fn contribution_status(&self) -> Balance {
        Balance::from_signed(self.contribution_balance)
    }

    pub fn tax_status(&self) -> Balance {
        Balance::from_signed(self.tax_balance)
    }

    /// Copy with every monetary field rounded half-up to cents.
    pub fn rounded(&self) -> Self {
        Self {
            taxable_income: round_half_up(self.taxable_income),
            contributions: self.contributions.rounded(),
            estimated_contributions: round_half_up(self.estimated_contributions),
            deductible_contributions: round_half_up(self.deductible_contributions),
            taxable_base: round_half_up(self.taxable_base),
            substitute_tax_rate: self.substitute_tax_rate,
            estimated_tax: round_half_up(self.estimated_tax),
            contributions_already_paid: round_half_up(self.contributions_already_paid),
            fourth_installment_amount: round_half_up(self.fourth_installment_amount),
            total_contributions_paid: round_half_up(self.total_contributions_paid),
            tax_already_paid: round_half_up(self.tax_already_paid),
            contribution_balance: round_half_up(self.contribution_balance),
            tax_balance: round_half_up(self.tax_balance),
        }
    }
}

/// Reconciler for a closed fiscal year.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use forfait_core::{
///     Balance, ContributionRegime, PolicyConstants, PriorPeriodInput, PriorPeriodReconciler,
///     SubstituteTaxRate,
/// };
///
/// let policy = PolicyConstants::fiscal_year_2024();
/// let reconciler = PriorPeriodReconciler::new(&policy);
///
/// let input = PriorPeriodInput {
///     revenue: dec!(20000),
///     coefficient: dec!(0.78),
///     substitute_tax_rate: SubstituteTaxRate::Reduced,
///     has_reduction: true,
///     regime: ContributionRegime::RegisteredTrader,
///     contributions_already_paid: dec!(2051.40),
///     fourth_installment_paid: true,
///     tax_already_paid: dec!(700),
/// };
///
/// let result = reconciler.reconcile(&input).unwrap();
///
/// assert_eq!(result.fourth_installment_amount, dec!(683.80));
/// assert_eq!(result.contribution_status(), Balance::Credit(dec!(0)));
/// assert_eq!(result.tax_status(), Balance::Due(dec!(11.62)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PriorPeriodReconciler<'a> {
    policy: &'a PolicyConstants,
}

impl<'a> PriorPeriodReconciler<'a> {
    pub fn new(policy: &'a PolicyConstants) -> Self {
        Self { policy }
    }

    /// Reconciles `input` against the policy snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::InvalidPolicy`] for a malformed policy,
    /// or [`CalculationError::InvalidInput`] if revenue or an already-paid
    /// amount is negative, or the coefficient is outside (0, 1].
    pub fn reconcile(
        &self,
        input: &PriorPeriodInput,
    ) -> Result<PriorPeriodResult, CalculationError> {
        self.policy.validate()?;
        ensure_non_negative(InputField::Revenue, input.revenue)?;
        ensure_coefficient(input.coefficient)?;
        ensure_non_negative(
            InputField::ContributionsAlreadyPaid,
            input.contributions_already_paid,
        )?;
        ensure_non_negative(InputField::TaxAlreadyPaid, input.tax_already_paid)?;

        let schedule = ContributionSchedule::new(self.policy);

        let taxable_income = input.revenue * input.coefficient;
        let contributions = schedule.breakdown(input.regime, taxable_income, input.has_reduction);
        let estimated_contributions = contributions.total();

        let fourth_installment_amount = self.fourth_installment(&schedule, &contributions, input);
        let total_contributions_paid = input.contributions_already_paid + fourth_installment_amount;
        let contribution_balance = estimated_contributions - total_contributions_paid;

        let deductible_contributions = schedule.deductible_contributions(estimated_contributions);
        let taxable_base = schedule.taxable_base(taxable_income, deductible_contributions);
        let substitute_tax_rate = input.substitute_tax_rate.rate(self.policy);
        let estimated_tax = schedule.substitute_tax(taxable_base, substitute_tax_rate);
        let tax_balance = estimated_tax - input.tax_already_paid;

        debug!(
            fiscal_year = self.policy.fiscal_year,
            rate = input.substitute_tax_rate.as_str(),
            estimated_contributions = %estimated_contributions,
            total_contributions_paid = %total_contributions_paid,
            estimated_tax = %estimated_tax,
            tax_already_paid = %input.tax_already_paid,
            "Reconciled prior period"
        );

        Ok(PriorPeriodResult {
            taxable_income,
            contributions,
            estimated_contributions,
            deductible_contributions,
            taxable_base,
            substitute_tax_rate,
            estimated_tax,
            contributions_already_paid: input.contributions_already_paid,
            fourth_installment_amount,
            total_contributions_paid,
            tax_already_paid: input.tax_already_paid,
            contribution_balance,
            tax_balance,
        })
    }

    /// Share of the fixed contribution attributed to the year via the
    /// fourth installment.
    fn fourth_installment(
        &self,
        schedule: &ContributionSchedule<'_>,
        contributions: &ContributionBreakdown,
        input: &PriorPeriodInput,
    ) -> Decimal {
        if !input.fourth_installment_paid {
            return Decimal::ZERO;
        }
        if input.regime == ContributionRegime::SeparateManagement {
            warn!(
                regime = input.regime.as_str(),
                "Fourth installment marked as paid, but separate management has no fixed contribution"
            );
        }
        schedule.fixed_installment(contributions)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::format::FmtSpan;

    use super::*;
    use crate::calculations::error::InputViolation;

    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_span_events(FmtSpan::NONE)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    fn base_input() -> PriorPeriodInput {
        PriorPeriodInput {
            revenue: dec!(20000),
            coefficient: dec!(0.78),
            substitute_tax_rate: SubstituteTaxRate::Reduced,
            has_reduction: true,
            regime: ContributionRegime::RegisteredTrader,
            contributions_already_paid: dec!(2051.40),
            fourth_installment_paid: false,
            tax_already_paid: dec!(700),
        }
    }

    // =========================================================================
    // Input validation
    // =========================================================================

    #[test]
    fn reconcile_rejects_negative_contributions_paid() {
        let policy = PolicyConstants::fiscal_year_2024();
        let reconciler = PriorPeriodReconciler::new(&policy);
        let input = PriorPeriodInput {
            contributions_already_paid: dec!(-0.01),
            ..base_input()
        };

        assert_eq!(
            reconciler.reconcile(&input),
            Err(CalculationError::InvalidInput {
                field: InputField::ContributionsAlreadyPaid,
                violation: InputViolation::Negative(dec!(-0.01)),
            })
        );
    }

    #[test]
    fn reconcile_rejects_negative_tax_paid() {
        let policy = PolicyConstants::fiscal_year_2024();
        let reconciler = PriorPeriodReconciler::new(&policy);
        let input = PriorPeriodInput {
            tax_already_paid: dec!(-5),
            ..base_input()
        };

        assert_eq!(
            reconciler.reconcile(&input),
            Err(CalculationError::InvalidInput {
                field: InputField::TaxAlreadyPaid,
                violation: InputViolation::Negative(dec!(-5)),
            })
        );
    }

    #[test]
    fn reconcile_rejects_coefficient_given_as_percentage() {
        let policy = PolicyConstants::fiscal_year_2024();
        let reconciler = PriorPeriodReconciler::new(&policy);
        let input = PriorPeriodInput {
            coefficient: dec!(78),
            ..base_input()
        };

        assert_eq!(
            reconciler.reconcile(&input),
            Err(CalculationError::InvalidInput {
                field: InputField::ProfitabilityCoefficient,
                violation: InputViolation::CoefficientOutOfRange(dec!(78)),
            })
        );
    }

    #[test]
    fn reconcile_rejects_negative_revenue() {
        let policy = PolicyConstants::fiscal_year_2024();
        let reconciler = PriorPeriodReconciler::new(&policy);
        let input = PriorPeriodInput {
            revenue: dec!(-100),
            ..base_input()
        };

        assert_eq!(
            reconciler.reconcile(&input),
            Err(CalculationError::InvalidInput {
                field: InputField::Revenue,
                violation: InputViolation::Negative(dec!(-100)),
            })
        );
    }

    // =========================================================================
    // Fourth installment
    // =========================================================================

    #[test]
    fn fourth_installment_adds_quarter_of_reduced_fixed_contribution() {
        let policy = PolicyConstants::fiscal_year_2024();
        let reconciler = PriorPeriodReconciler::new(&policy);
        let input = PriorPeriodInput {
            fourth_installment_paid: true,
            ..base_input()
        };

        let result = reconciler.reconcile(&input).unwrap();

        // 4208 × 0.65 = 2735.20; 2735.20 / 4 = 683.80
        assert_eq!(result.contributions.fixed(), Some(dec!(2735.20)));
        assert_eq!(result.fourth_installment_amount, dec!(683.80));
        assert_eq!(result.total_contributions_paid, dec!(2735.20));
        assert_eq!(result.contribution_balance, dec!(0));
        assert_eq!(result.contribution_status(), Balance::Credit(dec!(0)));
    }

    #[test]
    fn fourth_installment_without_reduction_uses_gross_fixed() {
        let policy = PolicyConstants::fiscal_year_2024();
        let reconciler = PriorPeriodReconciler::new(&policy);
        let input = PriorPeriodInput {
            has_reduction: false,
            fourth_installment_paid: true,
            ..base_input()
        };

        let result = reconciler.reconcile(&input).unwrap();

        assert_eq!(result.fourth_installment_amount, dec!(1052));
    }

    #[test]
    fn unpaid_fourth_installment_adds_nothing() {
        let policy = PolicyConstants::fiscal_year_2024();
        let reconciler = PriorPeriodReconciler::new(&policy);

        let result = reconciler.reconcile(&base_input()).unwrap();

        assert_eq!(result.fourth_installment_amount, dec!(0));
        assert_eq!(result.total_contributions_paid, dec!(2051.40));
        // 2735.20 - 2051.40 = 683.80 still owed
        assert_eq!(result.contribution_status(), Balance::Due(dec!(683.80)));
    }

    #[test]
    fn separate_management_ignores_fourth_installment() {
        let _guard = init_test_tracing();
        let policy = PolicyConstants::fiscal_year_2024();
        let reconciler = PriorPeriodReconciler::new(&policy);
        let input = PriorPeriodInput {
            regime: ContributionRegime::SeparateManagement,
            fourth_installment_paid: true,
            ..base_input()
        };

        let result = reconciler.reconcile(&input).unwrap();

        // 15600 × 0.2607 × 0.65 = 2643.498
        assert_eq!(result.estimated_contributions, dec!(2643.498));
        assert_eq!(result.fourth_installment_amount, dec!(0));
        assert_eq!(result.total_contributions_paid, dec!(2051.40));
    }

    // =========================================================================
    // Tax balance
    // =========================================================================

    #[test]
    fn tax_balance_due_when_underpaid() {
        let policy = PolicyConstants::fiscal_year_2024();
        let reconciler = PriorPeriodReconciler::new(&policy);

        let result = reconciler.reconcile(&base_input()).unwrap();

        // 15600 - 2735.20 × 0.50 = 14232.40; × 0.05 = 711.62
        assert_eq!(result.taxable_income, dec!(15600));
        assert_eq!(result.taxable_base, dec!(14232.40));
        assert_eq!(result.estimated_tax, dec!(711.62));
        assert_eq!(result.tax_balance, dec!(11.62));
        assert_eq!(result.tax_status(), Balance::Due(dec!(11.62)));
    }

    #[test]
    fn tax_balance_credit_when_overpaid() {
        let policy = PolicyConstants::fiscal_year_2024();
        let reconciler = PriorPeriodReconciler::new(&policy);
        let input = PriorPeriodInput {
            tax_already_paid: dec!(900),
            ..base_input()
        };

        let result = reconciler.reconcile(&input).unwrap();

        assert_eq!(result.tax_balance, dec!(-188.38));
        assert_eq!(result.tax_status(), Balance::Credit(dec!(188.38)));
    }

    #[test]
    fn reconcile_above_threshold_includes_variable_part() {
        let policy = PolicyConstants::fiscal_year_2024();
        let reconciler = PriorPeriodReconciler::new(&policy);
        let input = PriorPeriodInput {
            revenue: dec!(50000),
            has_reduction: false,
            substitute_tax_rate: SubstituteTaxRate::Standard,
            contributions_already_paid: dec!(3156),
            fourth_installment_paid: true,
            tax_already_paid: dec!(5000),
            ..base_input()
        };

        let result = reconciler.reconcile(&input).unwrap();

        assert_eq!(result.estimated_contributions, dec!(9148.40));
        assert_eq!(result.total_contributions_paid, dec!(4208));
        assert_eq!(result.contribution_balance, dec!(4940.40));
        assert_eq!(result.estimated_tax, dec!(5163.87));
        assert_eq!(result.tax_status(), Balance::Due(dec!(163.87)));
    }

    #[test]
    fn rounded_result_rounds_monetary_fields() {
        let _guard = init_test_tracing();
        let policy = PolicyConstants::fiscal_year_2024();
        let reconciler = PriorPeriodReconciler::new(&policy);
        let input = PriorPeriodInput {
            regime: ContributionRegime::SeparateManagement,
            ..base_input()
        };

        let result = reconciler.reconcile(&input).unwrap().rounded();

        assert_eq!(result.estimated_contributions, dec!(2643.50));
        assert_eq!(result.contribution_balance, dec!(592.10));
    }
}
