//! Social-security contribution formulas shared by both calculators.
//!
//! # Registered artisans and traders
//!
//! | Step | Value |
//! |------|-------|
//! | 1 | Excess income: taxable income − threshold (floored at 0) |
//! | 2 | Variable contribution: excess × variable rate |
//! | 3 | Fixed contribution: flat annual amount |
//! | 4 | With the reduction, steps 2 and 3 × reduction factor |
//! | 5 | Contributions: fixed + variable, plus the chamber of commerce fee |
//!
//! # Separate management
//!
//! Contributions are taxable income × separate management rate (× reduction
//! factor when claimed). No fixed part and no chamber fee.
//!
//! # Substitute tax
//!
//! The deductible share of contributions is subtracted from taxable income
//! to get the taxable base, which is floored at zero and multiplied by the
//! substitute rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::{max, round_half_up};
use crate::models::{ContributionRegime, PolicyConstants};

/// Itemized contributions for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "regime", rename_all = "kebab-case")]
pub enum ContributionBreakdown {
    RegisteredTrader {
        /// Taxable income above the contribution threshold.
        excess_income: Decimal,
        /// Fixed contribution, reduced when applicable.
        fixed: Decimal,
        /// Variable contribution on the excess income, reduced when applicable.
        variable: Decimal,
    },
    SeparateManagement {
        amount: Decimal,
    },
}

impl ContributionBreakdown {
    pub fn regime(&self) -> ContributionRegime {
        match self {
            Self::RegisteredTrader { .. } => ContributionRegime::RegisteredTrader,
            Self::SeparateManagement { .. } => ContributionRegime::SeparateManagement,
        }
    }

    /// Total contributions owed.
    pub fn total(&self) -> Decimal {
        match self {
            Self::RegisteredTrader {
                fixed, variable, ..
            } => *fixed + *variable,
            Self::SeparateManagement { amount } => *amount,
        }
    }

    /// Fixed part, reported only for registered traders.
    pub fn fixed(&self) -> Option<Decimal> {
        match self {
            Self::RegisteredTrader { fixed, .. } => Some(*fixed),
            Self::SeparateManagement { .. } => None,
        }
    }

    /// Variable part, reported only for registered traders.
    pub fn variable(&self) -> Option<Decimal> {
        match self {
            Self::RegisteredTrader { variable, .. } => Some(*variable),
            Self::SeparateManagement { .. } => None,
        }
    }

    pub fn rounded(&self) -> Self {
        match *self {
            Self::RegisteredTrader {
                excess_income,
                fixed,
                variable,
            } => Self::RegisteredTrader {
                excess_income: round_half_up(excess_income),
                fixed: round_half_up(fixed),
                variable: round_half_up(variable),
            },
            Self::SeparateManagement { amount } => Self::SeparateManagement {
                amount: round_half_up(amount),
            },
        }
    }
}

/// Applies one [`PolicyConstants`] snapshot to contribution and tax lines.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use forfait_core::{ContributionRegime, PolicyConstants};
/// use forfait_core::calculations::ContributionSchedule;
///
/// let policy = PolicyConstants::fiscal_year_2024();
/// let schedule = ContributionSchedule::new(&policy);
///
/// let breakdown =
///     schedule.breakdown(ContributionRegime::RegisteredTrader, dec!(39000), false);
///
/// assert_eq!(breakdown.fixed(), Some(dec!(4208)));
/// assert_eq!(breakdown.variable(), Some(dec!(4940.40)));
/// assert_eq!(breakdown.total(), dec!(9148.40));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContributionSchedule<'a> {
    policy: &'a PolicyConstants,
}

impl<'a> ContributionSchedule<'a> {
    pub fn new(policy: &'a PolicyConstants) -> Self {
        Self { policy }
    }

    /// Contributions owed on `taxable_income` under `regime`.
    pub fn breakdown(
        &self,
        regime: ContributionRegime,
        taxable_income: Decimal,
        has_reduction: bool,
    ) -> ContributionBreakdown {
        let factor = self.reduction_factor(has_reduction);
        match regime {
            ContributionRegime::RegisteredTrader => {
                let excess_income = self.excess_income(taxable_income);
                let variable = excess_income * self.policy.variable_contribution_rate * factor;
                let fixed = self.policy.fixed_contribution_gross * factor;
                ContributionBreakdown::RegisteredTrader {
                    excess_income,
                    fixed,
                    variable,
                }
            }
            ContributionRegime::SeparateManagement => ContributionBreakdown::SeparateManagement {
                amount: taxable_income * self.policy.separate_management_rate * factor,
            },
        }
    }

    /// Chamber of commerce fee, owed only by registered traders.
    pub fn chamber_fee(
        &self,
        regime: ContributionRegime,
    ) -> Decimal {
        match regime {
            ContributionRegime::RegisteredTrader => self.policy.chamber_of_commerce_fee,
            ContributionRegime::SeparateManagement => Decimal::ZERO,
        }
    }

    /// Portion of contributions deducted from the taxable base.
    pub fn deductible_contributions(
        &self,
        contributions: Decimal,
    ) -> Decimal {
        contributions * self.policy.income_tax_deduction_share
    }

    /// Taxable income less deductible contributions, floored at zero.
    pub fn taxable_base(
        &self,
        taxable_income: Decimal,
        deductible_contributions: Decimal,
    ) -> Decimal {
        let base = taxable_income - deductible_contributions;
        if base < Decimal::ZERO {
            warn!(
                taxable_income = %taxable_income,
                deductible_contributions = %deductible_contributions,
                base = %base,
                "Deductible contributions exceed taxable income; taxable base floored at zero"
            );
            return Decimal::ZERO;
        }
        base
    }

    pub fn substitute_tax(
        &self,
        taxable_base: Decimal,
        rate: Decimal,
    ) -> Decimal {
        taxable_base * rate
    }

    /// One installment of the fixed contribution in `breakdown`.
    ///
    /// Separate management has no fixed contribution, so its share is zero.
    pub fn fixed_installment(
        &self,
        breakdown: &ContributionBreakdown,
    ) -> Decimal {
        match breakdown.fixed() {
            Some(fixed) => fixed / Decimal::from(self.policy.installments_per_year),
            None => Decimal::ZERO,
        }
    }

    fn reduction_factor(
        &self,
        has_reduction: bool,
    ) -> Decimal {
        if has_reduction {
            self.policy.reduced_contribution_factor
        } else {
            Decimal::ONE
        }
    }

    fn excess_income(
        &self,
        taxable_income: Decimal,
    ) -> Decimal {
        max(
            Decimal::ZERO,
            taxable_income - self.policy.contribution_threshold,
        )
    }
}
