use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::PolicyError;

/// Input fields checked before a calculation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    Revenue,
    ProfitabilityCoefficient,
    SubstituteTaxRate,
    ContributionsAlreadyPaid,
    TaxAlreadyPaid,
}

impl InputField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::ProfitabilityCoefficient => "profitability coefficient",
            Self::SubstituteTaxRate => "substitute tax rate",
            Self::ContributionsAlreadyPaid => "contributions already paid",
            Self::TaxAlreadyPaid => "tax already paid",
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The constraint an input value broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputViolation {
    /// An amount was below zero.
    Negative(Decimal),
    /// A coefficient was outside (0, 1].
    CoefficientOutOfRange(Decimal),
    /// A substitute tax rate was not one of the policy's rates.
    RateNotAllowed(Decimal),
}

impl fmt::Display for InputViolation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Negative(value) => write!(f, "must not be negative, got {value}"),
            Self::CoefficientOutOfRange(value) => {
                write!(f, "must be greater than 0 and at most 1, got {value}")
            }
            Self::RateNotAllowed(value) => write!(f, "{value} is not an allowed rate"),
        }
    }
}

/// Errors returned by the calculators.
///
/// Every variant is raised before any arithmetic runs, so a failed call
/// never yields a partial result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalculationError {
    #[error("invalid {field}: {violation}")]
    InvalidInput {
        field: InputField,
        violation: InputViolation,
    },

    #[error("invalid policy: {0}")]
    InvalidPolicy(#[from] PolicyError),
}

pub(crate) fn ensure_non_negative(
    field: InputField,
    value: Decimal,
) -> Result<(), CalculationError> {
    if value < Decimal::ZERO {
        return Err(CalculationError::InvalidInput {
            field,
            violation: InputViolation::Negative(value),
        });
    }
    Ok(())
}

pub(crate) fn ensure_coefficient(value: Decimal) -> Result<(), CalculationError> {
    if value <= Decimal::ZERO || value > Decimal::ONE {
        return Err(CalculationError::InvalidInput {
            field: InputField::ProfitabilityCoefficient,
            violation: InputViolation::CoefficientOutOfRange(value),
        });
    }
    Ok(())
}
