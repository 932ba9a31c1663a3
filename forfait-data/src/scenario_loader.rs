//! CSV loader for batch current-period scenarios.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter.
//!
//! | Column        | Required | Type    | Notes                                          |
//! |---------------|----------|---------|------------------------------------------------|
//! | `label`       | yes      | string  | Free text shown with the result                |
//! | `revenue`     | yes      | decimal | e.g. `50000.00`                                |
//! | `activity`    | no       | string  | Activity code; leave empty to use `coefficient` |
//! | `coefficient` | no       | decimal | Fraction in (0, 1]; leave empty to use `activity` |
//! | `regime`      | yes      | string  | `registered-trader` / `separate-management` (or `registered` / `separate`) |
//! | `reduction`   | yes      | flag    | `yes`/`no`, `true`/`false`, `1`/`0`            |
//! | `rate`        | yes      | decimal | Substitute rate in percent: `5` or `15`        |
//!
//! Exactly one of `activity` and `coefficient` must be filled.
//!
//! ### Example
//!
//! ```csv
//! label,revenue,activity,coefficient,regime,reduction,rate
//! designer,50000.00,graphic-designer,,registered-trader,no,15
//! custom,12000.00,,0.62,separate,yes,5
//! ```
use std::path::Path;

use forfait_core::{
    ActivityCatalogue, CalculationError, CalculationInput, ContributionRegime, PolicyConstants,
    SubstituteTaxRate,
};
use rust_decimal::Decimal;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    label: String,
    revenue: Decimal,
    activity: Option<String>,
    coefficient: Option<Decimal>,
    regime: String,
    reduction: String,
    rate: Decimal,
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Where a scenario's profitability coefficient comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoefficientSource {
    /// Looked up in the activity catalogue.
    Activity(String),
    /// Given directly as a fraction.
    Explicit(Decimal),
}

/// One batch row, typed but not yet resolved against a policy or catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub label: String,
    pub revenue: Decimal,
    pub coefficient: CoefficientSource,
    pub regime: ContributionRegime,
    pub has_reduction: bool,
    /// Substitute rate in percent, as written in the file.
    pub rate_percent: Decimal,
}

/// Errors raised while turning a [`Scenario`] into engine input.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("unknown activity code '{0}'")]
    UnknownActivity(String),

    #[error(transparent)]
    Calculation(#[from] CalculationError),
}

impl Scenario {
    /// Resolves the coefficient and rate into a [`CalculationInput`].
    ///
    /// # Errors
    ///
    /// * [`ScenarioError::UnknownActivity`] – the activity code is not in
    ///   `catalogue`.
    /// * [`ScenarioError::Calculation`] – the rate is not one of the
    ///   policy's substitute rates.
    pub fn to_input(
        &self,
        catalogue: &ActivityCatalogue,
        policy: &PolicyConstants,
    ) -> Result<CalculationInput, ScenarioError> {
        let coefficient = match &self.coefficient {
            CoefficientSource::Activity(code) => catalogue
                .coefficient(code)
                .ok_or_else(|| ScenarioError::UnknownActivity(code.clone()))?,
            CoefficientSource::Explicit(value) => *value,
        };
        let substitute_tax_rate = SubstituteTaxRate::from_percent(self.rate_percent, policy)?;

        Ok(CalculationInput {
            revenue: self.revenue,
            coefficient,
            regime: self.regime,
            has_reduction: self.has_reduction,
            substitute_tax_rate,
        })
    }
}

/// Errors that can occur while loading scenario files.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioLoadError {
    #[error("could not read scenario file: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV was structurally invalid or a cell had the wrong type.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("unrecognised regime '{value}' on row {row}")]
    InvalidRegime { value: String, row: usize },

    #[error("unrecognised reduction flag '{value}' on row {row}")]
    InvalidFlag { value: String, row: usize },

    #[error("row {row} needs either an activity or a coefficient")]
    MissingCoefficient { row: usize },

    #[error("row {row} has both an activity and a coefficient")]
    AmbiguousCoefficient { row: usize },
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "1" => Some(true),
        "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Convert a single CSV row into a Scenario.
///
/// row_number is 1-based (for error messages).
fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<Scenario, ScenarioLoadError> {
    let regime =
        ContributionRegime::parse(&row.regime).ok_or_else(|| ScenarioLoadError::InvalidRegime {
            value: row.regime.clone(),
            row: row_number,
        })?;
    let has_reduction =
        parse_flag(&row.reduction).ok_or_else(|| ScenarioLoadError::InvalidFlag {
            value: row.reduction.clone(),
            row: row_number,
        })?;
    let activity = row.activity.filter(|a| !a.trim().is_empty());
    let coefficient = match (activity, row.coefficient) {
        (Some(code), None) => CoefficientSource::Activity(code),
        (None, Some(value)) => CoefficientSource::Explicit(value),
        (None, None) => return Err(ScenarioLoadError::MissingCoefficient { row: row_number }),
        (Some(_), Some(_)) => {
            return Err(ScenarioLoadError::AmbiguousCoefficient { row: row_number });
        }
    };

    Ok(Scenario {
        label: row.label,
        revenue: row.revenue,
        coefficient,
        regime,
        has_reduction,
        rate_percent: row.rate,
    })
}

/// Parse CSV text and return the scenarios in file order.
///
/// # Errors
///
/// * [ScenarioLoadError::Parse] – structurally invalid CSV or bad cell type.
/// * [ScenarioLoadError::InvalidRegime] / [ScenarioLoadError::InvalidFlag] –
///   unrecognised codes.
/// * [ScenarioLoadError::MissingCoefficient] /
///   [ScenarioLoadError::AmbiguousCoefficient] – not exactly one coefficient
///   source on a row.
pub fn load_from_str(input: &str) -> Result<Vec<Scenario>, ScenarioLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1)
        })
        .collect()
}

/// Read a file from disk and delegate to [load_from_str].
pub fn load_from_file(path: &Path) -> Result<Vec<Scenario>, ScenarioLoadError> {
    let contents = std::fs::read_to_string(path)?;
    load_from_str(&contents)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use forfait_core::{InputField, InputViolation};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const HEADER: &str = "label,revenue,activity,coefficient,regime,reduction,rate";

    fn one_row(row: &str) -> String {
        format!("{HEADER}\n{row}\n")
    }

    #[test]
    fn test_activity_row() {
        let scenarios =
            load_from_str(&one_row("designer,50000.00,graphic-designer,,registered-trader,no,15"))
                .expect("should parse");

        assert_eq!(
            scenarios,
            vec![Scenario {
                label: "designer".to_string(),
                revenue: dec!(50000.00),
                coefficient: CoefficientSource::Activity("graphic-designer".to_string()),
                regime: ContributionRegime::RegisteredTrader,
                has_reduction: false,
                rate_percent: dec!(15),
            }]
        );
    }

    #[test]
    fn test_explicit_coefficient_row() {
        let scenarios = load_from_str(&one_row("custom,12000,,0.62,separate,yes,5"))
            .expect("should parse");

        assert_eq!(scenarios[0].coefficient, CoefficientSource::Explicit(dec!(0.62)));
        assert_eq!(scenarios[0].regime, ContributionRegime::SeparateManagement);
        assert!(scenarios[0].has_reduction);
    }

    #[test]
    fn test_invalid_regime_reports_row() {
        let csv = format!(
            "{HEADER}\nok,1000,trader,,registered,no,15\nbad,1000,trader,,employee,no,15\n"
        );

        let err = load_from_str(&csv).expect_err("should reject regime");

        match err {
            ScenarioLoadError::InvalidRegime { value, row } => {
                assert_eq!(value, "employee");
                assert_eq!(row, 2);
            }
            other => panic!("expected InvalidRegime, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_flag() {
        let err = load_from_str(&one_row("x,1000,trader,,registered,maybe,15"))
            .expect_err("should reject flag");

        assert!(matches!(
            err,
            ScenarioLoadError::InvalidFlag { ref value, row: 1 } if value == "maybe"
        ));
    }

    #[test]
    fn test_missing_coefficient_source() {
        let err = load_from_str(&one_row("x,1000,,,registered,no,15"))
            .expect_err("should need a coefficient");

        assert!(matches!(err, ScenarioLoadError::MissingCoefficient { row: 1 }));
    }

    #[test]
    fn test_ambiguous_coefficient_source() {
        let err = load_from_str(&one_row("x,1000,trader,0.4,registered,no,15"))
            .expect_err("should reject two sources");

        assert!(matches!(err, ScenarioLoadError::AmbiguousCoefficient { row: 1 }));
    }

    #[test]
    fn test_bad_revenue_is_parse_error() {
        let err = load_from_str(&one_row("x,lots,trader,,registered,no,15"))
            .expect_err("should fail");

        assert!(matches!(err, ScenarioLoadError::Parse(_)));
    }

    #[test]
    fn test_empty_file_yields_no_scenarios() {
        let scenarios = load_from_str(&format!("{HEADER}\n")).expect("should parse");

        assert!(scenarios.is_empty());
    }

    #[test]
    fn test_to_input_resolves_activity() {
        let scenario = Scenario {
            label: "designer".to_string(),
            revenue: dec!(50000),
            coefficient: CoefficientSource::Activity("graphic-designer".to_string()),
            regime: ContributionRegime::RegisteredTrader,
            has_reduction: false,
            rate_percent: dec!(15),
        };

        let input = scenario
            .to_input(&ActivityCatalogue::builtin(), &PolicyConstants::fiscal_year_2024())
            .expect("should resolve");

        assert_eq!(input.coefficient, dec!(0.78));
        assert_eq!(input.substitute_tax_rate, SubstituteTaxRate::Standard);
    }

    #[test]
    fn test_to_input_unknown_activity() {
        let scenario = Scenario {
            label: "x".to_string(),
            revenue: dec!(1),
            coefficient: CoefficientSource::Activity("astronaut".to_string()),
            regime: ContributionRegime::RegisteredTrader,
            has_reduction: false,
            rate_percent: dec!(15),
        };

        let result =
            scenario.to_input(&ActivityCatalogue::builtin(), &PolicyConstants::fiscal_year_2024());

        assert_eq!(result, Err(ScenarioError::UnknownActivity("astronaut".to_string())));
    }

    #[test]
    fn test_to_input_rejects_rate_outside_policy() {
        let scenario = Scenario {
            label: "x".to_string(),
            revenue: dec!(1),
            coefficient: CoefficientSource::Explicit(dec!(0.5)),
            regime: ContributionRegime::SeparateManagement,
            has_reduction: false,
            rate_percent: dec!(10),
        };

        let result =
            scenario.to_input(&ActivityCatalogue::builtin(), &PolicyConstants::fiscal_year_2024());

        assert_eq!(
            result,
            Err(ScenarioError::Calculation(CalculationError::InvalidInput {
                field: InputField::SubstituteTaxRate,
                violation: InputViolation::RateNotAllowed(dec!(10)),
            }))
        );
    }
}
