use std::io::Read;

use forfait_core::{PolicyConstants, PolicyError, PolicyTable};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when loading policy tables.
#[derive(Debug, Error)]
pub enum PolicyLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid policy for fiscal year {fiscal_year}: {source}")]
    InvalidPolicy {
        fiscal_year: i32,
        #[source]
        source: PolicyError,
    },
}

impl From<csv::Error> for PolicyLoaderError {
    fn from(err: csv::Error) -> Self {
        PolicyLoaderError::CsvParse(err.to_string())
    }
}

/// A single row of a policy CSV file: one fiscal year's parameters.
///
/// Rates and factors are fractions (`0.24`, not `24`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PolicyRecord {
    pub fiscal_year: i32,
    pub contribution_threshold: Decimal,
    pub fixed_contribution_gross: Decimal,
    pub variable_contribution_rate: Decimal,
    pub reduced_contribution_factor: Decimal,
    pub separate_management_rate: Decimal,
    pub chamber_of_commerce_fee: Decimal,
    pub income_tax_deduction_share: Decimal,
    pub reduced_substitute_rate: Decimal,
    pub standard_substitute_rate: Decimal,
    pub installments_per_year: u32,
}

impl From<&PolicyRecord> for PolicyConstants {
    fn from(record: &PolicyRecord) -> Self {
        PolicyConstants {
            fiscal_year: record.fiscal_year,
            contribution_threshold: record.contribution_threshold,
            fixed_contribution_gross: record.fixed_contribution_gross,
            variable_contribution_rate: record.variable_contribution_rate,
            reduced_contribution_factor: record.reduced_contribution_factor,
            separate_management_rate: record.separate_management_rate,
            chamber_of_commerce_fee: record.chamber_of_commerce_fee,
            income_tax_deduction_share: record.income_tax_deduction_share,
            reduced_substitute_rate: record.reduced_substitute_rate,
            standard_substitute_rate: record.standard_substitute_rate,
            installments_per_year: record.installments_per_year,
        }
    }
}

/// Loader for fiscal-year policy parameters stored as CSV.
pub struct PolicyLoader;

impl PolicyLoader {
    /// Parse policy records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<PolicyRecord>, PolicyLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: PolicyRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Build a validated [`PolicyTable`] from parsed records.
    ///
    /// Every record is validated; a second record for a year already in the
    /// table is rejected rather than overwriting the first.
    pub fn load(records: &[PolicyRecord]) -> Result<PolicyTable, PolicyLoaderError> {
        let mut table = PolicyTable::new();

        for record in records {
            table
                .insert(PolicyConstants::from(record))
                .map_err(|source| PolicyLoaderError::InvalidPolicy {
                    fiscal_year: record.fiscal_year,
                    source,
                })?;
            debug!(fiscal_year = record.fiscal_year, "Loaded policy");
        }

        Ok(table)
    }

    /// Parse and load in one step.
    pub fn read<R: Read>(reader: R) -> Result<PolicyTable, PolicyLoaderError> {
        let records = Self::parse(reader)?;
        Self::load(&records)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const HEADER: &str = "fiscal_year,contribution_threshold,fixed_contribution_gross,variable_contribution_rate,reduced_contribution_factor,separate_management_rate,chamber_of_commerce_fee,income_tax_deduction_share,reduced_substitute_rate,standard_substitute_rate,installments_per_year";

    fn csv_with(rows: &[&str]) -> String {
        let mut csv = String::from(HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        csv
    }

    #[test]
    fn test_parse_single_year() {
        let csv = csv_with(&["2024,18415,4208,0.24,0.65,0.2607,50,0.50,0.05,0.15,4"]);

        let records = PolicyLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fiscal_year, 2024);
        assert_eq!(records[0].contribution_threshold, dec!(18415));
        assert_eq!(records[0].separate_management_rate, dec!(0.2607));
        assert_eq!(records[0].installments_per_year, 4);
    }

    #[test]
    fn test_load_matches_builtin_2024() {
        let csv = csv_with(&["2024,18415,4208,0.24,0.65,0.2607,50,0.50,0.05,0.15,4"]);

        let table = PolicyLoader::read(csv.as_bytes()).expect("Failed to load policy");

        assert_eq!(table.get(2024), Some(&PolicyConstants::fiscal_year_2024()));
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let csv = csv_with(&["2024, 18415 ,4208,0.24,0.65,0.2607,50,0.50,0.05,0.15, 4"]);

        let records = PolicyLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(records[0].contribution_threshold, dec!(18415));
    }

    #[test]
    fn test_load_rejects_duplicate_year() {
        let csv = csv_with(&[
            "2024,18415,4208,0.24,0.65,0.2607,50,0.50,0.05,0.15,4",
            "2024,18415,4208,0.24,0.65,0.2607,50,0.50,0.05,0.15,4",
        ]);

        let err = PolicyLoader::read(csv.as_bytes()).expect_err("Should reject duplicate year");

        match err {
            PolicyLoaderError::InvalidPolicy {
                fiscal_year,
                source,
            } => {
                assert_eq!(fiscal_year, 2024);
                assert_eq!(source, PolicyError::DuplicateFiscalYear(2024));
            }
            other => panic!("expected InvalidPolicy, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_rate_given_as_percentage() {
        let csv = csv_with(&["2025,18555,4427.04,24,0.65,0.2607,50,0.50,0.05,0.15,4"]);

        let err = PolicyLoader::read(csv.as_bytes()).expect_err("Should reject rate of 24");

        let PolicyLoaderError::InvalidPolicy { fiscal_year, source } = err else {
            panic!("Expected InvalidPolicy error, got: {:?}", err);
        };
        assert_eq!(fiscal_year, 2025);
        assert_eq!(source, PolicyError::InvalidVariableContributionRate(dec!(24)));
    }

    #[test]
    fn test_parse_missing_column() {
        let csv = "fiscal_year,contribution_threshold\n2024,18415";

        let err = PolicyLoader::parse(csv.as_bytes()).expect_err("Should fail for missing column");

        let PolicyLoaderError::CsvParse(msg) = err else {
            panic!("Expected CsvParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_empty_csv() {
        let records = PolicyLoader::parse(csv_with(&[]).as_bytes()).expect("Failed to parse CSV");

        assert!(records.is_empty());
    }
}
