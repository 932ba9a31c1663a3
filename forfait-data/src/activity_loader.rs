use std::io::Read;

use forfait_core::{ActivityCatalogue, ActivityError, ActivityProfile};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading an activity catalogue.
#[derive(Debug, Error)]
pub enum ActivityLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Invalid activity on row {row}: {source}")]
    InvalidActivity {
        row: usize,
        #[source]
        source: ActivityError,
    },
}

impl From<csv::Error> for ActivityLoaderError {
    fn from(err: csv::Error) -> Self {
        ActivityLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from an activities CSV file.
///
/// - `code`: short identifier used on the command line (e.g. `it-consultant`)
/// - `description`: human-readable name
/// - `coefficient`: profitability coefficient as a fraction (e.g. `0.78`)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ActivityRecord {
    pub code: String,
    pub description: String,
    pub coefficient: Decimal,
}

/// Loader for activity catalogues stored as CSV.
pub struct ActivityLoader;

impl ActivityLoader {
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ActivityRecord>, ActivityLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ActivityRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Build a catalogue from parsed records, preserving file order.
    ///
    /// Row numbers in errors are 1-based and do not count the header.
    pub fn load(records: &[ActivityRecord]) -> Result<ActivityCatalogue, ActivityLoaderError> {
        let mut catalogue = ActivityCatalogue::new();

        for (idx, record) in records.iter().enumerate() {
            let profile = ActivityProfile::new(
                record.code.as_str(),
                record.description.as_str(),
                record.coefficient,
            );
            catalogue
                .insert(profile)
                .map_err(|source| ActivityLoaderError::InvalidActivity {
                    row: idx + 1,
                    source,
                })?;
        }

        Ok(catalogue)
    }

    pub fn read<R: Read>(reader: R) -> Result<ActivityCatalogue, ActivityLoaderError> {
        let records = Self::parse(reader)?;
        Self::load(&records)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_parse_activities() {
        let csv = "code,description,coefficient\ntrader,Trader,0.40\nartisan,General artisan,0.67";

        let records = ActivityLoader::parse(csv.as_bytes()).expect("Failed to parse CSV");

        assert_eq!(
            records,
            vec![
                ActivityRecord {
                    code: "trader".to_string(),
                    description: "Trader".to_string(),
                    coefficient: dec!(0.40),
                },
                ActivityRecord {
                    code: "artisan".to_string(),
                    description: "General artisan".to_string(),
                    coefficient: dec!(0.67),
                },
            ]
        );
    }

    #[test]
    fn test_load_builds_catalogue() {
        let csv = "code,description,coefficient\nPhotographer,Photographer,0.78";

        let catalogue = ActivityLoader::read(csv.as_bytes()).expect("Failed to load");

        assert_eq!(catalogue.len(), 1);
        assert_eq!(catalogue.coefficient("photographer"), Some(dec!(0.78)));
    }

    #[test]
    fn test_load_reports_row_of_duplicate_code() {
        let csv = "code,description,coefficient\ntrader,Trader,0.40\nother,Other,0.86\ntrader,Again,0.40";

        let err = ActivityLoader::read(csv.as_bytes()).expect_err("Should reject duplicate");

        match err {
            ActivityLoaderError::InvalidActivity { row, source } => {
                assert_eq!(row, 3);
                assert_eq!(source, ActivityError::DuplicateCode("trader".to_string()));
            }
            other => panic!("expected InvalidActivity, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_percentage_coefficient() {
        let csv = "code,description,coefficient\ntrader,Trader,40";

        let err = ActivityLoader::read(csv.as_bytes()).expect_err("Should reject coefficient 40");

        let ActivityLoaderError::InvalidActivity { row, source } = err else {
            panic!("Expected InvalidActivity error, got: {:?}", err);
        };
        assert_eq!(row, 1);
        assert_eq!(
            source,
            ActivityError::InvalidCoefficient {
                code: "trader".to_string(),
                coefficient: dec!(40),
            }
        );
    }

    #[test]
    fn test_parse_invalid_coefficient() {
        let csv = "code,description,coefficient\ntrader,Trader,forty";

        let err = ActivityLoader::parse(csv.as_bytes()).expect_err("Should fail to parse");

        assert!(matches!(err, ActivityLoaderError::CsvParse(_)));
    }
}
