//! Activity codes and their profitability coefficients.
//!
//! Under the flat-rate regime taxable income is not revenue minus expenses:
//! it is revenue multiplied by a coefficient fixed per activity. The
//! [`ActivityCatalogue`] maps a short code to that coefficient.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building an [`ActivityCatalogue`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActivityError {
    #[error("activity code '{0}' is already registered")]
    DuplicateCode(String),

    #[error("activity code must not be empty")]
    EmptyCode,

    #[error("coefficient for activity '{code}' must be greater than 0 and at most 1, got {coefficient}")]
    InvalidCoefficient { code: String, coefficient: Decimal },
}

/// One activity and the share of its revenue that counts as taxable income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityProfile {
    pub code: String,
    pub description: String,
    pub coefficient: Decimal,
}

impl ActivityProfile {
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        coefficient: Decimal,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            coefficient,
        }
    }
}

/// Ordered collection of activity profiles with unique codes.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use forfait_core::ActivityCatalogue;
///
/// let catalogue = ActivityCatalogue::builtin();
///
/// assert_eq!(catalogue.coefficient("graphic-designer"), Some(dec!(0.78)));
/// assert_eq!(catalogue.coefficient("Trader"), Some(dec!(0.40)));
/// assert_eq!(catalogue.coefficient("astronaut"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCatalogue {
    profiles: Vec<ActivityProfile>,
}

impl ActivityCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled-in catalogue of common activities.
    pub fn builtin() -> Self {
        let profiles = vec![
            ActivityProfile::new(
                "graphic-designer",
                "Graphic designer (ATECO 74.10.29)",
                Decimal::new(78, 2),
            ),
            ActivityProfile::new("trader", "Trader", Decimal::new(40, 2)),
            ActivityProfile::new("artisan", "General artisan", Decimal::new(67, 2)),
            ActivityProfile::new("it-consultant", "IT consultant", Decimal::new(78, 2)),
            ActivityProfile::new("other", "Other activities", Decimal::new(86, 2)),
        ];
        Self { profiles }
    }

    /// Adds a profile, normalizing its code to trimmed lowercase.
    ///
    /// # Errors
    ///
    /// Fails when the code is empty or already present, or when the
    /// coefficient is outside (0, 1].
    pub fn insert(
        &mut self,
        mut profile: ActivityProfile,
    ) -> Result<(), ActivityError> {
        profile.code = normalize_code(&profile.code);
        if profile.code.is_empty() {
            return Err(ActivityError::EmptyCode);
        }
        if profile.coefficient <= Decimal::ZERO || profile.coefficient > Decimal::ONE {
            return Err(ActivityError::InvalidCoefficient {
                code: profile.code,
                coefficient: profile.coefficient,
            });
        }
        if self.get(&profile.code).is_some() {
            return Err(ActivityError::DuplicateCode(profile.code));
        }
        self.profiles.push(profile);
        Ok(())
    }

    /// Looks up a profile. Matching ignores case and surrounding whitespace.
    pub fn get(
        &self,
        code: &str,
    ) -> Option<&ActivityProfile> {
        let code = normalize_code(code);
        self.profiles.iter().find(|p| p.code == code)
    }

    pub fn coefficient(
        &self,
        code: &str,
    ) -> Option<Decimal> {
        self.get(code).map(|p| p.coefficient)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_lowercase()
}
