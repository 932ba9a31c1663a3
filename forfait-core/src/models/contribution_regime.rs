use serde::{Deserialize, Serialize};

/// Social-security scheme the taxpayer contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributionRegime {
    /// Artisan or trader enrolled in the trade register: fixed plus variable
    /// contributions and the chamber of commerce fee.
    RegisteredTrader,
    /// Freelancer without a trade-register enrollment: a single
    /// percentage-based contribution.
    SeparateManagement,
}

impl ContributionRegime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RegisteredTrader => "registered-trader",
            Self::SeparateManagement => "separate-management",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RegisteredTrader => "Registered artisan/trader",
            Self::SeparateManagement => "Separate management",
        }
    }

    /// Accepts the canonical code plus the short forms `registered` and
    /// `separate`. Matching is case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "registered-trader" | "registered" => Some(Self::RegisteredTrader),
            "separate-management" | "separate" => Some(Self::SeparateManagement),
            _ => None,
        }
    }

    /// Maps the trade-register enrollment flag to a regime.
    pub fn from_registration(is_registered_trader: bool) -> Self {
        if is_registered_trader {
            Self::RegisteredTrader
        } else {
            Self::SeparateManagement
        }
    }

    pub fn is_registered_trader(&self) -> bool {
        matches!(self, Self::RegisteredTrader)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_round_trips_canonical_codes() {
        for regime in [
            ContributionRegime::RegisteredTrader,
            ContributionRegime::SeparateManagement,
        ] {
            assert_eq!(ContributionRegime::parse(regime.as_str()), Some(regime));
        }
    }

    #[test]
    fn parse_accepts_short_forms_ignoring_case() {
        assert_eq!(
            ContributionRegime::parse(" Registered "),
            Some(ContributionRegime::RegisteredTrader)
        );
        assert_eq!(
            ContributionRegime::parse("SEPARATE"),
            Some(ContributionRegime::SeparateManagement)
        );
    }

    #[test]
    fn parse_rejects_unknown_code() {
        assert_eq!(ContributionRegime::parse("employee"), None);
    }

    #[test]
    fn from_registration_maps_flag() {
        assert_eq!(
            ContributionRegime::from_registration(true),
            ContributionRegime::RegisteredTrader
        );
        assert_eq!(
            ContributionRegime::from_registration(false),
            ContributionRegime::SeparateManagement
        );
    }
}
