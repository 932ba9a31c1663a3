use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of netting an estimated liability against payments already made.
///
/// A signed balance of zero or less means the liability is fully covered;
/// the overpaid amount is reported as a credit.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use forfait_core::Balance;
///
/// assert_eq!(Balance::from_signed(dec!(120.50)), Balance::Due(dec!(120.50)));
/// assert_eq!(Balance::from_signed(dec!(-35.00)), Balance::Credit(dec!(35.00)));
/// assert_eq!(Balance::from_signed(dec!(0)), Balance::Credit(dec!(0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "amount", rename_all = "kebab-case")]
pub enum Balance {
    /// Amount still owed.
    Due(Decimal),
    /// Amount paid in excess.
    Credit(Decimal),
}

impl Balance {
    pub fn from_signed(balance: Decimal) -> Self {
        if balance > Decimal::ZERO {
            Self::Due(balance)
        } else {
            Self::Credit(balance.abs())
        }
    }

    /// The unsigned amount owed or credited.
    pub fn amount(&self) -> Decimal {
        match self {
            Self::Due(amount) | Self::Credit(amount) => *amount,
        }
    }

    pub fn is_due(&self) -> bool {
        matches!(self, Self::Due(_))
    }

}
