use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::policy_constants::{PolicyConstants, PolicyError};

/// Policy snapshots keyed by fiscal year.
///
/// Every snapshot is validated on insertion, so anything returned by
/// [`PolicyTable::get`] can be handed straight to a calculator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyTable {
    policies: BTreeMap<i32, PolicyConstants>,
}

impl PolicyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table containing only the compiled-in snapshots.
    pub fn builtin() -> Self {
        let policy = PolicyConstants::fiscal_year_2024();
        let mut policies = BTreeMap::new();
        policies.insert(policy.fiscal_year, policy);
        Self { policies }
    }

    /// Validates and registers a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::DuplicateFiscalYear`] if the year is already
    /// present, or the validation error of the snapshot itself.
    pub fn insert(
        &mut self,
        policy: PolicyConstants,
    ) -> Result<(), PolicyError> {
        policy.validate()?;
        if self.policies.contains_key(&policy.fiscal_year) {
            return Err(PolicyError::DuplicateFiscalYear(policy.fiscal_year));
        }
        self.policies.insert(policy.fiscal_year, policy);
        Ok(())
    }

    /// Snapshot for `fiscal_year`, if registered.
    pub fn get(
        &self,
        fiscal_year: i32,
    ) -> Option<&PolicyConstants> {
        self.policies.get(&fiscal_year)
    }

    /// Snapshot with the highest fiscal year.
    pub fn latest(&self) -> Option<&PolicyConstants> {
        self.policies.values().next_back()
    }

    /// Registered fiscal years in ascending order.
    pub fn fiscal_years(&self) -> Vec<i32> {
        self.policies.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}
