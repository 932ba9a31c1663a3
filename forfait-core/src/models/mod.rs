mod activity_profile;
mod balance;
mod contribution_regime;
mod policy_constants;
mod policy_table;
mod substitute_tax_rate;

pub use activity_profile::{ActivityCatalogue, ActivityError, ActivityProfile};
pub use balance::Balance;
pub use contribution_regime::ContributionRegime;
pub use policy_constants::{PolicyConstants, PolicyError};
pub use policy_table::PolicyTable;
pub use substitute_tax_rate::SubstituteTaxRate;
