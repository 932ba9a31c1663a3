//! CSV sources for the flat-rate engine: fiscal-year policy tables,
//! activity catalogues and batch scenario files.

mod activity_loader;
mod policy_loader;
pub mod scenario_loader;

pub use activity_loader::{ActivityLoader, ActivityLoaderError, ActivityRecord};
pub use policy_loader::{PolicyLoader, PolicyLoaderError, PolicyRecord};
pub use scenario_loader::{CoefficientSource, Scenario, ScenarioError, ScenarioLoadError};
