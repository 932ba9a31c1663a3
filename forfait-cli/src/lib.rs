//! Command-line host for the flat-rate estimator: argument parsing,
//! configuration, logging and rendering around `forfait-core`.

pub mod app;
pub mod cli;
pub mod config;
pub mod display;
pub mod logging;
pub mod utils;
