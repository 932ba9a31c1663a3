use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::utils::parse_decimal;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Tax and contribution estimator for the flat-rate regime.
///
/// Estimates the current period from revenue so far, or reconciles a
/// closed period against what was already paid.
#[derive(Debug, Parser)]
#[command(name = "forfait", version)]
pub struct Cli {
    /// TOML configuration file. Flags given on the command line win.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Fiscal year whose policy constants apply. Defaults to the latest known.
    #[arg(long, global = true)]
    pub year: Option<i32>,

    /// Policy CSV replacing the built-in constants.
    #[arg(long, global = true)]
    pub policy: Option<PathBuf>,

    /// Activities CSV replacing the built-in catalogue.
    #[arg(long, global = true)]
    pub activities: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Append log output to this file as well as stderr.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Estimate taxes and contributions accrued in the current period.
    Current(CurrentArgs),
    /// Reconcile a closed period against the amounts already paid.
    Prior(PriorArgs),
    /// Run every scenario in a CSV file.
    Batch(BatchArgs),
    /// List the activity catalogue.
    Activities,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct CurrentArgs {
    /// Revenue invoiced so far (e.g. `50,000.00`).
    #[arg(long, value_parser = parse_decimal)]
    pub revenue: Decimal,

    /// Activity code from the catalogue.
    #[arg(long, conflicts_with = "coefficient", required_unless_present = "coefficient")]
    pub activity: Option<String>,

    /// Profitability coefficient as a fraction (e.g. `0.78`).
    #[arg(long, value_parser = parse_decimal)]
    pub coefficient: Option<Decimal>,

    /// Registered artisan/trader; otherwise separate management.
    #[arg(long)]
    pub registered: bool,

    /// Claim the 35% contribution reduction.
    #[arg(long)]
    pub reduction: bool,

    /// Substitute tax rate in percent (5 or 15).
    #[arg(long, value_parser = parse_decimal, default_value = "5")]
    pub rate: Decimal,
}

#[derive(Debug, Args)]
pub struct PriorArgs {
    /// Revenue of the closed period.
    #[arg(long, value_parser = parse_decimal)]
    pub revenue: Decimal,

    /// Profitability coefficient as a fraction.
    #[arg(long, value_parser = parse_decimal)]
    pub coefficient: Decimal,

    /// Substitute tax rate in percent (5 or 15).
    #[arg(long, value_parser = parse_decimal, default_value = "5")]
    pub rate: Decimal,

    /// Do not apply the 35% contribution reduction.
    #[arg(long)]
    pub no_reduction: bool,

    /// Contributions were due under separate management.
    #[arg(long)]
    pub separate_management: bool,

    /// Contributions paid within the period.
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub contributions_paid: Decimal,

    /// The fourth fixed installment was paid after the period closed.
    #[arg(long)]
    pub fourth_installment_paid: bool,

    /// Substitute tax already paid for the period.
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub tax_paid: Decimal,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// Scenario CSV (`label,revenue,activity,coefficient,regime,reduction,rate`).
    pub file: PathBuf,
}
