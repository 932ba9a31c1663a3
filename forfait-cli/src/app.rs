use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use forfait_core::{
    ActivityCatalogue, CalculationInput, ContributionRegime, CurrentPeriodCalculator,
    PolicyConstants, PolicyTable, PriorPeriodInput, PriorPeriodReconciler, SubstituteTaxRate,
};
use forfait_data::{ActivityLoader, PolicyLoader, scenario_loader};
use tracing::{debug, info};

use crate::cli::{BatchArgs, Command, CurrentArgs, PriorArgs};
use crate::config::Settings;
use crate::display::{self, BatchEntry};

/// Policy table from `path`, or the built-in table when no file is given.
pub fn load_policy_table(path: Option<&Path>) -> Result<PolicyTable> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open policy file '{}'", path.display()))?;
            let table = PolicyLoader::read(BufReader::new(file))
                .with_context(|| format!("cannot load policy file '{}'", path.display()))?;
            if table.is_empty() {
                anyhow::bail!("policy file '{}' has no fiscal years", path.display());
            }
            info!(path = %path.display(), years = ?table.fiscal_years(), "Loaded policy table");
            Ok(table)
        }
        None => Ok(PolicyTable::builtin()),
    }
}

/// Activity catalogue from `path`, or the built-in catalogue.
pub fn load_catalogue(path: Option<&Path>) -> Result<ActivityCatalogue> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open activities file '{}'", path.display()))?;
            let catalogue = ActivityLoader::read(BufReader::new(file))
                .with_context(|| format!("cannot load activities file '{}'", path.display()))?;
            info!(path = %path.display(), activities = catalogue.len(), "Loaded activity catalogue");
            Ok(catalogue)
        }
        None => Ok(ActivityCatalogue::builtin()),
    }
}

/// The requested fiscal year, or the latest one in `table`.
pub fn select_policy(
    table: &PolicyTable,
    year: Option<i32>,
) -> Result<&PolicyConstants> {
    let policy = match year {
        Some(year) => table.get(year).ok_or_else(|| {
            anyhow!(
                "no policy for fiscal year {year}; known years: {:?}",
                table.fiscal_years()
            )
        })?,
        None => table
            .latest()
            .ok_or_else(|| anyhow!("policy table is empty"))?,
    };
    debug!(fiscal_year = policy.fiscal_year, "Selected policy");
    Ok(policy)
}

fn lookup_activity(
    catalogue: &ActivityCatalogue,
    code: &str,
) -> Result<rust_decimal::Decimal> {
    catalogue.coefficient(code).ok_or_else(|| {
        let known: Vec<&str> = catalogue.iter().map(|p| p.code.as_str()).collect();
        anyhow!("unknown activity '{code}'; known activities: {}", known.join(", "))
    })
}

fn run_current(
    args: &CurrentArgs,
    policy: &PolicyConstants,
    catalogue: &ActivityCatalogue,
    settings: &Settings,
) -> Result<String> {
    let coefficient = match (&args.activity, args.coefficient) {
        (Some(code), _) => lookup_activity(catalogue, code)?,
        (None, Some(value)) => value,
        (None, None) => anyhow::bail!("either --activity or --coefficient is required"),
    };
    let input = CalculationInput {
        revenue: args.revenue,
        coefficient,
        regime: ContributionRegime::from_registration(args.registered),
        has_reduction: args.reduction,
        substitute_tax_rate: SubstituteTaxRate::from_percent(args.rate, policy)?,
    };

    let result = CurrentPeriodCalculator::new(policy)
        .calculate(&input)
        .context("current-period estimate failed")?;
    display::render_current(settings.format, policy, &input, &result)
}

fn run_prior(
    args: &PriorArgs,
    policy: &PolicyConstants,
    settings: &Settings,
) -> Result<String> {
    let input = PriorPeriodInput {
        revenue: args.revenue,
        coefficient: args.coefficient,
        substitute_tax_rate: SubstituteTaxRate::from_percent(args.rate, policy)?,
        has_reduction: !args.no_reduction,
        regime: ContributionRegime::from_registration(!args.separate_management),
        contributions_already_paid: args.contributions_paid,
        fourth_installment_paid: args.fourth_installment_paid,
        tax_already_paid: args.tax_paid,
    };

    let result = PriorPeriodReconciler::new(policy)
        .reconcile(&input)
        .context("prior-period reconciliation failed")?;
    display::render_prior(settings.format, policy, &input, &result)
}

fn run_batch(
    args: &BatchArgs,
    policy: &PolicyConstants,
    catalogue: &ActivityCatalogue,
    settings: &Settings,
) -> Result<String> {
    let scenarios = scenario_loader::load_from_file(&args.file)
        .with_context(|| format!("cannot load scenarios from '{}'", args.file.display()))?;
    let calculator = CurrentPeriodCalculator::new(policy);

    let entries = scenarios
        .into_iter()
        .map(|scenario| {
            let input = scenario
                .to_input(catalogue, policy)
                .with_context(|| format!("scenario '{}'", scenario.label))?;
            let result = calculator
                .calculate(&input)
                .with_context(|| format!("scenario '{}'", scenario.label))?;
            Ok(BatchEntry {
                label: scenario.label,
                input,
                result,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(scenarios = entries.len(), "Batch complete");
    display::render_batch(settings.format, policy, &entries)
}

/// Runs `command` with the data sources named in `settings` and returns the
/// rendered output.
pub fn run(
    command: &Command,
    settings: &Settings,
) -> Result<String> {
    let catalogue = load_catalogue(settings.activities_file.as_deref())?;
    if let Command::Activities = command {
        return display::render_activities(settings.format, &catalogue);
    }

    let table = load_policy_table(settings.policy_file.as_deref())?;
    let policy = select_policy(&table, settings.fiscal_year)?;

    match command {
        Command::Current(args) => run_current(args, policy, &catalogue, settings),
        Command::Prior(args) => run_prior(args, policy, settings),
        Command::Batch(args) => run_batch(args, policy, &catalogue, settings),
        Command::Activities => display::render_activities(settings.format, &catalogue),
    }
}
