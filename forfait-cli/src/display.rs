//! Text and JSON rendering of calculator results.
//!
//! Text output shows every amount as `€ 1,234.56`. JSON output serializes
//! the rounded result types directly; decimals appear as strings.

use std::fmt::Write as _;

use anyhow::Result;
use forfait_core::{
    ActivityCatalogue, Balance, CalculationInput, CalculationResult, ContributionBreakdown,
    PolicyConstants, PriorPeriodInput, PriorPeriodResult,
};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::utils::{format_currency, format_percent};

const LABEL_WIDTH: usize = 46;

// ─── text layout ─────────────────────────────────────────────────────────────

/// Two-column block: labels left, amounts right-aligned.
#[derive(Default)]
struct Sheet {
    out: String,
}

impl Sheet {
    fn heading(
        &mut self,
        text: &str,
    ) -> &mut Self {
        let _ = writeln!(self.out, "{text}");
        self
    }

    fn row(
        &mut self,
        label: &str,
        value: String,
    ) -> &mut Self {
        let _ = writeln!(self.out, "  {label:<LABEL_WIDTH$}{value:>16}");
        self
    }

    fn finish(self) -> String {
        self.out
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn balance_text(balance: Balance) -> String {
    let status = if balance.is_due() { "due" } else { "credit" };
    format!("{} {status}", format_currency(balance.amount()))
}

fn contribution_rows(
    sheet: &mut Sheet,
    contributions: &ContributionBreakdown,
    policy: &PolicyConstants,
) {
    match contributions {
        ContributionBreakdown::RegisteredTrader {
            fixed, variable, ..
        } => {
            sheet.row("Fixed contribution", format_currency(*fixed));
            sheet.row(
                &format!(
                    "Variable contribution ({} above {})",
                    format_percent(policy.variable_contribution_rate),
                    format_currency(policy.contribution_threshold)
                ),
                format_currency(*variable),
            );
            sheet.row("Contributions total", format_currency(contributions.total()));
        }
        ContributionBreakdown::SeparateManagement { amount } => {
            sheet.row(
                &format!(
                    "Separate management ({})",
                    format_percent(policy.separate_management_rate)
                ),
                format_currency(*amount),
            );
        }
    }
}

// ─── current period ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CurrentReport<'a> {
    fiscal_year: i32,
    input: &'a CalculationInput,
    result: CalculationResult,
}

fn current_text(
    policy: &PolicyConstants,
    input: &CalculationInput,
    result: &CalculationResult,
) -> String {
    let mut sheet = Sheet::default();
    sheet.heading(&format!(
        "Fiscal year {} · {} · reduction: {}",
        policy.fiscal_year,
        result.contributions.regime().label(),
        yes_no(input.has_reduction)
    ));
    sheet.row(
        &format!(
            "Taxable income ({} of {})",
            format_percent(input.coefficient),
            format_currency(result.revenue)
        ),
        format_currency(result.taxable_income),
    );
    contribution_rows(&mut sheet, &result.contributions, policy);
    sheet.row("Taxable base", format_currency(result.taxable_base));
    sheet.row(
        &format!(
            "Substitute tax ({})",
            format_percent(result.substitute_tax_rate)
        ),
        format_currency(result.substitute_tax),
    );
    if input.regime.is_registered_trader() {
        sheet.row("Chamber of commerce fee", format_currency(result.chamber_fee));
    }
    sheet.row("Total tax burden", format_currency(result.total_tax_burden));
    sheet.row("Net income", format_currency(result.net_income));
    sheet.finish()
}

/// Renders a current-period estimate. Amounts are rounded to cents.
pub fn render_current(
    format: OutputFormat,
    policy: &PolicyConstants,
    input: &CalculationInput,
    result: &CalculationResult,
) -> Result<String> {
    let rounded = result.rounded();
    match format {
        OutputFormat::Text => Ok(current_text(policy, input, &rounded)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&CurrentReport {
            fiscal_year: policy.fiscal_year,
            input,
            result: rounded,
        })?),
    }
}

// ─── prior period ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct PriorReport<'a> {
    fiscal_year: i32,
    input: &'a PriorPeriodInput,
    result: PriorPeriodResult,
    contribution_status: Balance,
    tax_status: Balance,
}

fn prior_text(
    policy: &PolicyConstants,
    input: &PriorPeriodInput,
    result: &PriorPeriodResult,
) -> String {
    let mut sheet = Sheet::default();
    sheet.heading(&format!(
        "Fiscal year {} reconciliation · {} · reduction: {}",
        policy.fiscal_year,
        result.contributions.regime().label(),
        yes_no(input.has_reduction)
    ));
    sheet.row("Taxable income", format_currency(result.taxable_income));
    contribution_rows(&mut sheet, &result.contributions, policy);
    sheet.row("Taxable base", format_currency(result.taxable_base));
    sheet.row(
        &format!(
            "Estimated substitute tax ({})",
            format_percent(result.substitute_tax_rate)
        ),
        format_currency(result.estimated_tax),
    );
    if input.fourth_installment_paid && !result.fourth_installment_amount.is_zero() {
        sheet.row(
            "Fourth installment paid after year end",
            format_currency(result.fourth_installment_amount),
        );
    }
    sheet.row(
        "Contributions paid",
        format_currency(result.total_contributions_paid),
    );
    sheet.row("Substitute tax paid", format_currency(result.tax_already_paid));
    sheet.row(
        "Contribution balance",
        balance_text(result.contribution_status()),
    );
    sheet.row("Substitute tax balance", balance_text(result.tax_status()));
    sheet.finish()
}

/// Renders a prior-period reconciliation. Amounts are rounded to cents.
pub fn render_prior(
    format: OutputFormat,
    policy: &PolicyConstants,
    input: &PriorPeriodInput,
    result: &PriorPeriodResult,
) -> Result<String> {
    let rounded = result.rounded();
    match format {
        OutputFormat::Text => Ok(prior_text(policy, input, &rounded)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&PriorReport {
            fiscal_year: policy.fiscal_year,
            input,
            contribution_status: rounded.contribution_status(),
            tax_status: rounded.tax_status(),
            result: rounded,
        })?),
    }
}

// ─── batch ───────────────────────────────────────────────────────────────────

/// One evaluated scenario of a batch run.
#[derive(Debug, Serialize)]
pub struct BatchEntry {
    pub label: String,
    pub input: CalculationInput,
    pub result: CalculationResult,
}

#[derive(Debug, Serialize)]
struct BatchReport<'a> {
    fiscal_year: i32,
    scenarios: Vec<CurrentReportEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct CurrentReportEntry<'a> {
    label: &'a str,
    input: &'a CalculationInput,
    result: CalculationResult,
}

/// Renders a batch: one text block per scenario, or a single JSON document.
pub fn render_batch(
    format: OutputFormat,
    policy: &PolicyConstants,
    entries: &[BatchEntry],
) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let blocks: Vec<String> = entries
                .iter()
                .map(|entry| {
                    format!(
                        "[{}]\n{}",
                        entry.label,
                        current_text(policy, &entry.input, &entry.result.rounded())
                    )
                })
                .collect();
            Ok(blocks.join("\n"))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&BatchReport {
            fiscal_year: policy.fiscal_year,
            scenarios: entries
                .iter()
                .map(|entry| CurrentReportEntry {
                    label: &entry.label,
                    input: &entry.input,
                    result: entry.result.rounded(),
                })
                .collect(),
        })?),
    }
}

// ─── activities ──────────────────────────────────────────────────────────────

pub fn render_activities(
    format: OutputFormat,
    catalogue: &ActivityCatalogue,
) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            for profile in catalogue.iter() {
                let _ = writeln!(
                    out,
                    "{:<20}{:>6}  {}",
                    profile.code,
                    format_percent(profile.coefficient),
                    profile.description
                );
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let profiles: Vec<_> = catalogue.iter().collect();
            Ok(serde_json::to_string_pretty(&profiles)?)
        }
    }
}
