use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use lease_projection_core::assumptions::Phase;
use lease_projection_core::run_projection;

use crate::input;

/// Arguments for a full projection run
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to a proposal file (.json, .yaml or .yml)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the period statement listing
#[derive(Args)]
pub struct PeriodsArgs {
    /// Path to a proposal file (.json, .yaml or .yml)
    #[arg(long)]
    pub input: Option<String>,

    /// Only list contract years
    #[arg(long)]
    pub contract_only: bool,
}

/// One flattened statement line per year, for table and CSV output
#[derive(Debug, Serialize)]
struct PeriodRow {
    year: i32,
    phase: Phase,
    enrollment: Decimal,
    revenue: Decimal,
    rent: Decimal,
    staff_costs: Decimal,
    ebitda: Decimal,
    depreciation: Decimal,
    net_income: Decimal,
    capex: Decimal,
    free_cash_flow: Decimal,
    cash: Decimal,
    debt: Decimal,
    equity: Decimal,
    balanced: bool,
    reconciled: bool,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let proposal = input::load_proposal(args.input.as_deref())?;
    let output = run_projection(&proposal)?;
    Ok(serde_json::to_value(output)?)
}

pub fn run_periods(args: PeriodsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let proposal = input::load_proposal(args.input.as_deref())?;
    let output = run_projection(&proposal)?;

    let rows: Vec<PeriodRow> = output
        .periods
        .iter()
        .zip(&output.validation.periods)
        .filter(|(p, _)| !args.contract_only || p.is_contract())
        .map(|(p, check)| PeriodRow {
            year: p.year,
            phase: p.phase,
            enrollment: p.profit_and_loss.enrollment,
            revenue: p.profit_and_loss.revenue.round_dp(2),
            rent: p.profit_and_loss.rent.round_dp(2),
            staff_costs: p.profit_and_loss.staff_costs.round_dp(2),
            ebitda: p.profit_and_loss.ebitda.round_dp(2),
            depreciation: p.profit_and_loss.depreciation.round_dp(2),
            net_income: p.profit_and_loss.net_income.round_dp(2),
            capex: p.cash_flow.capex.round_dp(2),
            free_cash_flow: p.cash_flow.free_cash_flow.round_dp(2),
            cash: p.balance_sheet.cash.round_dp(2),
            debt: p.balance_sheet.debt.round_dp(2),
            equity: p.balance_sheet.equity.round_dp(2),
            balanced: check.balanced,
            reconciled: check.reconciled,
        })
        .collect();

    Ok(serde_json::to_value(rows)?)
}
