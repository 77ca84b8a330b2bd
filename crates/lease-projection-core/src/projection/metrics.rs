use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LeaseProjectionError;
use crate::projection::period::PeriodResult;
use crate::time_value::{irr, npv, payback_period};
use crate::types::{Money, Rate, Years};
use crate::LeaseProjectionResult;

/// Summary investment metrics over the contract phase.
///
/// `irr`, `payback_period_years`, `roi` and `average_rent_to_revenue` are
/// `None` when mathematically undefined; zero is always a computed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub npv: Money,
    pub irr: Option<Rate>,
    pub payback_period_years: Option<Years>,
    pub roi: Option<Rate>,
    pub total_rent: Money,
    pub total_revenue: Money,
    pub total_net_income: Money,
    pub total_capex: Money,
    pub average_ebitda: Money,
    pub average_rent_to_revenue: Option<Rate>,
    /// Highest closing debt over the whole series
    pub peak_debt: Money,
    /// Closing cash of the last projected year
    pub final_cash: Money,
    /// Lowest closing cash over the contract phase
    pub minimum_cash: Money,
    pub contract_years: u32,
}

/// Reduce the period sequence to summary metrics. Free cash flows are
/// discounted by their contract offset, so the first contract year is
/// undiscounted.
pub fn compute_metrics(
    periods: &[PeriodResult],
    discount_rate: Rate,
) -> LeaseProjectionResult<Metrics> {
    let contract: Vec<&PeriodResult> = periods.iter().filter(|p| p.is_contract()).collect();
    if contract.is_empty() {
        return Err(LeaseProjectionError::InsufficientData(
            "Metrics require at least one contract year".into(),
        ));
    }

    let fcf: Vec<Money> = contract.iter().map(|p| p.cash_flow.free_cash_flow).collect();
    let n = Decimal::from(contract.len() as u64);

    let total_rent: Money = contract.iter().map(|p| p.profit_and_loss.rent).sum();
    let total_revenue: Money = contract.iter().map(|p| p.profit_and_loss.revenue).sum();
    let total_net_income: Money = contract.iter().map(|p| p.profit_and_loss.net_income).sum();
    let total_capex: Money = contract.iter().map(|p| p.cash_flow.capex).sum();
    let total_ebitda: Money = contract.iter().map(|p| p.profit_and_loss.ebitda).sum();

    let roi = if total_capex.is_zero() {
        None
    } else {
        Some(total_net_income / total_capex)
    };
    let average_rent_to_revenue = if total_revenue.is_zero() {
        None
    } else {
        Some(total_rent / total_revenue)
    };

    let peak_debt = periods
        .iter()
        .map(|p| p.balance_sheet.debt)
        .max()
        .unwrap_or(Decimal::ZERO);
    let final_cash = periods
        .last()
        .map(|p| p.balance_sheet.cash)
        .unwrap_or(Decimal::ZERO);
    let minimum_cash = contract
        .iter()
        .map(|p| p.balance_sheet.cash)
        .min()
        .unwrap_or(Decimal::ZERO);

    Ok(Metrics {
        npv: npv(discount_rate, &fcf)?,
        irr: irr(&fcf),
        payback_period_years: payback_period(&fcf),
        roi,
        total_rent,
        total_revenue,
        total_net_income,
        total_capex,
        average_ebitda: total_ebitda / n,
        average_rent_to_revenue,
        peak_debt,
        final_cash,
        minimum_cash,
        contract_years: contract.len() as u32,
    })
}
