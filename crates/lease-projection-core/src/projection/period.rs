use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::Phase;
use crate::types::Money;

/// Income statement for a single projected year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitAndLoss {
    pub enrollment: Decimal,
    pub revenue: Money,
    pub rent: Money,
    pub staff_costs: Money,
    pub other_opex: Money,
    pub ebitda: Money,
    pub depreciation: Money,
    pub interest_expense: Money,
    pub interest_income: Money,
    pub zakat: Money,
    pub net_income: Money,
}

impl ProfitAndLoss {
    pub fn net_interest(&self) -> Money {
        self.interest_expense - self.interest_income
    }
}

/// Balance sheet at the end of a single projected year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub cash: Money,
    pub net_fixed_assets: Money,
    pub total_assets: Money,
    pub debt: Money,
    pub equity: Money,
    pub total_liabilities_and_equity: Money,
}

/// Cash flow statement for a single projected year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlow {
    pub opening_cash: Money,
    pub operating: Money,
    pub capex: Money,
    pub investing: Money,
    pub debt_drawn: Money,
    pub debt_repaid: Money,
    pub financing: Money,
    pub net_change: Money,
    pub closing_cash: Money,
    /// Operating cash flow less capital expenditure
    pub free_cash_flow: Money,
    /// Running free cash flow total. Pre-contract years count from the
    /// series start; contract years restart at contract start, so the
    /// contract figure is the one payback is measured on.
    pub cumulative_free_cash_flow: Money,
}

/// One projected year. Created once by the simulator, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodResult {
    pub year: i32,
    pub phase: Phase,
    /// Full years since the contract start; `None` before the contract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_offset: Option<u32>,
    pub profit_and_loss: ProfitAndLoss,
    pub balance_sheet: BalanceSheet,
    pub cash_flow: CashFlow,
}

impl PeriodResult {
    pub fn is_contract(&self) -> bool {
        self.phase == Phase::Contract
    }
}
