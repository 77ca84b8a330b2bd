use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::projection::period::PeriodResult;
use crate::types::Money;

/// Rounding residue allowed by both identity checks.
pub const TOLERANCE: Decimal = dec!(0.01);

/// Outcome of both accounting identities for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCheck {
    pub year: i32,
    pub balanced: bool,
    pub reconciled: bool,
    /// total assets − (debt + equity)
    pub balance_difference: Money,
    /// (opening cash + operating + investing + financing) − closing cash
    pub reconciliation_difference: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub all_periods_balanced: bool,
    pub all_cash_flows_reconciled: bool,
    pub periods: Vec<PeriodCheck>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.all_periods_balanced && self.all_cash_flows_reconciled
    }

    pub fn failures(&self) -> impl Iterator<Item = &PeriodCheck> {
        self.periods.iter().filter(|c| !c.balanced || !c.reconciled)
    }
}

/// Check `assets == debt + equity` and the cash-flow identity for every
/// period. The opening cash of each period is taken from the previous
/// period's balance sheet, so a break in the carry-forward shows up here.
pub fn validate_periods(periods: &[PeriodResult], opening_cash: Money) -> ValidationResult {
    let mut prior_cash = opening_cash;
    let mut checks = Vec::with_capacity(periods.len());

    for p in periods {
        let bs = &p.balance_sheet;
        let cf = &p.cash_flow;

        let balance_difference = bs.total_assets - (bs.debt + bs.equity);
        let reconciliation_difference =
            prior_cash + cf.operating + cf.investing + cf.financing - bs.cash;

        checks.push(PeriodCheck {
            year: p.year,
            balanced: balance_difference.abs() <= TOLERANCE,
            reconciled: reconciliation_difference.abs() <= TOLERANCE,
            balance_difference,
            reconciliation_difference,
        });
        prior_cash = bs.cash;
    }

    ValidationResult {
        all_periods_balanced: checks.iter().all(|c| c.balanced),
        all_cash_flows_reconciled: checks.iter().all(|c| c.reconciled),
        periods: checks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::sample_input;
    use crate::projection::simulator::simulate;

    #[test]
    fn test_simulated_periods_pass_both_checks() {
        let input = sample_input();
        let out = simulate(&input).unwrap();
        let result = validate_periods(&out.periods, input.opening_position.cash);
        assert!(result.all_periods_balanced);
        assert!(result.all_cash_flows_reconciled);
        assert_eq!(result.periods.len(), out.periods.len());
        assert_eq!(result.failures().count(), 0);
    }

    #[test]
    fn test_unbalanced_period_is_flagged_not_dropped() {
        let input = sample_input();
        let mut periods = simulate(&input).unwrap().periods;
        periods[10].balance_sheet.total_assets += dec!(5);
        let result = validate_periods(&periods, input.opening_position.cash);
        assert!(!result.all_periods_balanced);
        assert!(result.all_cash_flows_reconciled);
        let failed: Vec<i32> = result.failures().map(|c| c.year).collect();
        assert_eq!(failed, vec![periods[10].year]);
        assert_eq!(result.periods[10].balance_difference, dec!(5));
    }

    #[test]
    fn test_broken_carry_forward_fails_reconciliation() {
        let input = sample_input();
        let mut periods = simulate(&input).unwrap().periods;
        periods[3].balance_sheet.cash += dec!(1);
        periods[3].balance_sheet.total_assets += dec!(1);
        periods[3].balance_sheet.equity += dec!(1);
        let result = validate_periods(&periods, input.opening_position.cash);
        assert!(result.all_periods_balanced);
        assert!(!result.all_cash_flows_reconciled);
        // the altered closing cash and the next period's opening both break
        assert!(!result.periods[3].reconciled);
        assert!(!result.periods[4].reconciled);
    }

    #[test]
    fn test_residue_within_tolerance_passes() {
        let input = sample_input();
        let mut periods = simulate(&input).unwrap().periods;
        periods[0].balance_sheet.total_assets += dec!(0.004);
        let result = validate_periods(&periods, input.opening_position.cash);
        assert!(result.all_periods_balanced);
    }
}
