use rust_decimal::Decimal;
use tracing::debug;

use crate::assumptions::{validate_input, Phase, ProjectionInput};
use crate::capex::ledger::AssetLedger;
use crate::error::LeaseProjectionError;
use crate::projection::period::{BalanceSheet, CashFlow, PeriodResult, ProfitAndLoss};
use crate::schedule::resolver::{resolve_contract_year, resolve_transition_year};
use crate::schedule::step::compound;
use crate::types::Money;
use crate::LeaseProjectionResult;

/// Everything a full simulation produces before validation and metrics.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub periods: Vec<PeriodResult>,
    pub ledger: AssetLedger,
    pub warnings: Vec<String>,
}

/// Revenue and cash operating costs for one year, whatever the data source.
struct OperatingLine {
    enrollment: Decimal,
    revenue: Money,
    rent: Money,
    staff_costs: Money,
    other_opex: Money,
}

/// Balances carried from one year-end to the next year's opening.
struct CarryForward {
    cash: Money,
    debt: Money,
    equity: Money,
    cumulative_fcf: Money,
}

/// Run the year-by-year projection: historical actuals, transition bridge
/// years, then the fully simulated contract years.
///
/// Interest and zakat are computed on opening balances, so every year is
/// solved in one pass without a circular reference.
pub fn simulate(input: &ProjectionInput) -> LeaseProjectionResult<SimulationOutcome> {
    validate_input(input)?;

    let timeline = input.timeline;
    let rates = &input.rates;
    let mut ledger = AssetLedger::from_config(&input.capex, timeline)?;
    let mut warnings: Vec<String> = Vec::new();
    let mut periods = Vec::with_capacity(timeline.total_years());

    // Carry-forward state from the opening position. No asset predates the
    // first year, so opening equity is cash less debt.
    let mut prior = CarryForward {
        cash: input.opening_position.cash,
        debt: input.opening_position.debt,
        equity: input.opening_position.cash - input.opening_position.debt,
        cumulative_fcf: Decimal::ZERO,
    };

    let mut current_phase: Option<Phase> = None;

    for year in timeline.years() {
        let phase = timeline.phase_of(year);
        if current_phase != Some(phase) {
            debug!(year, ?phase, "entering phase");
            current_phase = Some(phase);
        }

        // ---------------------------------------------------------------
        // Revenue and cash operating costs
        // ---------------------------------------------------------------
        let line = operating_line(input, phase, year)?;

        if phase == Phase::Contract {
            ledger.reinvest(&input.capex, year, line.revenue);
        }
        let assets = ledger.period(year);

        // ---------------------------------------------------------------
        // Income statement (interest and zakat on opening balances)
        // ---------------------------------------------------------------
        let ebitda = line.revenue - line.rent - line.staff_costs - line.other_opex;
        let interest_expense = prior.debt * rates.debt_interest_rate;
        let deposit_base = (prior.cash - rates.minimum_cash_balance).max(Decimal::ZERO);
        let interest_income = deposit_base * rates.deposit_interest_rate;
        let zakat = prior.equity.max(Decimal::ZERO) * rates.zakat_rate;
        let net_income =
            ebitda - assets.depreciation - (interest_expense - interest_income) - zakat;

        // ---------------------------------------------------------------
        // Cash and debt balancing against the minimum cash covenant
        // ---------------------------------------------------------------
        let operating_cf = net_income + assets.depreciation;
        let investing_cf = -assets.capex;
        let preliminary_cash = prior.cash + operating_cf + investing_cf;

        let (debt_drawn, debt_repaid) = if phase == Phase::Contract {
            if preliminary_cash < rates.minimum_cash_balance {
                (rates.minimum_cash_balance - preliminary_cash, Decimal::ZERO)
            } else {
                let excess = preliminary_cash - rates.minimum_cash_balance;
                (Decimal::ZERO, excess.min(prior.debt).max(Decimal::ZERO))
            }
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        let financing_cf = debt_drawn - debt_repaid;
        let closing_cash = preliminary_cash + financing_cf;
        let closing_debt = prior.debt + debt_drawn - debt_repaid;
        let equity = prior.equity + net_income;

        // ---------------------------------------------------------------
        // Statements
        // ---------------------------------------------------------------
        let fcf = operating_cf - assets.capex;
        // contract years restart the running total, the base payback reads
        let cumulative_fcf = if timeline.contract_offset(year) == Some(0) {
            fcf
        } else {
            prior.cumulative_fcf + fcf
        };

        let balance_sheet = BalanceSheet {
            cash: closing_cash,
            net_fixed_assets: assets.net_book_value,
            total_assets: closing_cash + assets.net_book_value,
            debt: closing_debt,
            equity,
            total_liabilities_and_equity: closing_debt + equity,
        };

        let cash_flow = CashFlow {
            opening_cash: prior.cash,
            operating: operating_cf,
            capex: assets.capex,
            investing: investing_cf,
            debt_drawn,
            debt_repaid,
            financing: financing_cf,
            net_change: closing_cash - prior.cash,
            closing_cash,
            free_cash_flow: fcf,
            cumulative_free_cash_flow: cumulative_fcf,
        };

        let profit_and_loss = ProfitAndLoss {
            enrollment: line.enrollment,
            revenue: line.revenue,
            rent: line.rent,
            staff_costs: line.staff_costs,
            other_opex: line.other_opex,
            ebitda,
            depreciation: assets.depreciation,
            interest_expense,
            interest_income,
            zakat,
            net_income,
        };

        // Warnings
        if net_income < Decimal::ZERO {
            warnings.push(format!("Year {year}: net loss ({net_income})"));
        }
        if line.rent > line.revenue {
            warnings.push(format!(
                "Year {year}: rent ({}) exceeds revenue ({})",
                line.rent, line.revenue
            ));
        }
        if phase != Phase::Contract && closing_cash < rates.minimum_cash_balance {
            warnings.push(format!(
                "Year {year}: cash ({closing_cash}) below minimum balance before contract start"
            ));
        }

        debug!(
            year,
            revenue = %line.revenue,
            net_income = %net_income,
            cash = %closing_cash,
            debt = %closing_debt,
            "period simulated"
        );

        periods.push(PeriodResult {
            year,
            phase,
            contract_offset: timeline.contract_offset(year),
            profit_and_loss,
            balance_sheet,
            cash_flow,
        });

        // Advance carry-forward state
        prior = CarryForward {
            cash: closing_cash,
            debt: closing_debt,
            equity,
            cumulative_fcf,
        };
    }

    Ok(SimulationOutcome {
        periods,
        ledger,
        warnings,
    })
}

fn operating_line(
    input: &ProjectionInput,
    phase: Phase,
    year: i32,
) -> LeaseProjectionResult<OperatingLine> {
    match phase {
        Phase::Historical => {
            let h = input
                .historical
                .iter()
                .find(|h| h.year == year)
                .ok_or_else(|| {
                    LeaseProjectionError::InconsistentTimeline(format!(
                        "No historical record for {year}"
                    ))
                })?;
            Ok(OperatingLine {
                enrollment: h.enrollment,
                revenue: h.revenue,
                rent: h.rent,
                staff_costs: h.staff_costs,
                other_opex: h.other_opex,
            })
        }
        Phase::Transition => {
            let ty = input
                .transition
                .years
                .iter()
                .find(|t| t.year == year)
                .ok_or_else(|| {
                    LeaseProjectionError::InconsistentTimeline(format!(
                        "No transition record for {year}"
                    ))
                })?;
            let drivers = resolve_transition_year(input, ty);
            let elapsed = (year - input.timeline.transition_start()) as u32;
            let rent = input.transition.base_rent
                * compound(input.transition.rent_growth_rate, elapsed);
            Ok(OperatingLine {
                enrollment: drivers.enrollment,
                revenue: drivers.revenue,
                rent,
                staff_costs: drivers.staff_costs,
                other_opex: drivers.revenue * input.other_opex_pct,
            })
        }
        Phase::Contract => {
            let drivers = resolve_contract_year(input, year);
            let rent = input
                .rent
                .rent_for(input.timeline.contract_start_year, year, drivers.revenue);
            Ok(OperatingLine {
                enrollment: drivers.enrollment,
                revenue: drivers.revenue,
                rent: rent.total,
                staff_costs: drivers.staff_costs,
                other_opex: drivers.revenue * input.other_opex_pct,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::sample_input;
    use crate::capex::reinvestment::{ReinvestmentPolicy, ReinvestmentSizing, ReinvestmentTrigger};
    use crate::rent::RentModel;
    use rust_decimal_macros::dec;

    fn run() -> SimulationOutcome {
        simulate(&sample_input()).unwrap()
    }

    #[test]
    fn test_one_period_per_year_without_gaps() {
        let out = run();
        assert_eq!(out.periods.len(), 35);
        for (i, p) in out.periods.iter().enumerate() {
            assert_eq!(p.year, 2023 + i as i32);
        }
    }

    #[test]
    fn test_phases_in_order() {
        let out = run();
        assert_eq!(out.periods[0].phase, Phase::Historical);
        assert_eq!(out.periods[1].phase, Phase::Historical);
        assert_eq!(out.periods[2].phase, Phase::Transition);
        assert_eq!(out.periods[4].phase, Phase::Transition);
        assert_eq!(out.periods[5].phase, Phase::Contract);
        assert_eq!(out.periods[5].contract_offset, Some(0));
    }

    #[test]
    fn test_historical_figures_taken_verbatim() {
        let input = sample_input();
        let out = run();
        let pl = &out.periods[0].profit_and_loss;
        assert_eq!(pl.revenue, input.historical[0].revenue);
        assert_eq!(pl.rent, input.historical[0].rent);
        assert_eq!(pl.staff_costs, input.historical[0].staff_costs);
        // 27m - 4m - 13.5m - 3m
        assert_eq!(pl.ebitda, dec!(6_500_000));
    }

    #[test]
    fn test_transition_rent_grows_at_configured_rate() {
        let out = run();
        assert_eq!(out.periods[2].profit_and_loss.rent, dec!(4_200_000));
        assert_eq!(out.periods[3].profit_and_loss.rent, dec!(4_326_000));
        assert_eq!(out.periods[4].profit_and_loss.rent, dec!(4_455_780));
    }

    #[test]
    fn test_no_debt_dynamics_before_contract() {
        let out = run();
        for p in out.periods.iter().filter(|p| !p.is_contract()) {
            assert_eq!(p.cash_flow.debt_drawn, Decimal::ZERO);
            assert_eq!(p.cash_flow.debt_repaid, Decimal::ZERO);
        }
    }

    #[test]
    fn test_contract_rent_uses_rent_model() {
        let out = run();
        assert_eq!(out.periods[5].profit_and_loss.rent, dec!(5_000_000));
        assert_eq!(out.periods[6].profit_and_loss.rent, dec!(5_000_000));
        assert_eq!(out.periods[7].profit_and_loss.rent, dec!(5_250_000));
    }

    #[test]
    fn test_ebitda_and_net_income_identities() {
        for p in &run().periods {
            let pl = &p.profit_and_loss;
            assert_eq!(
                pl.ebitda,
                pl.revenue - pl.rent - pl.staff_costs - pl.other_opex
            );
            assert_eq!(
                pl.net_income,
                pl.ebitda - pl.depreciation - pl.net_interest() - pl.zakat
            );
        }
    }

    fn leveraged_input() -> ProjectionInput {
        let mut input = sample_input();
        // A fit-out far beyond accumulated cash forces a draw at contract start
        input.capex.manual_assets[1].amount = dec!(150_000_000);
        input
    }

    #[test]
    fn test_fit_out_year_draws_debt_to_restore_minimum() {
        let out = simulate(&leveraged_input()).unwrap();
        let start = &out.periods[5];
        assert!(start.cash_flow.debt_drawn > Decimal::ZERO);
        assert_eq!(start.cash_flow.debt_repaid, Decimal::ZERO);
        assert_eq!(start.balance_sheet.cash, dec!(1_000_000));
        assert_eq!(start.balance_sheet.debt, start.cash_flow.debt_drawn);
    }

    #[test]
    fn test_interest_on_opening_debt() {
        let out = simulate(&leveraged_input()).unwrap();
        let opening_debt = out.periods[5].balance_sheet.debt;
        let next = &out.periods[6].profit_and_loss;
        assert!(opening_debt > Decimal::ZERO);
        assert_eq!(next.interest_expense, opening_debt * dec!(0.06));
    }

    #[test]
    fn test_surplus_sweeps_debt_before_building_cash() {
        let out = simulate(&leveraged_input()).unwrap();
        let mut repaid_any = false;
        for pair in out.periods.windows(2).filter(|w| w[1].is_contract()) {
            let (prev, cur) = (&pair[0], &pair[1]);
            repaid_any |= cur.cash_flow.debt_repaid > Decimal::ZERO;
            if cur.balance_sheet.cash > dec!(1_000_000) {
                // cash only accumulates once the opening debt is fully repaid
                assert_eq!(cur.cash_flow.debt_repaid, prev.balance_sheet.debt);
                assert_eq!(cur.balance_sheet.debt, Decimal::ZERO);
            }
        }
        assert!(repaid_any);
    }

    #[test]
    fn test_contract_cash_never_below_minimum() {
        for p in simulate(&leveraged_input()).unwrap().periods.iter().filter(|p| p.is_contract()) {
            assert!(p.balance_sheet.cash >= dec!(1_000_000) - dec!(0.01));
        }
    }

    #[test]
    fn test_zakat_never_negative() {
        let mut input = sample_input();
        input.opening_position.cash = dec!(0);
        input.opening_position.debt = dec!(5_000_000);
        let out = simulate(&input).unwrap();
        assert_eq!(out.periods[0].profit_and_loss.zakat, Decimal::ZERO);
        for p in &out.periods {
            assert!(p.profit_and_loss.zakat >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_negative_outcomes_are_not_errors() {
        let mut input = sample_input();
        input.rent = RentModel::FixedEscalation {
            base_rent: dec!(80_000_000),
            escalation: crate::rent::Escalation {
                rate: dec!(0.05),
                frequency_years: 1,
            },
        };
        let out = simulate(&input).unwrap();
        assert!(out
            .periods
            .iter()
            .any(|p| p.profit_and_loss.net_income < Decimal::ZERO));
        assert!(out.periods.last().unwrap().balance_sheet.equity < Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("rent")));
    }

    #[test]
    fn test_cumulative_fcf_restarts_at_contract_start() {
        let periods = simulate(&sample_input()).unwrap().periods;
        let pre_contract: Money = periods[..5].iter().map(|p| p.cash_flow.free_cash_flow).sum();
        assert_eq!(periods[4].cash_flow.cumulative_free_cash_flow, pre_contract);

        let mut running = Decimal::ZERO;
        for p in &periods[5..] {
            running += p.cash_flow.free_cash_flow;
            assert_eq!(p.cash_flow.cumulative_free_cash_flow, running);
        }
    }

    #[test]
    fn test_invalid_rent_halts_before_simulation() {
        let mut input = sample_input();
        input.rent = RentModel::Hybrid {
            base_rent: dec!(-1),
            escalation: crate::rent::Escalation {
                rate: dec!(0.05),
                frequency_years: 1,
            },
            share_pct: dec!(0.1),
            revenue_threshold: dec!(0),
        };
        assert!(simulate(&input).unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_auto_reinvestment_adds_assets() {
        let mut input = sample_input();
        input.capex.default_policy = Some(ReinvestmentPolicy {
            trigger: ReinvestmentTrigger::EveryYears { years: 2 },
            sizing: ReinvestmentSizing::FixedAmount {
                amount: dec!(100_000),
            },
        });
        let with_auto = simulate(&input).unwrap();
        input.capex.auto_reinvestment = false;
        let without = simulate(&input).unwrap();
        assert!(with_auto.ledger.assets().len() > without.ledger.assets().len());
    }
}
