use lease_projection_core::assumptions::{example_input, ProjectionInput};
use lease_projection_core::capex::{ReinvestmentPolicy, ReinvestmentSizing, ReinvestmentTrigger};
use lease_projection_core::rent::{Escalation, RentModel};
use lease_projection_core::time_value::npv;
use lease_projection_core::run_projection;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn money(units: i64) -> Decimal {
    Decimal::new(units, 0)
}

/// Rate in basis points
fn bps(value: i64) -> Decimal {
    Decimal::new(value, 4)
}

fn rent_model(variant: u8, base: Decimal, escalation: Escalation, share: Decimal) -> RentModel {
    match variant % 4 {
        0 => RentModel::FixedEscalation {
            base_rent: base,
            escalation,
        },
        1 => RentModel::RevenueShare {
            share_pct: share,
            minimum_guarantee: Some(base / dec!(2)),
        },
        2 => RentModel::PartnerInvestment {
            land_area_sqm: dec!(20_000),
            land_price_per_sqm: dec!(1_500),
            built_up_area_sqm: dec!(15_000),
            construction_cost_per_sqm: base / dec!(1_000),
            yield_rate: share,
            escalation,
        },
        _ => RentModel::Hybrid {
            base_rent: base / dec!(2),
            escalation,
            share_pct: share,
            revenue_threshold: dec!(30_000_000),
        },
    }
}

prop_compose! {
    fn valid_input()(
        variant in 0u8..4,
        base_rent in 1_000_000i64..20_000_000,
        escalation_bps in 0i64..1_000,
        escalation_years in 1u32..5,
        share_bps in 100i64..3_000,
        opening_cash in 0i64..10_000_000,
        opening_debt in 0i64..20_000_000,
        minimum_cash in 0i64..5_000_000,
        discount_bps in 0i64..2_000,
        other_opex_bps in 0i64..3_000,
        fit_out in 0i64..150_000_000,
        auto in any::<bool>(),
    ) -> ProjectionInput {
        let mut input = example_input();
        let escalation = Escalation { rate: bps(escalation_bps), frequency_years: escalation_years };
        input.rent = rent_model(variant, money(base_rent), escalation, bps(share_bps));
        input.opening_position.cash = money(opening_cash);
        input.opening_position.debt = money(opening_debt);
        input.rates.minimum_cash_balance = money(minimum_cash);
        input.rates.discount_rate = bps(discount_bps);
        input.other_opex_pct = bps(other_opex_bps);
        input.capex.manual_assets[1].amount = money(fit_out);
        input.capex.auto_reinvestment = auto;
        input
    }
}

fn it_sizing(mode: u8) -> ReinvestmentSizing {
    match mode % 4 {
        0 => ReinvestmentSizing::FixedAmount {
            amount: dec!(800_000),
        },
        1 => ReinvestmentSizing::PercentOfPriorCost { pct: dec!(0.5) },
        2 => ReinvestmentSizing::PercentOfPriorCost { pct: dec!(1.5) },
        _ => ReinvestmentSizing::PercentOfRevenue { pct: dec!(0.02) },
    }
}

fn total_depreciation_with_it_cycle(years: u32, sizing: ReinvestmentSizing) -> Decimal {
    let mut input = example_input();
    input.capex.default_policy = None;
    for category in &mut input.capex.categories {
        category.policy = if category.name == "it_equipment" {
            Some(ReinvestmentPolicy {
                trigger: ReinvestmentTrigger::EveryYears { years },
                sizing: sizing.clone(),
            })
        } else {
            None
        };
    }
    run_projection(&input)
        .unwrap()
        .periods
        .iter()
        .map(|p| p.profit_and_loss.depreciation)
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_period_balances_and_reconciles(input in valid_input()) {
        let out = run_projection(&input).unwrap();
        prop_assert!(out.validation.all_periods_balanced, "{:?}", out.validation.failures().next());
        prop_assert!(out.validation.all_cash_flows_reconciled, "{:?}", out.validation.failures().next());
        prop_assert_eq!(out.periods.len(), 35);
    }

    #[test]
    fn book_values_stay_within_bounds(input in valid_input()) {
        let out = run_projection(&input).unwrap();
        for p in &out.periods {
            prop_assert!(p.balance_sheet.net_fixed_assets >= Decimal::ZERO);
            prop_assert!(p.profit_and_loss.depreciation >= Decimal::ZERO);
            prop_assert!(p.profit_and_loss.zakat >= Decimal::ZERO);
        }
        for row in &out.asset_schedule {
            prop_assert!(row.net_book_value >= Decimal::ZERO);
            prop_assert!(row.accumulated_depreciation <= row.amount);
        }
    }

    #[test]
    fn contract_cash_respects_minimum(input in valid_input()) {
        let minimum = input.rates.minimum_cash_balance;
        let out = run_projection(&input).unwrap();
        for p in out.contract_periods() {
            prop_assert!(p.balance_sheet.cash >= minimum - dec!(0.01));
            prop_assert!(p.balance_sheet.debt >= Decimal::ZERO);
        }
    }

    #[test]
    fn npv_strictly_decreases_with_discount_rate(
        outlay in 1i64..50_000_000,
        inflows in prop::collection::vec(1i64..10_000_000, 1..30),
        low_bps in 0i64..1_500,
        gap_bps in 1i64..1_000,
    ) {
        let mut flows = vec![-money(outlay)];
        flows.extend(inflows.into_iter().map(money));
        let low = npv(bps(low_bps), &flows).unwrap();
        let high = npv(bps(low_bps + gap_bps), &flows).unwrap();
        prop_assert!(high < low);
    }

    #[test]
    fn more_frequent_reinvestment_never_lowers_depreciation(
        frequent in 1u32..13,
        extra in 0u32..5,
        mode in 0u8..4,
    ) {
        let often = total_depreciation_with_it_cycle(frequent, it_sizing(mode));
        let rarely = total_depreciation_with_it_cycle(frequent + extra, it_sizing(mode));
        prop_assert!(often >= rarely, "{:?}: every {} -> {}, every {} -> {}",
            it_sizing(mode), frequent, often, frequent + extra, rarely);
    }
}

#[test]
fn revenue_sized_reinvestment_is_monotone_over_long_intervals() {
    let sizing = ReinvestmentSizing::PercentOfRevenue { pct: dec!(0.02) };
    let totals: Vec<Decimal> = (10..=12)
        .map(|years| total_depreciation_with_it_cycle(years, sizing.clone()))
        .collect();
    assert!(totals[0] >= totals[1], "{totals:?}");
    assert!(totals[1] >= totals[2], "{totals:?}");
}

#[test]
fn project_npv_decreases_with_discount_rate() {
    let mut input = example_input();
    let mut previous: Option<Decimal> = None;
    for rate in [dec!(0.04), dec!(0.06), dec!(0.08), dec!(0.10), dec!(0.12)] {
        input.rates.discount_rate = rate;
        let npv = run_projection(&input).unwrap().metrics.npv;
        if let Some(prev) = previous {
            assert!(npv < prev, "NPV at {rate} ({npv}) not below {prev}");
        }
        previous = Some(npv);
    }
}
