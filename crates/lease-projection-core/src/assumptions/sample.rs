use rust_decimal_macros::dec;

use crate::assumptions::proposal::*;
use crate::capex::reinvestment::{ReinvestmentPolicy, ReinvestmentSizing, ReinvestmentTrigger};
use crate::rent::model::{Escalation, RentModel};
use crate::schedule::ramp::RampUp;
use crate::schedule::step::StepSchedule;

/// A representative two-curriculum campus proposal on a 30-year fixed
/// escalation lease. Used as the CLI's input template and as a test fixture.
pub fn example_input() -> ProjectionInput {
    ProjectionInput {
        proposal_name: "Campus A - initial offer".into(),
        timeline: Timeline {
            first_year: 2023,
            contract_start_year: 2028,
            contract_length_years: 30,
        },
        opening_position: OpeningPosition {
            cash: dec!(2_000_000),
            debt: dec!(0),
        },
        historical: vec![
            HistoricalYear {
                year: 2023,
                enrollment: dec!(900),
                revenue: dec!(27_000_000),
                staff_costs: dec!(13_500_000),
                other_opex: dec!(3_000_000),
                rent: dec!(4_000_000),
            },
            HistoricalYear {
                year: 2024,
                enrollment: dec!(950),
                revenue: dec!(29_000_000),
                staff_costs: dec!(14_000_000),
                other_opex: dec!(3_200_000),
                rent: dec!(4_000_000),
            },
        ],
        transition: TransitionConfig {
            years: vec![
                TransitionYear {
                    year: 2025,
                    enrollment: dec!(1000),
                    average_tuition: dec!(30_000),
                },
                TransitionYear {
                    year: 2026,
                    enrollment: dec!(1050),
                    average_tuition: dec!(31_000),
                },
                TransitionYear {
                    year: 2027,
                    enrollment: dec!(1100),
                    average_tuition: dec!(32_000),
                },
            ],
            base_rent: dec!(4_200_000),
            rent_growth_rate: dec!(0.03),
            updated_at: None,
        },
        curricula: vec![
            CurriculumStream {
                name: "National".into(),
                enabled: true,
                capacity: dec!(1200),
                ramp_up: RampUp {
                    initial_students: dec!(1100),
                    target_students: dec!(1200),
                    start_year: 2028,
                    end_year: 2031,
                },
                tuition: StepSchedule {
                    base_value: dec!(30_000),
                    growth_rate: dec!(0.05),
                    frequency_years: 2,
                    reference_year: 2028,
                },
            },
            CurriculumStream {
                name: "International".into(),
                enabled: true,
                capacity: dec!(600),
                ramp_up: RampUp {
                    initial_students: dec!(100),
                    target_students: dec!(500),
                    start_year: 2028,
                    end_year: 2033,
                },
                tuition: StepSchedule {
                    base_value: dec!(55_000),
                    growth_rate: dec!(0.05),
                    frequency_years: 2,
                    reference_year: 2028,
                },
            },
        ],
        staffing: StaffingPlan {
            roles: vec![
                StaffRole {
                    name: "Teacher".into(),
                    students_per_staff: dec!(15),
                    minimum_headcount: 0,
                    base_salary: dec!(180_000),
                },
                StaffRole {
                    name: "Administration".into(),
                    students_per_staff: dec!(60),
                    minimum_headcount: 10,
                    base_salary: dec!(120_000),
                },
            ],
            salary_reference_year: 2025,
            cpi_rate: dec!(0.02),
            cpi_frequency_years: 1,
        },
        rent: RentModel::FixedEscalation {
            base_rent: dec!(5_000_000),
            escalation: Escalation {
                rate: dec!(0.05),
                frequency_years: 2,
            },
        },
        other_opex_pct: dec!(0.10),
        rates: SystemRates {
            zakat_rate: dec!(0.025),
            debt_interest_rate: dec!(0.06),
            deposit_interest_rate: dec!(0.03),
            discount_rate: dec!(0.08),
            minimum_cash_balance: dec!(1_000_000),
        },
        capex: CapexConfig {
            auto_reinvestment: true,
            default_policy: Some(ReinvestmentPolicy {
                trigger: ReinvestmentTrigger::EveryYears { years: 5 },
                sizing: ReinvestmentSizing::PercentOfRevenue { pct: dec!(0.01) },
            }),
            categories: vec![
                AssetCategory {
                    name: "building_improvements".into(),
                    useful_life_years: 20,
                    policy: Some(ReinvestmentPolicy {
                        trigger: ReinvestmentTrigger::OnFullDepreciation,
                        sizing: ReinvestmentSizing::PercentOfPriorCost { pct: dec!(0.5) },
                    }),
                },
                AssetCategory {
                    name: "furniture".into(),
                    useful_life_years: 10,
                    policy: None,
                },
                AssetCategory {
                    name: "it_equipment".into(),
                    useful_life_years: 4,
                    policy: Some(ReinvestmentPolicy {
                        trigger: ReinvestmentTrigger::EveryYears { years: 4 },
                        sizing: ReinvestmentSizing::FixedAmount {
                            amount: dec!(800_000),
                        },
                    }),
                },
            ],
            manual_assets: vec![
                ManualAsset {
                    description: "Furniture refresh".into(),
                    category: "furniture".into(),
                    purchase_year: 2026,
                    amount: dec!(1_200_000),
                },
                ManualAsset {
                    description: "Campus fit-out".into(),
                    category: "building_improvements".into(),
                    purchase_year: 2028,
                    amount: dec!(15_000_000),
                },
                ManualAsset {
                    description: "Initial IT rollout".into(),
                    category: "it_equipment".into(),
                    purchase_year: 2028,
                    amount: dec!(1_000_000),
                },
            ],
        },
    }
}
