use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assumptions::{CurriculumStream, ProjectionInput, StaffingPlan, TransitionYear};
use crate::types::Money;

/// Resolved enrollment and pricing for one stream in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamYear {
    pub name: String,
    pub enrollment: Decimal,
    pub tuition: Money,
    pub revenue: Money,
}

/// Resolved headcount and cost for one staff role in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffYear {
    pub role: String,
    pub headcount: Decimal,
    pub salary: Money,
    pub cost: Money,
}

/// Everything the simulator needs from the time-varying assumptions for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyDrivers {
    pub year: i32,
    pub enrollment: Decimal,
    pub revenue: Money,
    pub staff_costs: Money,
    pub streams: Vec<StreamYear>,
    pub staff: Vec<StaffYear>,
}

pub fn stream_enrollment(stream: &CurriculumStream, year: i32) -> Decimal {
    if !stream.enabled {
        return Decimal::ZERO;
    }
    stream.ramp_up.students_in(year).min(stream.capacity)
}

/// Contract-year drivers: each enabled stream resolved independently, then summed.
pub fn resolve_contract_year(input: &ProjectionInput, year: i32) -> YearlyDrivers {
    let streams: Vec<StreamYear> = input
        .curricula
        .iter()
        .filter(|s| s.enabled)
        .map(|s| {
            let enrollment = stream_enrollment(s, year);
            let tuition = s.tuition.value_in(year);
            StreamYear {
                name: s.name.clone(),
                enrollment,
                tuition,
                revenue: enrollment * tuition,
            }
        })
        .collect();

    let enrollment: Decimal = streams.iter().map(|s| s.enrollment).sum();
    let revenue: Money = streams.iter().map(|s| s.revenue).sum();
    let staff = resolve_staff(&input.staffing, enrollment, year);
    let staff_costs = staff.iter().map(|s| s.cost).sum();

    YearlyDrivers {
        year,
        enrollment,
        revenue,
        staff_costs,
        streams,
        staff,
    }
}

/// Transition-year drivers: enrollment and tuition come straight from the
/// transition configuration; staffing still follows the ratios.
pub fn resolve_transition_year(input: &ProjectionInput, ty: &TransitionYear) -> YearlyDrivers {
    let revenue = ty.enrollment * ty.average_tuition;
    let staff = resolve_staff(&input.staffing, ty.enrollment, ty.year);
    let staff_costs = staff.iter().map(|s| s.cost).sum();

    YearlyDrivers {
        year: ty.year,
        enrollment: ty.enrollment,
        revenue,
        staff_costs,
        streams: vec![StreamYear {
            name: "transition".into(),
            enrollment: ty.enrollment,
            tuition: ty.average_tuition,
            revenue,
        }],
        staff,
    }
}

/// Ratio-derived headcount (rounded up) times the CPI-escalated salary.
pub fn resolve_staff(plan: &StaffingPlan, enrollment: Decimal, year: i32) -> Vec<StaffYear> {
    plan.roles
        .iter()
        .map(|role| {
            let by_ratio = if role.students_per_staff > Decimal::ZERO {
                (enrollment / role.students_per_staff).ceil()
            } else {
                Decimal::ZERO
            };
            let headcount = by_ratio.max(Decimal::from(role.minimum_headcount));
            let salary = plan.salary_schedule(role).value_in(year);
            StaffYear {
                role: role.name.clone(),
                headcount,
                salary,
                cost: headcount * salary,
            }
        })
        .collect()
}
