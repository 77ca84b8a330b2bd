use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::assumptions::ProjectionInput;
use crate::error::LeaseProjectionError;
use crate::projection::engine::run_projection_at;
use crate::types::*;
use crate::LeaseProjectionResult;

/// Assumptions a sensitivity sweep can vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityDriver {
    DiscountRate,
    /// Escalation rate of the active rent model
    RentEscalationRate,
    /// Step growth of every curriculum's tuition
    TuitionGrowthRate,
    /// Multiplier on every stream's target enrollment and capacity (base = 1)
    EnrollmentTargetScale,
    OtherOpexPct,
}

impl SensitivityDriver {
    pub const ALL: [SensitivityDriver; 5] = [
        SensitivityDriver::DiscountRate,
        SensitivityDriver::RentEscalationRate,
        SensitivityDriver::TuitionGrowthRate,
        SensitivityDriver::EnrollmentTargetScale,
        SensitivityDriver::OtherOpexPct,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SensitivityDriver::DiscountRate => "discount_rate",
            SensitivityDriver::RentEscalationRate => "rent_escalation_rate",
            SensitivityDriver::TuitionGrowthRate => "tuition_growth_rate",
            SensitivityDriver::EnrollmentTargetScale => "enrollment_target_scale",
            SensitivityDriver::OtherOpexPct => "other_opex_pct",
        }
    }

    /// The driver's value in an unmodified input.
    pub fn base_value(&self, input: &ProjectionInput) -> LeaseProjectionResult<Decimal> {
        match self {
            SensitivityDriver::DiscountRate => Ok(input.rates.discount_rate),
            SensitivityDriver::RentEscalationRate => input
                .rent
                .escalation()
                .map(|e| e.rate)
                .ok_or_else(|| self.not_applicable(input)),
            SensitivityDriver::TuitionGrowthRate => input
                .curricula
                .first()
                .map(|c| c.tuition.growth_rate)
                .ok_or_else(|| LeaseProjectionError::invalid("curricula", "No curriculum stream")),
            SensitivityDriver::EnrollmentTargetScale => Ok(Decimal::ONE),
            SensitivityDriver::OtherOpexPct => Ok(input.other_opex_pct),
        }
    }

    /// Copy of `base` with this driver set to `value`.
    pub fn apply(
        &self,
        base: &ProjectionInput,
        value: Decimal,
    ) -> LeaseProjectionResult<ProjectionInput> {
        let mut input = base.clone();
        match self {
            SensitivityDriver::DiscountRate => input.rates.discount_rate = value,
            SensitivityDriver::RentEscalationRate => {
                let escalation = input
                    .rent
                    .escalation_mut()
                    .ok_or_else(|| self.not_applicable(base))?;
                escalation.rate = value;
            }
            SensitivityDriver::TuitionGrowthRate => {
                for stream in &mut input.curricula {
                    stream.tuition.growth_rate = value;
                }
            }
            SensitivityDriver::EnrollmentTargetScale => {
                for stream in &mut input.curricula {
                    stream.ramp_up.target_students = (stream.ramp_up.target_students * value).floor();
                    stream.capacity = (stream.capacity * value).floor();
                }
            }
            SensitivityDriver::OtherOpexPct => input.other_opex_pct = value,
        }
        Ok(input)
    }

    fn not_applicable(&self, input: &ProjectionInput) -> LeaseProjectionError {
        LeaseProjectionError::invalid(
            format!("variable:{}", self.name()),
            format!("Rent model '{}' has no escalation", input.rent.name()),
        )
    }
}

impl fmt::Display for SensitivityDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SensitivityDriver {
    type Err = LeaseProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensitivityDriver::ALL
            .into_iter()
            .find(|d| d.name() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = SensitivityDriver::ALL.iter().map(|d| d.name()).collect();
                LeaseProjectionError::invalid(
                    format!("variable:{s}"),
                    format!("Unknown driver, expected one of: {}", known.join(", ")),
                )
            })
    }
}

/// Input for a one- or two-way NPV sensitivity sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    pub base: ProjectionInput,
    pub variable_1: SensitivityVariable,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_2: Option<SensitivityVariable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub variable_1_name: String,
    pub variable_2_name: Option<String>,
    pub variable_1_values: Vec<Decimal>,
    /// Empty for a one-way sweep
    pub variable_2_values: Vec<Decimal>,
    pub output_metric: String,
    /// matrix[i][j] = NPV at variable_1_values[i], variable_2_values[j];
    /// a one-way sweep has a single column. `None` where the run failed.
    pub matrix: Vec<Vec<Option<Money>>>,
    /// NPV of the unmodified proposal
    pub base_case_value: Money,
    /// Grid cell closest to the unmodified proposal's driver values
    pub base_case_position: (usize, usize),
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Generate the sweep values for a sensitivity variable from min to max with step.
fn generate_sweep_values(var: &SensitivityVariable) -> LeaseProjectionResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(LeaseProjectionError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(LeaseProjectionError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Min must be <= max".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        current += var.step;
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Sweep one or two drivers and record the contract NPV at each point.
///
/// A grid point whose assumptions fail validation is reported as `None`
/// with a warning; the sweep itself only fails on a bad variable spec or an
/// invalid base case.
pub fn run_sensitivity(input: &SensitivityInput) -> LeaseProjectionResult<SensitivityOutput> {
    let calculated_at = Utc::now();
    let mut warnings: Vec<String> = Vec::new();

    let driver_1: SensitivityDriver = input.variable_1.name.parse()?;
    let driver_2: Option<SensitivityDriver> = input
        .variable_2
        .as_ref()
        .map(|v| v.name.parse())
        .transpose()?;

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = match &input.variable_2 {
        Some(v) => generate_sweep_values(v)?,
        None => Vec::new(),
    };

    let base_case_value = run_projection_at(&input.base, calculated_at)?.metrics.npv;
    let base_row = closest_index(&v1_values, driver_1.base_value(&input.base)?);
    let base_col = match driver_2 {
        Some(d) => closest_index(&v2_values, d.base_value(&input.base)?),
        None => 0,
    };

    let mut evaluate = |v1: Decimal, v2: Option<Decimal>| -> Option<Money> {
        let point = driver_1.apply(&input.base, v1).and_then(|shifted| match (driver_2, v2) {
            (Some(d), Some(v)) => d.apply(&shifted, v),
            _ => Ok(shifted),
        });
        match point.and_then(|p| run_projection_at(&p, calculated_at)) {
            Ok(out) => Some(out.metrics.npv),
            Err(e) => {
                let at = match v2 {
                    Some(v2) => format!("({v1}, {v2})"),
                    None => format!("({v1})"),
                };
                warnings.push(format!("Evaluation failed at {at}: {e}"));
                None
            }
        }
    };

    let mut matrix = Vec::with_capacity(v1_values.len());
    for v1 in &v1_values {
        let row = if v2_values.is_empty() {
            vec![evaluate(*v1, None)]
        } else {
            v2_values.iter().map(|v2| evaluate(*v1, Some(*v2))).collect()
        };
        debug!(driver = %driver_1, value = %v1, "sensitivity row evaluated");
        matrix.push(row);
    }

    info!(
        variable_1 = %driver_1,
        variable_2 = driver_2.map(|d| d.name()).unwrap_or("-"),
        points = v1_values.len() * v2_values.len().max(1),
        failures = warnings.len(),
        "sensitivity sweep complete"
    );

    Ok(SensitivityOutput {
        variable_1_name: driver_1.name().to_string(),
        variable_2_name: driver_2.map(|d| d.name().to_string()),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: "npv".into(),
        matrix,
        base_case_value,
        base_case_position: (base_row, base_col),
        warnings,
        metadata: ComputationMetadata::new("NPV sensitivity sweep"),
    })
}
