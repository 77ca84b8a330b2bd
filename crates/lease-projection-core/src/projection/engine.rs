use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assumptions::ProjectionInput;
use crate::cache::Fingerprint;
use crate::capex::AssetScheduleRow;
use crate::projection::metrics::{compute_metrics, Metrics};
use crate::projection::period::PeriodResult;
use crate::projection::simulator::simulate;
use crate::projection::validator::{validate_periods, ValidationResult};
use crate::types::ComputationMetadata;
use crate::LeaseProjectionResult;

const METHODOLOGY: &str =
    "Annual three-statement lease projection (opening-balance interest, minimum cash covenant)";

/// Complete result of one projection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationEngineOutput {
    pub proposal_name: String,
    pub fingerprint: Fingerprint,
    pub periods: Vec<PeriodResult>,
    pub validation: ValidationResult,
    pub metrics: Metrics,
    pub asset_schedule: Vec<AssetScheduleRow>,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
    pub calculated_at: DateTime<Utc>,
}

impl CalculationEngineOutput {
    pub fn contract_periods(&self) -> impl Iterator<Item = &PeriodResult> {
        self.periods.iter().filter(|p| p.is_contract())
    }

    pub fn period(&self, year: i32) -> Option<&PeriodResult> {
        self.periods.iter().find(|p| p.year == year)
    }
}

/// Run a full projection stamped with the current time.
pub fn run_projection(input: &ProjectionInput) -> LeaseProjectionResult<CalculationEngineOutput> {
    run_projection_at(input, Utc::now())
}

/// Run a full projection with an explicit timestamp. Identical inputs and
/// timestamps produce identical outputs.
pub fn run_projection_at(
    input: &ProjectionInput,
    calculated_at: DateTime<Utc>,
) -> LeaseProjectionResult<CalculationEngineOutput> {
    let start = Instant::now();
    let fingerprint = Fingerprint::of(input)?;

    let outcome = simulate(input)?;
    let validation = validate_periods(&outcome.periods, input.opening_position.cash);
    let metrics = compute_metrics(&outcome.periods, input.rates.discount_rate)?;

    let mut warnings = outcome.warnings;
    for check in validation.failures() {
        warn!(
            year = check.year,
            balance_difference = %check.balance_difference,
            reconciliation_difference = %check.reconciliation_difference,
            "period failed consistency check"
        );
        warnings.push(format!(
            "Year {}: consistency check failed (balance difference {}, reconciliation difference {})",
            check.year, check.balance_difference, check.reconciliation_difference
        ));
    }
    if metrics.irr.is_none() {
        warnings.push("IRR undefined: free cash flow never changes sign within bounds".into());
    }
    if metrics.payback_period_years.is_none() {
        warnings.push("Payback undefined: cumulative free cash flow never turns positive".into());
    }

    let series_end = input.timeline.series_end();
    let asset_schedule = outcome.ledger.schedule(series_end);

    info!(
        proposal = %input.proposal_name,
        %fingerprint,
        periods = outcome.periods.len(),
        npv = %metrics.npv,
        valid = validation.is_valid(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "projection complete"
    );

    Ok(CalculationEngineOutput {
        proposal_name: input.proposal_name.clone(),
        fingerprint,
        periods: outcome.periods,
        validation,
        metrics,
        asset_schedule,
        warnings,
        metadata: ComputationMetadata::new(METHODOLOGY),
        calculated_at,
    })
}
