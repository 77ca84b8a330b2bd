use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assumptions::ProjectionInput;
use crate::cache::Fingerprint;
use crate::error::LeaseProjectionError;
use crate::projection::engine::{run_projection, CalculationEngineOutput};
use crate::types::{ComputationMetadata, Money, Rate, Years};
use crate::LeaseProjectionResult;

/// One proposal's headline figures within a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSummary {
    /// 1 = highest NPV
    pub rank: usize,
    pub proposal_name: String,
    pub fingerprint: Fingerprint,
    pub rent_model: String,
    pub npv: Money,
    pub irr: Option<Rate>,
    pub payback_period_years: Option<Years>,
    pub total_rent: Money,
    pub peak_debt: Money,
    pub all_periods_balanced: bool,
    pub all_cash_flows_reconciled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonOutput {
    /// Ordered by NPV, highest first. Ties keep input order.
    pub proposals: Vec<ProposalSummary>,
    pub best_proposal: String,
    /// Best NPV minus worst NPV
    pub npv_spread: Money,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Project every proposal and rank them by NPV.
pub fn compare_proposals(inputs: &[ProjectionInput]) -> LeaseProjectionResult<ComparisonOutput> {
    let mut outputs = Vec::with_capacity(inputs.len());
    let mut rent_models = Vec::with_capacity(inputs.len());
    for input in inputs {
        outputs.push(run_projection(input)?);
        rent_models.push(input.rent.name());
    }
    let refs: Vec<(&CalculationEngineOutput, &str)> =
        outputs.iter().zip(rent_models.iter().copied()).collect();
    compare_outputs(&refs)
}

/// Rank already computed outputs, paired with their rent model name.
pub fn compare_outputs(
    outputs: &[(&CalculationEngineOutput, &str)],
) -> LeaseProjectionResult<ComparisonOutput> {
    if outputs.is_empty() {
        return Err(LeaseProjectionError::InsufficientData(
            "Comparison requires at least one proposal".into(),
        ));
    }

    let mut warnings = Vec::new();
    let mut proposals: Vec<ProposalSummary> = outputs
        .iter()
        .map(|(out, rent_model)| {
            if !out.validation.is_valid() {
                warnings.push(format!(
                    "{}: projection failed consistency checks",
                    out.proposal_name
                ));
            }
            ProposalSummary {
                rank: 0,
                proposal_name: out.proposal_name.clone(),
                fingerprint: out.fingerprint.clone(),
                rent_model: rent_model.to_string(),
                npv: out.metrics.npv,
                irr: out.metrics.irr,
                payback_period_years: out.metrics.payback_period_years,
                total_rent: out.metrics.total_rent,
                peak_debt: out.metrics.peak_debt,
                all_periods_balanced: out.validation.all_periods_balanced,
                all_cash_flows_reconciled: out.validation.all_cash_flows_reconciled,
            }
        })
        .collect();

    // Stable sort keeps input order for equal NPVs
    proposals.sort_by(|a, b| b.npv.cmp(&a.npv));
    for (i, p) in proposals.iter_mut().enumerate() {
        p.rank = i + 1;
    }

    let best = proposals.first().map(|p| p.npv).unwrap_or(Decimal::ZERO);
    let worst = proposals.last().map(|p| p.npv).unwrap_or(Decimal::ZERO);
    let best_proposal = proposals
        .first()
        .map(|p| p.proposal_name.clone())
        .unwrap_or_default();

    info!(proposals = proposals.len(), best = %best_proposal, "proposals compared");

    Ok(ComparisonOutput {
        proposals,
        best_proposal,
        npv_spread: best - worst,
        warnings,
        metadata: ComputationMetadata::new("Proposal ranking by contract-phase NPV"),
    })
}
