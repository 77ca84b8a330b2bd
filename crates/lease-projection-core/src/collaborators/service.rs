use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::assumptions::ProjectionInput;
use crate::cache::{CalculationCache, Fingerprint};
use crate::collaborators::store::{ProjectionStore, StoredProjection};
use crate::projection::engine::CalculationEngineOutput;
use crate::LeaseProjectionResult;

/// Entry point used by callers that persist results: every run goes
/// through the shared cache and the latest output is saved per proposal.
pub struct ProjectionService<S: ProjectionStore> {
    cache: Arc<CalculationCache>,
    store: S,
}

impl<S: ProjectionStore> ProjectionService<S> {
    pub fn new(cache: Arc<CalculationCache>, store: S) -> Self {
        ProjectionService { cache, store }
    }

    pub fn cache(&self) -> &CalculationCache {
        &self.cache
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Cached projection of `input`, persisted as the proposal's latest.
    pub fn calculate(
        &self,
        proposal_id: &str,
        input: &ProjectionInput,
    ) -> LeaseProjectionResult<Arc<CalculationEngineOutput>> {
        let output = self.cache.get_or_compute(input)?;
        self.persist(proposal_id, input, &output)?;
        Ok(output)
    }

    /// Forced fresh run that bypasses any cached entry. The returned output
    /// carries its own per-period balance and reconciliation flags.
    pub fn recalculate(
        &self,
        proposal_id: &str,
        input: &ProjectionInput,
    ) -> LeaseProjectionResult<Arc<CalculationEngineOutput>> {
        let output = self.cache.recalculate(input)?;
        info!(
            proposal_id,
            fingerprint = %output.fingerprint,
            valid = output.validation.is_valid(),
            "proposal recalculated"
        );
        self.persist(proposal_id, input, &output)?;
        Ok(output)
    }

    /// Stored output if it was computed from `input` and the transition
    /// configuration has not moved since, otherwise a fresh calculation.
    pub fn latest_or_calculate(
        &self,
        proposal_id: &str,
        input: &ProjectionInput,
    ) -> LeaseProjectionResult<Arc<CalculationEngineOutput>> {
        if !self.store.is_stale(proposal_id, input.transition.updated_at)? {
            if let Some(record) = self.store.latest(proposal_id)? {
                let fingerprint = Fingerprint::of(input)?;
                if record.output.fingerprint == fingerprint {
                    return Ok(record.output);
                }
                debug!(
                    proposal_id,
                    stored = %record.output.fingerprint,
                    current = %fingerprint,
                    "stored projection was computed from other assumptions"
                );
            }
        }
        self.calculate(proposal_id, input)
    }

    fn persist(
        &self,
        proposal_id: &str,
        input: &ProjectionInput,
        output: &Arc<CalculationEngineOutput>,
    ) -> LeaseProjectionResult<()> {
        self.store.save(StoredProjection {
            proposal_id: proposal_id.to_string(),
            output: Arc::clone(output),
            calculated_at: Utc::now(),
            transition_updated_at: input.transition.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::sample_input;
    use crate::collaborators::store::InMemoryProjectionStore;
    use crate::projection::engine::run_projection;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn service() -> ProjectionService<InMemoryProjectionStore> {
        ProjectionService::new(Arc::new(CalculationCache::new()), InMemoryProjectionStore::new())
    }

    #[test]
    fn test_calculate_persists_latest() {
        let svc = service();
        let out = svc.calculate("p-1", &sample_input()).unwrap();
        let stored = svc.store().latest("p-1").unwrap().unwrap();
        assert!(Arc::ptr_eq(&out, &stored.output));
    }

    #[test]
    fn test_calculate_reuses_cache() {
        let svc = service();
        let a = svc.calculate("p-1", &sample_input()).unwrap();
        let b = svc.calculate("p-1", &sample_input()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(svc.cache().stats().computations, 1);
    }

    #[test]
    fn test_recalculate_returns_fresh_output() {
        let svc = service();
        let cached = svc.calculate("p-1", &sample_input()).unwrap();
        let fresh = svc.recalculate("p-1", &sample_input()).unwrap();
        assert!(!Arc::ptr_eq(&cached, &fresh));
        assert!(fresh.validation.is_valid());
        assert_eq!(fresh.validation.periods.len(), fresh.periods.len());
        assert_eq!(svc.cache().stats().computations, 2);
    }

    #[test]
    fn test_recalculate_after_input_change() {
        let svc = service();
        let before = svc.calculate("p-1", &sample_input()).unwrap();
        let mut changed = sample_input();
        changed.rates.discount_rate = dec!(0.12);
        let after = svc.recalculate("p-1", &changed).unwrap();
        assert_ne!(before.metrics.npv, after.metrics.npv);
        let stored = svc.store().latest("p-1").unwrap().unwrap();
        assert_eq!(stored.output.fingerprint, after.fingerprint);
    }

    #[test]
    fn test_changed_assumptions_bypass_stored_output() {
        let svc = service();
        let stored = svc.latest_or_calculate("p-1", &sample_input()).unwrap();

        let mut changed = sample_input();
        changed.rates.discount_rate = dec!(0.12);
        let out = svc.latest_or_calculate("p-1", &changed).unwrap();

        assert!(!Arc::ptr_eq(&stored, &out));
        assert_eq!(out.fingerprint, Fingerprint::of(&changed).unwrap());
        assert_eq!(out.metrics, run_projection(&changed).unwrap().metrics);
        assert_eq!(
            svc.store().latest("p-1").unwrap().unwrap().output.fingerprint,
            out.fingerprint
        );
    }

    #[test]
    fn test_transition_update_triggers_recalculation() {
        let svc = service();
        let mut input = sample_input();
        input.transition.updated_at = Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let first = svc.latest_or_calculate("p-1", &input).unwrap();
        let again = svc.latest_or_calculate("p-1", &input).unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        input.transition.updated_at = Some(Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        input.transition.base_rent = dec!(4_400_000);
        let refreshed = svc.latest_or_calculate("p-1", &input).unwrap();
        assert_ne!(first.fingerprint, refreshed.fingerprint);
    }
}
