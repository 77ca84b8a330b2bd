use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::projection::engine::CalculationEngineOutput;
use crate::LeaseProjectionResult;

/// Latest output for one proposal plus the stamps needed to detect staleness.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredProjection {
    pub proposal_id: String,
    pub output: Arc<CalculationEngineOutput>,
    pub calculated_at: DateTime<Utc>,
    /// `updated_at` of the transition configuration the run used
    pub transition_updated_at: Option<DateTime<Utc>>,
}

pub trait ProjectionStore: Send + Sync {
    /// Replace the stored projection for `record.proposal_id`.
    fn save(&self, record: StoredProjection) -> LeaseProjectionResult<()>;

    fn latest(&self, proposal_id: &str) -> LeaseProjectionResult<Option<StoredProjection>>;

    fn remove(&self, proposal_id: &str) -> LeaseProjectionResult<bool>;

    /// True when nothing is stored, or when the transition configuration has
    /// changed since the stored run.
    fn is_stale(
        &self,
        proposal_id: &str,
        current_transition_updated_at: Option<DateTime<Utc>>,
    ) -> LeaseProjectionResult<bool> {
        let Some(record) = self.latest(proposal_id)? else {
            return Ok(true);
        };
        Ok(match (record.transition_updated_at, current_transition_updated_at) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(used), Some(current)) => current > used,
        })
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProjectionStore {
    records: RwLock<HashMap<String, StoredProjection>>,
}

impl InMemoryProjectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProjectionStore for InMemoryProjectionStore {
    fn save(&self, record: StoredProjection) -> LeaseProjectionResult<()> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.insert(record.proposal_id.clone(), record);
        Ok(())
    }

    fn latest(&self, proposal_id: &str) -> LeaseProjectionResult<Option<StoredProjection>> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(proposal_id).cloned())
    }

    fn remove(&self, proposal_id: &str) -> LeaseProjectionResult<bool> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        Ok(records.remove(proposal_id).is_some())
    }
}
