use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assumptions::ProjectionInput;
use crate::cache::fingerprint::Fingerprint;
use crate::error::LeaseProjectionError;
use crate::projection::engine::{run_projection, CalculationEngineOutput};
use crate::LeaseProjectionResult;

type CachedResult = Result<Arc<CalculationEngineOutput>, LeaseProjectionError>;
type Slot = Arc<Entry>;

/// One memoized run. `canonical` holds the JSON encoding the key was hashed
/// from, when the caller supplied the input itself.
#[derive(Debug)]
struct Entry {
    canonical: Option<Vec<u8>>,
    cell: OnceLock<CachedResult>,
}

impl Entry {
    fn new(canonical: Option<Vec<u8>>) -> Self {
        Entry {
            canonical,
            cell: OnceLock::new(),
        }
    }

    /// False only when both sides carry an encoding and they differ, i.e.
    /// two inputs collided on the same fingerprint.
    fn matches(&self, canonical: Option<&[u8]>) -> bool {
        match (self.canonical.as_deref(), canonical) {
            (Some(stored), Some(requested)) => stored == requested,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of times a projection actually ran
    pub computations: u64,
    pub entries: usize,
}

/// Memoizes projection runs by input fingerprint.
///
/// At most one computation is in flight per fingerprint: a concurrent
/// caller for the same key blocks on the running computation and receives
/// the same `Arc`. Entries live until explicitly invalidated or cleared.
/// Failed runs are cached like successful ones since the engine is
/// deterministic. A hit is only served when the stored input encoding equals
/// the requested one; a colliding input is computed uncached.
#[derive(Debug, Default)]
pub struct CalculationCache {
    entries: Mutex<HashMap<Fingerprint, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
    computations: AtomicU64,
}

impl CalculationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached output for this input, running the projection if
    /// no entry exists yet.
    pub fn get_or_compute(
        &self,
        input: &ProjectionInput,
    ) -> LeaseProjectionResult<Arc<CalculationEngineOutput>> {
        let canonical = Fingerprint::canonical_bytes(input)?;
        let fingerprint = Fingerprint::from_bytes(&canonical);
        self.single_flight(fingerprint, Some(canonical), || run_projection(input))
    }

    /// Single-flight lookup with a caller-supplied computation. The caller
    /// vouches that `fingerprint` identifies what `compute` produces.
    pub fn get_or_compute_with<F>(
        &self,
        fingerprint: Fingerprint,
        compute: F,
    ) -> LeaseProjectionResult<Arc<CalculationEngineOutput>>
    where
        F: FnOnce() -> LeaseProjectionResult<CalculationEngineOutput>,
    {
        self.single_flight(fingerprint, None, compute)
    }

    fn single_flight<F>(
        &self,
        fingerprint: Fingerprint,
        canonical: Option<Vec<u8>>,
        compute: F,
    ) -> LeaseProjectionResult<Arc<CalculationEngineOutput>>
    where
        F: FnOnce() -> LeaseProjectionResult<CalculationEngineOutput>,
    {
        let slot = {
            let mut entries = self.lock();
            let existing = entries.get(&fingerprint).cloned();
            match existing {
                Some(slot) if slot.matches(canonical.as_deref()) => slot,
                Some(_) => {
                    drop(entries);
                    warn!(%fingerprint, "fingerprint collision, computing uncached");
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    self.computations.fetch_add(1, Ordering::Relaxed);
                    return compute().map(Arc::new);
                }
                None => {
                    let slot = Arc::new(Entry::new(canonical));
                    entries.insert(fingerprint.clone(), Arc::clone(&slot));
                    slot
                }
            }
        };

        // Map lock released; only callers of this key wait on the cell.
        let mut computed_here = false;
        let result = slot.cell.get_or_init(|| {
            computed_here = true;
            self.computations.fetch_add(1, Ordering::Relaxed);
            debug!(%fingerprint, "computing projection");
            compute().map(Arc::new)
        });

        if computed_here {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(%fingerprint, "cache hit");
        }
        result.clone()
    }

    /// Completed entry for `fingerprint`, if any. Never blocks on an
    /// in-flight computation.
    pub fn get(
        &self,
        fingerprint: &Fingerprint,
    ) -> Option<LeaseProjectionResult<Arc<CalculationEngineOutput>>> {
        let slot = self.lock().get(fingerprint).cloned()?;
        slot.cell.get().cloned()
    }

    /// Drop the entry for `fingerprint`. Callers already waiting on it still
    /// receive its result; later callers trigger a fresh run.
    pub fn invalidate(&self, fingerprint: &Fingerprint) -> bool {
        let removed = self.lock().remove(fingerprint).is_some();
        if removed {
            debug!(%fingerprint, "cache entry invalidated");
        }
        removed
    }

    /// Forced recalculation: invalidate, then compute afresh.
    pub fn recalculate(
        &self,
        input: &ProjectionInput,
    ) -> LeaseProjectionResult<Arc<CalculationEngineOutput>> {
        let canonical = Fingerprint::canonical_bytes(input)?;
        let fingerprint = Fingerprint::from_bytes(&canonical);
        self.invalidate(&fingerprint);
        self.single_flight(fingerprint, Some(canonical), || run_projection(input))
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            computations: self.computations.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Fingerprint, Slot>> {
        // Computations run outside the map lock, so poisoning cannot leave it half-updated
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
