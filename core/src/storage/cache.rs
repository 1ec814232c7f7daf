use super::store::DurableStore;
use crate::error::{CoreError, CoreResult};
use crate::relief::model::FoodRequest;
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub const CACHE_KEY: &str = "flood_requests_cache";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Missing,
    Loaded { records: usize },
    /// The stored payload was unreadable; the cache started empty.
    Recovered { reason: String },
}

/// The authoritative request list for the process, mirrored whole to a
/// [`DurableStore`] after every mutation. Newest batch first.
pub struct RequestCache<S: DurableStore> {
    store: S,
    records: Vec<FoodRequest>,
    load_outcome: LoadOutcome,
}

impl<S: DurableStore> RequestCache<S> {
    /// Never fails: a missing or corrupt payload yields an empty cache.
    pub fn load(store: S) -> Self {
        let (records, load_outcome) = match read_payload(&store) {
            Ok(None) => (Vec::new(), LoadOutcome::Missing),
            Ok(Some(records)) => {
                let n = records.len();
                (records, LoadOutcome::Loaded { records: n })
            }
            Err(e) => {
                warn!(error = %e, key = CACHE_KEY, "failed to load cache, starting empty");
                (
                    Vec::new(),
                    LoadOutcome::Recovered {
                        reason: e.to_string(),
                    },
                )
            }
        };
        info!(records = records.len(), "request cache ready");
        Self {
            store,
            records,
            load_outcome,
        }
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    pub fn records(&self) -> &[FoodRequest] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&FoodRequest> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Prepend `batch` and rewrite the whole store.
    ///
    /// A batch whose ids collide with each other or with cached records is
    /// rejected before anything changes. A `CacheWrite` error means the
    /// in-memory list was updated but the durable copy is stale.
    ///
    /// Returns `true` when the store was rewritten; an empty batch touches
    /// nothing and returns `false`.
    pub fn mutate(&mut self, batch: Vec<FoodRequest>) -> CoreResult<bool> {
        if batch.is_empty() {
            return Ok(false);
        }
        let mut seen: HashSet<&str> = self.records.iter().map(|r| r.id.as_str()).collect();
        for r in &batch {
            if !seen.insert(r.id.as_str()) {
                return Err(CoreError::InvalidInput(format!(
                    "duplicate request id {}",
                    r.id
                )));
            }
        }

        let added = batch.len();
        let mut next = batch;
        next.append(&mut self.records);
        self.records = next;
        debug!(added, total = self.records.len(), "cache mutated");
        self.persist().map(|()| true)
    }

    pub fn persist(&mut self) -> CoreResult<()> {
        let payload = serde_json::to_string(&self.records)?;
        self.store.set(CACHE_KEY, &payload).map_err(|e| {
            warn!(error = %e, key = CACHE_KEY, "cache write failed, memory remains authoritative");
            CoreError::CacheWrite(e.to_string())
        })
    }

    /// Empties the cache and removes the durable key entirely.
    /// Confirmation is the caller's job.
    pub fn clear(&mut self) -> CoreResult<()> {
        let dropped = self.records.len();
        self.records.clear();
        info!(dropped, "cache cleared");
        self.store.remove(CACHE_KEY).map_err(|e| {
            warn!(error = %e, key = CACHE_KEY, "failed to remove cache key");
            CoreError::CacheWrite(e.to_string())
        })
    }
}

fn read_payload<S: DurableStore>(store: &S) -> CoreResult<Option<Vec<FoodRequest>>> {
    let raw = store
        .get(CACHE_KEY)
        .map_err(|e| CoreError::CacheLoad(e.to_string()))?;
    match raw {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CoreError::CacheLoad(format!("unparsable payload: {}", e))),
    }
}
