use crate::adapters::interface::AiCapability;
use crate::audit::event::JournalEntry;
use crate::audit::log::ActivityJournal;
use crate::determinism::clock::{Clock, SystemClock};
use crate::determinism::ids::session_id;
use crate::error::{CoreError, CoreResult};
use crate::relief::extraction::ExtractionAdapter;
use crate::relief::model::FoodRequest;
use crate::relief::render::RequestDetails;
use crate::relief::sample::SAMPLE_RAW_DATA;
use crate::relief::stats::{dashboard_stats, DashboardStats, ExtractionStats};
use crate::relief::view::{project, SortDirection, SortField, ViewQuery};
use crate::storage::cache::{LoadOutcome, RequestCache};
use crate::storage::store::DurableStore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

pub const WEB_FAILURE_PREFIX: &str = "Failed to fetch and process data from the web";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoadingSource {
    Manual,
    Web,
}

impl LoadingSource {
    fn as_str(self) -> &'static str {
        match self {
            LoadingSource::Manual => "manual",
            LoadingSource::Web => "web",
        }
    }
}

/// Everything the UI needs to draw one frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub total: usize,
    pub requests: Vec<FoodRequest>,
    pub stats: Option<DashboardStats>,
    pub query: ViewQuery,
    pub loading: Option<LoadingSource>,
    pub error: Option<String>,
    pub storage_warning: Option<String>,
    pub selected: Option<RequestDetails>,
    pub filter_matches_nothing: bool,
    pub draft: String,
}

/// Owns the cache plus all UI-facing state, and enforces that only one
/// extraction is in flight at a time.
pub struct DashboardSession<S: DurableStore> {
    session_id: String,
    cache: RequestCache<S>,
    query: ViewQuery,
    loading: Option<LoadingSource>,
    error: Option<String>,
    storage_warning: Option<String>,
    selected_id: Option<String>,
    draft: String,
    journal: Option<ActivityJournal>,
    clock: Arc<dyn Clock>,
}

impl<S: DurableStore> DashboardSession<S> {
    pub fn new(cache: RequestCache<S>) -> Self {
        Self {
            session_id: session_id(),
            cache,
            query: ViewQuery::default(),
            loading: None,
            error: None,
            storage_warning: None,
            selected_id: None,
            draft: String::new(),
            journal: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Attaches a journal and records how the cache was loaded.
    pub fn with_journal(mut self, journal: ActivityJournal) -> Self {
        self.journal = Some(journal);
        let (kind, details) = match self.cache.load_outcome() {
            LoadOutcome::Missing => ("CACHE_LOADED", json!({ "records": 0 })),
            LoadOutcome::Loaded { records } => ("CACHE_LOADED", json!({ "records": records })),
            LoadOutcome::Recovered { reason } => {
                ("CACHE_LOAD_FAILED", json!({ "reason": reason }))
            }
        };
        self.record(kind, details);
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn cache(&self) -> &RequestCache<S> {
        &self.cache
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn loading(&self) -> Option<LoadingSource> {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn storage_warning(&self) -> Option<&str> {
        self.storage_warning.as_deref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn begin_extraction(&mut self, source: LoadingSource, input_chars: usize) -> CoreResult<()> {
        if let Some(current) = self.loading {
            warn!(requested = ?source, in_flight = ?current, "extraction rejected, one already running");
            return Err(CoreError::Busy);
        }
        self.loading = Some(source);
        self.error = None;
        self.record(
            "EXTRACTION_STARTED",
            json!({ "source": source.as_str(), "input_chars": input_chars }),
        );
        Ok(())
    }

    /// Ends the in-flight attempt. A failed attempt leaves the cache as it was.
    pub fn finish_extraction(
        &mut self,
        source: LoadingSource,
        result: CoreResult<Vec<FoodRequest>>,
    ) -> CoreResult<ExtractionStats> {
        self.loading = None;
        let batch = match result {
            Ok(batch) => batch,
            Err(e) => return Err(self.fail_attempt(source, e)),
        };

        let stats = ExtractionStats::for_batch(&batch, self.cache.len() + batch.len());
        match self.cache.mutate(batch) {
            Ok(true) => self.storage_warning = None,
            // nothing was written, so an earlier warning still holds
            Ok(false) => {}
            Err(CoreError::CacheWrite(reason)) => {
                self.storage_warning = Some(format!(
                    "Requests are kept for this session but could not be saved: {}",
                    reason
                ));
                self.record(
                    "CACHE_WRITE_FAILED",
                    json!({ "reason": reason, "records_in_memory": self.cache.len() }),
                );
            }
            Err(e) => return Err(self.fail_attempt(source, e)),
        }

        if source == LoadingSource::Manual {
            self.draft.clear();
        }
        info!(
            source = source.as_str(),
            found = stats.food_requests_found,
            critical = stats.critical_count,
            total = stats.total_processed,
            "extraction committed"
        );
        self.record(
            "EXTRACTION_COMPLETED",
            json!({
                "source": source.as_str(),
                "records_found": stats.food_requests_found,
                "critical_count": stats.critical_count,
                "total_after": stats.total_processed
            }),
        );
        Ok(stats)
    }

    fn fail_attempt(&mut self, source: LoadingSource, e: CoreError) -> CoreError {
        let message = match source {
            LoadingSource::Web => format!("{}: {}", WEB_FAILURE_PREFIX, e),
            LoadingSource::Manual => e.to_string(),
        };
        let error_kind = match &e {
            CoreError::Extraction(_) => "EXTRACTION",
            CoreError::Search(_) => "SEARCH",
            _ => "INTERNAL",
        };
        warn!(source = source.as_str(), error = %e, "extraction attempt failed");
        self.record(
            "EXTRACTION_FAILED",
            json!({ "source": source.as_str(), "error_kind": error_kind, "message": message }),
        );
        self.error = Some(message);
        e
    }

    /// Blank text is ignored without touching any state.
    pub async fn extract_manual<C: AiCapability>(
        &mut self,
        adapter: &ExtractionAdapter<C>,
        raw_text: &str,
    ) -> CoreResult<Option<ExtractionStats>> {
        if raw_text.trim().is_empty() {
            return Ok(None);
        }
        self.begin_extraction(LoadingSource::Manual, raw_text.chars().count())?;
        let result = adapter.extract(raw_text).await;
        self.finish_extraction(LoadingSource::Manual, result).map(Some)
    }

    pub async fn fetch_from_web<C: AiCapability>(
        &mut self,
        adapter: &ExtractionAdapter<C>,
    ) -> CoreResult<ExtractionStats> {
        self.begin_extraction(LoadingSource::Web, 0)?;
        let result = adapter.search_and_extract().await;
        self.finish_extraction(LoadingSource::Web, result)
    }

    pub fn set_location_filter(&mut self, filter: impl Into<String>) {
        self.query.location_filter = filter.into();
    }

    pub fn reset_filter(&mut self) {
        self.query.location_filter.clear();
    }

    pub fn set_sort(&mut self, field: SortField, direction: SortDirection) {
        self.query.sort_field = field;
        self.query.sort_direction = direction;
    }

    pub fn toggle_sort_direction(&mut self) {
        self.query.sort_direction = self.query.sort_direction.toggled();
    }

    pub fn select(&mut self, id: &str) -> CoreResult<RequestDetails> {
        let details = self
            .cache
            .get(id)
            .map(RequestDetails::from_request)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown request id {}", id)))?;
        self.selected_id = Some(id.to_string());
        Ok(details)
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn load_sample_draft(&mut self) -> &str {
        self.draft = SAMPLE_RAW_DATA.to_string();
        &self.draft
    }

    /// Destructive. Does nothing unless `confirmed`.
    pub fn clear_all(&mut self, confirmed: bool) -> CoreResult<bool> {
        if !confirmed {
            return Ok(false);
        }
        let dropped = self.cache.len();
        match self.cache.clear() {
            Ok(()) => self.storage_warning = None,
            Err(CoreError::CacheWrite(reason)) => {
                self.storage_warning = Some(format!(
                    "Saved requests could not be removed from disk: {}",
                    reason
                ));
            }
            Err(e) => return Err(e),
        }
        self.selected_id = None;
        self.record("CACHE_CLEARED", json!({ "records_dropped": dropped }));
        Ok(true)
    }

    pub fn view(&self) -> Vec<&FoodRequest> {
        project(self.cache.records(), &self.query)
    }

    pub fn stats(&self) -> Option<DashboardStats> {
        dashboard_stats(self.cache.records())
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let requests: Vec<FoodRequest> = self.view().into_iter().cloned().collect();
        DashboardSnapshot {
            total: self.cache.len(),
            filter_matches_nothing: !self.cache.is_empty() && requests.is_empty(),
            requests,
            stats: self.stats(),
            query: self.query.clone(),
            loading: self.loading,
            error: self.error.clone(),
            storage_warning: self.storage_warning.clone(),
            selected: self
                .selected_id
                .as_deref()
                .and_then(|id| self.cache.get(id))
                .map(RequestDetails::from_request),
            draft: self.draft.clone(),
        }
    }

    fn record(&mut self, kind: &str, details: serde_json::Value) {
        let Some(journal) = self.journal.as_mut() else {
            return;
        };
        let entry = JournalEntry {
            ts_utc: self.clock.now_rfc3339(),
            kind: kind.to_string(),
            session_id: self.session_id.clone(),
            details,
            prev_hash: String::new(),
            hash: String::new(),
        };
        if let Err(e) = journal.append(entry) {
            warn!(error = %e, kind, "journal append failed");
        }
    }
}
