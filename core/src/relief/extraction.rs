use super::model::FoodRequest;
use super::prompts::{extraction_prompt, web_search_query, with_web_provenance};
use super::schema::{parse_candidates, request_response_schema};
use crate::adapters::interface::AiCapability;
use crate::determinism::clock::{Clock, SystemClock};
use crate::determinism::ids::request_id;
use crate::error::{CoreError, CoreResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_SEARCH_SOURCE: &str = "floodsupport.org";

/// Turns free text into validated [`FoodRequest`]s through an [`AiCapability`].
///
/// Every call is a single attempt. Results are all-or-nothing.
pub struct ExtractionAdapter<C: AiCapability> {
    capability: C,
    clock: Arc<dyn Clock>,
    search_source: String,
}

impl<C: AiCapability> ExtractionAdapter<C> {
    pub fn new(capability: C) -> Self {
        Self {
            capability,
            clock: Arc::new(SystemClock),
            search_source: DEFAULT_SEARCH_SOURCE.to_string(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_search_source(mut self, source: impl Into<String>) -> Self {
        self.search_source = source.into();
        self
    }

    pub fn capability(&self) -> &C {
        &self.capability
    }

    pub fn search_source(&self) -> &str {
        &self.search_source
    }

    pub async fn extract(&self, raw_text: &str) -> CoreResult<Vec<FoodRequest>> {
        if raw_text.trim().is_empty() {
            debug!("extract called with blank text, skipping service call");
            return Ok(Vec::new());
        }
        let start = std::time::Instant::now();
        let prompt = extraction_prompt(raw_text);
        debug!(prompt_len = prompt.len(), "structured extraction starting");

        let response = self
            .capability
            .generate_structured(&prompt, &request_response_schema())
            .await
            .map_err(|e| {
                warn!(category = %e.category, code = %e.code, "extraction call failed");
                CoreError::Extraction(format!(
                    "Failed to process requests using the AI service: {}",
                    e.message
                ))
            })?;

        let Some(text) = response else {
            info!("extraction returned no content");
            return Ok(Vec::new());
        };
        debug!(response_len = text.len(), "structured extraction answered");

        let candidates = parse_candidates(&text).map_err(|e| {
            warn!(error = %e, "extraction response failed validation");
            CoreError::Extraction(format!(
                "Failed to process requests using the AI service: {}",
                e
            ))
        })?;

        let captured_at = self.clock.now_rfc3339();
        let records: Vec<FoodRequest> = candidates
            .into_iter()
            .map(|c| c.into_request(request_id(), captured_at.clone()))
            .collect();

        info!(
            records = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "extraction completed"
        );
        Ok(records)
    }

    pub async fn search_and_extract(&self) -> CoreResult<Vec<FoodRequest>> {
        let start = std::time::Instant::now();
        let query = web_search_query(&self.search_source);
        debug!(source = %self.search_source, "grounded web search starting");

        let digest = self
            .capability
            .grounded_search(&query)
            .await
            .map_err(|e| {
                warn!(category = %e.category, code = %e.code, "web search call failed");
                CoreError::Search(format!("web search failed: {}", e.message))
            })?;

        let digest = match digest {
            Some(d) if !d.trim().is_empty() => d,
            _ => {
                warn!(source = %self.search_source, "web search returned no content");
                return Err(CoreError::Search("No data found from web search.".to_string()));
            }
        };
        info!(
            digest_len = digest.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "web search completed"
        );

        self.extract(&with_web_provenance(&self.search_source, &digest))
            .await
    }
}
