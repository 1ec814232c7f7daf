#![allow(dead_code)]

use relief_core::adapters::interface::{AiCapability, CapabilityError, CapabilityResult};
use relief_core::relief::model::{FoodRequest, UrgencyLevel};
use relief_core::storage::store::DurableStore;
use relief_core::error::{CoreError, CoreResult};
use std::sync::Mutex;

pub fn request(id: &str, urgency: UrgencyLevel, people: u32, location: &str) -> FoodRequest {
    FoodRequest {
        id: id.to_string(),
        requester_name: format!("requester {}", id),
        location: location.to_string(),
        contact_number: None,
        needs: "rice and water".to_string(),
        people_count: people,
        urgency,
        timestamp: "2026-06-20T08:00:00Z".to_string(),
        original_text: format!("report {}", id),
    }
}

pub fn at(mut r: FoodRequest, timestamp: &str) -> FoodRequest {
    r.timestamp = timestamp.to_string();
    r
}

pub fn ids(rows: &[&FoodRequest]) -> Vec<String> {
    rows.iter().map(|r| r.id.clone()).collect()
}

/// Scripted stand-in for the generative-language service.
pub struct FakeCapability {
    pub structured: CapabilityResult<Option<String>>,
    pub search: CapabilityResult<Option<String>>,
    pub prompts: Mutex<Vec<String>>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeCapability {
    pub fn answering(structured: &str) -> Self {
        Self {
            structured: Ok(Some(structured.to_string())),
            search: Ok(Some("Ward 4 shelter, 30 people, no food".to_string())),
            prompts: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            structured: Err(relief_core::adapters::interface::classify_capability_error(message)),
            ..Self::answering("[]")
        }
    }

    pub fn with_search(mut self, search: CapabilityResult<Option<String>>) -> Self {
        self.search = search;
        self
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl AiCapability for FakeCapability {
    async fn generate_structured(
        &self,
        prompt: &str,
        _response_schema: &serde_json::Value,
    ) -> CapabilityResult<Option<String>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.structured.clone()
    }

    async fn grounded_search(&self, query: &str) -> CapabilityResult<Option<String>> {
        self.queries.lock().unwrap().push(query.to_string());
        self.search.clone()
    }
}

pub fn capability_error(message: &str) -> CapabilityError {
    relief_core::adapters::interface::classify_capability_error(message)
}

pub fn two_item_response() -> String {
    serde_json::json!([
        {
            "requesterName": "Karim",
            "location": "Companiganj, Sylhet",
            "contactNumber": "01711-482913",
            "needs": "food and drinking water",
            "peopleCount": 14,
            "urgency": "Critical",
            "originalText": "14 people on the roof, no food for 2 days"
        },
        {
            "requesterName": "Unknown",
            "location": "Goainghat",
            "needs": "dry food, purification tablets",
            "peopleCount": 20,
            "urgency": "Moderate",
            "originalText": "5 families near the mosque"
        }
    ])
    .to_string()
}

/// Store whose writes always fail; reads see nothing.
#[derive(Default)]
pub struct BrokenStore;

impl DurableStore for BrokenStore {
    fn get(&self, _key: &str) -> CoreResult<Option<String>> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> CoreResult<()> {
        Err(CoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "disk is read-only",
        )))
    }

    fn remove(&mut self, _key: &str) -> CoreResult<()> {
        Err(CoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "disk is read-only",
        )))
    }
}

/// Fails the first `failures` writes, then behaves like a [`MemoryStore`].
pub struct FlakyStore {
    pub failures: usize,
    pub inner: relief_core::storage::store::MemoryStore,
}

impl FlakyStore {
    pub fn failing_first(failures: usize) -> Self {
        Self {
            failures,
            inner: relief_core::storage::store::MemoryStore::new(),
        }
    }
}

impl DurableStore for FlakyStore {
    fn get(&self, key: &str) -> CoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> CoreResult<()> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(CoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> CoreResult<()> {
        self.inner.remove(key)
    }
}
