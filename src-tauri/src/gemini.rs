//! HTTP client for the Gemini `generateContent` endpoint.
//!
//! This is the only place in the workspace that talks to the network.

use async_trait::async_trait;
use relief_core::adapters::endpoint::validate_api_base;
use relief_core::adapters::interface::{
    classify_capability_error, AiCapability, CapabilityError, CapabilityResult,
};
use relief_core::config::AppConfig;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub struct GeminiClient {
    http: reqwest::Client,
    api_base: Url,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn from_config(cfg: &AppConfig) -> Result<Self, String> {
        let api_base = validate_api_base(&cfg.api_base).map_err(|e| e.to_string())?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .user_agent(concat!("relief_desk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("failed to build http client: {}", e))?;
        Ok(Self {
            http,
            api_base,
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> Result<Url, String> {
        self.api_base
            .join(&format!("v1beta/models/{}:generateContent", self.model))
            .map_err(|e| format!("bad endpoint for model {}: {}", self.model, e))
    }

    async fn generate(&self, body: Value) -> CapabilityResult<Option<String>> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(CapabilityError {
                code: "CAPABILITY_AUTH".to_string(),
                message: "no API key configured; set GEMINI_API_KEY".to_string(),
                retryable: false,
                category: "AUTH".to_string(),
            });
        };
        let url = self.endpoint().map_err(|e| classify_capability_error(&e))?;
        let start = std::time::Instant::now();

        let resp = self
            .http
            .post(url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let msg = if e.is_timeout() {
                    format!("request timed out: {}", e)
                } else {
                    format!("request failed: {}", e)
                };
                warn!(error = %msg, "generateContent transport error");
                classify_capability_error(&msg)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let msg = format!("HTTP {}: {}", status.as_u16(), error_message(&text));
            warn!(status = status.as_u16(), "generateContent rejected");
            return Err(classify_capability_error(&msg));
        }

        let payload: Value = resp
            .json()
            .await
            .map_err(|e| classify_capability_error(&format!("undecodable response: {}", e)))?;
        debug!(
            model = %self.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "generateContent answered"
        );
        response_text(&payload)
    }
}

#[async_trait]
impl AiCapability for GeminiClient {
    async fn generate_structured(
        &self,
        prompt: &str,
        response_schema: &Value,
    ) -> CapabilityResult<Option<String>> {
        self.generate(structured_body(prompt, response_schema)).await
    }

    async fn grounded_search(&self, query: &str) -> CapabilityResult<Option<String>> {
        self.generate(search_body(query)).await
    }
}

pub fn structured_body(prompt: &str, response_schema: &Value) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema
        }
    })
}

pub fn search_body(query: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": query }] }],
        "tools": [{ "google_search": {} }]
    })
}

/// Joins the text parts of the first candidate. A prompt blocked by the
/// service is reported as a safety refusal.
pub fn response_text(payload: &Value) -> CapabilityResult<Option<String>> {
    if let Some(reason) = payload
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
    {
        return Err(classify_capability_error(&format!(
            "prompt blocked by safety filter: {}",
            reason
        )));
    }
    let Some(parts) = payload
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
    else {
        return Ok(None);
    };
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if text.is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> AppConfig {
        AppConfig {
            api_key: api_key.map(str::to_string),
            ..AppConfig::default()
        }
    }

    #[test]
    fn endpoint_targets_the_configured_model() {
        let client = GeminiClient::from_config(&config(Some("k"))).unwrap();
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn structured_body_carries_schema_and_mime_type() {
        let body = structured_body("extract", &json!({ "type": "ARRAY" }));
        assert_eq!(body["contents"][0]["parts"][0]["text"], "extract");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn search_body_enables_grounding() {
        let body = search_body("flood relief");
        assert!(body["tools"][0].get("google_search").is_some());
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn candidate_parts_are_concatenated() {
        let payload = json!({
            "candidates": [{ "content": { "parts": [{ "text": "[{\"a\":" }, { "text": "1}]" }] } }]
        });
        assert_eq!(response_text(&payload).unwrap().as_deref(), Some("[{\"a\":1}]"));
    }

    #[test]
    fn empty_answers_are_none() {
        assert_eq!(response_text(&json!({})).unwrap(), None);
        let payload = json!({ "candidates": [{ "content": { "parts": [] } }] });
        assert_eq!(response_text(&payload).unwrap(), None);
    }

    #[test]
    fn blocked_prompts_are_safety_refusals() {
        let payload = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert_eq!(response_text(&payload).unwrap_err().category, "SAFETY_REFUSAL");
    }

    #[test]
    fn service_error_bodies_are_unwrapped() {
        let body = r#"{"error":{"code":400,"message":"API key not valid."}}"#;
        assert_eq!(error_message(body), "API key not valid.");
        assert_eq!(error_message("gateway down"), "gateway down");
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let client = GeminiClient::from_config(&config(None)).unwrap();
        let err = client.grounded_search("anything").await.unwrap_err();
        assert_eq!(err.category, "AUTH");
    }
}
