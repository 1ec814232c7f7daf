use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapabilityError {
    pub code: String,
    pub message: String,
    pub retryable: bool,
    pub category: String, // TIMEOUT|AUTH|RATE_LIMITED|SAFETY_REFUSAL|RUNTIME_ERROR
}

impl std::fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.category, self.code, self.message)
    }
}

impl std::error::Error for CapabilityError {}

pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// The external generative-language service, seen as two opaque calls.
///
/// Both return `Ok(None)` when the service answered without any text.
/// Implementations live outside the core; the core never opens sockets.
#[async_trait]
pub trait AiCapability: Send + Sync {
    /// Structured generation: `prompt` plus a response schema, JSON text out.
    async fn generate_structured(
        &self,
        prompt: &str,
        response_schema: &serde_json::Value,
    ) -> CapabilityResult<Option<String>>;

    /// Web-grounded search: natural-language query, free text out.
    async fn grounded_search(&self, query: &str) -> CapabilityResult<Option<String>>;
}

pub fn classify_capability_error(err: &str) -> CapabilityError {
    let lower = err.to_ascii_lowercase();
    let (category, code, retryable) = if lower.contains("timeout") || lower.contains("timed out")
    {
        ("TIMEOUT", "CAPABILITY_TIMEOUT", true)
    } else if lower.contains("401") || lower.contains("403") || lower.contains("api key") {
        ("AUTH", "CAPABILITY_AUTH", false)
    } else if lower.contains("429") || lower.contains("quota") {
        ("RATE_LIMITED", "CAPABILITY_RATE_LIMITED", true)
    } else if lower.contains("safety") || lower.contains("blocked") {
        ("SAFETY_REFUSAL", "SAFETY_REFUSAL", false)
    } else {
        ("RUNTIME_ERROR", "RUNTIME_ERROR", false)
    };
    CapabilityError {
        code: code.to_string(),
        message: err.to_string(),
        retryable,
        category: category.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_are_marked_retryable() {
        let e = classify_capability_error("operation timed out after 60s");
        assert_eq!(e.category, "TIMEOUT");
        assert!(e.retryable);
    }

    #[test]
    fn missing_key_is_auth() {
        let e = classify_capability_error("HTTP 403: API key not valid");
        assert_eq!(e.category, "AUTH");
        assert!(!e.retryable);
    }

    #[test]
    fn unknown_errors_fall_back_to_runtime() {
        let e = classify_capability_error("connection reset");
        assert_eq!(e.code, "RUNTIME_ERROR");
    }
}
