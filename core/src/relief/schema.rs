use super::model::{RequestCandidate, UrgencyLevel, UNKNOWN_MARKER};
use crate::error::{CoreError, CoreResult};
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

/// Output schema handed to the structured-generation call.
pub fn request_response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "requesterName": { "type": "STRING", "description": "Name of person or group asking for help" },
                "location": { "type": "STRING", "description": "Address, landmark, or coordinates" },
                "contactNumber": { "type": "STRING", "description": "Phone number if available" },
                "needs": { "type": "STRING", "description": "Short summary of specific food/water needs" },
                "peopleCount": { "type": "NUMBER", "description": "Estimated number of people affected, default to 1 if unknown" },
                "urgency": {
                    "type": "STRING",
                    "enum": UrgencyLevel::ALL.iter().map(|u| u.as_str()).collect::<Vec<_>>(),
                    "description": "Urgency level assessment"
                },
                "originalText": { "type": "STRING", "description": "The original snippet of text for reference" }
            },
            "required": ["requesterName", "location", "needs", "peopleCount", "urgency", "originalText"]
        }
    })
}

fn code_fence() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n?(.*?)\n?\s*```\s*$").ok())
        .as_ref()
}

fn strip_code_fence(raw: &str) -> &str {
    match code_fence()
        .and_then(|re| re.captures(raw))
        .and_then(|c| c.get(1))
    {
        Some(m) => m.as_str(),
        None => raw,
    }
}

/// Parse the service's JSON text into validated candidates.
///
/// All-or-nothing: one bad element fails the whole response.
pub fn parse_candidates(raw: &str) -> CoreResult<Vec<RequestCandidate>> {
    let body = strip_code_fence(raw).trim();
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(body)
        .map_err(|e| CoreError::Extraction(format!("response is not valid JSON: {}", e)))?;
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(CoreError::Extraction(format!(
                "expected a JSON array of requests, got {}",
                json_kind(&other)
            )))
        }
    };
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| validate_candidate(idx, item))
        .collect()
}

fn validate_candidate(idx: usize, item: &Value) -> CoreResult<RequestCandidate> {
    let obj = item.as_object().ok_or_else(|| {
        CoreError::Extraction(format!("item {} is {}, not an object", idx, json_kind(item)))
    })?;

    let urgency_raw = required_str(obj, idx, "urgency")?;
    let urgency = UrgencyLevel::parse(urgency_raw).ok_or_else(|| {
        CoreError::Extraction(format!("item {}: unknown urgency '{}'", idx, urgency_raw))
    })?;

    Ok(RequestCandidate {
        requester_name: or_unknown(required_str(obj, idx, "requesterName")?),
        location: or_unknown(required_str(obj, idx, "location")?),
        contact_number: optional_contact(obj, idx)?,
        needs: required_str(obj, idx, "needs")?.to_string(),
        people_count: people_count(obj, idx)?,
        urgency,
        original_text: required_str(obj, idx, "originalText")?.to_string(),
    })
}

fn required_str<'a>(obj: &'a Map<String, Value>, idx: usize, key: &str) -> CoreResult<&'a str> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(CoreError::Extraction(format!(
            "item {}: field {} must be a string, got {}",
            idx,
            key,
            json_kind(other)
        ))),
        None => Err(CoreError::Extraction(format!(
            "item {}: missing required field {}",
            idx, key
        ))),
    }
}

fn or_unknown(raw: &str) -> String {
    if raw.trim().is_empty() {
        UNKNOWN_MARKER.to_string()
    } else {
        raw.to_string()
    }
}

fn optional_contact(obj: &Map<String, Value>, idx: usize) -> CoreResult<Option<String>> {
    match obj.get("contactNumber") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let t = s.trim();
            if t.is_empty() || t.eq_ignore_ascii_case(UNKNOWN_MARKER) {
                Ok(None)
            } else {
                Ok(Some(s.clone()))
            }
        }
        Some(other) => Err(CoreError::Extraction(format!(
            "item {}: field contactNumber must be a string, got {}",
            idx,
            json_kind(other)
        ))),
    }
}

fn people_count(obj: &Map<String, Value>, idx: usize) -> CoreResult<u32> {
    let n = match obj.get("peopleCount") {
        None | Some(Value::Null) => return Ok(1),
        Some(Value::Number(n)) => n,
        Some(other) => {
            return Err(CoreError::Extraction(format!(
                "item {}: peopleCount must be a number, got {}",
                idx,
                json_kind(other)
            )))
        }
    };
    if let Some(u) = n.as_u64() {
        return u32::try_from(u).map_err(|_| {
            CoreError::Extraction(format!("item {}: peopleCount {} out of range", idx, u))
        });
    }
    let f = n.as_f64().unwrap_or(f64::NAN);
    if !f.is_finite() || f < 0.0 || f.round() > f64::from(u32::MAX) {
        return Err(CoreError::Extraction(format!(
            "item {}: peopleCount {} is not a non-negative count",
            idx, n
        )));
    }
    Ok(f.round() as u32)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
