use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

// Canonical form used for journal hashing:
// - keys sorted lexicographically at every depth
// - compact separators
// - integers only; floats are rejected so hashes never depend on float formatting
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> CoreResult<Vec<u8>> {
    let v = serde_json::to_value(value)?;
    let normalized = normalize_value(v)?;
    let s = serde_json::to_string(&normalized)?;
    Ok(s.into_bytes())
}

fn normalize_value(v: Value) -> CoreResult<Value> {
    match v {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(k, vv)| normalize_value(vv).map(|n| (k, n)))
                .collect::<CoreResult<_>>()?;
            Ok(Value::Object(sorted.into_iter().collect()))
        }
        Value::Array(arr) => Ok(Value::Array(
            arr.into_iter()
                .map(normalize_value)
                .collect::<CoreResult<Vec<_>>>()?,
        )),
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Ok(Value::Number(n))
            } else {
                Err(CoreError::InvalidInput(
                    "canonical JSON forbids non-integer numbers".to_string(),
                ))
            }
        }
        other => Ok(other),
    }
}
