use crate::determinism::ids::sha256_hex;
use crate::determinism::json_canonical;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JournalEntry {
    pub ts_utc: String, // RFC3339 UTC
    pub kind: String,
    pub session_id: String,
    pub details: serde_json::Value,
    pub prev_hash: String, // hex 64
    pub hash: String,      // hex 64
}

pub const ZERO_HASH_64: &str = "0000000000000000000000000000000000000000000000000000000000000000";

pub const KNOWN_KINDS: [&str; 7] = [
    "CACHE_LOADED",
    "CACHE_LOAD_FAILED",
    "EXTRACTION_STARTED",
    "EXTRACTION_COMPLETED",
    "EXTRACTION_FAILED",
    "CACHE_WRITE_FAILED",
    "CACHE_CLEARED",
];

// The hash covers the canonical bytes of the whole entry with `hash` zeroed.
pub fn compute_entry_hash(entry: &JournalEntry) -> CoreResult<String> {
    let mut e = entry.clone();
    e.hash = ZERO_HASH_64.to_string();
    let bytes = json_canonical::to_canonical_bytes(&e)?;
    Ok(sha256_hex(&bytes))
}

pub fn finalize_entry(mut entry: JournalEntry) -> CoreResult<JournalEntry> {
    if entry.prev_hash.len() != 64 || !entry.prev_hash.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::InvalidInput(
            "prev_hash must be 64 hex chars".to_string(),
        ));
    }
    validate_kind(&entry)?;
    entry.hash = compute_entry_hash(&entry)?;
    Ok(entry)
}

fn validate_kind(entry: &JournalEntry) -> CoreResult<()> {
    if !KNOWN_KINDS.contains(&entry.kind.as_str()) {
        return Err(CoreError::InvalidInput(format!(
            "unknown journal kind {}",
            entry.kind
        )));
    }
    for k in required_detail_keys(&entry.kind) {
        if entry.details.get(k).is_none() {
            return Err(CoreError::InvalidInput(format!(
                "journal entry {} missing details.{}",
                entry.kind, k
            )));
        }
    }
    Ok(())
}

fn required_detail_keys(kind: &str) -> &'static [&'static str] {
    match kind {
        "CACHE_LOADED" => &["records"],
        "CACHE_LOAD_FAILED" => &["reason"],
        "EXTRACTION_STARTED" => &["source", "input_chars"],
        "EXTRACTION_COMPLETED" => &["source", "records_found", "critical_count", "total_after"],
        "EXTRACTION_FAILED" => &["source", "error_kind", "message"],
        "CACHE_WRITE_FAILED" => &["reason", "records_in_memory"],
        "CACHE_CLEARED" => &["records_dropped"],
        _ => &[],
    }
}
