mod common;

use common::{request, BrokenStore};
use relief_core::error::CoreError;
use relief_core::relief::model::UrgencyLevel;
use relief_core::storage::cache::{LoadOutcome, RequestCache, CACHE_KEY};
use relief_core::storage::store::{DurableStore, FileStore, MemoryStore};

fn cache_ids<S: DurableStore>(c: &RequestCache<S>) -> Vec<&str> {
    c.records().iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn missing_key_loads_empty() {
    let c = RequestCache::load(MemoryStore::new());
    assert!(c.is_empty());
    assert_eq!(c.load_outcome(), &LoadOutcome::Missing);
}

#[test]
fn corrupt_payload_loads_empty_without_failing() {
    let mut store = MemoryStore::new();
    store.set(CACHE_KEY, "{not json").unwrap();
    let c = RequestCache::load(store);
    assert!(c.is_empty());
    assert!(matches!(c.load_outcome(), LoadOutcome::Recovered { .. }));
}

#[test]
fn batches_stack_newest_first() {
    let mut c = RequestCache::load(MemoryStore::new());
    c.mutate(vec![request("a1", UrgencyLevel::Low, 1, "X"), request("a2", UrgencyLevel::Low, 1, "X")])
        .unwrap();
    c.mutate(vec![request("b1", UrgencyLevel::High, 1, "Y")]).unwrap();
    c.mutate(vec![request("c1", UrgencyLevel::Critical, 1, "Z"), request("c2", UrgencyLevel::Moderate, 1, "Z")])
        .unwrap();
    assert_eq!(cache_ids(&c), vec!["c1", "c2", "b1", "a1", "a2"]);
}

#[test]
fn every_mutation_rewrites_the_whole_payload() {
    let mut c = RequestCache::load(MemoryStore::new());
    c.mutate(vec![request("a1", UrgencyLevel::Low, 1, "X")]).unwrap();
    c.mutate(vec![request("b1", UrgencyLevel::High, 2, "Y")]).unwrap();

    let raw = c.store().get(CACHE_KEY).unwrap().unwrap();
    let stored: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0]["id"], "b1");
    assert_eq!(stored[1]["id"], "a1");
    assert_eq!(stored[0]["peopleCount"], 2);
}

#[test]
fn file_backed_cache_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut c = RequestCache::load(FileStore::open(dir.path()).unwrap());
        c.mutate(vec![request("a1", UrgencyLevel::Critical, 9, "Sylhet")]).unwrap();
    }
    let reopened = RequestCache::load(FileStore::open(dir.path()).unwrap());
    assert_eq!(reopened.load_outcome(), &LoadOutcome::Loaded { records: 1 });
    assert_eq!(reopened.records()[0].location, "Sylhet");
    assert_eq!(reopened.records()[0].people_count, 9);
}

#[test]
fn clear_removes_the_key_entirely() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = RequestCache::load(FileStore::open(dir.path()).unwrap());
    c.mutate(vec![request("a1", UrgencyLevel::Low, 1, "X")]).unwrap();
    assert!(c.store().path_for(CACHE_KEY).exists());

    c.clear().unwrap();
    assert!(c.is_empty());
    assert_eq!(c.store().get(CACHE_KEY).unwrap(), None);
    assert!(!c.store().path_for(CACHE_KEY).exists());
}

#[test]
fn duplicate_ids_are_rejected_before_any_change() {
    let mut c = RequestCache::load(MemoryStore::new());
    c.mutate(vec![request("a1", UrgencyLevel::Low, 1, "X")]).unwrap();

    let err = c
        .mutate(vec![request("b1", UrgencyLevel::Low, 1, "X"), request("a1", UrgencyLevel::High, 1, "X")])
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInput(_)));
    assert_eq!(cache_ids(&c), vec!["a1"]);
}

#[test]
fn failed_write_keeps_memory_authoritative() {
    let mut c = RequestCache::load(BrokenStore);
    let err = c.mutate(vec![request("a1", UrgencyLevel::Low, 1, "X")]).unwrap_err();
    assert!(matches!(err, CoreError::CacheWrite(_)));
    assert_eq!(cache_ids(&c), vec!["a1"]);
}

#[test]
fn empty_batch_is_a_no_op() {
    let mut c = RequestCache::load(MemoryStore::new());
    assert!(!c.mutate(Vec::new()).unwrap());
    assert!(!c.store().contains_key(CACHE_KEY));
    assert!(c.mutate(vec![request("a1", UrgencyLevel::Low, 1, "X")]).unwrap());
}
