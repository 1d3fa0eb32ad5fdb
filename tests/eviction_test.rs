//! Tests for bulk cache eviction.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;

use locallens::cache::{CACHE_TTL, ResponseCache, clear_prefixes};
use locallens::{FileStore, KeyValueStore, LensError, LensGateway, LocalLens, MemoryStore, Result};

fn seeded() -> MemoryStore {
    MemoryStore::with_entries([
        ("ll_rec_1.00000_2.00000".to_string(), json!({"data": 1, "timestamp": 0})),
        ("ll_rec_3.00000_4.00000".to_string(), json!({"data": 2, "timestamp": 0})),
        ("ll_ins_1.00000_2.00000".to_string(), json!({"data": 3, "timestamp": 0})),
        ("locallens_apiKey".to_string(), json!("secret")),
        ("ll_settings".to_string(), json!({"theme": "dark"})),
    ])
}

#[tokio::test]
async fn clear_removes_only_cache_prefixes() {
    let store = Arc::new(seeded());
    let cache = ResponseCache::new(store.clone(), "ll", CACHE_TTL);

    assert_eq!(cache.clear().await, 3);

    let all = store.get_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all.get("locallens_apiKey"), Some(&json!("secret")));
    assert!(all.contains_key("ll_settings"));
}

#[tokio::test]
async fn clear_on_empty_store_is_zero() {
    let store = MemoryStore::new();
    let removed = clear_prefixes(&store, &["ll_rec_".to_string()]).await;
    assert_eq!(removed, 0);
}

#[tokio::test]
async fn clear_is_idempotent() {
    let store = Arc::new(seeded());
    let client = LocalLens::builder()
        .store(store.clone())
        .build()
        .unwrap();

    assert_eq!(client.clear_cache().await, 3);
    assert_eq!(client.clear_cache().await, 0);
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn clear_persists_to_file_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    let store = FileStore::new(&path);
    store
        .set(HashMap::from([
            ("ll_ins_0.00000_0.00000".to_string(), json!({"data": 1, "timestamp": 0})),
            ("locallens_apiKey".to_string(), json!("k")),
        ]))
        .await
        .unwrap();

    let removed = clear_prefixes(&store, &["ll_rec_".to_string(), "ll_ins_".to_string()]).await;
    assert_eq!(removed, 1);

    let reopened = FileStore::new(&path);
    let keys: Vec<String> = reopened.get_all().await.unwrap().into_keys().collect();
    assert_eq!(keys, vec!["locallens_apiKey".to_string()]);
}

/// Store that enumerates fine but refuses removals.
struct ReadOnlyStore(MemoryStore);

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.0.get(key).await
    }

    async fn set(&self, _items: HashMap<String, Value>) -> Result<()> {
        Err(LensError::StoreUnavailable("read-only".to_string()))
    }

    async fn remove(&self, _keys: &[String]) -> Result<()> {
        Err(LensError::StoreUnavailable("read-only".to_string()))
    }

    async fn get_all(&self) -> Result<HashMap<String, Value>> {
        self.0.get_all().await
    }
}

#[tokio::test]
async fn removal_failure_reports_zero() {
    let store = ReadOnlyStore(seeded());
    let removed = clear_prefixes(&store, &["ll_rec_".to_string()]).await;
    assert_eq!(removed, 0);
    assert_eq!(store.get_all().await.unwrap().len(), 5);
}
