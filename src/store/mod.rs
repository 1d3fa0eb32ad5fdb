//! Persistent key-value store adapter.
//!
//! Everything locallens persists (the API credential and the cached
//! recommendation/insight responses) goes through [`KeyValueStore`]. Values
//! are JSON; keys are namespaced strings (see [`crate::cache`] for the
//! cache key layout).
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryStore`]: process-local, mostly for tests and short-lived tools.
//! - [`FileStore`]: a single JSON file, rewritten atomically on mutation.
//!
//! # Failure semantics
//!
//! Every operation may fail with [`LensError::StoreUnavailable`](crate::LensError::StoreUnavailable).
//! Callers inside this crate treat such failures as non-fatal: a failed read
//! is a cache miss (or an empty credential), a failed write is logged and
//! ignored. No ordering or transactional guarantees hold across keys.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::Result;

/// Asynchronous string-keyed store of JSON values.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read one key. `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Write (insert or overwrite) every entry of `items`.
    async fn set(&self, items: HashMap<String, Value>) -> Result<()>;

    /// Remove the given keys. Absent keys are ignored.
    async fn remove(&self, keys: &[String]) -> Result<()>;

    /// Snapshot of every stored entry.
    async fn get_all(&self) -> Result<HashMap<String, Value>>;

    /// All stored keys starting with `prefix`.
    ///
    /// Default implementation filters [`get_all`](Self::get_all).
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let all = self.get_all().await?;
        Ok(all.into_keys().filter(|k| k.starts_with(prefix)).collect())
    }
}
