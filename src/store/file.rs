//! JSON-file backed [`KeyValueStore`].
//!
//! The whole store is one JSON object on disk. Every read goes to the file,
//! so values written by another process (or another `FileStore` on the same
//! path) are visible on the next read. Every mutation rewrites the file
//! atomically (tmp file + rename), so a crash mid-write leaves the previous
//! contents intact.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::KeyValueStore;
use crate::{LensError, Result};

/// Store persisted to a single JSON file.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by `path`. Nothing is read until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store at the default location: `<data_dir>/locallens/store.json`.
    pub fn at_default_path() -> Self {
        Self::new(default_store_path())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the current file contents, apply a mutation and persist the result.
    async fn mutate(&self, f: impl FnOnce(&mut HashMap<String, Value>)) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = load_file(&self.path).await?;
        f(&mut entries);
        save_file(&self.path, &entries).await
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut entries = load_file(&self.path).await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, items: HashMap<String, Value>) -> Result<()> {
        self.mutate(|entries| entries.extend(items)).await
    }

    async fn remove(&self, keys: &[String]) -> Result<()> {
        self.mutate(|entries| {
            for key in keys {
                entries.remove(key);
            }
        })
        .await
    }

    async fn get_all(&self) -> Result<HashMap<String, Value>> {
        load_file(&self.path).await
    }
}

/// Default store path: `<data_dir>/locallens/store.json`.
pub(crate) fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("locallens")
        .join("store.json")
}

/// Read the store file. A missing file is an empty store.
async fn load_file(path: &Path) -> Result<HashMap<String, Value>> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "store file absent, starting empty");
            return Ok(HashMap::new());
        }
        Err(e) => {
            return Err(LensError::StoreUnavailable(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };
    serde_json::from_str(&content).map_err(|e| {
        LensError::StoreUnavailable(format!("corrupt store file {}: {e}", path.display()))
    })
}

/// Write the store file atomically via tmp + rename.
async fn save_file(path: &Path, entries: &HashMap<String, Value>) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            LensError::StoreUnavailable(format!(
                "failed to create store dir {}: {e}",
                parent.display()
            ))
        })?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let json = serde_json::to_string(entries)?;
    tokio::fs::write(&tmp_path, json).await.map_err(|e| {
        LensError::StoreUnavailable(format!("failed to write {}: {e}", tmp_path.display()))
    })?;
    tokio::fs::rename(&tmp_path, path).await.map_err(|e| {
        LensError::StoreUnavailable(format!(
            "failed to rename {} to {}: {e}",
            tmp_path.display(),
            path.display()
        ))
    })?;

    Ok(())
}
