//! API credential loading with shared in-flight loads.
//!
//! [`CredentialManager`] owns the bearer token used for authenticated
//! requests. The token lives in memory once loaded and is persisted in the
//! [`KeyValueStore`] under a namespaced key (`"<app>_apiKey"`).
//!
//! # Load semantics
//!
//! - A cached value is returned immediately.
//! - Otherwise one store read is started and shared: every `load()` issued
//!   while it is pending awaits the same future, so concurrent callers
//!   trigger exactly one read.
//! - Store failures never surface. The credential falls back to the empty
//!   string and a warning is logged.
//!
//! [`update()`](CredentialManager::update) takes effect immediately; a load
//! that completes afterwards does not overwrite it.
//! [`invalidate()`](CredentialManager::invalidate) forces the next `load()`
//! to read the store, joining a read that is already in flight rather than
//! starting another one. At most one store read is pending at any time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::store::KeyValueStore;
use crate::telemetry;

/// Observable lifecycle of the in-memory credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    /// Never loaded, or invalidated since the last load.
    Unloaded,
    /// A store read is in flight.
    Loading,
    /// Loaded, non-empty.
    Present,
    /// Loaded, but the store held no credential (or could not be read).
    Empty,
}

type PendingLoad = Shared<BoxFuture<'static, String>>;

enum State {
    Unloaded,
    Loading { generation: u64, pending: PendingLoad },
    Loaded(String),
}

struct Inner {
    state: State,
    generation: u64,
}

/// Loads, caches, updates and invalidates the API credential.
pub struct CredentialManager {
    store: Arc<dyn KeyValueStore>,
    storage_key: String,
    inner: Mutex<Inner>,
}

impl CredentialManager {
    /// Create a manager reading the credential from `storage_key` in `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        Self {
            store,
            storage_key: storage_key.into(),
            inner: Mutex::new(Inner {
                state: State::Unloaded,
                generation: 0,
            }),
        }
    }

    /// Key under which the credential is persisted.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Current lifecycle state.
    pub fn status(&self) -> CredentialStatus {
        match &self.lock().state {
            State::Unloaded => CredentialStatus::Unloaded,
            State::Loading { .. } => CredentialStatus::Loading,
            State::Loaded(v) if v.is_empty() => CredentialStatus::Empty,
            State::Loaded(_) => CredentialStatus::Present,
        }
    }

    /// Return the credential, reading it from the store if not cached.
    ///
    /// Never fails: an absent or unreadable credential yields `""`.
    pub async fn load(&self) -> String {
        let (generation, pending) = {
            let mut inner = self.lock();
            match &inner.state {
                State::Loaded(value) => return value.clone(),
                State::Loading {
                    generation,
                    pending,
                } => (*generation, pending.clone()),
                State::Unloaded => {
                    inner.generation += 1;
                    let generation = inner.generation;
                    let pending = read_credential(self.store.clone(), self.storage_key.clone())
                        .boxed()
                        .shared();
                    inner.state = State::Loading {
                        generation,
                        pending: pending.clone(),
                    };
                    (generation, pending)
                }
            }
        };

        let value = pending.await;

        let mut inner = self.lock();
        if matches!(&inner.state, State::Loading { generation: g, .. } if *g == generation) {
            inner.state = State::Loaded(value.clone());
        }
        value
    }

    /// Replace the credential.
    ///
    /// The in-memory value is replaced before the store write starts, so
    /// `load()` sees it even while persistence is still pending.
    /// Persistence failures are logged, not returned.
    pub async fn update(&self, new_value: impl Into<String>) {
        let value = new_value.into();
        {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.state = State::Loaded(value.clone());
        }

        let items = HashMap::from([(self.storage_key.clone(), Value::String(value))]);
        match self.store.set(items).await {
            Ok(()) => info!(key = %self.storage_key, "credential updated"),
            Err(e) => warn!(key = %self.storage_key, error = %e, "failed to persist credential"),
        }
    }

    /// Drop the cached credential so the next `load()` re-reads the store.
    ///
    /// A store read already in flight is kept: later `load()` calls join it
    /// instead of starting a second read.
    pub fn invalidate(&self) {
        let mut inner = self.lock();
        let (loading, loaded) = match &inner.state {
            State::Loading { .. } => (true, false),
            State::Loaded(_) => (false, true),
            State::Unloaded => (false, false),
        };
        if loading {
            debug!(key = %self.storage_key, "credential load in flight; joining it");
        } else if loaded {
            inner.generation += 1;
            inner.state = State::Unloaded;
            debug!(key = %self.storage_key, "credential invalidated");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State transitions never panic while holding the lock.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Read the credential from the store, degrading every failure to `""`.
async fn read_credential(store: Arc<dyn KeyValueStore>, key: String) -> String {
    metrics::counter!(telemetry::CREDENTIAL_LOADS_TOTAL).increment(1);
    match store.get(&key).await {
        Ok(Some(Value::String(value))) if !value.is_empty() => value,
        Ok(Some(Value::String(_))) | Ok(None) | Ok(Some(Value::Null)) => {
            warn!(%key, "credential not found in store; authenticated requests may fail");
            String::new()
        }
        Ok(Some(other)) => {
            warn!(%key, found = json_type(&other), "stored credential is not a string; ignoring");
            String::new()
        }
        Err(e) => {
            warn!(%key, error = %e, "failed to load credential from store");
            String::new()
        }
    }
}

/// JSON type name of `value`, for logging without the value itself.
fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
