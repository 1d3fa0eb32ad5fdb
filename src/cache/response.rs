//! TTL-checked response cache for coordinate-keyed queries.
//!
//! Entries are stored as `{"data": <response>, "timestamp": <unix millis>}`.
//! Every read is validated against the TTL before being trusted; a stale,
//! malformed or unreadable entry is a miss. Writes are best-effort: a store
//! failure is logged and the fresh data is still returned to the caller.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::geo::normalize;
use crate::store::KeyValueStore;
use crate::telemetry;

/// Default time-to-live for cached responses.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// The cached query endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Recommendations,
    Insights,
}

impl QueryKind {
    /// Both kinds, in key-prefix order.
    pub const ALL: [QueryKind; 2] = [QueryKind::Recommendations, QueryKind::Insights];

    /// Endpoint path on the API base URL.
    pub fn path(self) -> &'static str {
        match self {
            QueryKind::Recommendations => "/recommendations",
            QueryKind::Insights => "/insights",
        }
    }

    /// Short tag used in cache keys.
    pub fn tag(self) -> &'static str {
        match self {
            QueryKind::Recommendations => "rec",
            QueryKind::Insights => "ins",
        }
    }

    /// Metric/log label.
    pub fn label(self) -> &'static str {
        match self {
            QueryKind::Recommendations => "recommendations",
            QueryKind::Insights => "insights",
        }
    }
}

/// Persisted cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Response body exactly as returned by the API.
    pub data: Value,
    /// Unix milliseconds at which the entry was written.
    pub timestamp: u64,
}

impl CacheEntry {
    /// Entry stamped with the current time.
    pub fn now(data: Value) -> Self {
        Self {
            data,
            timestamp: now_millis(),
        }
    }

    /// Whether the entry is still within `ttl` at time `now` (unix millis).
    pub fn is_fresh(&self, ttl: Duration, now: u64) -> bool {
        u128::from(now.saturating_sub(self.timestamp)) < ttl.as_millis()
    }
}

/// Read-through cache over a [`KeyValueStore`].
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            ttl,
        }
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Key prefix shared by every entry of `kind`, e.g. `"ll_rec_"`.
    pub fn prefix(&self, kind: QueryKind) -> String {
        format!("{}_{}_", self.namespace, kind.tag())
    }

    /// Prefixes of every cached kind.
    pub fn prefixes(&self) -> Vec<String> {
        QueryKind::ALL.iter().map(|k| self.prefix(*k)).collect()
    }

    /// Cache key for `kind` at the given coordinates.
    pub fn key(&self, kind: QueryKind, lat: f64, lon: f64) -> String {
        format!("{}{}_{}", self.prefix(kind), normalize(lat), normalize(lon))
    }

    /// Cached data for `key` if present and fresh.
    pub async fn get_fresh(&self, kind: QueryKind, key: &str) -> Option<Value> {
        let hit = match self.store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_value::<CacheEntry>(raw) {
                Ok(entry) if entry.is_fresh(self.ttl, now_millis()) => Some(entry.data),
                Ok(_) => {
                    debug!(key, "cache entry stale");
                    None
                }
                Err(e) => {
                    warn!(key, error = %e, "malformed cache entry; ignoring");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "cache read failed; treating as miss");
                None
            }
        };

        if hit.is_some() {
            debug!(key, "cache hit");
            metrics::counter!(telemetry::CACHE_HITS_TOTAL, "kind" => kind.label()).increment(1);
        } else {
            debug!(key, "cache miss");
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "kind" => kind.label())
                .increment(1);
        }
        hit
    }

    /// Store `data` under `key`, stamped now. Failures are logged only.
    pub async fn put(&self, key: &str, data: &Value) {
        let entry = match serde_json::to_value(CacheEntry::now(data.clone())) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "failed to encode cache entry");
                return;
            }
        };
        if let Err(e) = self.store.set(HashMap::from([(key.to_string(), entry)])).await {
            warn!(key, error = %e, "cache write failed; continuing without caching");
        }
    }

    /// Remove every cache entry. Best-effort; returns the number removed.
    pub async fn clear(&self) -> usize {
        super::clear_prefixes(self.store.as_ref(), &self.prefixes()).await
    }
}

/// Current time in unix milliseconds.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn cache() -> ResponseCache {
        ResponseCache::new(Arc::new(MemoryStore::new()), "ll", CACHE_TTL)
    }

    #[test]
    fn key_uses_normalized_coordinates() {
        let cache = cache();
        assert_eq!(
            cache.key(QueryKind::Recommendations, 40.712341, -74.005671),
            "ll_rec_40.71234_-74.00567"
        );
        assert_eq!(
            cache.key(QueryKind::Insights, 1.0, 2.0),
            "ll_ins_1.00000_2.00000"
        );
    }

    #[test]
    fn prefixes_cover_both_kinds() {
        assert_eq!(cache().prefixes(), vec!["ll_rec_", "ll_ins_"]);
    }

    #[test]
    fn freshness_boundary() {
        let ttl = Duration::from_millis(1000);
        let entry = CacheEntry {
            data: Value::Null,
            timestamp: 10_000,
        };
        assert!(entry.is_fresh(ttl, 10_999));
        assert!(!entry.is_fresh(ttl, 11_000));
        assert!(!entry.is_fresh(ttl, 11_001));
    }

    #[tokio::test]
    async fn put_then_get_fresh() {
        let cache = cache();
        let data = json!({"places": [{"name": "a"}]});
        cache.put("ll_rec_1_2", &data).await;
        assert_eq!(
            cache.get_fresh(QueryKind::Recommendations, "ll_rec_1_2").await,
            Some(data)
        );
    }

    #[tokio::test]
    async fn malformed_entry_is_a_miss() {
        let store = Arc::new(MemoryStore::with_entries([(
            "ll_rec_1_2".to_string(),
            json!("not an entry"),
        )]));
        let cache = ResponseCache::new(store, "ll", CACHE_TTL);
        assert_eq!(
            cache.get_fresh(QueryKind::Recommendations, "ll_rec_1_2").await,
            None
        );
    }
}
