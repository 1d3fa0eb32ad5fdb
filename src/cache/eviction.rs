//! Bulk cache eviction by key prefix.

use tracing::{debug, info, warn};

use crate::store::KeyValueStore;

/// Remove every stored key that starts with one of `prefixes`.
///
/// Best-effort: store failures are logged and reported as zero removals.
/// Keys outside the prefixes are never touched.
pub async fn clear_prefixes(store: &dyn KeyValueStore, prefixes: &[String]) -> usize {
    let all = match store.get_all().await {
        Ok(all) => all,
        Err(e) => {
            warn!(error = %e, "failed to enumerate store for cache eviction");
            return 0;
        }
    };

    let doomed: Vec<String> = all
        .into_keys()
        .filter(|key| prefixes.iter().any(|p| key.starts_with(p.as_str())))
        .collect();

    if doomed.is_empty() {
        debug!("no cache entries to clear");
        return 0;
    }

    match store.remove(&doomed).await {
        Ok(()) => {
            info!(removed = doomed.len(), "cleared response cache");
            doomed.len()
        }
        Err(e) => {
            warn!(error = %e, "failed to clear response cache");
            0
        }
    }
}
