//! Support for the `lens` binary: configuration and client construction.

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use crate::store::FileStore;
use crate::{LensClient, LocalLens, Result};

pub use config::Config;

/// Build a [`LensClient`] from configuration.
pub fn build_client(config: &Config) -> Result<LensClient> {
    let store = match &config.store.path {
        Some(path) => FileStore::new(path),
        None => FileStore::at_default_path(),
    };

    LocalLens::builder()
        .api_base_url(&config.api.base_url)
        .proxy_base_url(&config.api.proxy_url)
        .timeout(Duration::from_secs(config.api.timeout_secs))
        .retry(config.retry.to_retry_config())
        .cache_ttl(Duration::from_secs(config.cache.ttl_secs))
        .store(Arc::new(store))
        .build()
}
