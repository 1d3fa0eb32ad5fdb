//! Builder for configuring client instances

use std::sync::Arc;
use std::time::Duration;

use super::LensClient;
use crate::cache::{CACHE_TTL, DEFAULT_CACHE_NAMESPACE, ResponseCache};
use crate::credential::CredentialManager;
use crate::http::{DEFAULT_TIMEOUT, RequestExecutor, RetryConfig};
use crate::store::{FileStore, KeyValueStore};
use crate::{LensError, Result};

/// Default base URL of the recommendations/insights API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.locallens.com/v1";

/// Default base URL of the places proxy (a locally running worker).
pub const DEFAULT_PROXY_BASE_URL: &str = "http://127.0.0.1:8787";

/// Default application namespace for persisted settings.
pub const DEFAULT_APP_NAMESPACE: &str = "locallens";

/// Main entry point for creating client instances.
pub struct LocalLens;

impl LocalLens {
    /// Create a new builder for configuring the client.
    pub fn builder() -> LocalLensBuilder {
        LocalLensBuilder::new()
    }
}

/// Builder for configuring client instances.
pub struct LocalLensBuilder {
    api_base_url: String,
    proxy_base_url: String,
    timeout: Duration,
    retry: RetryConfig,
    cache_ttl: Duration,
    app_namespace: String,
    cache_namespace: String,
    store: Option<Arc<dyn KeyValueStore>>,
    http: Option<reqwest::Client>,
}

impl LocalLensBuilder {
    pub fn new() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            proxy_base_url: DEFAULT_PROXY_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
            cache_ttl: CACHE_TTL,
            app_namespace: DEFAULT_APP_NAMESPACE.to_string(),
            cache_namespace: DEFAULT_CACHE_NAMESPACE.to_string(),
            store: None,
            http: None,
        }
    }

    /// Base URL of the recommendations/insights API.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Base URL of the places proxy (geocoding, search, summaries).
    pub fn proxy_base_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_base_url = url.into();
        self
    }

    /// Per-attempt request timeout (default: 10s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retry policy for API requests.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Time-to-live for cached recommendations/insights (default: 5 min).
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Namespace of the persisted credential key (`"<app>_apiKey"`).
    pub fn app_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.app_namespace = namespace.into();
        self
    }

    /// Namespace of cache keys (`"<ns>_rec_…"`, `"<ns>_ins_…"`).
    pub fn cache_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.cache_namespace = namespace.into();
        self
    }

    /// Key-value store for the credential and cached responses.
    ///
    /// Defaults to a [`FileStore`] at `<data_dir>/locallens/store.json`.
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Share an existing HTTP client (connection pool).
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<LensClient> {
        if self.app_namespace.is_empty() || self.cache_namespace.is_empty() {
            return Err(LensError::Configuration(
                "namespaces must not be empty".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(LensError::Configuration(
                "request timeout must be positive".to_string(),
            ));
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(FileStore::at_default_path()));
        let http = self.http.unwrap_or_default();

        let credentials = Arc::new(CredentialManager::new(
            store.clone(),
            format!("{}_apiKey", self.app_namespace),
        ));

        let api = RequestExecutor::new(http.clone(), &self.api_base_url, Some(credentials.clone()))?
            .with_retry(self.retry.clone())
            .with_timeout(self.timeout);
        let proxy = RequestExecutor::new(http, &self.proxy_base_url, None)?
            .with_retry(self.retry)
            .with_timeout(self.timeout);

        let cache = ResponseCache::new(store.clone(), self.cache_namespace, self.cache_ttl);

        Ok(LensClient::new(api, proxy, credentials, cache, store))
    }
}

impl Default for LocalLensBuilder {
    fn default() -> Self {
        Self::new()
    }
}
