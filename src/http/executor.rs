//! Single-endpoint HTTP executor with timeout, retry and credential refresh.
//!
//! [`RequestExecutor::execute`] runs one *logical* request: an explicit,
//! bounded loop of attempts. Each attempt is built fresh (so a refreshed
//! credential is picked up), bounded by the per-attempt timeout, and its
//! outcome classified:
//!
//! - 2xx → JSON body returned.
//! - retryable failure (401, 408, 429, 5xx, timeout) with retries left →
//!   wait `2^attempt * base_backoff + jitter`, try again. A 401 on an
//!   authenticated request invalidates the credential first.
//! - anything else → terminal error (`Api { status, body }`, `Timeout`,
//!   `Http`).
//!
//! Attempts within one logical request are strictly sequential; a retry
//! never starts before its backoff elapsed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, Url};
use serde_json::Value;
use tracing::{debug, error, warn};

use super::retry::RetryConfig;
use crate::credential::CredentialManager;
use crate::telemetry;
use crate::{LensError, Result};

/// Default per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Options for one logical request.
///
/// ```rust
/// # use locallens::RequestOptions;
/// let options = RequestOptions::get()
///     .query("lat", 40.71234)
///     .query_opt("radius", None::<u32>)
///     .auth(false);
/// assert_eq!(options.query_pairs().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    query: Vec<(String, String)>,
    body: Option<Value>,
    use_auth: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            query: Vec::new(),
            body: None,
            use_auth: true,
        }
    }
}

impl RequestOptions {
    /// Authenticated `GET` without parameters.
    pub fn get() -> Self {
        Self::default()
    }

    /// Authenticated `POST` with a JSON body.
    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    /// Override the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter only when `value` is present.
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// Whether to attach the bearer credential. Default: true.
    pub fn auth(mut self, use_auth: bool) -> Self {
        self.use_auth = use_auth;
        self
    }

    /// Query parameters in insertion order.
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// Whether the request carries the bearer credential.
    pub fn uses_auth(&self) -> bool {
        self.use_auth
    }
}

/// One concrete attempt of a logical request. Lives only while it is sent.
#[derive(Debug)]
struct RequestAttempt<'a> {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<&'a Value>,
    index: u32,
}

/// Issues requests against one base URL.
///
/// Cheap to clone; clones share the connection pool and credential manager.
#[derive(Clone)]
pub struct RequestExecutor {
    http: Client,
    base_url: Url,
    credentials: Option<Arc<CredentialManager>>,
    retry: RetryConfig,
    timeout: Duration,
}

impl RequestExecutor {
    /// Create an executor for `base_url`.
    ///
    /// `credentials` is consulted for requests with `auth(true)`; without a
    /// manager such requests go out with an empty bearer token.
    pub fn new(
        http: Client,
        base_url: &str,
        credentials: Option<Arc<CredentialManager>>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            LensError::Configuration(format!("invalid base URL '{base_url}': {e}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(LensError::Configuration(format!(
                "base URL '{base_url}' cannot carry a path"
            )));
        }
        Ok(Self {
            http,
            base_url,
            credentials,
            retry: RetryConfig::default(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Replace the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL every path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Run a logical request against `base_url + path`, retrying as configured.
    pub async fn execute(&self, path: &str, options: &RequestOptions) -> Result<Value> {
        let start = Instant::now();
        let result = self.run(path, options).await;

        let status = if result.is_ok() { "ok" } else { "error" };
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "path" => path.to_owned(),
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS, "path" => path.to_owned())
            .record(start.elapsed().as_secs_f64());

        result
    }

    async fn run(&self, path: &str, options: &RequestOptions) -> Result<Value> {
        let mut attempt = 0;
        loop {
            let request = self.prepare(path, options, attempt).await?;
            match self.send(request).await {
                Ok(value) => return Ok(value),
                Err(e) if self.retry.should_retry(&e, attempt) => {
                    if e.status() == Some(401) && options.use_auth {
                        if let Some(credentials) = &self.credentials {
                            debug!(path, "reloading credential after 401");
                            credentials.invalidate();
                        }
                    }
                    let delay = self.retry.effective_delay(attempt);
                    metrics::counter!(telemetry::RETRIES_TOTAL, "path" => path.to_owned())
                        .increment(1);
                    warn!(
                        path,
                        status = e.status(),
                        attempt = attempt + 1,
                        max_retries = self.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!(path, attempts = attempt + 1, error = %e, "request failed");
                    return Err(e);
                }
            }
        }
    }

    /// Build the URL and headers for one attempt.
    async fn prepare<'a>(
        &self,
        path: &str,
        options: &'a RequestOptions,
        index: u32,
    ) -> Result<RequestAttempt<'a>> {
        let mut url = self.url_for(path);
        if !options.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &options.query {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if options.body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if options.use_auth {
            let credential = match &self.credentials {
                Some(manager) => manager.load().await,
                None => String::new(),
            };
            if credential.is_empty() {
                warn!(path, "credential missing for authenticated request; it will likely be rejected");
            }
            let value = HeaderValue::from_str(&format!("Bearer {credential}")).map_err(|_| {
                LensError::Configuration("credential contains invalid header characters".into())
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(RequestAttempt {
            method: options.method.clone(),
            url,
            headers,
            body: options.body.as_ref(),
            index,
        })
    }

    /// Send one attempt and classify its outcome.
    async fn send(&self, request: RequestAttempt<'_>) -> Result<Value> {
        debug!(
            method = %request.method,
            url = %request.url,
            attempt = request.index,
            "sending request"
        );

        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers)
            .timeout(self.timeout);
        if let Some(body) = request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();

        if status.is_success() {
            let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let body = self.error_body(response).await;
        Err(LensError::Api {
            status: status.as_u16(),
            body,
        })
    }

    /// Parse a failed response body: JSON when declared as such, text otherwise.
    ///
    /// An unreadable body becomes `""`; the status still decides the outcome.
    async fn error_body(&self, response: Response) -> Value {
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                debug!(error = %e, "failed to read error response body");
                String::new()
            }
        };
        if is_json {
            if let Ok(value) = serde_json::from_str(&text) {
                return value;
            }
        }
        Value::String(text)
    }

    fn classify(&self, err: reqwest::Error) -> LensError {
        if err.is_timeout() {
            LensError::Timeout {
                elapsed: self.timeout,
            }
        } else {
            LensError::from(err)
        }
    }

    /// `base_url` with `path` appended to its path.
    fn url_for(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }
}
