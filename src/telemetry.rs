//! Telemetry metric name constants.
//!
//! Centralised metric names for locallens operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `locallens_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `path`: request path relative to the executor base URL (e.g. "/recommendations")
//! - `status`: outcome: "ok" or "error"
//! - `kind`: cached query kind: "recommendations" or "insights"

/// Total logical requests issued by the executor (retries excluded).
///
/// Labels: `path`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "locallens_requests_total";

/// Logical request duration in seconds, including backoff delays.
///
/// Labels: `path`.
pub const REQUEST_DURATION_SECONDS: &str = "locallens_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `path`.
pub const RETRIES_TOTAL: &str = "locallens_retries_total";

/// Total read-through cache hits.
///
/// Labels: `kind`.
pub const CACHE_HITS_TOTAL: &str = "locallens_cache_hits_total";

/// Total read-through cache misses (absent or stale entries).
///
/// Labels: `kind`.
pub const CACHE_MISSES_TOTAL: &str = "locallens_cache_misses_total";

/// Total credential reads from the key-value store.
pub const CREDENTIAL_LOADS_TOTAL: &str = "locallens_credential_loads_total";
