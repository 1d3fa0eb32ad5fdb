//! HTTP request execution: per-attempt timeout, retry with backoff, and
//! credential refresh on authentication failure.

pub mod executor;
pub mod retry;

pub use executor::{DEFAULT_TIMEOUT, RequestExecutor, RequestOptions};
pub use retry::{BASE_BACKOFF, MAX_RETRIES, RetryConfig};
