//! Read-through response caching on top of the key-value store.
//!
//! - [`response::ResponseCache`]: TTL-checked entries for the
//!   recommendation and insight endpoints, keyed by normalized coordinates.
//! - [`eviction`]: best-effort bulk removal of every cache entry.
//!
//! # Key layout
//!
//! ```text
//! <namespace>_rec_<lat>_<lon>    recommendations
//! <namespace>_ins_<lat>_<lon>    insights
//! ```
//!
//! `<lat>`/`<lon>` come from [`normalize`](crate::geo::normalize), so two
//! geographically identical inputs always share a key. The default
//! namespace is [`DEFAULT_CACHE_NAMESPACE`].

pub mod eviction;
pub mod response;

pub use eviction::clear_prefixes;
pub use response::{CACHE_TTL, CacheEntry, QueryKind, ResponseCache};

/// Default cache key namespace.
pub const DEFAULT_CACHE_NAMESPACE: &str = "ll";
