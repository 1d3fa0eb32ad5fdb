//! LocalLens - request orchestration and response caching for the
//! LocalLens recommendation and insight APIs.
//!
//! This crate sits between a UI layer and two HTTP backends: the
//! authenticated recommendations/insights API and a places proxy
//! (geocoding, place search, generated summaries). It provides:
//!
//! - a read-through, TTL-checked cache keyed by normalized coordinates,
//! - an HTTP executor with per-attempt timeouts, bounded retries with
//!   exponential backoff, and a one-time credential refresh on 401,
//! - a credential manager that shares concurrent loads,
//! - best-effort bulk cache eviction.
//!
//! # Example
//!
//! ```rust,no_run
//! use locallens::{LensGateway, LocalLens};
//!
//! #[tokio::main]
//! async fn main() -> locallens::Result<()> {
//!     let client = LocalLens::builder()
//!         .api_base_url("https://api.locallens.com/v1")
//!         .build()?;
//!
//!     client.update_credential("my-api-key").await;
//!     let recommendations = client.get_recommendations(40.71234, -74.00567).await?;
//!     println!("{recommendations}");
//!
//!     let discovery = client.discover("Lisbon").await?;
//!     for place in discovery.items {
//!         println!("{}: {}", place.name, place.authentic_summary);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod credential;
pub mod discovery;
pub mod error;
pub mod gateway;
pub mod geo;
pub mod http;
pub mod store;
pub mod telemetry;
pub mod traits;

// Re-export main types at crate root
pub use cache::{CacheEntry, QueryKind, ResponseCache};
pub use credential::{CredentialManager, CredentialStatus};
pub use discovery::{DiscoveredPlace, Discovery};
pub use error::{LensError, Result};
pub use gateway::{LensClient, LocalLens, LocalLensBuilder};
pub use geo::{GeocodedLocation, PlaceRecord};
pub use http::{RequestExecutor, RequestOptions, RetryConfig};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use traits::LensGateway;

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
