//! Core LensGateway trait

use async_trait::async_trait;
use serde_json::Value;

use crate::discovery::{self, Discovery};
use crate::geo::{GeocodedLocation, PlaceRecord};
use crate::Result;

/// Operations exposed to the rendering/UI layer.
///
/// UI code depends on this trait rather than on [`LensClient`](crate::LensClient)
/// so it can be exercised against fakes. Every method returns plain,
/// JSON-compatible data or a typed [`LensError`](crate::LensError).
#[async_trait]
pub trait LensGateway: Send + Sync {
    // ===== Cached API queries =====

    /// Recommendations near a point, served from cache while fresh.
    async fn get_recommendations(&self, lat: f64, lon: f64) -> Result<Value>;

    /// Insights near a point, served from cache while fresh.
    async fn get_insights(&self, lat: f64, lon: f64) -> Result<Value>;

    // ===== Places proxy =====

    /// Resolve free text to a location.
    async fn geocode(&self, text: &str) -> Result<GeocodedLocation>;

    /// Places of a given type around a point.
    ///
    /// `radius` defaults to [`DEFAULT_RADIUS_METERS`](crate::geo::DEFAULT_RADIUS_METERS).
    /// `limit` defaults to [`DEFAULT_SEARCH_LIMIT`](crate::geo::DEFAULT_SEARCH_LIMIT),
    /// or [`DISCOVERY_CANDIDATE_LIMIT`](crate::geo::DISCOVERY_CANDIDATE_LIMIT)
    /// when `place_type` is empty.
    async fn search_by_query(
        &self,
        place_type: &str,
        lat: f64,
        lon: f64,
        radius: Option<f64>,
        limit: Option<u32>,
    ) -> Result<Vec<PlaceRecord>>;

    /// Raw detail record for a place. Empty ids yield `Ok(None)`.
    async fn place_details(&self, place_id: &str) -> Result<Option<Value>>;

    /// Short generated summary of a place.
    async fn summarize_place(&self, place_name: &str, location_name: &str) -> Result<String>;

    // ===== Maintenance =====

    /// Remove every cached response. Returns the number of entries removed.
    async fn clear_cache(&self) -> usize;

    /// Replace the stored API credential.
    async fn update_credential(&self, value: &str);

    // ===== Orchestration (provided) =====

    /// Geocode `location_query`, find things to do there, and annotate the
    /// top candidates with summaries.
    async fn discover(&self, location_query: &str) -> Result<Discovery> {
        discovery::discover(self, location_query).await
    }

    /// Geocode `location_query` and search it for `place_type`.
    async fn quick_search(&self, location_query: &str, place_type: &str) -> Result<Vec<PlaceRecord>> {
        discovery::quick_search(self, location_query, place_type).await
    }
}
