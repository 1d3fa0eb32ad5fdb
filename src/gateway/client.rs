//! LensClient - the explicitly constructed, cached request client

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::cache::{QueryKind, ResponseCache};
use crate::credential::CredentialManager;
use crate::geo::places::{parse_geocode, parse_place_details, parse_places, parse_summary};
use crate::geo::{
    DEFAULT_RADIUS_METERS, DEFAULT_SEARCH_LIMIT, DISCOVERY_CANDIDATE_LIMIT, GeocodedLocation,
    PlaceRecord, categories_for,
};
use crate::http::{RequestExecutor, RequestOptions};
use crate::store::KeyValueStore;
use crate::{LensError, LensGateway, Result};

/// Proxy route forwarding to the places provider.
const PLACES_ROUTE: &str = "/geoapify";

/// Proxy route forwarding to the summarization model.
const SUMMARY_ROUTE: &str = "/openai";

/// Model requested for place summaries.
pub const SUMMARY_MODEL: &str = "gpt-4o-mini";

const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a helpful travel assistant that specializes in finding authentic, local experiences.";

/// Client owning the API/proxy executors, the credential, and the cache.
///
/// Built with [`LocalLens::builder()`](crate::LocalLens::builder). There is
/// no process-wide instance: the composition root owns it and hands out
/// references (or an `Arc`) to whoever needs it.
pub struct LensClient {
    api: RequestExecutor,
    proxy: RequestExecutor,
    credentials: Arc<CredentialManager>,
    cache: ResponseCache,
    store: Arc<dyn KeyValueStore>,
}

impl LensClient {
    pub(crate) fn new(
        api: RequestExecutor,
        proxy: RequestExecutor,
        credentials: Arc<CredentialManager>,
        cache: ResponseCache,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            api,
            proxy,
            credentials,
            cache,
            store,
        }
    }

    /// Credential manager shared with the API executor.
    pub fn credentials(&self) -> &CredentialManager {
        &self.credentials
    }

    /// Response cache used by the cached queries.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Underlying key-value store.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Read-through query shared by recommendations and insights.
    async fn cached_query(&self, kind: QueryKind, lat: f64, lon: f64) -> Result<Value> {
        require_coordinate("latitude", lat, kind)?;
        require_coordinate("longitude", lon, kind)?;

        let key = self.cache.key(kind, lat, lon);
        if let Some(data) = self.cache.get_fresh(kind, &key).await {
            return Ok(data);
        }

        debug!(kind = kind.label(), %key, "fetching fresh data");
        let options = RequestOptions::get().query("lat", lat).query("lon", lon);
        let data = self.api.execute(kind.path(), &options).await?;
        self.cache.put(&key, &data).await;
        Ok(data)
    }

    /// POST a provider request through the places proxy.
    async fn places_request(&self, endpoint: &str, query_params: Value) -> Result<Value> {
        let body = json!({
            "endpoint": endpoint,
            "query_params": query_params,
        });
        self.proxy
            .execute(PLACES_ROUTE, &RequestOptions::post(body).auth(false))
            .await
    }
}

/// Reject coordinates that are absent (NaN) or otherwise not finite.
fn require_coordinate(name: &str, value: f64, kind: QueryKind) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LensError::InvalidArgument(format!(
            "{name} is missing or not a finite number for {}",
            kind.label()
        )))
    }
}

#[async_trait]
impl LensGateway for LensClient {
    async fn get_recommendations(&self, lat: f64, lon: f64) -> Result<Value> {
        self.cached_query(QueryKind::Recommendations, lat, lon).await
    }

    async fn get_insights(&self, lat: f64, lon: f64) -> Result<Value> {
        self.cached_query(QueryKind::Insights, lat, lon).await
    }

    async fn geocode(&self, text: &str) -> Result<GeocodedLocation> {
        let text = text.trim();
        if text.is_empty() {
            return Err(LensError::InvalidArgument(
                "location text cannot be empty for geocoding".to_string(),
            ));
        }

        let body = self
            .places_request("/v1/geocode/search", json!({ "text": text, "limit": 1 }))
            .await?;
        let location = parse_geocode(&body, text)?;
        info!(query = text, lat = location.lat, lon = location.lon, "geocoded location");
        Ok(location)
    }

    async fn search_by_query(
        &self,
        place_type: &str,
        lat: f64,
        lon: f64,
        radius: Option<f64>,
        limit: Option<u32>,
    ) -> Result<Vec<PlaceRecord>> {
        let radius = radius.unwrap_or(f64::from(DEFAULT_RADIUS_METERS));
        if !lat.is_finite() || !lon.is_finite() || !radius.is_finite() || radius <= 0.0 {
            return Err(LensError::InvalidArgument(format!(
                "invalid coordinates or radius for place search (lat={lat}, lon={lon}, radius={radius})"
            )));
        }

        let limit = limit.unwrap_or(if place_type.trim().is_empty() {
            DISCOVERY_CANDIDATE_LIMIT
        } else {
            DEFAULT_SEARCH_LIMIT
        });
        let categories = categories_for(place_type);
        debug!(place_type, categories, limit, "searching places");

        let body = self
            .places_request(
                "/v2/places",
                json!({
                    "categories": categories,
                    "filter": format!("circle:{lon},{lat},{radius}"),
                    "limit": limit,
                }),
            )
            .await?;
        let places = parse_places(&body);
        debug!(place_type, count = places.len(), "place search complete");
        Ok(places)
    }

    async fn place_details(&self, place_id: &str) -> Result<Option<Value>> {
        let place_id = place_id.trim();
        if place_id.is_empty() {
            return Ok(None);
        }
        let body = self
            .places_request("/v2/place-details", json!({ "id": place_id }))
            .await?;
        Ok(parse_place_details(body))
    }

    async fn summarize_place(&self, place_name: &str, location_name: &str) -> Result<String> {
        let prompt = format!(
            "For the place named \"{place_name}\" located in \"{location_name}\", provide a short, \
             engaging summary (around 2-3 sentences, max 70 words). This summary should highlight \
             why it might be considered an authentic or \"off-the-beaten-path\" experience for a \
             traveler, focusing on its unique local appeal rather than typical tourist descriptions."
        );
        let body = json!({
            "model": SUMMARY_MODEL,
            "messages": [
                { "role": "system", "content": SUMMARY_SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        });
        let response = self
            .proxy
            .execute(SUMMARY_ROUTE, &RequestOptions::post(body).auth(false))
            .await?;
        parse_summary(&response)
    }

    async fn clear_cache(&self) -> usize {
        self.cache.clear().await
    }

    async fn update_credential(&self, value: &str) {
        self.credentials.update(value).await;
    }
}
