//! Location-first discovery flows built on [`LensGateway`].
//!
//! These compose the gateway primitives the way the popup does: geocode the
//! typed location, search around it, and (for discovery) attach a generated
//! summary to the best few candidates.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::geo::PlaceRecord;
use crate::traits::LensGateway;
use crate::{LensError, Result};

/// Candidates annotated with a summary in [`discover`].
pub const DISCOVERY_SUMMARY_COUNT: usize = 5;

/// Summary used when generating one failed.
pub const FALLBACK_SUMMARY: &str =
    "Could not load an authentic summary for this place. It is a known point of interest.";

/// A discovered place with its generated summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredPlace {
    pub name: String,
    pub address: String,
    pub categories: String,
    pub authentic_summary: String,
}

/// Result of [`discover`]: annotated places, or a message explaining why
/// there are none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Discovery {
    pub items: Vec<DiscoveredPlace>,
    pub message: Option<String>,
}

/// Geocode, search with no place type, and summarize the top candidates.
///
/// Summaries are requested concurrently. A failed summary is replaced by
/// [`FALLBACK_SUMMARY`]; geocode and search failures propagate.
pub async fn discover<G>(gateway: &G, location_query: &str) -> Result<Discovery>
where
    G: LensGateway + ?Sized,
{
    let location_query = location_query.trim();
    if location_query.is_empty() {
        return Err(LensError::InvalidArgument(
            "location query is missing".to_string(),
        ));
    }

    let location = gateway.geocode(location_query).await?;
    let candidates = gateway
        .search_by_query("", location.lat, location.lon, None, None)
        .await?;

    if candidates.is_empty() {
        return Ok(Discovery {
            items: Vec::new(),
            message: Some(format!(
                "Could not find specific things to do in \"{location_query}\". \
                 Try a broader search or check spelling."
            )),
        });
    }

    let location_name = location
        .full_address
        .as_deref()
        .unwrap_or(location_query);

    let items = join_all(
        candidates
            .into_iter()
            .take(DISCOVERY_SUMMARY_COUNT)
            .map(|place| async move {
                let authentic_summary =
                    match gateway.summarize_place(&place.name, location_name).await {
                        Ok(summary) => summary,
                        Err(e) => {
                            warn!(place = %place.name, error = %e, "summary failed; using fallback");
                            FALLBACK_SUMMARY.to_string()
                        }
                    };
                DiscoveredPlace {
                    name: place.name,
                    address: place.address,
                    categories: place.categories,
                    authentic_summary,
                }
            }),
    )
    .await;

    info!(location = location_query, count = items.len(), "discovery complete");
    Ok(Discovery {
        items,
        message: None,
    })
}

/// Geocode `location_query` and search around it for `place_type`.
pub async fn quick_search<G>(
    gateway: &G,
    location_query: &str,
    place_type: &str,
) -> Result<Vec<PlaceRecord>>
where
    G: LensGateway + ?Sized,
{
    if location_query.trim().is_empty() {
        return Err(LensError::InvalidArgument(
            "location query is missing for quick search".to_string(),
        ));
    }
    if place_type.trim().is_empty() {
        return Err(LensError::InvalidArgument(
            "place type is missing for quick search".to_string(),
        ));
    }

    let location = gateway.geocode(location_query).await?;
    gateway
        .search_by_query(place_type, location.lat, location.lon, None, None)
        .await
}
