//! Place and geocoding payloads returned by the places proxy.
//!
//! The proxy forwards requests to a GeoJSON places provider. Responses are
//! feature collections; this module turns them into the flat records the
//! UI layer consumes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{LensError, Result};

/// Default search radius in meters.
pub const DEFAULT_RADIUS_METERS: u32 = 5000;

/// Default result limit for a typed place search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;

/// Result limit when the place type is empty (discovery candidates).
pub const DISCOVERY_CANDIDATE_LIMIT: u32 = 15;

/// A geocoded location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedLocation {
    pub lat: f64,
    pub lon: f64,
    /// Provider-formatted address, when available.
    pub full_address: Option<String>,
}

/// A point of interest, flattened for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub name: String,
    pub address: String,
    /// Comma-separated provider categories, or "N/A".
    pub categories: String,
    /// Distance from the search center, e.g. "120m".
    pub distance: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlaceProperties {
    name: Option<String>,
    street: Option<String>,
    city: Option<String>,
    formatted: Option<String>,
    address_line1: Option<String>,
    address_line2: Option<String>,
    categories: Option<Vec<String>>,
    distance: Option<serde_json::Number>,
}

impl From<PlaceProperties> for PlaceRecord {
    fn from(props: PlaceProperties) -> Self {
        let name = non_empty(props.name)
            .or_else(|| non_empty(props.street.clone()))
            .unwrap_or_else(|| "Unknown place".to_string());

        let lines: Vec<String> = [props.address_line1, props.address_line2]
            .into_iter()
            .filter_map(non_empty)
            .collect();
        let address = if !lines.is_empty() {
            lines.join(", ")
        } else if let (Some(street), Some(city)) =
            (non_empty(props.street), non_empty(props.city))
        {
            format!("{street}, {city}")
        } else {
            non_empty(props.formatted).unwrap_or_else(|| "Address not available".to_string())
        };

        let categories = match props.categories {
            Some(list) if !list.is_empty() => list.join(", "),
            _ => "N/A".to_string(),
        };

        let distance = props
            .distance
            .and_then(|d| d.as_f64())
            .filter(|v| *v != 0.0)
            .map(format_meters);

        Self {
            name,
            address,
            categories,
            distance,
        }
    }
}

/// `"120m"`, `"120.5m"`: whole numbers print without a fractional part.
fn format_meters(meters: f64) -> String {
    if meters.fract() == 0.0 {
        format!("{}m", meters as i64)
    } else {
        format!("{meters}m")
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn features(body: &Value) -> Option<&Vec<Value>> {
    body.get("features").and_then(Value::as_array)
}

/// Extract the first usable location from a geocoding response.
pub(crate) fn parse_geocode(body: &Value, query: &str) -> Result<GeocodedLocation> {
    let first = features(body).and_then(|f| f.first());
    let coordinates = first
        .and_then(|f| f.pointer("/geometry/coordinates"))
        .and_then(Value::as_array);

    // GeoJSON order: [lon, lat]
    let (lon, lat) = match coordinates.map(|c| c.as_slice()) {
        Some([lon, lat, ..]) => match (lon.as_f64(), lat.as_f64()) {
            (Some(lon), Some(lat)) => (lon, lat),
            _ => return Err(no_coordinates(query)),
        },
        _ => return Err(no_coordinates(query)),
    };

    let full_address = first
        .and_then(|f| f.pointer("/properties/formatted"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Ok(GeocodedLocation {
        lat,
        lon,
        full_address,
    })
}

fn no_coordinates(query: &str) -> LensError {
    LensError::NotFound(format!(
        "could not find valid coordinates for location \"{query}\""
    ))
}

/// Map a places response to records. A body without features is empty.
pub(crate) fn parse_places(body: &Value) -> Vec<PlaceRecord> {
    let Some(features) = features(body) else {
        return Vec::new();
    };
    features
        .iter()
        .map(|feature| {
            let props = feature
                .get("properties")
                .cloned()
                .map(serde_json::from_value::<PlaceProperties>)
                .and_then(|r| r.ok())
                .unwrap_or_default();
            PlaceRecord::from(props)
        })
        .collect()
}

/// Pick the detail payload out of a place-details response.
///
/// Preference: first feature's properties, then top-level properties, then
/// the whole body. `null` bodies yield `None`.
pub(crate) fn parse_place_details(body: Value) -> Option<Value> {
    if let Some(props) = features(&body)
        .and_then(|f| f.first())
        .and_then(|f| f.get("properties"))
    {
        return Some(props.clone());
    }
    if let Some(props) = body.get("properties") {
        return Some(props.clone());
    }
    (!body.is_null()).then_some(body)
}

/// Extract summary text from a summarization response.
///
/// Accepts `{"summary": "..."}` or a chat-completion shaped body.
pub(crate) fn parse_summary(body: &Value) -> Result<String> {
    let text = body
        .get("summary")
        .and_then(Value::as_str)
        .or_else(|| {
            body.pointer("/choices/0/message/content")
                .and_then(Value::as_str)
        })
        .map(str::trim)
        .filter(|s| !s.is_empty());

    text.map(str::to_string).ok_or_else(|| {
        LensError::UnexpectedResponse("summary response had no summary text".to_string())
    })
}
