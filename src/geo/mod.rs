//! Geographic helpers: coordinate normalization, category resolution, and
//! the place/geocode payload types.

pub mod categories;
pub mod coords;
pub mod places;

pub use categories::{DEFAULT_BROAD_CATEGORIES, THINGS_TO_DO_CATEGORIES, categories_for};
pub use coords::{COORD_PRECISION, NORMALIZED_FALLBACK, normalize, normalize_str};
pub use places::{
    DEFAULT_RADIUS_METERS, DEFAULT_SEARCH_LIMIT, DISCOVERY_CANDIDATE_LIMIT, GeocodedLocation,
    PlaceRecord,
};
