//! Free-text place type → places-provider category filter.

/// Categories used when no place type is given: a curated "things to do" set.
pub const THINGS_TO_DO_CATEGORIES: &str = "tourism.sights,tourism.attraction,heritage,natural,\
natural.mountain.peak,natural.water.spring,natural.sand.dune,leisure.park,leisure.playground,\
leisure.park.nature_reserve,activity,entertainment.culture,entertainment.museum,sport,\
catering.cafe,catering.restaurant,commercial.marketplace";

/// Categories used when a place type has no table entry.
pub const DEFAULT_BROAD_CATEGORIES: &str = "accommodation,catering,entertainment,tourism,leisure,\
commercial,activity,sport,natural,service,public_transport";

/// Exact-match lookup table (keys are lowercase, trimmed).
const CATEGORY_TABLE: &[(&str, &str)] = &[
    ("restaurants", "catering.restaurant"),
    ("restaurant", "catering.restaurant"),
    ("food", "catering"),
    ("hotels", "accommodation.hotel"),
    ("hotel", "accommodation.hotel"),
    ("lodging", "accommodation"),
    ("attractions", "tourism.attraction,tourism.sights"),
    ("attraction", "tourism.attraction,tourism.sights"),
    ("sights", "tourism.sights"),
    ("museums", "entertainment.museum"),
    ("cafes", "catering.cafe"),
    ("cafe", "catering.cafe"),
    ("bars", "catering.bar"),
    ("bar", "catering.bar"),
    ("pubs", "catering.pub"),
    ("pub", "catering.pub"),
    (
        "shopping",
        "commercial.shopping_mall,commercial.department_store,commercial.market",
    ),
    ("mall", "commercial.shopping_mall"),
    ("groceries", "commercial.supermarket,commercial.convenience"),
    ("supermarket", "commercial.supermarket"),
    ("pharmacy", "healthcare.pharmacy"),
    ("hospital", "healthcare.hospital"),
    ("parking", "parking"),
    ("airport", "airport"),
    ("gas station", "service.vehicle.fuel"),
    ("things to do", THINGS_TO_DO_CATEGORIES),
];

/// Resolve a place-type query to a comma-separated category filter.
///
/// Matching is case-insensitive on the trimmed query. Empty input maps to
/// [`THINGS_TO_DO_CATEGORIES`]; unknown input to [`DEFAULT_BROAD_CATEGORIES`].
///
/// ```rust
/// # use locallens::geo::categories_for;
/// assert_eq!(categories_for(" Restaurants "), "catering.restaurant");
/// ```
pub fn categories_for(place_type: &str) -> &'static str {
    let query = place_type.trim().to_lowercase();
    if query.is_empty() {
        return THINGS_TO_DO_CATEGORIES;
    }
    CATEGORY_TABLE
        .iter()
        .find(|(name, _)| *name == query)
        .map(|(_, categories)| *categories)
        .unwrap_or(DEFAULT_BROAD_CATEGORIES)
}
