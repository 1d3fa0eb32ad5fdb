//! Coordinate canonicalization for cache keys.
//!
//! Normalized coordinates are only used to build cache keys; the value sent
//! to the remote service may still be the unrounded one.

/// Fractional digits kept by [`normalize`].
pub const COORD_PRECISION: usize = 5;

/// Value returned for inputs that are not finite numbers.
pub const NORMALIZED_FALLBACK: &str = "0.00000";

/// Format `coord` with exactly [`COORD_PRECISION`] fractional digits.
///
/// Non-finite input (NaN, ±∞) yields [`NORMALIZED_FALLBACK`]. Values that
/// round to zero are always rendered unsigned, so `-0.000001` and
/// `0.000001` share a key.
///
/// ```rust
/// # use locallens::geo::normalize;
/// assert_eq!(normalize(40.712344), "40.71234");
/// assert_eq!(normalize(-74.005671), "-74.00567");
/// assert_eq!(normalize(f64::NAN), "0.00000");
/// ```
pub fn normalize(coord: f64) -> String {
    if !coord.is_finite() {
        return NORMALIZED_FALLBACK.to_string();
    }
    let formatted = format!("{:.*}", COORD_PRECISION, coord);
    match formatted.strip_prefix('-') {
        Some(unsigned) if unsigned.bytes().all(|b| b == b'0' || b == b'.') => {
            unsigned.to_string()
        }
        _ => formatted,
    }
}

/// Parse `text` as a decimal number and [`normalize`] it.
///
/// Unparseable text yields [`NORMALIZED_FALLBACK`].
pub fn normalize_str(text: &str) -> String {
    match text.trim().parse::<f64>() {
        Ok(value) => normalize(value),
        Err(_) => NORMALIZED_FALLBACK.to_string(),
    }
}
