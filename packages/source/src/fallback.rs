//! Static datasets substituted when live data is unavailable.
//!
//! Two tiers exist. The sample tier is used when the warehouse is switched
//! off (local development) and is large enough to exercise the map. The
//! error tier is a deliberately small subset used when the warehouse is
//! configured but produced nothing usable, so degraded output is obvious.

use radon_map_geography_models::GeoPoint;
use radon_map_source_models::RawRow;
use serde_json::json;

use crate::normalize::DEFAULT_CITY;

/// Storm track vertices used when the warehouse is disabled.
pub const SAMPLE_PATH: [(f64, f64); 6] = [
    (38.6580, -90.2310),
    (38.6620, -90.2280),
    (38.6680, -90.2200),
    (38.6750, -90.2150),
    (38.6820, -90.2100),
    (38.6900, -90.2050),
];

/// Number of [`SAMPLE_PATH`] vertices used when the warehouse failed.
pub const ERROR_PATH_LEN: usize = 4;

/// Radon test results used when the warehouse is disabled:
/// `(latitude, longitude, final_result, zip_code)`.
pub const SAMPLE_RESULTS: [(f64, f64, f64, &str); 28] = [
    (38.6580, -90.2310, 5.2, "63113"),
    (38.6620, -90.2280, 3.1, "63113"),
    (38.6680, -90.2200, 6.8, "63115"),
    (38.6750, -90.2150, 2.9, "63115"),
    (38.6900, -90.2050, 4.5, "63147"),
    (38.6550, -90.2290, 5.8, "63113"),
    (38.6610, -90.2270, 4.3, "63113"),
    (38.6700, -90.2220, 3.5, "63115"),
    (38.6350, -90.2000, 4.8, "63106"),
    (38.6420, -90.2100, 3.2, "63106"),
    (38.6490, -90.2180, 5.5, "63112"),
    (38.6560, -90.2250, 3.8, "63113"),
    (38.6630, -90.2320, 6.2, "63113"),
    (38.6700, -90.2400, 4.1, "63112"),
    (38.6770, -90.2480, 5.9, "63112"),
    (38.6840, -90.2550, 3.6, "63115"),
    (38.6910, -90.2620, 4.7, "63115"),
    (38.6980, -90.2680, 6.5, "63113"),
    (38.7050, -90.2150, 3.9, "63147"),
    (38.7120, -90.2080, 5.1, "63147"),
    (38.6280, -90.2380, 4.4, "63108"),
    (38.6180, -90.2480, 6.1, "63108"),
    (38.6080, -90.2580, 3.4, "63110"),
    (38.5980, -90.2380, 5.3, "63118"),
    (38.5880, -90.2280, 4.0, "63111"),
    (38.5780, -90.2180, 6.7, "63111"),
    (38.6380, -90.1980, 3.7, "63101"),
    (38.6480, -90.2050, 5.4, "63106"),
];

/// Number of [`SAMPLE_RESULTS`] rows used when the warehouse failed.
pub const ERROR_RESULTS_LEN: usize = 2;

fn to_points(vertices: &[(f64, f64)]) -> Vec<GeoPoint> {
    vertices
        .iter()
        .filter_map(|&(lat, lon)| GeoPoint::new(lat, lon).ok())
        .collect()
}

/// The full sample storm track.
#[must_use]
pub fn sample_path() -> Vec<GeoPoint> {
    to_points(&SAMPLE_PATH)
}

/// The reduced storm track used after an upstream failure.
#[must_use]
pub fn error_path() -> Vec<GeoPoint> {
    to_points(&SAMPLE_PATH[..ERROR_PATH_LEN])
}

fn to_rows(results: &[(f64, f64, f64, &str)]) -> Vec<RawRow> {
    results
        .iter()
        .map(|&(lat, lon, value, zip)| {
            RawRow::from([
                ("LATITUDE".to_string(), json!(lat)),
                ("LONGITUDE".to_string(), json!(lon)),
                ("FINAL_RESULT".to_string(), json!(value)),
                ("VALID_TEST".to_string(), json!("Y")),
                ("CITY".to_string(), json!(DEFAULT_CITY)),
                ("ZIP_CODE".to_string(), json!(zip)),
            ])
        })
        .collect()
}

/// Sample radon rows, shaped like a geocoded upstream result.
#[must_use]
pub fn sample_rows() -> Vec<RawRow> {
    to_rows(&SAMPLE_RESULTS)
}

/// The reduced radon rows used after an upstream failure.
#[must_use]
pub fn error_rows() -> Vec<RawRow> {
    to_rows(&SAMPLE_RESULTS[..ERROR_RESULTS_LEN])
}
