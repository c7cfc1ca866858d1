#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Point-to-path proximity using great-circle distance.
//!
//! A storm path is treated as a set of vertices: the distance from a point
//! to the path is the haversine distance to the closest vertex. Segments
//! between vertices are not interpolated, so a point beside the middle of
//! a long segment can measure farther than it really is.

use radon_map_geography_models::GeoPoint;

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Default radius for "near the path" queries, in statute miles.
pub const DEFAULT_RADIUS_MILES: f64 = 2.0;

/// Great-circle distance between two points in statute miles.
#[must_use]
pub fn haversine_miles(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let dlat = (b.latitude() - a.latitude()).to_radians();
    let dlon = (b.longitude() - a.longitude()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    // rounding can push h a hair past 1 for antipodal points
    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}

/// Minimum distance in miles from `point` to any vertex of `path`.
///
/// Returns [`f64::INFINITY`] for an empty path, so a missing path never
/// counts as "near".
#[must_use]
pub fn distance_to_path(point: &GeoPoint, path: &[GeoPoint]) -> f64 {
    path.iter()
        .map(|vertex| haversine_miles(point, vertex))
        .fold(f64::INFINITY, f64::min)
}

/// Whether `point` lies within `radius_miles` of the path (inclusive).
#[must_use]
pub fn is_near(point: &GeoPoint, path: &[GeoPoint], radius_miles: f64) -> bool {
    distance_to_path(point, path) <= radius_miles
}

/// Keeps only the items whose location is within `radius_miles` of `path`.
///
/// Input order is preserved.
pub fn filter_near<T, F>(items: Vec<T>, path: &[GeoPoint], radius_miles: f64, location: F) -> Vec<T>
where
    F: Fn(&T) -> &GeoPoint,
{
    let before = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter(|item| is_near(location(item), path, radius_miles))
        .collect();
    log::debug!(
        "Proximity filter kept {}/{before} points within {radius_miles} mi of {} vertices",
        kept.len(),
        path.len()
    );
    kept
}
