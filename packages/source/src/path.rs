//! Storm track resolution from upstream segment rows.

use radon_map_geography_models::GeoPoint;
use radon_map_source_models::RawRow;
use serde::Deserialize;

use crate::Origin;
use crate::fallback;
use crate::fields::FieldAlias;
use crate::orchestrator::{NoDataReason, Outcome};

/// Column aliases for reading track segment rows.
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentFields {
    /// Segment start latitude.
    pub begin_lat: FieldAlias,
    /// Segment start longitude.
    pub begin_lon: FieldAlias,
    /// Segment end latitude.
    pub end_lat: FieldAlias,
    /// Segment end longitude.
    pub end_lon: FieldAlias,
}

/// A storm track together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    /// Ordered track vertices. Never empty.
    pub points: Vec<GeoPoint>,
    /// Source of the vertices.
    pub origin: Origin,
}

fn endpoint(row: &RawRow, lat: &FieldAlias, lon: &FieldAlias) -> Option<GeoPoint> {
    let lat = lat.resolve_f64(row)??;
    let lon = lon.resolve_f64(row)??;
    GeoPoint::new(lat, lon).ok()
}

/// Flattens segment rows into an ordered vertex list.
///
/// Each segment contributes its begin point and then its end point. The end
/// point is omitted when its raw values equal the begin point's, compared
/// before any numeric conversion. An endpoint that is missing or fails
/// coercion is skipped on its own.
#[must_use]
pub fn points_from_segments(rows: &[RawRow], fields: &SegmentFields) -> Vec<GeoPoint> {
    let mut points = Vec::with_capacity(rows.len() * 2);

    for (i, row) in rows.iter().enumerate() {
        match endpoint(row, &fields.begin_lat, &fields.begin_lon) {
            Some(point) => points.push(point),
            None => log::debug!("Segment {i}: unusable begin point"),
        }

        let same_raw = fields.begin_lat.resolve(row) == fields.end_lat.resolve(row)
            && fields.begin_lon.resolve(row) == fields.end_lon.resolve(row);
        if same_raw {
            continue;
        }

        match endpoint(row, &fields.end_lat, &fields.end_lon) {
            Some(point) => points.push(point),
            None => log::debug!("Segment {i}: unusable end point"),
        }
    }

    points
}

/// Turns an orchestrator outcome into a non-empty track.
///
/// A disabled source yields the full sample track. An exhausted source, or
/// live rows that produce no usable vertex, yield the reduced error track.
#[must_use]
pub fn resolve(outcome: Outcome, fields: &SegmentFields) -> ResolvedPath {
    match outcome {
        Outcome::Data { variant, rows } => {
            let points = points_from_segments(&rows, fields);
            if points.is_empty() {
                log::warn!(
                    "Variant {variant} returned {} segments but no usable points",
                    rows.len()
                );
                return ResolvedPath {
                    points: fallback::error_path(),
                    origin: Origin::Fallback,
                };
            }
            log::info!("Resolved storm track with {} points", points.len());
            ResolvedPath {
                points,
                origin: Origin::Warehouse { variant },
            }
        }
        Outcome::NoData(NoDataReason::Disabled) => ResolvedPath {
            points: fallback::sample_path(),
            origin: Origin::Sample,
        },
        Outcome::NoData(NoDataReason::Exhausted { .. }) => ResolvedPath {
            points: fallback::error_path(),
            origin: Origin::Fallback,
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::registry;

    fn fields() -> SegmentFields {
        registry::tornado_path().fields
    }

    fn rows(value: serde_json::Value) -> Vec<RawRow> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn emits_begin_and_end_points_in_order() {
        let points = points_from_segments(
            &rows(json!([
                {"BEGIN_LAT": 38.65, "BEGIN_LON": -90.24, "END_LAT": 38.66, "END_LON": -90.23},
                {"begin_lat": "38.67", "begin_lon": "-90.22", "end_lat": "38.68", "end_lon": "-90.21"},
            ])),
            &fields(),
        );

        let coords: Vec<(f64, f64)> = points
            .iter()
            .map(|p| (p.latitude(), p.longitude()))
            .collect();
        assert_eq!(
            coords,
            vec![
                (38.65, -90.24),
                (38.66, -90.23),
                (38.67, -90.22),
                (38.68, -90.21)
            ]
        );
    }

    #[test]
    fn identical_raw_endpoints_collapse_to_one() {
        let points = points_from_segments(
            &rows(json!([
                {"BEGIN_LAT": 38.7, "BEGIN_LON": -90.2, "END_LAT": 38.7, "END_LON": -90.2},
            ])),
            &fields(),
        );
        assert_eq!(points.len(), 1);
    }

    #[test]
    fn equality_is_on_raw_values_not_parsed_floats() {
        // "38.70" and 38.7 parse equal but are different raw values
        let points = points_from_segments(
            &rows(json!([
                {"BEGIN_LAT": "38.70", "BEGIN_LON": -90.2, "END_LAT": 38.7, "END_LON": -90.2},
            ])),
            &fields(),
        );
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn unparseable_endpoint_is_skipped_alone() {
        let points = points_from_segments(
            &rows(json!([
                {"BEGIN_LAT": "n/a", "BEGIN_LON": -90.2, "END_LAT": 38.7, "END_LON": -90.2},
                {"BEGIN_LAT": 38.71, "BEGIN_LON": -90.19},
            ])),
            &fields(),
        );
        let lats: Vec<f64> = points.iter().map(GeoPoint::latitude).collect();
        assert_eq!(lats, vec![38.7, 38.71]);
    }

    #[test]
    fn disabled_source_resolves_to_sample_track() {
        let first = resolve(Outcome::NoData(NoDataReason::Disabled), &fields());
        let second = resolve(Outcome::NoData(NoDataReason::Disabled), &fields());
        assert_eq!(first, second);
        assert_eq!(first.points.len(), 6);
        assert_eq!(first.origin, Origin::Sample);
    }

    #[test]
    fn exhausted_source_resolves_to_error_track() {
        let path = resolve(
            Outcome::NoData(NoDataReason::Exhausted { attempts: 3 }),
            &fields(),
        );
        assert_eq!(path.points, fallback::error_path());
        assert_eq!(path.origin, Origin::Fallback);
    }

    #[test]
    fn live_rows_without_points_fall_back() {
        let outcome = Outcome::Data {
            variant: "noaa_point".to_string(),
            rows: rows(json!([{"BEGIN_LAT": null, "EVENT_TYPE": "Tornado"}])),
        };
        let path = resolve(outcome, &fields());
        assert_eq!(path.origin, Origin::Fallback);
        assert!(!path.points.is_empty());
    }
}
