//! Group-by aggregation and threshold-filtered ranking.

use std::collections::BTreeMap;

use radon_map_analytics_models::{NeighborhoodAggregate, SortKey};
use radon_map_source_models::MeasurementRecord;

/// Filters aggregates by sample count and orders them by `sort_by`.
///
/// Groups with `sample_count >= min_samples` are kept. `sort_by` names a
/// [`SortKey`] (`average`, `count`, or `percent`); the sort is descending
/// and stable, so ties keep their input order. An unrecognized key leaves
/// the filtered input order untouched. Nothing is truncated.
#[must_use]
pub fn rank(
    mut aggregates: Vec<NeighborhoodAggregate>,
    min_samples: u64,
    sort_by: &str,
) -> Vec<NeighborhoodAggregate> {
    aggregates.retain(|a| a.sample_count >= min_samples);

    match sort_by.parse::<SortKey>() {
        Ok(key) => aggregates.sort_by(|a, b| key.descending(a, b)),
        Err(_) => log::debug!("Unrecognized sort key {sort_by:?}, keeping input order"),
    }

    aggregates
}

#[derive(Default)]
struct Accumulator {
    zip_code: Option<String>,
    count: u64,
    sum: f64,
    high_risk: u64,
}

/// Groups valid measurements by [`MeasurementRecord::group_key`].
///
/// Invalid tests are ignored. A test is high risk when its value is at or
/// above `action_level`. Groups are emitted in the order their key is first
/// seen.
#[must_use]
pub fn aggregate_measurements(
    records: &[MeasurementRecord],
    action_level: f64,
) -> Vec<NeighborhoodAggregate> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();

    for record in records.iter().filter(|r| r.valid.is_valid()) {
        let key = record.group_key();
        let acc = groups.entry(key.to_string()).or_insert_with(|| {
            order.push(key.to_string());
            Accumulator {
                zip_code: record.zip_code.clone(),
                ..Accumulator::default()
            }
        });
        acc.count += 1;
        acc.sum += record.value;
        if record.value >= action_level {
            acc.high_risk += 1;
        }
    }

    order
        .into_iter()
        .filter_map(|key| {
            let acc = groups.remove(&key)?;
            #[allow(clippy::cast_precision_loss)]
            let count = acc.count as f64;
            #[allow(clippy::cast_precision_loss)]
            let high_risk = acc.high_risk as f64;
            Some(NeighborhoodAggregate {
                neighborhood: key,
                zip_code: acc.zip_code,
                ward: None,
                sample_count: acc.count,
                mean_value: acc.sum / count,
                high_risk_count: acc.high_risk,
                high_risk_fraction: high_risk / count,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use radon_map_analytics_models::ACTION_LEVEL_PCI_L;
    use radon_map_geography_models::GeoPoint;
    use radon_map_source_models::{RawRow, ValidFlag};

    use super::*;
    use crate::sample;

    fn aggregate(name: &str, sample_count: u64, mean_value: f64) -> NeighborhoodAggregate {
        NeighborhoodAggregate {
            neighborhood: name.to_string(),
            zip_code: None,
            ward: None,
            sample_count,
            mean_value,
            high_risk_count: 0,
            high_risk_fraction: 0.0,
        }
    }

    fn names(aggregates: &[NeighborhoodAggregate]) -> Vec<&str> {
        aggregates.iter().map(|a| a.neighborhood.as_str()).collect()
    }

    fn record(zip: Option<&str>, value: f64, valid: ValidFlag) -> MeasurementRecord {
        MeasurementRecord {
            location: GeoPoint::new(38.65, -90.23).unwrap(),
            value,
            valid,
            city: "St. Louis".to_string(),
            zip_code: zip.map(str::to_string),
            raw_fields: RawRow::new(),
        }
    }

    #[test]
    fn threshold_is_inclusive_and_sort_is_descending() {
        let input = vec![aggregate("A", 4, 9.0), aggregate("B", 5, 3.0), aggregate("C", 10, 6.0)];
        let ranked = rank(input, 5, "average");
        assert_eq!(names(&ranked), vec!["C", "B"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let input = vec![
            aggregate("A", 10, 5.0),
            aggregate("B", 20, 7.0),
            aggregate("C", 10, 5.0),
            aggregate("D", 10, 5.0),
        ];
        assert_eq!(names(&rank(input.clone(), 0, "average")), vec!["B", "A", "C", "D"]);
        assert_eq!(names(&rank(input, 0, "count")), vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn unknown_sort_key_keeps_filtered_input_order() {
        let input = vec![aggregate("A", 6, 1.0), aggregate("B", 2, 9.0), aggregate("C", 8, 5.0)];
        assert_eq!(names(&rank(input, 5, "median")), vec!["A", "C"]);
    }

    #[test]
    fn sample_table_ranks_by_count() {
        let ranked = rank(sample::sample_aggregates(), 30, "count");
        assert_eq!(
            names(&ranked),
            vec![
                "Penrose",
                "The Ville",
                "Fairground Neighborhood",
                "Walnut Park",
                "O'Fallon",
                "Mark Twain",
                "North Pointe"
            ]
        );
    }

    #[test]
    fn sample_table_ranks_by_percent() {
        let ranked = rank(sample::sample_aggregates(), 5, "percent");
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].neighborhood, "The Ville");
        assert_eq!(ranked[9].neighborhood, "Baden");
    }

    #[test]
    fn aggregates_valid_tests_by_zip_in_first_seen_order() {
        let records = vec![
            record(Some("63113"), 5.0, ValidFlag::Yes),
            record(None, 2.0, ValidFlag::Yes),
            record(Some("63113"), 3.0, ValidFlag::Yes),
            record(Some("63113"), 100.0, ValidFlag::No),
            record(Some("63106"), 4.0, ValidFlag::Yes),
        ];

        let aggregates = aggregate_measurements(&records, ACTION_LEVEL_PCI_L);

        assert_eq!(names(&aggregates), vec!["63113", "St. Louis", "63106"]);
        let first = &aggregates[0];
        assert_eq!(first.sample_count, 2);
        assert!((first.mean_value - 4.0).abs() < 1e-12);
        assert_eq!(first.high_risk_count, 1);
        assert!((first.high_risk_fraction - 0.5).abs() < 1e-12);
        assert_eq!(aggregates[1].zip_code, None);
        assert_eq!(aggregates[2].high_risk_count, 1);
    }

    #[test]
    fn no_valid_tests_yields_no_groups() {
        let records = vec![record(Some("63113"), 5.0, ValidFlag::No)];
        assert!(aggregate_measurements(&records, ACTION_LEVEL_PCI_L).is_empty());
    }
}
