//! Neighborhood aggregates served when the warehouse has none.

use radon_map_analytics_models::NeighborhoodAggregate;

/// `(neighborhood, zip_code, ward, test_count, average, high_risk_count)`
pub const SAMPLE_NEIGHBORHOODS: [(&str, &str, u32, u64, f64, u64); 10] = [
    ("The Ville", "63113", 19, 45, 6.8, 32),
    ("Walnut Park", "63113", 21, 38, 6.2, 26),
    ("Penrose", "63113", 21, 52, 5.9, 35),
    ("College Hill", "63115", 21, 28, 5.7, 18),
    ("Mark Twain", "63113", 19, 33, 5.5, 20),
    ("Fairground Neighborhood", "63106", 19, 41, 5.3, 24),
    ("O'Fallon", "63106", 19, 36, 5.1, 21),
    ("Fountain Park", "63106", 19, 29, 4.9, 16),
    ("North Pointe", "63147", 2, 31, 4.8, 17),
    ("Baden", "63147", 2, 27, 4.7, 14),
];

/// The sample table as aggregates, in declaration order.
#[must_use]
pub fn sample_aggregates() -> Vec<NeighborhoodAggregate> {
    SAMPLE_NEIGHBORHOODS
        .iter()
        .map(|&(name, zip, ward, count, average, high_risk)| {
            #[allow(clippy::cast_precision_loss)]
            let high_risk_fraction = high_risk as f64 / count as f64;
            NeighborhoodAggregate {
                neighborhood: name.to_string(),
                zip_code: Some(zip.to_string()),
                ward: Some(ward),
                sample_count: count,
                mean_value: average,
                high_risk_count: high_risk,
                high_risk_fraction,
            }
        })
        .collect()
}
