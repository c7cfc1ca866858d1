//! Hot-neighborhood lookup: warehouse aggregates, measurements grouped
//! locally, or the sample table, then ranking.

use radon_map_analytics_models::{ACTION_LEVEL_PCI_L, NeighborhoodAggregate};
use radon_map_source::Origin;
use radon_map_source::engine::RadonEngine;
use radon_map_source::fields::{FieldAlias, coerce_f64};
use radon_map_source::orchestrator::{NoDataReason, Outcome};
use radon_map_source::registry::{QueryDefinition, parse_definition};
use radon_map_source_models::RawRow;
use serde::Deserialize;

use crate::{aggregate_measurements, rank, sample};

/// Neighborhood aggregate query definition.
pub const HOT_NEIGHBORHOODS_TOML: &str = include_str!("../queries/hot_neighborhoods.toml");

/// Column aliases for reading pre-aggregated neighborhood rows.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregateFields {
    /// Neighborhood name.
    pub neighborhood: FieldAlias,
    /// ZIP code.
    pub zip_code: FieldAlias,
    /// City ward.
    pub ward: FieldAlias,
    /// Number of tests.
    pub test_count: FieldAlias,
    /// Mean test value.
    pub average_radon_level: FieldAlias,
    /// Tests at or above the action level.
    pub high_risk_count: FieldAlias,
}

/// Returns the hot-neighborhood query definition.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed.
#[must_use]
pub fn definition() -> QueryDefinition<AggregateFields> {
    parse_definition(HOT_NEIGHBORHOODS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse hot_neighborhoods.toml: {e}"))
}

/// Ranked aggregates together with where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct HotNeighborhoods {
    /// Filtered, ordered aggregates.
    pub aggregates: Vec<NeighborhoodAggregate>,
    /// Source of the aggregates.
    pub origin: Origin,
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_cmp
)]
fn count(alias: &FieldAlias, row: &RawRow) -> Option<u64> {
    let value = alias.resolve(row).and_then(coerce_f64)?;
    (value >= 0.0 && value.fract() == 0.0).then_some(value as u64)
}

/// Reads one pre-aggregated row. Returns `None` if a required column is
/// missing or inconsistent.
#[must_use]
pub fn aggregate_from_row(row: &RawRow, fields: &AggregateFields) -> Option<NeighborhoodAggregate> {
    let neighborhood = fields.neighborhood.resolve_text(row)?;
    let sample_count = count(&fields.test_count, row).filter(|&n| n > 0)?;
    let high_risk_count = count(&fields.high_risk_count, row).filter(|&n| n <= sample_count)?;
    let mean_value = fields.average_radon_level.resolve_f64(row)??;
    let ward = count(&fields.ward, row).and_then(|w| u32::try_from(w).ok());

    #[allow(clippy::cast_precision_loss)]
    let high_risk_fraction = high_risk_count as f64 / sample_count as f64;

    Some(NeighborhoodAggregate {
        neighborhood,
        zip_code: fields.zip_code.resolve_text(row),
        ward,
        sample_count,
        mean_value,
        high_risk_count,
        high_risk_fraction,
    })
}

/// Groups live radon results locally when the aggregate query has nothing
/// to offer. Falls back to the sample table when those are not live either.
async fn grouped_or_sample(engine: &RadonEngine) -> (Vec<NeighborhoodAggregate>, Origin) {
    let results = engine.radon_results(false, 0.0).await;
    if matches!(results.origin, Origin::Warehouse { .. }) {
        let aggregates = aggregate_measurements(&results.records, ACTION_LEVEL_PCI_L);
        if !aggregates.is_empty() {
            log::info!(
                "Grouped {} radon results into {} neighborhoods",
                results.records.len(),
                aggregates.len()
            );
            return (aggregates, results.origin);
        }
    }
    (sample::sample_aggregates(), Origin::Fallback)
}

/// Fetches neighborhood aggregates and ranks them.
///
/// Live rows are used when a variant returns any that convert. Otherwise
/// live radon results are grouped by ZIP code or city, and failing that the
/// sample table stands in. Ranking is the same in every case.
pub async fn hot_neighborhoods(
    engine: &RadonEngine,
    definition: &QueryDefinition<AggregateFields>,
    min_samples: u64,
    sort_by: &str,
) -> HotNeighborhoods {
    let outcome = engine
        .orchestrator()
        .fetch(&definition.id, &definition.variants)
        .await;

    let (aggregates, origin) = match outcome {
        Outcome::Data { variant, rows } => {
            let total = rows.len();
            let aggregates: Vec<NeighborhoodAggregate> = rows
                .iter()
                .filter_map(|row| aggregate_from_row(row, &definition.fields))
                .collect();
            if aggregates.len() < total {
                log::debug!("Dropped {} of {total} aggregate rows", total - aggregates.len());
            }
            if aggregates.is_empty() {
                log::warn!("Variant {variant} returned no usable aggregates");
                grouped_or_sample(engine).await
            } else {
                (aggregates, Origin::Warehouse { variant })
            }
        }
        Outcome::NoData(NoDataReason::Disabled) => (sample::sample_aggregates(), Origin::Sample),
        Outcome::NoData(NoDataReason::Exhausted { .. }) => grouped_or_sample(engine).await,
    };

    HotNeighborhoods {
        aggregates: rank(aggregates, min_samples, sort_by),
        origin,
    }
}
