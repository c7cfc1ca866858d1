//! Request-level entry points combining fetch, normalization, and filtering.

use radon_map_source_models::MeasurementRecord;
use radon_map_spatial::filter_near;

use crate::Origin;
use crate::fallback;
use crate::normalize::{MeasurementFields, Normalizer};
use crate::orchestrator::{NoDataReason, Orchestrator, Outcome};
use crate::path::{self, ResolvedPath, SegmentFields};
use crate::registry::{self, QueryDefinition};

/// Normalized radon results together with where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RadonResults {
    /// Records that passed normalization (and the proximity filter, if
    /// requested).
    pub records: Vec<MeasurementRecord>,
    /// Source of the records.
    pub origin: Origin,
}

/// Health of the upstream source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStatus {
    /// Whether a warehouse is configured.
    pub enabled: bool,
    /// Whether a trivial statement succeeded just now.
    pub connected: bool,
    /// Why the connectivity check failed, if it did.
    pub error: Option<String>,
}

/// Storm track and radon result lookups over an [`Orchestrator`].
///
/// Holds no per-request state; every call fetches fresh.
pub struct RadonEngine {
    orchestrator: Orchestrator,
    tornado: QueryDefinition<SegmentFields>,
    radon: QueryDefinition<MeasurementFields>,
}

impl RadonEngine {
    /// Creates an engine using the embedded query definitions.
    #[must_use]
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            tornado: registry::tornado_path(),
            radon: registry::radon_results(),
        }
    }

    /// The orchestrator this engine queries through.
    #[must_use]
    pub const fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Resolves the storm track. Always returns at least one point.
    pub async fn tornado_path(&self) -> ResolvedPath {
        let outcome = self
            .orchestrator
            .fetch(&self.tornado.id, &self.tornado.variants)
            .await;
        path::resolve(outcome, &self.tornado.fields)
    }

    /// Fetches and normalizes radon results.
    ///
    /// When `near_tornado` is set, only results within `radius_miles` of a
    /// storm track vertex are kept. Error rows served after an upstream
    /// failure are returned unfiltered.
    pub async fn radon_results(&self, near_tornado: bool, radius_miles: f64) -> RadonResults {
        let outcome = self
            .orchestrator
            .fetch(&self.radon.id, &self.radon.variants)
            .await;

        let (rows, origin) = match outcome {
            Outcome::Data { variant, rows } => (rows, Origin::Warehouse { variant }),
            Outcome::NoData(NoDataReason::Disabled) => (fallback::sample_rows(), Origin::Sample),
            Outcome::NoData(NoDataReason::Exhausted { .. }) => {
                (fallback::error_rows(), Origin::Fallback)
            }
        };

        let records = Normalizer::new(self.radon.fields.clone()).normalize_rows(rows);

        if !near_tornado || origin == Origin::Fallback {
            return RadonResults { records, origin };
        }

        let track = self.tornado_path().await;
        let records = filter_near(records, &track.points, radius_miles, |r| &r.location);

        RadonResults { records, origin }
    }

    /// Checks whether the upstream source answers.
    pub async fn status(&self) -> SourceStatus {
        let Some(warehouse) = self.orchestrator.warehouse() else {
            return SourceStatus {
                enabled: false,
                connected: false,
                error: None,
            };
        };

        match warehouse.ping().await {
            Ok(()) => SourceStatus {
                enabled: true,
                connected: true,
                error: None,
            },
            Err(e) => {
                log::warn!("Warehouse connectivity check failed: {e}");
                SourceStatus {
                    enabled: true,
                    connected: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
