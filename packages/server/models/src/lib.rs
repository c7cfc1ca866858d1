#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the radon map server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the domain types to allow independent evolution of the API
//! contract. Response fields keep the snake-case names the map frontend
//! already consumes.

use chrono::{DateTime, Utc};
use radon_map_analytics_models::NeighborhoodAggregate;
use radon_map_geography_models::GeoPoint;
use radon_map_source_models::{MeasurementRecord, ValidFlag};
use serde::{Deserialize, Serialize};

/// Plain message response.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    /// Message text.
    pub message: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Upstream data source status.
#[derive(Debug, Serialize)]
pub struct ApiDataSourceStatus {
    /// Whether the warehouse is configured.
    pub warehouse_enabled: bool,
    /// Whether the warehouse answered a trivial query.
    pub warehouse_connected: bool,
    /// Whether responses are currently served from static data.
    pub using_sample_data: bool,
    /// Connectivity error, if any.
    pub error: Option<String>,
}

/// Service status response.
#[derive(Debug, Serialize)]
pub struct ApiStatus {
    /// Always `"running"` when the server answers.
    pub status: String,
    /// Upstream source details.
    pub data_source: ApiDataSourceStatus,
    /// When the connectivity check ran.
    pub checked_at: DateTime<Utc>,
}

/// One storm track vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiPathPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl From<&GeoPoint> for ApiPathPoint {
    fn from(point: &GeoPoint) -> Self {
        Self {
            latitude: point.latitude(),
            longitude: point.longitude(),
        }
    }
}

/// A radon test result as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRadonResult {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Measured radon level (pCi/L).
    pub final_result: f64,
    /// `"Y"` or `"N"`.
    pub valid_test: ValidFlag,
    /// City name.
    pub city: String,
    /// ZIP code, if known.
    pub zip_code: Option<String>,
}

impl From<&MeasurementRecord> for ApiRadonResult {
    fn from(record: &MeasurementRecord) -> Self {
        Self {
            latitude: record.location.latitude(),
            longitude: record.location.longitude(),
            final_result: record.value,
            valid_test: record.valid,
            city: record.city.clone(),
            zip_code: record.zip_code.clone(),
        }
    }
}

/// A ranked neighborhood as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiHotNeighborhood {
    /// Neighborhood name.
    pub neighborhood: String,
    /// ZIP code, if known.
    pub zip_code: Option<String>,
    /// City ward, if known.
    pub ward: Option<u32>,
    /// Number of valid tests.
    pub test_count: u64,
    /// Mean radon level (pCi/L).
    pub average_radon_level: f64,
    /// Tests at or above the EPA action level.
    pub high_risk_count: u64,
    /// Share of tests at or above the action level, in percent.
    pub percent_above_action_level: f64,
}

impl From<&NeighborhoodAggregate> for ApiHotNeighborhood {
    fn from(aggregate: &NeighborhoodAggregate) -> Self {
        Self {
            neighborhood: aggregate.neighborhood.clone(),
            zip_code: aggregate.zip_code.clone(),
            ward: aggregate.ward,
            test_count: aggregate.sample_count,
            average_radon_level: aggregate.mean_value,
            high_risk_count: aggregate.high_risk_count,
            percent_above_action_level: aggregate.high_risk_percent(),
        }
    }
}

const fn default_radius_miles() -> f64 {
    radon_map_spatial::DEFAULT_RADIUS_MILES
}

/// Query parameters for the radon results endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RadonResultsParams {
    /// Keep only results near the storm track.
    #[serde(default)]
    pub near_tornado: bool,
    /// Proximity radius in miles.
    #[serde(default = "default_radius_miles")]
    pub radius_miles: f64,
}

const fn default_min_tests() -> i64 {
    5
}

fn default_sort_by() -> String {
    "average".to_string()
}

/// Query parameters for the hot-neighborhoods endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotNeighborhoodParams {
    /// Minimum number of tests for a neighborhood to be listed.
    #[serde(default = "default_min_tests")]
    pub min_tests: i64,
    /// `average`, `count`, or `percent`. Anything else keeps the source
    /// order.
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
}

impl HotNeighborhoodParams {
    /// The threshold as an unsigned count. Negative values admit every
    /// group.
    #[must_use]
    pub fn min_samples(&self) -> u64 {
        u64::try_from(self.min_tests).unwrap_or(0)
    }
}
