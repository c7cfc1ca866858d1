#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood radon aggregation and ranking.
//!
//! [`ranking`] holds the pure stages: grouping normalized measurements into
//! [`NeighborhoodAggregate`]s and ordering aggregates by a caller-selected
//! metric. [`hot`] wires those stages to the upstream warehouse, falling
//! back to the [`sample`] aggregates when it has nothing to offer.
//!
//! [`NeighborhoodAggregate`]: radon_map_analytics_models::NeighborhoodAggregate

pub mod hot;
pub mod ranking;
pub mod sample;

pub use ranking::{aggregate_measurements, rank};
