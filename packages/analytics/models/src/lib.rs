#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood-level radon statistics and the keys used to rank them.

use std::cmp::Ordering;

use strum_macros::{AsRefStr, Display, EnumString};

/// EPA action level for indoor radon, in pCi/L. Tests at or above this
/// value count as high risk.
pub const ACTION_LEVEL_PCI_L: f64 = 4.0;

/// Summary statistics for one group of radon tests.
///
/// Derived fresh for every request and never modified once built.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodAggregate {
    /// Group key: the neighborhood name, or a ZIP code or city when no
    /// neighborhood is known.
    pub neighborhood: String,
    /// ZIP code of the group, if known.
    pub zip_code: Option<String>,
    /// City ward, if known.
    pub ward: Option<u32>,
    /// Number of tests in the group.
    pub sample_count: u64,
    /// Mean test value (pCi/L).
    pub mean_value: f64,
    /// Tests at or above the action level.
    pub high_risk_count: u64,
    /// `high_risk_count / sample_count`, in `[0, 1]`.
    pub high_risk_fraction: f64,
}

impl NeighborhoodAggregate {
    /// High-risk share as a percentage rounded to one decimal place.
    #[must_use]
    pub fn high_risk_percent(&self) -> f64 {
        (self.high_risk_fraction * 1000.0).round() / 10.0
    }
}

/// Metric used to order aggregates, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum SortKey {
    /// Mean test value.
    Average,
    /// Number of tests.
    Count,
    /// High-risk fraction.
    Percent,
}

impl SortKey {
    /// Compares two aggregates so that the larger metric sorts first.
    #[must_use]
    pub fn descending(self, a: &NeighborhoodAggregate, b: &NeighborhoodAggregate) -> Ordering {
        match self {
            Self::Average => b.mean_value.total_cmp(&a.mean_value),
            Self::Count => b.sample_count.cmp(&a.sample_count),
            Self::Percent => b.high_risk_fraction.total_cmp(&a.high_risk_fraction),
        }
    }
}
