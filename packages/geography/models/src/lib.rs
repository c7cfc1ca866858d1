#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical point types shared by every radon map package.
//!
//! A [`GeoPoint`] is the only coordinate representation that flows past
//! normalization. It can only be built through [`GeoPoint::new`], which
//! rejects non-finite and out-of-range values, so downstream distance and
//! aggregation code never has to re-validate.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A validated WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

/// Unvalidated wire form of a [`GeoPoint`].
#[derive(Deserialize)]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = InvalidCoordinateError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl GeoPoint {
    /// Creates a point after checking both coordinates are finite and in
    /// range (`[-90, 90]` latitude, `[-180, 180]` longitude).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinateError`] if either coordinate is NaN,
    /// infinite, or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidCoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in decimal degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in decimal degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Error returned when a coordinate is not a valid geographic position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidCoordinateError {
    /// Latitude outside `[-90, 90]` or not finite.
    Latitude(f64),
    /// Longitude outside `[-180, 180]` or not finite.
    Longitude(f64),
}

impl std::fmt::Display for InvalidCoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latitude(v) => write!(f, "invalid latitude {v}: expected -90 to 90"),
            Self::Longitude(v) => write!(f, "invalid longitude {v}: expected -180 to 180"),
        }
    }
}

impl std::error::Error for InvalidCoordinateError {}

/// Projected coordinate reference systems that upstream sources use.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Crs {
    /// WGS 84 / UTM zone 15N. Covers the St. Louis study region.
    #[strum(serialize = "EPSG:32615")]
    #[serde(rename = "EPSG:32615")]
    Utm15N,
}

impl Crs {
    /// Returns the PROJ.4 definition string for this system.
    #[must_use]
    pub const fn proj_string(self) -> &'static str {
        match self {
            Self::Utm15N => "+proj=utm +zone=15 +datum=WGS84 +units=m +no_defs",
        }
    }
}

/// A planar point in a named projected system. Only lives until it is
/// reprojected into a [`GeoPoint`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    /// Easting in metres.
    pub x: f64,
    /// Northing in metres.
    pub y: f64,
    /// Reference system the easting/northing are expressed in.
    pub crs: Crs,
}

impl ProjectedPoint {
    /// Creates a projected point.
    #[must_use]
    pub const fn new(x: f64, y: f64, crs: Crs) -> Self {
        Self { x, y, crs }
    }
}

/// A latitude/longitude rectangle, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Whether `point` lies inside the box (edges included).
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.latitude())
            && (self.west..=self.east).contains(&point.longitude())
    }
}

/// The St. Louis study region. Measurements outside it are discarded.
pub const STUDY_REGION: BoundingBox = BoundingBox::new(-90.5, 38.4, -90.0, 38.9);
