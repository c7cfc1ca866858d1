#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reprojection from planar upstream coordinates to WGS84 degrees.
//!
//! Radon test results arrive as UTM easting/northing pairs. [`Reprojector`]
//! inverts the transverse Mercator projection with `proj4rs`, which uses
//! the same extended (Poder/Engsager) algorithm PROJ applies for `utm`, so
//! the output matches PROJ to well below a micro-degree.

use proj4rs::proj::Proj;
use radon_map_geography_models::{Crs, GeoPoint, InvalidCoordinateError, ProjectedPoint};
use thiserror::Error;

/// PROJ definition of the geographic target system.
const WGS84_LONGLAT: &str = "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs";

/// Errors that can occur while reprojecting a coordinate.
#[derive(Debug, Error)]
pub enum GeographyError {
    /// The projection library rejected the definition or the point.
    #[error("Projection error: {0}")]
    Projection(#[from] proj4rs::errors::Error),

    /// The reprojected point is not a valid geographic position.
    #[error("Invalid coordinate: {0}")]
    Coordinate(#[from] InvalidCoordinateError),

    /// The point is expressed in a different system than the reprojector.
    #[error("CRS mismatch: reprojector handles {expected}, point is in {actual}")]
    CrsMismatch {
        /// System this reprojector was built for.
        expected: Crs,
        /// System the point claims to be in.
        actual: Crs,
    },
}

/// Inverse projection from one projected system to WGS84 degrees.
///
/// Built once per request batch; holds no state between calls.
pub struct Reprojector {
    crs: Crs,
    source: Proj,
    target: Proj,
}

impl Reprojector {
    /// Builds a reprojector for points expressed in `crs`.
    ///
    /// # Errors
    ///
    /// Returns [`GeographyError::Projection`] if either PROJ definition
    /// fails to parse.
    pub fn new(crs: Crs) -> Result<Self, GeographyError> {
        let source = Proj::from_proj_string(crs.proj_string())?;
        let target = Proj::from_proj_string(WGS84_LONGLAT)?;
        log::debug!("Initialized reprojection {crs} -> EPSG:4326");
        Ok(Self {
            crs,
            source,
            target,
        })
    }

    /// Converts a projected point into geographic degrees.
    ///
    /// # Errors
    ///
    /// Returns [`GeographyError`] if the point is in another system, the
    /// inverse projection fails, or the result is out of range.
    pub fn to_geographic(&self, point: ProjectedPoint) -> Result<GeoPoint, GeographyError> {
        if point.crs != self.crs {
            return Err(GeographyError::CrsMismatch {
                expected: self.crs,
                actual: point.crs,
            });
        }

        // proj4rs works in radians on the geographic side
        let mut xyz = (point.x, point.y, 0.0);
        proj4rs::transform::transform(&self.source, &self.target, &mut xyz)?;

        Ok(GeoPoint::new(xyz.1.to_degrees(), xyz.0.to_degrees())?)
    }
}
