//! Row normalization into canonical [`MeasurementRecord`]s.

use radon_map_geography::Reprojector;
use radon_map_geography_models::{BoundingBox, Crs, GeoPoint, ProjectedPoint, STUDY_REGION};
use radon_map_source_models::{MeasurementRecord, RawRow, ValidFlag};
use serde::Deserialize;
use thiserror::Error;

use crate::fields::FieldAlias;

/// City assumed when a row does not name one.
pub const DEFAULT_CITY: &str = "St. Louis";

/// Column aliases for reading radon test result rows.
#[derive(Debug, Clone, Deserialize)]
pub struct MeasurementFields {
    /// Projected easting (UTM 15N metres).
    pub x_coord: FieldAlias,
    /// Projected northing (UTM 15N metres).
    pub y_coord: FieldAlias,
    /// Geographic latitude, used when no projected pair is present.
    pub latitude: FieldAlias,
    /// Geographic longitude, used when no projected pair is present.
    pub longitude: FieldAlias,
    /// Measured radon level.
    pub final_result: FieldAlias,
    /// Valid-test flag.
    pub valid_test: FieldAlias,
    /// City name.
    pub city: FieldAlias,
    /// ZIP code.
    pub zip_code: FieldAlias,
}

/// Why a row was dropped during normalization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowRejection {
    /// Neither a projected nor a geographic coordinate pair was present.
    #[error("no coordinate pair present")]
    MissingCoordinates,

    /// A coordinate was present but not a finite number.
    #[error("coordinate is not numeric")]
    NonNumericCoordinate,

    /// The projected pair could not be converted.
    #[error("reprojection failed: {0}")]
    Reprojection(String),

    /// The geographic pair is not a valid position.
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// The resolved position is outside the study region.
    #[error("({latitude}, {longitude}) is outside the study region")]
    OutsideRegion {
        /// Resolved latitude.
        latitude: f64,
        /// Resolved longitude.
        longitude: f64,
    },

    /// `final_result` was present but not a finite number.
    #[error("final_result is not numeric")]
    NonNumericResult,
}

/// Converts raw upstream rows into validated measurements.
///
/// Construct one per request. Rows are independent; one bad row never
/// affects another.
pub struct Normalizer {
    fields: MeasurementFields,
    reprojector: Option<Reprojector>,
    region: BoundingBox,
}

impl Normalizer {
    /// Creates a normalizer over the study region.
    ///
    /// If the UTM reprojector cannot be built, rows with projected
    /// coordinates are rejected and geographic rows still pass.
    #[must_use]
    pub fn new(fields: MeasurementFields) -> Self {
        let reprojector = match Reprojector::new(Crs::Utm15N) {
            Ok(reprojector) => Some(reprojector),
            Err(e) => {
                log::error!("Failed to initialize {} reprojection: {e}", Crs::Utm15N);
                None
            }
        };

        Self {
            fields,
            reprojector,
            region: STUDY_REGION,
        }
    }

    /// Normalizes a single row.
    ///
    /// # Errors
    ///
    /// Returns the [`RowRejection`] describing why the row is unusable.
    pub fn normalize_row(&self, row: RawRow) -> Result<MeasurementRecord, RowRejection> {
        let location = self.locate(&row)?;

        if !self.region.contains(&location) {
            return Err(RowRejection::OutsideRegion {
                latitude: location.latitude(),
                longitude: location.longitude(),
            });
        }

        let value = match self.fields.final_result.resolve_f64(&row) {
            None => 0.0,
            Some(Some(value)) => value,
            Some(None) => return Err(RowRejection::NonNumericResult),
        };

        let valid = self
            .fields
            .valid_test
            .resolve_text(&row)
            .map_or(ValidFlag::No, |s| ValidFlag::from_text(&s));
        let city = self
            .fields
            .city
            .resolve_text(&row)
            .unwrap_or_else(|| DEFAULT_CITY.to_string());
        let zip_code = self.fields.zip_code.resolve_text(&row);

        Ok(MeasurementRecord {
            location,
            value,
            valid,
            city,
            zip_code,
            raw_fields: row,
        })
    }

    /// Normalizes every row, dropping the ones that fail.
    #[must_use]
    pub fn normalize_rows(&self, rows: Vec<RawRow>) -> Vec<MeasurementRecord> {
        let total = rows.len();
        let records: Vec<MeasurementRecord> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(i, row)| match self.normalize_row(row) {
                Ok(record) => Some(record),
                Err(reason) => {
                    log::debug!("Dropping row {i}: {reason}");
                    None
                }
            })
            .collect();

        if records.len() < total {
            log::info!(
                "Normalized {} of {total} rows ({} dropped)",
                records.len(),
                total - records.len()
            );
        }

        records
    }

    fn locate(&self, row: &RawRow) -> Result<GeoPoint, RowRejection> {
        let x = self.fields.x_coord.resolve_f64(row);
        let y = self.fields.y_coord.resolve_f64(row);

        if let (Some(x), Some(y)) = (x, y) {
            let (Some(x), Some(y)) = (x, y) else {
                return Err(RowRejection::NonNumericCoordinate);
            };
            let Some(reprojector) = &self.reprojector else {
                return Err(RowRejection::Reprojection(
                    "reprojector unavailable".to_string(),
                ));
            };
            return reprojector
                .to_geographic(ProjectedPoint::new(x, y, Crs::Utm15N))
                .map_err(|e| RowRejection::Reprojection(e.to_string()));
        }

        let latitude = self.fields.latitude.resolve_f64(row);
        let longitude = self.fields.longitude.resolve_f64(row);

        match (latitude, longitude) {
            (Some(Some(latitude)), Some(Some(longitude))) => GeoPoint::new(latitude, longitude)
                .map_err(|e| RowRejection::InvalidCoordinate(e.to_string())),
            (Some(_), Some(_)) => Err(RowRejection::NonNumericCoordinate),
            _ => Err(RowRejection::MissingCoordinates),
        }
    }
}
