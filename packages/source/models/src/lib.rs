#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw upstream row type and the canonical normalized measurement.
//!
//! Upstream sources hand back loosely-typed rows whose column names vary in
//! casing and aliasing. Normalization turns each row into a
//! [`MeasurementRecord`] with a validated [`GeoPoint`] or drops it.

use std::collections::BTreeMap;

use radon_map_geography_models::GeoPoint;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One row as returned by an upstream query: column name to JSON value.
pub type RawRow = BTreeMap<String, serde_json::Value>;

/// Whether a radon test was recorded as valid.
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
pub enum ValidFlag {
    /// Valid test.
    #[strum(serialize = "Y")]
    #[serde(rename = "Y")]
    Yes,
    /// Invalid or unknown.
    #[strum(serialize = "N")]
    #[serde(rename = "N")]
    No,
}

impl ValidFlag {
    /// Normalizes the textual spellings upstream sources use.
    ///
    /// `"YES"` and `"Y"` (any casing, surrounding whitespace ignored) map to
    /// [`ValidFlag::Yes`]; every other spelling maps to [`ValidFlag::No`].
    #[must_use]
    pub fn from_text(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("YES") || s.eq_ignore_ascii_case("Y") {
            Self::Yes
        } else {
            Self::No
        }
    }

    /// Returns `true` for [`ValidFlag::Yes`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// A radon test result normalized to geographic coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRecord {
    /// Test location in WGS84 degrees.
    pub location: GeoPoint,
    /// Measured radon level (pCi/L), `final_result` upstream.
    pub value: f64,
    /// Normalized valid-test flag.
    pub valid: ValidFlag,
    /// City the test was recorded in.
    pub city: String,
    /// ZIP code, if the source provided one.
    pub zip_code: Option<String>,
    /// The untouched upstream row this record came from.
    #[serde(skip)]
    pub raw_fields: RawRow,
}

impl MeasurementRecord {
    /// Spatial grouping key: the ZIP code when known, else the city.
    #[must_use]
    pub fn group_key(&self) -> &str {
        self.zip_code.as_deref().unwrap_or(&self.city)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_spellings_normalize_to_yes() {
        for s in ["YES", "Y", "yes", "y", " Yes "] {
            assert_eq!(ValidFlag::from_text(s), ValidFlag::Yes, "{s:?}");
        }
    }

    #[test]
    fn unknown_spellings_normalize_to_no() {
        for s in ["N", "NO", "", "TRUE", "1", "maybe"] {
            assert_eq!(ValidFlag::from_text(s), ValidFlag::No, "{s:?}");
        }
    }

    #[test]
    fn flag_serializes_as_single_letter() {
        assert_eq!(serde_json::to_string(&ValidFlag::Yes).unwrap(), "\"Y\"");
        assert_eq!(ValidFlag::No.to_string(), "N");
    }

    #[test]
    fn group_key_prefers_zip_code() {
        let mut record = MeasurementRecord {
            location: GeoPoint::new(38.65, -90.23).unwrap(),
            value: 4.2,
            valid: ValidFlag::Yes,
            city: "St. Louis".to_string(),
            zip_code: Some("63113".to_string()),
            raw_fields: RawRow::new(),
        };
        assert_eq!(record.group_key(), "63113");

        record.zip_code = None;
        assert_eq!(record.group_key(), "St. Louis");
    }
}
