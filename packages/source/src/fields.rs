//! Declarative column alias resolution.
//!
//! Upstream sources disagree on column casing and naming. Each logical
//! field lists its candidate column names in priority order, and a single
//! resolver picks the first one holding a usable value. Supporting a new
//! upstream schema means adding an alias to a TOML file.

use radon_map_source_models::RawRow;
use serde::Deserialize;

/// Candidate column names for one logical field, highest priority first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct FieldAlias {
    /// Column names, tried in order.
    pub aliases: Vec<String>,
}

impl FieldAlias {
    /// Creates an alias list from column names.
    #[must_use]
    pub fn new<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the first present value among the aliases.
    ///
    /// `null` and blank strings count as absent, so a blank upper-case
    /// column falls through to its lower-case twin.
    #[must_use]
    pub fn resolve<'a>(&self, row: &'a RawRow) -> Option<&'a serde_json::Value> {
        self.aliases
            .iter()
            .filter_map(|alias| row.get(alias))
            .find(|value| is_present(value))
    }

    /// Resolves the field as a finite float.
    ///
    /// Returns `None` if the field is absent; `Some(None)` if it is present
    /// but not numeric.
    #[must_use]
    pub fn resolve_f64(&self, row: &RawRow) -> Option<Option<f64>> {
        self.resolve(row).map(coerce_f64)
    }

    /// Resolves the field as text, stringifying numbers and booleans.
    #[must_use]
    pub fn resolve_text(&self, row: &RawRow) -> Option<String> {
        self.resolve(row).and_then(coerce_text)
    }
}

fn is_present(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Parses a JSON number or numeric string into a finite `f64`.
#[must_use]
pub fn coerce_f64(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Renders a scalar JSON value as text. Arrays and objects yield `None`.
#[must_use]
pub fn coerce_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
