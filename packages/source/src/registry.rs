//! Query definitions embedded from TOML at compile time.
//!
//! Each file in `packages/source/queries/` names the schema variants to
//! try, in priority order, and the column aliases used to read their rows.
//! Adding a new upstream schema is a matter of editing the TOML.

use radon_map_warehouse::Statement;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::SourceError;
use crate::normalize::MeasurementFields;
use crate::path::SegmentFields;

/// Tornado path segment query definition.
pub const TORNADO_PATH_TOML: &str = include_str!("../queries/tornado_path.toml");

/// Radon test result query definition.
pub const RADON_RESULTS_TOML: &str = include_str!("../queries/radon_results.toml");

/// One candidate query shape for an upstream source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchemaVariant {
    /// Short name used in logs.
    pub name: String,
    /// The statement to run.
    #[serde(flatten)]
    pub statement: Statement,
}

/// A set of schema variants plus the field aliases for reading their rows.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryDefinition<F> {
    /// Unique identifier (e.g. `"radon_results"`).
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Column aliases for each logical field.
    pub fields: F,
    /// Variants to try, in priority order.
    pub variants: Vec<SchemaVariant>,
}

/// Parses and sanity-checks a query definition.
///
/// # Errors
///
/// Returns [`SourceError`] if the TOML is malformed, declares no
/// variants, or repeats a variant name.
pub fn parse_definition<F: DeserializeOwned>(
    toml: &str,
) -> Result<QueryDefinition<F>, SourceError> {
    let definition: QueryDefinition<F> = toml::from_str(toml)?;

    if definition.variants.is_empty() {
        return Err(SourceError::Definition {
            id: definition.id,
            message: "no variants declared".to_string(),
        });
    }

    let mut names: Vec<&str> = definition.variants.iter().map(|v| v.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    if names.len() != definition.variants.len() {
        return Err(SourceError::Definition {
            id: definition.id,
            message: "duplicate variant names".to_string(),
        });
    }

    Ok(definition)
}

/// Returns the tornado path query definition.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (a build-time guarantee since
/// the file is compiled in).
#[must_use]
pub fn tornado_path() -> QueryDefinition<SegmentFields> {
    parse_definition(TORNADO_PATH_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse tornado_path.toml: {e}"))
}

/// Returns the radon results query definition.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed.
#[must_use]
pub fn radon_results() -> QueryDefinition<MeasurementFields> {
    parse_definition(RADON_RESULTS_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse radon_results.toml: {e}"))
}
