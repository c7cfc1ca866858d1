#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Upstream data access and normalization for radon map.
//!
//! Everything that touches the warehouse goes through the
//! [`orchestrator::Orchestrator`], which walks a list of schema variants
//! declared in embedded TOML ([`registry`]) and never surfaces an upstream
//! error. Rows that come back are reconciled through declarative field
//! aliases ([`fields`]) into canonical points by the [`normalize`] and
//! [`path`] modules. When no live data is available the [`fallback`]
//! datasets are used instead.

pub mod engine;
pub mod fallback;
pub mod fields;
pub mod normalize;
pub mod orchestrator;
pub mod path;
pub mod registry;

use thiserror::Error;

/// Errors that can occur while loading source definitions.
#[derive(Debug, Error)]
pub enum SourceError {
    /// A query definition failed to parse.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A query definition parsed but is unusable.
    #[error("Invalid definition {id}: {message}")]
    Definition {
        /// Definition identifier.
        id: String,
        /// Description of what went wrong.
        message: String,
    },
}

/// Where a result set ultimately came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Live warehouse data from the named schema variant.
    Warehouse {
        /// Name of the variant that produced rows.
        variant: String,
    },
    /// The warehouse is disabled; the development sample was used.
    Sample,
    /// The warehouse was enabled but produced nothing usable.
    Fallback,
}

impl Origin {
    /// Short lowercase label, suitable for a response header.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Warehouse { .. } => "warehouse",
            Self::Sample => "sample",
            Self::Fallback => "fallback",
        }
    }
}
