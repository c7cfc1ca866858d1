#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read-only access to the upstream data warehouse.
//!
//! The [`Warehouse`] trait is the single seam between the engine and any
//! external store. The production implementation talks to the Snowflake
//! SQL REST API ([`snowflake::SnowflakeWarehouse`]); whether it is used at
//! all is decided once at startup from [`config::WarehouseSettings`].

pub mod config;
pub mod snowflake;

use std::sync::Arc;

use async_trait::async_trait;
use radon_map_source_models::RawRow;
use serde::Deserialize;
use thiserror::Error;

pub use crate::config::WarehouseSettings;

/// Errors that can occur while talking to the warehouse.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The warehouse rejected the statement.
    #[error("Warehouse error (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code returned.
        status: u16,
        /// Message reported by the warehouse.
        message: String,
    },

    /// The statement did not finish within the synchronous window.
    #[error("Statement {handle} still running")]
    Pending {
        /// Server-side statement handle.
        handle: String,
    },

    /// The response could not be mapped to rows.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of what went wrong.
        message: String,
    },
}

/// A read-only SQL statement with positional text bindings (`?`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Statement {
    /// SQL text.
    pub sql: String,
    /// Values bound to `?` placeholders, in order.
    #[serde(default)]
    pub bindings: Vec<String>,
}

impl Statement {
    /// Creates a statement with no bindings.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }
}

/// A read-only upstream store that answers SQL statements with rows.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Short name used in logs (e.g. `"snowflake"`).
    fn name(&self) -> &str;

    /// Executes `statement` and returns every result row.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`] if the request fails or the response
    /// cannot be decoded.
    async fn query(&self, statement: &Statement) -> Result<Vec<RawRow>, WarehouseError>;

    /// Checks connectivity with a trivial statement.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError`] if the warehouse cannot be reached.
    async fn ping(&self) -> Result<(), WarehouseError> {
        self.query(&Statement::new("SELECT 1")).await.map(|_| ())
    }
}

/// Builds the warehouse client described by `settings`.
///
/// Returns `None` when the warehouse is disabled.
///
/// # Errors
///
/// Returns [`WarehouseError::Http`] if the HTTP client cannot be built.
pub fn connect(settings: &WarehouseSettings) -> Result<Option<Arc<dyn Warehouse>>, WarehouseError> {
    match settings {
        WarehouseSettings::Disabled { reason } => {
            log::info!("Warehouse disabled: {reason}");
            Ok(None)
        }
        WarehouseSettings::Enabled(config) => {
            let warehouse = snowflake::SnowflakeWarehouse::new(config.clone())?;
            log::info!("Warehouse enabled: snowflake account {}", config.account);
            Ok(Some(Arc::new(warehouse)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(Vec<RawRow>);

    #[async_trait]
    impl Warehouse for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn query(&self, _statement: &Statement) -> Result<Vec<RawRow>, WarehouseError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn disabled_settings_connect_to_nothing() {
        let settings = WarehouseSettings::Disabled {
            reason: "test".to_string(),
        };
        assert!(connect(&settings).unwrap().is_none());
    }

    #[tokio::test]
    async fn default_ping_succeeds_when_query_does() {
        let warehouse = Canned(Vec::new());
        assert!(warehouse.ping().await.is_ok());
    }
}
