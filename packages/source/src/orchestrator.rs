//! Ordered schema-variant fallback over the upstream warehouse.
//!
//! Fetching is an explicit state machine:
//!
//! ```text
//! Trying(0) --rows--> Succeeded
//!     |
//!  empty / error
//!     v
//! Trying(1) --rows--> Succeeded
//!     |
//!    ...
//!     v
//! Exhausted
//! ```
//!
//! Each variant runs at most once. Upstream errors are logged and absorbed;
//! callers only ever see an [`Outcome`].

use std::sync::Arc;

use radon_map_source_models::RawRow;
use radon_map_warehouse::{Warehouse, WarehouseError};

use crate::registry::SchemaVariant;

/// Result of running a single variant.
#[derive(Debug)]
pub enum Attempt {
    /// The variant returned rows (possibly none).
    Rows(Vec<RawRow>),
    /// The variant failed.
    Failed(WarehouseError),
}

/// Fetch progress through a variant list.
#[derive(Debug, PartialEq)]
pub enum State {
    /// About to run the variant at this index.
    Trying(usize),
    /// A variant produced rows.
    Succeeded {
        /// Index of the accepted variant.
        variant: usize,
        /// Rows it returned.
        rows: Vec<RawRow>,
    },
    /// Every variant failed or came back empty.
    Exhausted,
}

impl State {
    /// Starting state for a list of `variant_count` variants.
    #[must_use]
    pub const fn start(variant_count: usize) -> Self {
        if variant_count == 0 {
            Self::Exhausted
        } else {
            Self::Trying(0)
        }
    }

    /// Advances after the current variant produced `attempt`.
    ///
    /// Terminal states ignore further attempts.
    #[must_use]
    pub fn next(self, attempt: Attempt, variant_count: usize) -> Self {
        let Self::Trying(index) = self else {
            return self;
        };

        match attempt {
            Attempt::Rows(rows) if !rows.is_empty() => Self::Succeeded {
                variant: index,
                rows,
            },
            Attempt::Rows(_) | Attempt::Failed(_) => {
                if index + 1 < variant_count {
                    Self::Trying(index + 1)
                } else {
                    Self::Exhausted
                }
            }
        }
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Trying(_))
    }
}

/// Why no live data was returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoDataReason {
    /// The warehouse is administratively disabled.
    Disabled,
    /// Every variant failed or returned no rows.
    Exhausted {
        /// How many variants were tried.
        attempts: usize,
    },
}

/// What a fetch produced.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// A variant returned rows.
    Data {
        /// Name of the accepted variant.
        variant: String,
        /// Its rows.
        rows: Vec<RawRow>,
    },
    /// No live data; the caller substitutes a static dataset.
    NoData(NoDataReason),
}

/// Runs schema variants against the configured warehouse, if any.
///
/// The warehouse handle is injected at construction and never changes.
#[derive(Clone, Default)]
pub struct Orchestrator {
    warehouse: Option<Arc<dyn Warehouse>>,
}

impl Orchestrator {
    /// Creates an orchestrator. `None` means the source is disabled.
    #[must_use]
    pub fn new(warehouse: Option<Arc<dyn Warehouse>>) -> Self {
        Self { warehouse }
    }

    /// Whether a live warehouse is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.warehouse.is_some()
    }

    /// The configured warehouse, if any.
    #[must_use]
    pub fn warehouse(&self) -> Option<&Arc<dyn Warehouse>> {
        self.warehouse.as_ref()
    }

    /// Tries each variant in order and returns the first non-empty result.
    pub async fn fetch(&self, label: &str, variants: &[SchemaVariant]) -> Outcome {
        let Some(warehouse) = &self.warehouse else {
            log::debug!("{label}: warehouse disabled, skipping {} variants", variants.len());
            return Outcome::NoData(NoDataReason::Disabled);
        };

        let mut state = State::start(variants.len());

        while let State::Trying(index) = state {
            let variant = &variants[index];
            let attempt = match warehouse.query(&variant.statement).await {
                Ok(rows) => {
                    if rows.is_empty() {
                        log::warn!("{label}: variant {} returned no rows", variant.name);
                    }
                    Attempt::Rows(rows)
                }
                Err(e) => {
                    log::warn!(
                        "{label}: variant {} failed on {}: {e}",
                        variant.name,
                        warehouse.name()
                    );
                    Attempt::Failed(e)
                }
            };
            state = state.next(attempt, variants.len());
        }

        match state {
            State::Succeeded { variant, rows } => {
                let name = variants[variant].name.clone();
                log::info!("{label}: variant {name} returned {} rows", rows.len());
                Outcome::Data {
                    variant: name,
                    rows,
                }
            }
            State::Exhausted | State::Trying(_) => {
                log::warn!(
                    "{label}: all {} variants exhausted, using fallback data",
                    variants.len()
                );
                Outcome::NoData(NoDataReason::Exhausted {
                    attempts: variants.len(),
                })
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use radon_map_warehouse::Statement;
    use serde_json::json;

    use super::*;

    /// Scripted warehouse keyed by SQL text. Unknown SQL is an error.
    pub struct ScriptedWarehouse {
        responses: BTreeMap<String, Result<Vec<RawRow>, String>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl ScriptedWarehouse {
        pub fn new() -> Self {
            Self {
                responses: BTreeMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn rows(mut self, sql: &str, rows: Vec<RawRow>) -> Self {
            self.responses.insert(sql.to_string(), Ok(rows));
            self
        }

        pub fn fail(mut self, sql: &str, message: &str) -> Self {
            self.responses.insert(sql.to_string(), Err(message.to_string()));
            self
        }
    }

    #[async_trait]
    impl Warehouse for ScriptedWarehouse {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn query(&self, statement: &Statement) -> Result<Vec<RawRow>, WarehouseError> {
            self.calls.lock().unwrap().push(statement.sql.clone());
            match self.responses.get(&statement.sql) {
                Some(Ok(rows)) => Ok(rows.clone()),
                Some(Err(message)) => Err(WarehouseError::Rejected {
                    status: 422,
                    message: message.clone(),
                }),
                None => Err(WarehouseError::Decode {
                    message: format!("unscripted statement {}", statement.sql),
                }),
            }
        }
    }

    fn variant(name: &str) -> SchemaVariant {
        SchemaVariant {
            name: name.to_string(),
            statement: Statement::new(format!("SELECT {name}")),
        }
    }

    fn one_row() -> Vec<RawRow> {
        vec![serde_json::from_value(json!({"A": "1"})).unwrap()]
    }

    #[test]
    fn empty_variant_list_starts_exhausted() {
        assert_eq!(State::start(0), State::Exhausted);
        assert_eq!(State::start(2), State::Trying(0));
    }

    #[test]
    fn rows_transition_to_succeeded() {
        let state = State::Trying(1).next(Attempt::Rows(one_row()), 3);
        assert_eq!(
            state,
            State::Succeeded {
                variant: 1,
                rows: one_row()
            }
        );
    }

    #[test]
    fn empty_and_failed_attempts_advance() {
        let state = State::Trying(0).next(Attempt::Rows(Vec::new()), 2);
        assert_eq!(state, State::Trying(1));

        let failed = Attempt::Failed(WarehouseError::Decode {
            message: "boom".to_string(),
        });
        assert_eq!(State::Trying(1).next(failed, 2), State::Exhausted);
    }

    #[test]
    fn terminal_states_are_sticky() {
        assert_eq!(
            State::Exhausted.next(Attempt::Rows(one_row()), 3),
            State::Exhausted
        );
        assert!(State::Exhausted.is_terminal());
        assert!(!State::Trying(0).is_terminal());
    }

    #[tokio::test]
    async fn disabled_source_returns_no_data() {
        let orchestrator = Orchestrator::new(None);
        let outcome = orchestrator.fetch("test", &[variant("a")]).await;
        assert_eq!(outcome, Outcome::NoData(NoDataReason::Disabled));
    }

    #[tokio::test]
    async fn first_non_empty_variant_wins_and_rest_are_skipped() {
        let warehouse = Arc::new(
            ScriptedWarehouse::new()
                .fail("SELECT a", "no such column")
                .rows("SELECT b", Vec::new())
                .rows("SELECT c", one_row())
                .rows("SELECT d", one_row()),
        );
        let orchestrator = Orchestrator::new(Some(warehouse.clone()));
        let variants = [variant("a"), variant("b"), variant("c"), variant("d")];

        let outcome = orchestrator.fetch("test", &variants).await;

        assert_eq!(
            outcome,
            Outcome::Data {
                variant: "c".to_string(),
                rows: one_row()
            }
        );
        assert_eq!(
            *warehouse.calls.lock().unwrap(),
            vec!["SELECT a", "SELECT b", "SELECT c"]
        );
    }

    #[tokio::test]
    async fn all_failures_exhaust_without_error() {
        let warehouse = Arc::new(ScriptedWarehouse::new().fail("SELECT a", "denied"));
        let orchestrator = Orchestrator::new(Some(warehouse.clone()));

        let outcome = orchestrator
            .fetch("test", &[variant("a"), variant("b")])
            .await;

        assert_eq!(
            outcome,
            Outcome::NoData(NoDataReason::Exhausted { attempts: 2 })
        );
        assert_eq!(warehouse.calls.lock().unwrap().len(), 2);
    }
}
