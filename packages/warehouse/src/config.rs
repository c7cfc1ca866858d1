//! Warehouse settings resolved once from the environment at startup.
//!
//! The warehouse is enabled exactly when credentials are present.
//! `USE_WAREHOUSE=true` requests it explicitly; without credentials that is
//! a configuration error, logged, and the warehouse stays disabled. Any
//! other `USE_WAREHOUSE` value defers to credential detection.

use std::time::Duration;

/// Default request timeout for warehouse statements.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved warehouse settings. Read-only after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarehouseSettings {
    /// No live source; every endpoint serves sample data.
    Disabled {
        /// Why the warehouse is off (logged at startup).
        reason: String,
    },
    /// Live Snowflake access.
    Enabled(SnowflakeConfig),
}

/// Connection parameters for the Snowflake SQL API.
#[derive(Clone, PartialEq, Eq)]
pub struct SnowflakeConfig {
    /// Account identifier (e.g. `"xy12345.us-east-1"`).
    pub account: String,
    /// Login name.
    pub user: String,
    /// Programmatic access token sent as a bearer token.
    pub token: String,
    /// Virtual warehouse to run statements on.
    pub warehouse: Option<String>,
    /// Default database.
    pub database: Option<String>,
    /// Default schema.
    pub schema: Option<String>,
    /// Role to assume.
    pub role: Option<String>,
    /// API host override. Defaults to `{account}.snowflakecomputing.com`.
    pub host: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for SnowflakeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnowflakeConfig")
            .field("account", &self.account)
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .field("warehouse", &self.warehouse)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("role", &self.role)
            .field("host", &self.host)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SnowflakeConfig {
    /// Base URL of the SQL API for this account.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.host.as_ref().map_or_else(
            || format!("https://{}.snowflakecomputing.com", self.account),
            |host| host.trim_end_matches('/').to_string(),
        )
    }
}

impl WarehouseSettings {
    /// Reads settings from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings from an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let forced =
            get("USE_WAREHOUSE").is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

        let (Some(account), Some(user)) = (get("SNOWFLAKE_ACCOUNT"), get("SNOWFLAKE_USER")) else {
            return Self::missing(forced, "SNOWFLAKE_ACCOUNT and SNOWFLAKE_USER must be set");
        };

        let Some(token) = get("SNOWFLAKE_PAT") else {
            if get("SNOWFLAKE_PASSWORD").is_some() {
                return Self::missing(
                    forced,
                    "SNOWFLAKE_PASSWORD is set but the SQL API needs a token; set SNOWFLAKE_PAT",
                );
            }
            return Self::missing(forced, "SNOWFLAKE_PAT is not set");
        };

        let timeout_secs = get("WAREHOUSE_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self::Enabled(SnowflakeConfig {
            account,
            user,
            token,
            warehouse: get("SNOWFLAKE_WAREHOUSE"),
            database: get("SNOWFLAKE_DATABASE"),
            schema: get("SNOWFLAKE_SCHEMA"),
            role: get("SNOWFLAKE_ROLE"),
            host: get("SNOWFLAKE_HOST"),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    fn missing(forced: bool, detail: &str) -> Self {
        if forced {
            log::warn!("USE_WAREHOUSE=true but credentials are incomplete: {detail}");
        }
        Self::Disabled {
            reason: format!("credentials not configured ({detail})"),
        }
    }

    /// Whether a live warehouse will be used.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }
}
