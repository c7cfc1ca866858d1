//! Snowflake SQL API v2 client.
//!
//! Each [`Warehouse::query`] call submits one statement synchronously to
//! `/api/v2/statements` and then pulls any extra result partitions. There
//! is no session to open or close: the HTTP connection is borrowed from
//! reqwest's pool for the duration of the request and returned on every
//! exit path.

use std::collections::BTreeMap;

use async_trait::async_trait;
use radon_map_source_models::RawRow;
use serde::{Deserialize, Serialize};

use crate::config::SnowflakeConfig;
use crate::{Statement, Warehouse, WarehouseError};

const STATEMENTS_PATH: &str = "/api/v2/statements";

/// Snowflake SQL API client.
pub struct SnowflakeWarehouse {
    config: SnowflakeConfig,
    client: reqwest::Client,
}

impl SnowflakeWarehouse {
    /// Creates a client for the configured account.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::Http`] if the HTTP client cannot be built.
    pub fn new(config: SnowflakeConfig) -> Result<Self, WarehouseError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.config.token)
            .header(
                "X-Snowflake-Authorization-Token-Type",
                "PROGRAMMATIC_ACCESS_TOKEN",
            )
            .header("Accept", "application/json")
            .header("User-Agent", concat!("radon-map/", env!("CARGO_PKG_VERSION")))
    }

    async fn fetch_partition(
        &self,
        handle: &str,
        partition: usize,
    ) -> Result<Vec<Vec<Option<String>>>, WarehouseError> {
        let url = format!("{}{STATEMENTS_PATH}/{handle}", self.config.base_url());
        let resp = self
            .authorized(self.client.get(&url))
            .query(&[("partition", partition)])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(rejected(status, &body));
        }

        let page: PartitionResponse = serde_json::from_str(&body)?;
        Ok(page.data)
    }
}

/// Request body for `POST /api/v2/statements`.
#[derive(Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    schema: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    bindings: BTreeMap<String, Binding<'a>>,
}

#[derive(Serialize)]
struct Binding<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

/// Response body for a completed statement.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementResponse {
    result_set_meta_data: Option<ResultSetMetaData>,
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
    statement_handle: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultSetMetaData {
    row_type: Vec<ColumnType>,
    #[serde(default)]
    partition_info: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct ColumnType {
    name: String,
}

#[derive(Deserialize)]
struct PartitionResponse {
    #[serde(default)]
    data: Vec<Vec<Option<String>>>,
}

/// Error body returned by the SQL API.
#[derive(Deserialize)]
struct ApiError {
    message: String,
}

fn rejected(status: reqwest::StatusCode, body: &str) -> WarehouseError {
    let message = serde_json::from_str::<ApiError>(body)
        .map_or_else(|_| format!("HTTP {status}: {body}"), |e| e.message);
    WarehouseError::Rejected {
        status: status.as_u16(),
        message,
    }
}

/// Zips column names with positional cell values into [`RawRow`]s.
fn rows_from(
    columns: &[ColumnType],
    data: Vec<Vec<Option<String>>>,
) -> Result<Vec<RawRow>, WarehouseError> {
    data.into_iter()
        .map(|cells| {
            if cells.len() != columns.len() {
                return Err(WarehouseError::Decode {
                    message: format!(
                        "row has {} cells but result set has {} columns",
                        cells.len(),
                        columns.len()
                    ),
                });
            }
            Ok(columns
                .iter()
                .zip(cells)
                .map(|(col, cell)| {
                    let value = cell.map_or(serde_json::Value::Null, serde_json::Value::String);
                    (col.name.clone(), value)
                })
                .collect())
        })
        .collect()
}

#[async_trait]
impl Warehouse for SnowflakeWarehouse {
    fn name(&self) -> &str {
        "snowflake"
    }

    async fn query(&self, statement: &Statement) -> Result<Vec<RawRow>, WarehouseError> {
        let bindings = statement
            .bindings
            .iter()
            .enumerate()
            .map(|(i, value)| {
                (
                    (i + 1).to_string(),
                    Binding {
                        kind: "TEXT",
                        value,
                    },
                )
            })
            .collect();

        let request = StatementRequest {
            statement: &statement.sql,
            timeout: self.config.timeout.as_secs(),
            warehouse: self.config.warehouse.as_deref(),
            database: self.config.database.as_deref(),
            schema: self.config.schema.as_deref(),
            role: self.config.role.as_deref(),
            bindings,
        };

        let url = format!("{}{STATEMENTS_PATH}", self.config.base_url());
        let resp = self
            .authorized(self.client.post(&url))
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::ACCEPTED {
            let handle = serde_json::from_str::<StatementResponse>(&body)
                .ok()
                .and_then(|r| r.statement_handle)
                .unwrap_or_default();
            return Err(WarehouseError::Pending { handle });
        }
        if !status.is_success() {
            return Err(rejected(status, &body));
        }

        let response: StatementResponse = serde_json::from_str(&body)?;
        let Some(meta) = response.result_set_meta_data else {
            return Err(WarehouseError::Decode {
                message: "response has no resultSetMetaData".to_string(),
            });
        };

        let mut rows = rows_from(&meta.row_type, response.data)?;

        if meta.partition_info.len() > 1 {
            let handle = response.statement_handle.ok_or_else(|| WarehouseError::Decode {
                message: "partitioned result without statementHandle".to_string(),
            })?;
            for partition in 1..meta.partition_info.len() {
                let data = self.fetch_partition(&handle, partition).await?;
                rows.extend(rows_from(&meta.row_type, data)?);
            }
        }

        log::debug!(
            "Snowflake statement returned {} rows across {} partitions",
            rows.len(),
            meta.partition_info.len().max(1)
        );

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<ColumnType> {
        names
            .iter()
            .map(|n| ColumnType {
                name: (*n).to_string(),
            })
            .collect()
    }

    #[test]
    fn decodes_statement_response() {
        let body = r#"{
            "resultSetMetaData": {
                "numRows": 1,
                "format": "jsonv2",
                "partitionInfo": [{"rowCount": 1}],
                "rowType": [{"name": "X_COORD"}, {"name": "CITY"}]
            },
            "data": [["745312.0", null]],
            "statementHandle": "01b2-abc",
            "code": "090001"
        }"#;
        let response: StatementResponse = serde_json::from_str(body).unwrap();
        let meta = response.result_set_meta_data.unwrap();
        let rows = rows_from(&meta.row_type, response.data).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["X_COORD"], serde_json::json!("745312.0"));
        assert_eq!(rows[0]["CITY"], serde_json::Value::Null);
    }

    #[test]
    fn ragged_row_is_a_decode_error() {
        let err = rows_from(&columns(&["A", "B"]), vec![vec![Some("1".to_string())]]).unwrap_err();
        assert!(matches!(err, WarehouseError::Decode { .. }));
    }

    #[test]
    fn rejection_uses_api_message_when_present() {
        let err = rejected(
            reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"code":"002003","message":"Object 'NOAA_DAT' does not exist."}"#,
        );
        match err {
            WarehouseError::Rejected { status, message } => {
                assert_eq!(status, 422);
                assert!(message.contains("does not exist"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejection_falls_back_to_raw_body() {
        let err = rejected(reqwest::StatusCode::BAD_GATEWAY, "upstream down");
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn bindings_serialize_as_numbered_text() {
        let mut bindings = BTreeMap::new();
        bindings.insert(
            "1".to_string(),
            Binding {
                kind: "TEXT",
                value: "St. Louis",
            },
        );
        let request = StatementRequest {
            statement: "SELECT 1 WHERE city = ?",
            timeout: 30,
            warehouse: None,
            database: Some("ARCHDATA"),
            schema: None,
            role: None,
            bindings,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["bindings"]["1"]["type"], "TEXT");
        assert_eq!(json["bindings"]["1"]["value"], "St. Louis");
        assert_eq!(json["database"], "ARCHDATA");
        assert!(json.get("warehouse").is_none());
    }
}
