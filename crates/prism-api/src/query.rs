//! DAX metadata queries (`executeQueries`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ApiError, MetadataQuery, PowerBiClient, http::check_response, segment};

/// One metadata query against one dataset.
#[derive(Debug, Clone, Copy)]
pub struct QueryRequest<'a> {
    pub workspace_id: &'a str,
    pub dataset_id: &'a str,
    pub query: &'a str,
    /// UPN whose effective permissions the query runs under.
    pub impersonated_user: &'a str,
    pub include_nulls: bool,
}

/// Result tables of a metadata query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub tables: Vec<QueryTable>,
}

/// One result table: rows of named columns.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryTable {
    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,
}

impl QueryResult {
    /// All rows across all tables, in order.
    pub fn rows(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.tables.iter().flat_map(|table| table.rows.iter())
    }
}

/// Read a column from a result row as text.
///
/// Accepts the bare name, the bracketed form (`[Name]`) and table-qualified
/// keys (`Partitions[Name]`). Nulls read as `None`; numbers and booleans are
/// rendered as text.
#[must_use]
pub fn column_text(row: &Map<String, Value>, column: &str) -> Option<String> {
    let bracketed = format!("[{column}]");
    let value = row.get(column).or_else(|| row.get(&bracketed)).or_else(|| {
        row.iter()
            .find(|(key, _)| key.ends_with(&bracketed))
            .map(|(_, value)| value)
    })?;
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteQueriesBody<'a> {
    queries: [QueryText<'a>; 1],
    serializer_settings: SerializerSettings,
    impersonated_user_name: &'a str,
}

#[derive(Serialize)]
struct QueryText<'a> {
    query: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SerializerSettings {
    include_nulls: bool,
}

#[derive(Deserialize)]
struct ExecuteQueriesResponse {
    #[serde(default)]
    results: Vec<ResultEntry>,
    error: Option<Value>,
}

#[derive(Deserialize)]
struct ResultEntry {
    #[serde(default)]
    tables: Vec<QueryTable>,
    error: Option<Value>,
}

fn request_body<'a>(request: &QueryRequest<'a>) -> ExecuteQueriesBody<'a> {
    ExecuteQueriesBody {
        queries: [QueryText {
            query: request.query,
        }],
        serializer_settings: SerializerSettings {
            include_nulls: request.include_nulls,
        },
        impersonated_user_name: request.impersonated_user,
    }
}

/// Turn a parsed response into tables, surfacing embedded error payloads.
fn into_result(response: ExecuteQueriesResponse) -> Result<QueryResult, ApiError> {
    if let Some(error) = response.error {
        return Err(ApiError::Query(error.to_string()));
    }
    let mut tables = Vec::new();
    for entry in response.results {
        if let Some(error) = entry.error {
            return Err(ApiError::Query(error.to_string()));
        }
        tables.extend(entry.tables);
    }
    Ok(QueryResult { tables })
}

#[async_trait]
impl MetadataQuery for PowerBiClient {
    async fn execute_query(&self, request: &QueryRequest<'_>) -> Result<QueryResult, ApiError> {
        let path = format!(
            "groups/{}/datasets/{}/executeQueries",
            segment(request.workspace_id),
            segment(request.dataset_id)
        );
        let resp = check_response(
            self.post(&path)
                .json(&request_body(request))
                .send()
                .await?,
        )
        .await?;
        let parsed: ExecuteQueriesResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Parse(format!("executeQueries response: {e}")))?;
        into_result(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "results": [{
            "tables": [{
                "rows": [
                    {"[PartitionName]": "Sales-2024", "[QueryDefinition]": "let Source = Sql.Database(\"dw\", \"fin\") in Source"},
                    {"[PartitionName]": "Sales-2025", "[QueryDefinition]": null}
                ]
            }]
        }]
    }"#;

    #[test]
    fn parses_rows_with_bracketed_columns() {
        let parsed: ExecuteQueriesResponse = serde_json::from_str(FIXTURE).unwrap();
        let result = into_result(parsed).unwrap();
        let rows: Vec<_> = result.rows().collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(
            column_text(rows[0], "PartitionName").as_deref(),
            Some("Sales-2024")
        );
        assert!(
            column_text(rows[0], "QueryDefinition")
                .unwrap()
                .starts_with("let Source")
        );
        assert_eq!(column_text(rows[1], "QueryDefinition"), None);
    }

    #[test]
    fn column_text_accepts_qualified_and_bare_keys() {
        let row: Map<String, Value> = serde_json::from_str(
            r#"{"Partitions[Name]": "p1", "Mode": 0, "QueryDefinition": "x"}"#,
        )
        .unwrap();
        assert_eq!(column_text(&row, "Name").as_deref(), Some("p1"));
        assert_eq!(column_text(&row, "Mode").as_deref(), Some("0"));
        assert_eq!(column_text(&row, "QueryDefinition").as_deref(), Some("x"));
        assert_eq!(column_text(&row, "Missing"), None);
    }

    #[test]
    fn embedded_error_is_surfaced() {
        let json = r#"{"results": [{"error": {"code": "DatasetExecuteQueriesError"}}]}"#;
        let parsed: ExecuteQueriesResponse = serde_json::from_str(json).unwrap();
        let err = into_result(parsed).unwrap_err();
        assert!(matches!(err, ApiError::Query(ref m) if m.contains("DatasetExecuteQueriesError")));
    }

    #[test]
    fn top_level_error_is_surfaced() {
        let json = r#"{"error": {"code": "PowerBIEntityNotFound"}}"#;
        let parsed: ExecuteQueriesResponse = serde_json::from_str(json).unwrap();
        assert!(into_result(parsed).is_err());
    }

    #[test]
    fn request_body_shape() {
        let request = QueryRequest {
            workspace_id: "w-1",
            dataset_id: "d-1",
            query: "EVALUATE INFO.PARTITIONS()",
            impersonated_user: "ops@contoso.com",
            include_nulls: true,
        };
        let body = serde_json::to_value(request_body(&request)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "queries": [{"query": "EVALUATE INFO.PARTITIONS()"}],
                "serializerSettings": {"includeNulls": true},
                "impersonatedUserName": "ops@contoso.com"
            })
        );
    }
}
