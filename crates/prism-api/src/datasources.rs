//! Data source mapping.
//!
//! The tenant returns a `connectionDetails` object whose keys depend on the
//! source kind (`server`/`database` for SQL, `url` for web and OData, `path`
//! for files, ...). A data source's display name is derived from the first
//! populated key; the full object is kept as compact JSON so downstream
//! filters can match on any part of it.

use prism_core::DataSource;
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DataSourceInfo {
    datasource_type: Option<String>,
    connection_details: Option<Map<String, Value>>,
    datasource_id: Option<String>,
}

fn detail<'a>(details: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    details
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Human-readable name for a data source.
///
/// `server/database` when both are present, otherwise the first of `server`,
/// `url`, `path`, `database`, `domain`, `account`, then the datasource id.
#[must_use]
pub fn display_name(details: Option<&Map<String, Value>>, datasource_id: Option<&str>) -> String {
    if let Some(details) = details {
        if let (Some(server), Some(database)) =
            (detail(details, "server"), detail(details, "database"))
        {
            return format!("{server}/{database}");
        }
        for key in ["server", "url", "path", "database", "domain", "account"] {
            if let Some(value) = detail(details, key) {
                return value.to_string();
            }
        }
    }
    datasource_id.unwrap_or_default().to_string()
}

pub(crate) fn to_data_sources(sources: Vec<DataSourceInfo>) -> Vec<DataSource> {
    sources
        .into_iter()
        .map(|source| DataSource {
            name: display_name(
                source.connection_details.as_ref(),
                source.datasource_id.as_deref(),
            ),
            kind: source.datasource_type.unwrap_or_default(),
            connection_details: source
                .connection_details
                .map(|details| Value::Object(details).to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::ODataList;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "value": [
            {
                "datasourceType": "Sql",
                "connectionDetails": {"server": "yourdatawarehouse.database.windows.net", "database": "Finance"},
                "datasourceId": "ds-1",
                "gatewayId": "gw-1"
            },
            {
                "datasourceType": "Web",
                "connectionDetails": {"url": "https://example.com/feed"},
                "datasourceId": "ds-2"
            },
            {
                "datasourceType": "Extension",
                "datasourceId": "ds-3"
            }
        ]
    }"#;

    fn parsed() -> Vec<DataSource> {
        let data: ODataList<DataSourceInfo> = serde_json::from_str(FIXTURE).unwrap();
        to_data_sources(data.value)
    }

    #[test]
    fn sql_source_joins_server_and_database() {
        let sources = parsed();
        assert_eq!(
            sources[0].name,
            "yourdatawarehouse.database.windows.net/Finance"
        );
        assert_eq!(sources[0].kind, "Sql");
        let details = sources[0].connection_details.as_deref().unwrap();
        assert!(details.contains("yourdatawarehouse"));
        assert!(details.contains("\"database\":\"Finance\""));
    }

    #[test]
    fn web_source_uses_url() {
        let sources = parsed();
        assert_eq!(sources[1].name, "https://example.com/feed");
    }

    #[test]
    fn missing_details_fall_back_to_id() {
        let sources = parsed();
        assert_eq!(sources[2].name, "ds-3");
        assert_eq!(sources[2].connection_details, None);
    }

    #[test]
    fn blank_values_are_skipped() {
        let details: Map<String, Value> =
            serde_json::from_str(r#"{"server": "  ", "path": "C:\\data\\book.xlsx"}"#).unwrap();
        assert_eq!(display_name(Some(&details), None), "C:\\data\\book.xlsx");
    }
}
