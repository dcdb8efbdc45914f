//! Table-metadata crawler configuration.

use serde::{Deserialize, Serialize};

fn default_connection_filter() -> String {
    "yourdatawarehouse".to_string()
}

fn default_partition_query() -> String {
    r#"EVALUATE SELECTCOLUMNS(INFO.PARTITIONS(), "PartitionName", [Name], "QueryDefinition", [QueryDefinition])"#
        .to_string()
}

const fn default_include_nulls() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlerConfig {
    /// UPN the metadata query impersonates and the elevation target.
    #[serde(default)]
    pub operator_upn: String,

    /// Substring of a data source's connection details that selects datasets.
    #[serde(default = "default_connection_filter")]
    pub connection_filter: String,

    /// DAX query returning `PartitionName` and `QueryDefinition` columns.
    #[serde(default = "default_partition_query")]
    pub partition_query: String,

    /// Serializer setting passed with every metadata query.
    #[serde(default = "default_include_nulls")]
    pub include_nulls: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            operator_upn: String::new(),
            connection_filter: default_connection_filter(),
            partition_query: default_partition_query(),
            include_nulls: default_include_nulls(),
        }
    }
}

impl CrawlerConfig {
    pub fn is_configured(&self) -> bool {
        !self.operator_upn.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CrawlerConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.connection_filter, "yourdatawarehouse");
        assert!(config.partition_query.contains("INFO.PARTITIONS()"));
        assert!(config.include_nulls);
    }
}
