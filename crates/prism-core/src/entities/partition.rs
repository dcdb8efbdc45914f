use serde::{Deserialize, Serialize};

/// One partition of a dataset table and the query that defines it.
///
/// Field names serialize to the partition CSV header
/// `WorkspaceId,DatasetId,PartitionName,QueryDefinition`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PartitionRow {
    pub workspace_id: String,
    pub dataset_id: String,
    pub partition_name: String,
    pub query_definition: String,
}
