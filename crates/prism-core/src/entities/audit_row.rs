use serde::{Deserialize, Serialize};

use super::{DataSource, Dataflow, Dataset, Report, Workspace};

/// One row of the topology audit.
///
/// A row is either on the report path (report + dataset columns filled) or
/// on the dataflow path (dataflow column filled), never both. Build rows
/// through [`AuditRow::for_report`] and [`AuditRow::for_dataflow`]; rows read
/// back from CSV can be checked with [`AuditRow::is_consistent`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct AuditRow {
    pub workspace_name: String,
    pub workspace_id: String,
    pub report_name: Option<String>,
    pub dataset_id: Option<String>,
    pub dataset_name: Option<String>,
    pub dataflow_name: Option<String>,
    pub data_source: String,
    pub data_source_type: String,
    pub connection_details: Option<String>,
}

impl AuditRow {
    /// Row for a report → dataset → data source combination.
    #[must_use]
    pub fn for_report(
        workspace: &Workspace,
        report: &Report,
        dataset: &Dataset,
        source: &DataSource,
    ) -> Self {
        Self {
            workspace_name: workspace.name.clone(),
            workspace_id: workspace.id.clone(),
            report_name: Some(report.name.clone()),
            dataset_id: Some(dataset.id.clone()),
            dataset_name: Some(dataset.name.clone()),
            dataflow_name: None,
            data_source: source.name.clone(),
            data_source_type: source.kind.clone(),
            connection_details: source.connection_details.clone(),
        }
    }

    /// Row for a dataflow → data source combination.
    #[must_use]
    pub fn for_dataflow(workspace: &Workspace, dataflow: &Dataflow, source: &DataSource) -> Self {
        Self {
            workspace_name: workspace.name.clone(),
            workspace_id: workspace.id.clone(),
            report_name: None,
            dataset_id: None,
            dataset_name: None,
            dataflow_name: Some(dataflow.name.clone()),
            data_source: source.name.clone(),
            data_source_type: source.kind.clone(),
            connection_details: source.connection_details.clone(),
        }
    }

    /// `false` when both report and dataflow context are populated.
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        !(self.report_name.is_some() && self.dataflow_name.is_some())
    }

    /// Whether this row's connection details contain `needle`.
    ///
    /// Only dataset rows qualify; dataflow rows and rows without connection
    /// details never match.
    #[must_use]
    pub fn dataset_matches(&self, needle: &str) -> bool {
        self.dataset_id.as_deref().is_some_and(|id| !id.is_empty())
            && self
                .connection_details
                .as_deref()
                .is_some_and(|details| details.contains(needle))
    }
}
