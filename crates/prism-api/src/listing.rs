//! Organization-scope listing of workspaces and their contents.

use std::collections::HashSet;

use async_trait::async_trait;
use prism_core::{DataSource, Dataflow, Dataset, Report, Workspace};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{ApiError, PowerBiClient, TenantListing, http::check_response, segment};

/// OData collection envelope.
#[derive(Deserialize)]
pub(crate) struct ODataList<T> {
    pub value: Vec<T>,
}

#[derive(Deserialize)]
struct GroupInfo {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportInfo {
    id: String,
    #[serde(default)]
    name: String,
    dataset_id: Option<String>,
}

#[derive(Deserialize)]
struct DatasetInfo {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataflowInfo {
    object_id: String,
    #[serde(default)]
    name: String,
}

impl PowerBiClient {
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let resp = check_response(self.get(path).send().await?).await?;
        let data: ODataList<T> = resp.json().await?;
        Ok(data.value)
    }
}

fn to_workspace(group: GroupInfo) -> Workspace {
    Workspace {
        id: group.id,
        name: group.name,
    }
}

fn to_report(report: ReportInfo, workspace_id: &str) -> Report {
    Report {
        id: report.id,
        name: report.name,
        dataset_id: report.dataset_id.filter(|id| !id.is_empty()),
        workspace_id: workspace_id.to_string(),
    }
}

fn to_dataset(dataset: DatasetInfo, workspace_id: &str) -> Dataset {
    Dataset {
        id: dataset.id,
        name: dataset.name,
        workspace_id: workspace_id.to_string(),
    }
}

fn to_dataflow(dataflow: DataflowInfo, workspace_id: &str) -> Dataflow {
    Dataflow {
        id: dataflow.object_id,
        name: dataflow.name,
        workspace_id: workspace_id.to_string(),
    }
}

#[async_trait]
impl TenantListing for PowerBiClient {
    async fn list_workspaces(&self) -> Result<Vec<Workspace>, ApiError> {
        let mut workspaces = Vec::new();
        let mut seen = HashSet::new();
        let mut skip = 0usize;
        loop {
            let path = format!("admin/groups?$top={}&$skip={skip}", self.page_size);
            let page: Vec<GroupInfo> = self.get_list(&path).await?;
            let fetched = page.len();
            let before = workspaces.len();
            workspaces.extend(
                page.into_iter()
                    .filter(|group| seen.insert(group.id.clone()))
                    .map(to_workspace),
            );
            let added = workspaces.len() - before;
            tracing::debug!(skip, fetched, added, "fetched workspace page");
            // A full page with nothing new means the server ignored $skip.
            if fetched < self.page_size as usize || added == 0 {
                break;
            }
            skip += fetched;
        }
        Ok(workspaces)
    }

    async fn list_reports(&self, workspace: &Workspace) -> Result<Vec<Report>, ApiError> {
        let path = format!("admin/groups/{}/reports", segment(&workspace.id));
        let reports: Vec<ReportInfo> = self.get_list(&path).await?;
        Ok(reports
            .into_iter()
            .map(|r| to_report(r, &workspace.id))
            .collect())
    }

    async fn list_datasets(&self, workspace: &Workspace) -> Result<Vec<Dataset>, ApiError> {
        let path = format!("admin/groups/{}/datasets", segment(&workspace.id));
        let datasets: Vec<DatasetInfo> = self.get_list(&path).await?;
        Ok(datasets
            .into_iter()
            .map(|d| to_dataset(d, &workspace.id))
            .collect())
    }

    async fn list_dataflows(&self, workspace: &Workspace) -> Result<Vec<Dataflow>, ApiError> {
        let path = format!("admin/groups/{}/dataflows", segment(&workspace.id));
        let dataflows: Vec<DataflowInfo> = self.get_list(&path).await?;
        Ok(dataflows
            .into_iter()
            .map(|d| to_dataflow(d, &workspace.id))
            .collect())
    }

    async fn dataset_sources(&self, dataset: &Dataset) -> Result<Vec<DataSource>, ApiError> {
        let path = format!("admin/datasets/{}/datasources", segment(&dataset.id));
        let sources = self.get_list(&path).await?;
        Ok(crate::datasources::to_data_sources(sources))
    }

    async fn dataflow_sources(&self, dataflow: &Dataflow) -> Result<Vec<DataSource>, ApiError> {
        let path = format!("admin/dataflows/{}/datasources", segment(&dataflow.id));
        let sources = self.get_list(&path).await?;
        Ok(crate::datasources::to_data_sources(sources))
    }
}
