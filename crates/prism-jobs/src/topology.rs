//! Topology audit: workspaces → reports → datasets → data sources, and
//! workspaces → dataflows → data sources, flattened into [`AuditRow`]s.
//!
//! Only the per-workspace report listing is guarded. A failure there is
//! recorded in the run log and the workspace is skipped; any other listing
//! failure ends the run.

use prism_api::TenantListing;
use prism_core::{AuditRow, DataSource, Dataset, Workspace};
use serde::Serialize;

use crate::error::JobError;
use crate::progress::JobProgress;
use crate::run_log::{JobKind, LogScope, RunLog, RunLogEntry};

/// Outcome of a topology audit.
#[derive(Debug, Clone, Default)]
pub struct TopologyReport {
    pub rows: Vec<AuditRow>,
    pub workspaces_total: usize,
    /// Workspaces skipped because their reports could not be listed.
    pub skipped: Vec<Workspace>,
}

/// Counts printed at the end of a topology run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TopologySummary {
    pub workspaces_total: usize,
    pub workspaces_skipped: usize,
    pub rows: usize,
    pub report_rows: usize,
    pub dataflow_rows: usize,
}

impl TopologyReport {
    #[must_use]
    pub fn summary(&self) -> TopologySummary {
        let report_rows = self
            .rows
            .iter()
            .filter(|r| r.report_name.is_some())
            .count();
        TopologySummary {
            workspaces_total: self.workspaces_total,
            workspaces_skipped: self.skipped.len(),
            rows: self.rows.len(),
            report_rows,
            dataflow_rows: self.rows.len() - report_rows,
        }
    }
}

pub struct TopologyAuditor<'a, L: TenantListing> {
    listing: &'a L,
    log: &'a RunLog,
}

impl<'a, L: TenantListing> TopologyAuditor<'a, L> {
    pub const fn new(listing: &'a L, log: &'a RunLog) -> Self {
        Self { listing, log }
    }

    /// Audit every workspace visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns `JobError::Api` for any unguarded listing failure (workspaces,
    /// datasets, dataflows, data sources).
    pub async fn run(&self, progress: &dyn JobProgress) -> Result<TopologyReport, JobError> {
        let workspaces = self
            .listing
            .list_workspaces()
            .await
            .map_err(JobError::api("list workspaces"))?;
        tracing::info!(count = workspaces.len(), "listed workspaces");

        let mut report = TopologyReport {
            workspaces_total: workspaces.len(),
            ..TopologyReport::default()
        };
        progress.begin(workspaces.len());

        for workspace in &workspaces {
            progress.step(&workspace.name);
            if self.audit_reports(workspace, &mut report.rows).await? {
                self.audit_dataflows(workspace, &mut report.rows).await?;
            } else {
                report.skipped.push(workspace.clone());
            }
        }

        progress.end();
        tracing::info!(
            rows = report.rows.len(),
            skipped = report.skipped.len(),
            "topology audit complete"
        );
        Ok(report)
    }

    /// Report path for one workspace. Returns `false` when the workspace's
    /// reports could not be listed and it must be skipped.
    async fn audit_reports(
        &self,
        workspace: &Workspace,
        rows: &mut Vec<AuditRow>,
    ) -> Result<bool, JobError> {
        let reports = match self.listing.list_reports(workspace).await {
            Ok(reports) => reports,
            Err(error) => {
                self.log.record(
                    &RunLogEntry::new(
                        JobKind::Topology,
                        LogScope::ListReports,
                        "failed to list reports; skipping workspace",
                    )
                    .workspace(&workspace.id, Some(&workspace.name))
                    .error(&error),
                );
                return Ok(false);
            }
        };
        if reports.is_empty() {
            return Ok(true);
        }

        let datasets = self
            .listing
            .list_datasets(workspace)
            .await
            .map_err(JobError::api(format!("list datasets of {}", workspace.id)))?;

        for report in &reports {
            let Some(dataset) = Dataset::find_for_report(&datasets, report) else {
                tracing::info!(
                    workspace = %workspace.name,
                    report = %report.name,
                    dataset_id = report.dataset_id.as_deref().unwrap_or(""),
                    "no matching dataset for report"
                );
                continue;
            };
            let sources = self
                .listing
                .dataset_sources(dataset)
                .await
                .map_err(JobError::api(format!("list data sources of dataset {}", dataset.id)))?;
            rows.extend(
                DataSource::or_placeholder(sources)
                    .iter()
                    .map(|source| AuditRow::for_report(workspace, report, dataset, source)),
            );
        }
        Ok(true)
    }

    async fn audit_dataflows(
        &self,
        workspace: &Workspace,
        rows: &mut Vec<AuditRow>,
    ) -> Result<(), JobError> {
        let dataflows = self
            .listing
            .list_dataflows(workspace)
            .await
            .map_err(JobError::api(format!("list dataflows of {}", workspace.id)))?;

        for dataflow in &dataflows {
            let sources = self
                .listing
                .dataflow_sources(dataflow)
                .await
                .map_err(JobError::api(format!("list data sources of dataflow {}", dataflow.id)))?;
            rows.extend(
                DataSource::or_placeholder(sources)
                    .iter()
                    .map(|source| AuditRow::for_dataflow(workspace, dataflow, source)),
            );
        }
        Ok(())
    }
}
