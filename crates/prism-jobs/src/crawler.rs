//! Partition-metadata crawl over the workspace → dataset index.
//!
//! Each dataset runs through the [`CrawlState`] machine:
//!
//! ```text
//! querying ──ok──────────────────────────────▶ emitting
//!    │ fail (not yet elevated)                    ▲
//!    ├──▶ elevating ──▶ retrying ──ok─────────────┘
//!    │ fail (already elevated)   │ fail
//!    └──────────────────▶ retrying ──▶ failed
//! ```
//!
//! Elevation is tracked per workspace: the operator is granted admin at most
//! once, and a workspace where the grant succeeded is revoked exactly once
//! after its last dataset, whatever the dataset outcomes were.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use prism_api::query::column_text;
use prism_api::{AccessAdmin, ApiError, MetadataQuery, QueryRequest, QueryResult};
use prism_core::{
    CheckpointMarker, CoreError, CrawlState, PartitionRow, ResumePoint, WorkspaceDatasetIndex,
};
use serde::Serialize;

use crate::error::JobError;
use crate::persist;
use crate::progress::JobProgress;
use crate::run_log::{JobKind, LogScope, RunLog, RunLogEntry};
use crate::tables::PartitionSink;

/// What to run against each dataset and as whom.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// UPN granted workspace admin on failure and impersonated by queries.
    pub operator_upn: String,
    /// DAX text listing the dataset's partitions.
    pub query: String,
    pub include_nulls: bool,
}

/// Counts reported at the end of a crawl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    pub workspaces_processed: usize,
    pub workspaces_skipped: usize,
    pub datasets_first_try: usize,
    pub datasets_after_elevation: usize,
    pub datasets_failed: usize,
    pub partition_rows: usize,
    pub grants: usize,
    pub revokes: usize,
    pub revoke_failures: usize,
}

impl CrawlSummary {
    #[must_use]
    pub const fn datasets_total(&self) -> usize {
        self.datasets_first_try + self.datasets_after_elevation + self.datasets_failed
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} workspaces crawled ({} skipped), {} datasets: {} ok, {} ok after elevation, {} failed; \
             {} partition rows; {} grants, {} revokes ({} failed)",
            self.workspaces_processed,
            self.workspaces_skipped,
            self.datasets_total(),
            self.datasets_first_try,
            self.datasets_after_elevation,
            self.datasets_failed,
            self.partition_rows,
            self.grants,
            self.revokes,
            self.revoke_failures,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Elevation {
    NotAttempted,
    Granted,
    GrantFailed,
}

/// Per-workspace state carried across its datasets.
struct WorkspaceSession<'w> {
    workspace_id: &'w str,
    elevation: Elevation,
}

pub struct Crawler<'a, Q: MetadataQuery, A: AccessAdmin> {
    query_api: &'a Q,
    admin: &'a A,
    settings: &'a CrawlSettings,
    log: &'a RunLog,
    checkpoint_path: Option<PathBuf>,
}

impl<'a, Q: MetadataQuery, A: AccessAdmin> Crawler<'a, Q, A> {
    pub const fn new(
        query_api: &'a Q,
        admin: &'a A,
        settings: &'a CrawlSettings,
        log: &'a RunLog,
    ) -> Self {
        Self {
            query_api,
            admin,
            settings,
            log,
            checkpoint_path: None,
        }
    }

    /// Write a [`CheckpointMarker`] to `path` after each completed workspace.
    #[must_use]
    pub fn with_checkpoint(mut self, path: PathBuf) -> Self {
        self.checkpoint_path = Some(path);
        self
    }

    /// Crawl every pending workspace of `index`, appending partition rows to
    /// `sink`.
    ///
    /// # Errors
    ///
    /// Returns `JobError::Core` if `resume` names a workspace not in the
    /// index, or the first sink/IO error. A workspace's admin grant is revoked
    /// before a sink error is returned.
    pub async fn run<S: PartitionSink>(
        &self,
        index: &WorkspaceDatasetIndex,
        resume: &ResumePoint,
        sink: &mut S,
        progress: &dyn JobProgress,
    ) -> Result<CrawlSummary, JobError> {
        let plan = index.plan(resume)?;
        let mut summary = CrawlSummary {
            workspaces_skipped: plan.skipped.len(),
            ..CrawlSummary::default()
        };
        if let Some(last) = plan.skipped.last() {
            tracing::info!(skipped = plan.skipped.len(), last_skipped = %last, "resuming crawl");
        }
        if let (false, Some(path)) = (resume.is_resume(), &self.checkpoint_path) {
            persist::clear_checkpoint(path)?;
        }

        progress.begin(plan.pending.iter().map(|(_, datasets)| datasets.len()).sum());
        for (workspace_id, datasets) in plan.pending {
            let mut session = WorkspaceSession {
                workspace_id,
                elevation: Elevation::NotAttempted,
            };
            let crawled = self
                .crawl_workspace(&mut session, datasets, sink, progress, &mut summary)
                .await;
            self.release(&session, &mut summary).await;
            crawled?;

            summary.workspaces_processed += 1;
            self.checkpoint(workspace_id);
        }
        progress.end();

        tracing::info!(%summary, "crawl complete");
        Ok(summary)
    }

    async fn crawl_workspace<S: PartitionSink>(
        &self,
        session: &mut WorkspaceSession<'_>,
        datasets: &BTreeSet<String>,
        sink: &mut S,
        progress: &dyn JobProgress,
        summary: &mut CrawlSummary,
    ) -> Result<(), JobError> {
        for dataset_id in datasets {
            progress.step(&format!("{}/{dataset_id}", session.workspace_id));
            let state = self.crawl_dataset(session, dataset_id, sink, summary).await?;
            tracing::debug!(
                workspace_id = session.workspace_id,
                dataset_id = %dataset_id,
                %state,
                "dataset finished"
            );
        }
        Ok(())
    }

    async fn crawl_dataset<S: PartitionSink>(
        &self,
        session: &mut WorkspaceSession<'_>,
        dataset_id: &str,
        sink: &mut S,
        summary: &mut CrawlSummary,
    ) -> Result<CrawlState, JobError> {
        let mut state = CrawlState::Querying;
        let request = QueryRequest {
            workspace_id: session.workspace_id,
            dataset_id,
            query: &self.settings.query,
            impersonated_user: &self.settings.operator_upn,
            include_nulls: self.settings.include_nulls,
        };

        let first_error = match self.query_api.execute_query(&request).await {
            Ok(result) => {
                advance(dataset_id, &mut state, CrawlState::Emitting)?;
                summary.partition_rows += emit(&request, &result, sink)?;
                summary.datasets_first_try += 1;
                return Ok(state);
            }
            Err(error) => error,
        };
        self.record(
            LogScope::MetadataQuery,
            "metadata query failed",
            &request,
            &first_error,
        );

        if session.elevation == Elevation::NotAttempted {
            advance(dataset_id, &mut state, CrawlState::Elevating)?;
            session.elevation = self.elevate(session.workspace_id).await;
            if session.elevation == Elevation::Granted {
                summary.grants += 1;
            }
        }

        advance(dataset_id, &mut state, CrawlState::Retrying)?;
        match self.query_api.execute_query(&request).await {
            Ok(result) => {
                advance(dataset_id, &mut state, CrawlState::Emitting)?;
                summary.partition_rows += emit(&request, &result, sink)?;
                summary.datasets_after_elevation += 1;
            }
            Err(error) => {
                self.record(
                    LogScope::RetryQuery,
                    "metadata query failed after elevation",
                    &request,
                    &error,
                );
                advance(dataset_id, &mut state, CrawlState::Failed)?;
                summary.datasets_failed += 1;
            }
        }
        Ok(state)
    }

    async fn elevate(&self, workspace_id: &str) -> Elevation {
        match self
            .admin
            .grant_admin(workspace_id, &self.settings.operator_upn)
            .await
        {
            Ok(()) => {
                tracing::info!(workspace_id, user = %self.settings.operator_upn, "granted workspace admin");
                Elevation::Granted
            }
            Err(error) => {
                self.log.record(
                    &RunLogEntry::new(JobKind::Crawl, LogScope::GrantAdmin, "failed to grant workspace admin")
                        .workspace(workspace_id, None)
                        .error(&error),
                );
                Elevation::GrantFailed
            }
        }
    }

    /// Revoke the grant made for this workspace, if any.
    async fn release(&self, session: &WorkspaceSession<'_>, summary: &mut CrawlSummary) {
        if session.elevation != Elevation::Granted {
            return;
        }
        summary.revokes += 1;
        match self
            .admin
            .revoke_admin(session.workspace_id, &self.settings.operator_upn)
            .await
        {
            Ok(()) => tracing::info!(
                workspace_id = session.workspace_id,
                user = %self.settings.operator_upn,
                "revoked workspace admin"
            ),
            Err(error) => {
                summary.revoke_failures += 1;
                self.log.record(
                    &RunLogEntry::new(JobKind::Crawl, LogScope::RevokeAdmin, "failed to revoke workspace admin")
                        .workspace(session.workspace_id, None)
                        .error(&error),
                );
            }
        }
    }

    fn checkpoint(&self, workspace_id: &str) {
        let Some(path) = &self.checkpoint_path else {
            return;
        };
        if let Err(error) = persist::save_checkpoint(path, &CheckpointMarker::now(workspace_id)) {
            self.log.record(
                &RunLogEntry::new(JobKind::Crawl, LogScope::Checkpoint, "failed to write checkpoint marker")
                    .workspace(workspace_id, None)
                    .error(&error),
            );
        }
    }

    fn record(&self, scope: LogScope, message: &str, request: &QueryRequest<'_>, error: &ApiError) {
        self.log.record(
            &RunLogEntry::new(JobKind::Crawl, scope, message)
                .workspace(request.workspace_id, None)
                .dataset(request.dataset_id)
                .error(error),
        );
    }
}

fn advance(dataset_id: &str, state: &mut CrawlState, next: CrawlState) -> Result<(), CoreError> {
    if !state.can_transition_to(next) {
        return Err(CoreError::InvalidTransition {
            dataset_id: dataset_id.to_string(),
            from: state.to_string(),
            to: next.to_string(),
        });
    }
    *state = next;
    Ok(())
}

/// Append one [`PartitionRow`] per result row; returns the number appended.
fn emit<S: PartitionSink>(
    request: &QueryRequest<'_>,
    result: &QueryResult,
    sink: &mut S,
) -> Result<usize, JobError> {
    let mut written = 0;
    for row in result.rows() {
        let partition_name = column_text(row, "PartitionName")
            .or_else(|| column_text(row, "Name"))
            .unwrap_or_default();
        sink.append(&PartitionRow {
            workspace_id: request.workspace_id.to_string(),
            dataset_id: request.dataset_id.to_string(),
            partition_name,
            query_definition: column_text(row, "QueryDefinition").unwrap_or_default(),
        })?;
        written += 1;
    }
    Ok(written)
}
