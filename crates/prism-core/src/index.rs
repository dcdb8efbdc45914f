//! Workspace → dataset index for the partition crawl.
//!
//! The index is an ordered map of workspace id to an ordered set of dataset
//! ids. Both levels are sorted, which gives a stable iteration order for
//! resuming and makes duplicate (workspace, dataset) pairs unrepresentable.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::checkpoint::ResumePoint;
use crate::entities::AuditRow;
use crate::errors::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceDatasetIndex {
    workspaces: BTreeMap<String, BTreeSet<String>>,
}

/// Result of applying a [`ResumePoint`] to an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlPlan<'a> {
    /// Workspaces skipped because they precede the checkpoint.
    pub skipped: Vec<&'a str>,
    /// Workspaces to process, in order, with their datasets.
    pub pending: Vec<(&'a str, &'a BTreeSet<String>)>,
}

impl WorkspaceDatasetIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from topology rows whose connection details contain
    /// `filter`. Duplicate pairs collapse into one entry.
    #[must_use]
    pub fn from_audit_rows<'a, I>(rows: I, filter: &str) -> Self
    where
        I: IntoIterator<Item = &'a AuditRow>,
    {
        let mut index = Self::new();
        for row in rows {
            if !row.dataset_matches(filter) {
                continue;
            }
            if let Some(dataset_id) = row.dataset_id.as_deref() {
                index.insert(&row.workspace_id, dataset_id);
            }
        }
        index
    }

    /// Insert a pair. Returns `false` if it was already present.
    pub fn insert(&mut self, workspace_id: &str, dataset_id: &str) -> bool {
        self.workspaces
            .entry(workspace_id.to_string())
            .or_default()
            .insert(dataset_id.to_string())
    }

    #[must_use]
    pub fn contains(&self, workspace_id: &str, dataset_id: &str) -> bool {
        self.workspaces
            .get(workspace_id)
            .is_some_and(|datasets| datasets.contains(dataset_id))
    }

    #[must_use]
    pub fn contains_workspace(&self, workspace_id: &str) -> bool {
        self.workspaces.contains_key(workspace_id)
    }

    /// Dataset ids for a workspace, in iteration order.
    pub fn datasets(&self, workspace_id: &str) -> impl Iterator<Item = &str> {
        self.workspaces
            .get(workspace_id)
            .into_iter()
            .flat_map(|datasets| datasets.iter().map(String::as_str))
    }

    /// Iterate workspaces in crawl order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.workspaces
            .iter()
            .map(|(workspace, datasets)| (workspace.as_str(), datasets))
    }

    #[must_use]
    pub fn workspace_count(&self) -> usize {
        self.workspaces.len()
    }

    /// Total number of (workspace, dataset) pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.workspaces.values().map(BTreeSet::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }

    /// Split the index into skipped and pending workspaces for `resume`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownCheckpoint`] if the checkpoint workspace is
    /// not in the index.
    pub fn plan(&self, resume: &ResumePoint) -> Result<CrawlPlan<'_>, CoreError> {
        let start = match resume {
            ResumePoint::Fresh => 0,
            ResumePoint::From(workspace_id) => self.position(workspace_id)?,
            ResumePoint::After(workspace_id) => self.position(workspace_id)? + 1,
        };

        let mut plan = CrawlPlan {
            skipped: Vec::with_capacity(start),
            pending: Vec::with_capacity(self.workspaces.len().saturating_sub(start)),
        };
        for (position, (workspace, datasets)) in self.iter().enumerate() {
            if position < start {
                plan.skipped.push(workspace);
            } else {
                plan.pending.push((workspace, datasets));
            }
        }
        Ok(plan)
    }

    fn position(&self, workspace_id: &str) -> Result<usize, CoreError> {
        self.workspaces
            .keys()
            .position(|key| key == workspace_id)
            .ok_or_else(|| CoreError::UnknownCheckpoint(workspace_id.to_string()))
    }
}
