//! Resume points and the persisted "last completed workspace" marker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a crawl starts in the index's iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResumePoint {
    /// Process every workspace.
    #[default]
    Fresh,
    /// Skip workspaces strictly before this one; process it and the rest.
    From(String),
    /// Skip this workspace and everything before it.
    After(String),
}

impl ResumePoint {
    #[must_use]
    pub const fn is_resume(&self) -> bool {
        !matches!(self, Self::Fresh)
    }
}

impl From<&CheckpointMarker> for ResumePoint {
    fn from(marker: &CheckpointMarker) -> Self {
        Self::After(marker.last_completed_workspace.clone())
    }
}

/// Written after each workspace's cleanup so an interrupted crawl can resume
/// without the operator picking the workspace by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointMarker {
    pub last_completed_workspace: String,
    pub completed_at: DateTime<Utc>,
}

impl CheckpointMarker {
    #[must_use]
    pub fn now(workspace_id: &str) -> Self {
        Self {
            last_completed_workspace: workspace_id.to_string(),
            completed_at: Utc::now(),
        }
    }
}
