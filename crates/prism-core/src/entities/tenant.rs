use serde::{Deserialize, Serialize};

/// A tenant-level container grouping reports, datasets and dataflows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Workspace {
    pub id: String,
    pub name: String,
}

/// A report inside a workspace. `dataset_id` is absent for reports that are
/// not bound to a dataset (e.g. paginated reports on external sources).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub id: String,
    pub name: String,
    pub dataset_id: Option<String>,
    pub workspace_id: String,
}

/// A modeled collection of tables backing zero or more reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dataset {
    pub id: String,
    pub name: String,
    pub workspace_id: String,
}

impl Dataset {
    /// Resolve a report's dataset by linear lookup in a workspace's dataset list.
    #[must_use]
    pub fn find_for_report<'a>(datasets: &'a [Self], report: &Report) -> Option<&'a Self> {
        let dataset_id = report.dataset_id.as_deref()?;
        datasets.iter().find(|d| d.id == dataset_id)
    }
}

/// A reusable data-preparation artifact, independent of any report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dataflow {
    pub id: String,
    pub name: String,
    pub workspace_id: String,
}
