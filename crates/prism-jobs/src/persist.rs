//! On-disk state between runs: the workspace → dataset index and the
//! checkpoint marker.

use std::path::Path;

use prism_core::{CheckpointMarker, WorkspaceDatasetIndex};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::JobError;
use crate::tables::read_audit_rows;

/// Counts from deriving an index out of a topology table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub rows_read: usize,
    pub rows_matched: usize,
    pub workspaces: usize,
    pub pairs: usize,
}

/// Build the index from a topology CSV, keeping dataset rows whose
/// connection details contain `filter`.
///
/// # Errors
///
/// Returns `JobError` if the CSV cannot be read.
pub fn derive_index(
    topology_csv: &Path,
    filter: &str,
) -> Result<(WorkspaceDatasetIndex, IndexStats), JobError> {
    let rows = read_audit_rows(topology_csv)?;
    let index = WorkspaceDatasetIndex::from_audit_rows(&rows, filter);
    let stats = IndexStats {
        rows_read: rows.len(),
        rows_matched: rows.iter().filter(|r| r.dataset_matches(filter)).count(),
        workspaces: index.workspace_count(),
        pairs: index.pair_count(),
    };
    tracing::info!(
        rows_read = stats.rows_read,
        rows_matched = stats.rows_matched,
        pairs = stats.pairs,
        filter,
        "derived workspace dataset index"
    );
    Ok((index, stats))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), JobError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(JobError::io(parent))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|source| JobError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    // Rename into place; readers never observe a partial file.
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, json).map_err(JobError::io(&tmp))?;
    std::fs::rename(&tmp, path).map_err(JobError::io(path))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, JobError> {
    let text = std::fs::read_to_string(path).map_err(JobError::io(path))?;
    serde_json::from_str(&text).map_err(|source| JobError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// # Errors
///
/// Returns `JobError` if the file cannot be written.
pub fn save_index(path: &Path, index: &WorkspaceDatasetIndex) -> Result<(), JobError> {
    write_json(path, index)
}

/// # Errors
///
/// Returns `JobError` if the file is missing or malformed.
pub fn load_index(path: &Path) -> Result<WorkspaceDatasetIndex, JobError> {
    read_json(path)
}

/// # Errors
///
/// Returns `JobError` if the file cannot be written.
pub fn save_checkpoint(path: &Path, marker: &CheckpointMarker) -> Result<(), JobError> {
    write_json(path, marker)
}

/// Load the checkpoint marker, `None` if no marker has been written.
///
/// # Errors
///
/// Returns `JobError` if the marker exists but cannot be read.
pub fn load_checkpoint(path: &Path) -> Result<Option<CheckpointMarker>, JobError> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

/// Remove a stale marker before a fresh crawl.
///
/// # Errors
///
/// Returns `JobError` if the marker exists but cannot be removed.
pub fn clear_checkpoint(path: &Path) -> Result<(), JobError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(JobError::io(path)(e)),
    }
}
