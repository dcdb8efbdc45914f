//! Job error types.

use std::path::PathBuf;

use prism_api::ApiError;
use prism_core::CoreError;
use thiserror::Error;

/// Errors that end a job run.
///
/// Recovered failures (a workspace whose reports cannot be listed, a dataset
/// whose metadata query fails twice, grant/revoke failures) never surface
/// here; they go to the [`RunLog`](crate::RunLog).
#[derive(Debug, Error)]
pub enum JobError {
    /// An unguarded tenant API call failed.
    #[error("tenant API call failed during {operation}: {source}")]
    Api {
        operation: String,
        #[source]
        source: ApiError,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error on {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// `--resume` was requested but no checkpoint marker exists.
    #[error("no checkpoint marker at {}; run without --resume or pass --resume-from", .0.display())]
    MissingCheckpoint(PathBuf),
}

impl JobError {
    pub(crate) fn api(operation: impl Into<String>) -> impl FnOnce(ApiError) -> Self {
        let operation = operation.into();
        move |source| Self::Api { operation, source }
    }

    pub(crate) fn io(path: &std::path::Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
