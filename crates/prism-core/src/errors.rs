//! Cross-cutting error types for Prism.
//!
//! Domain-specific errors (`ApiError`, `JobError`, ...) live in their own
//! crates. `anyhow` only appears in `prism-cli` where everything converges.

use thiserror::Error;

/// Errors that can be raised by any Prism crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A resume checkpoint names a workspace that is not in the index.
    #[error("Checkpoint workspace '{0}' is not present in the workspace index")]
    UnknownCheckpoint(String),

    /// A crawl state transition was attempted that is not allowed.
    #[error("Invalid crawl transition for dataset {dataset_id}: {from} -> {to}")]
    InvalidTransition {
        dataset_id: String,
        from: String,
        to: String,
    },

    /// Data failed validation (row shape, identifiers).
    #[error("Validation error: {0}")]
    Validation(String),
}
