//! State enums for Prism.
//!
//! All enums use `snake_case` serialization. State machines provide
//! `allowed_next_states()` so callers can reject invalid transitions.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// CrawlState
// ---------------------------------------------------------------------------

/// State of one (workspace, dataset) pair during the partition crawl.
///
/// ```text
/// querying → emitting
///          → elevating → retrying → emitting
///          → retrying               → failed
/// ```
///
/// `querying → retrying` is taken when the workspace was already elevated
/// for an earlier dataset in the same run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlState {
    Querying,
    Elevating,
    Retrying,
    Emitting,
    Failed,
}

impl CrawlState {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Querying => &[Self::Emitting, Self::Elevating, Self::Retrying],
            Self::Elevating => &[Self::Retrying],
            Self::Retrying => &[Self::Emitting, Self::Failed],
            Self::Emitting | Self::Failed => &[],
        }
    }

    /// Check whether transitioning to `next` is valid.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Whether processing of the dataset has ended in this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Emitting | Self::Failed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Querying => "querying",
            Self::Elevating => "elevating",
            Self::Retrying => "retrying",
            Self::Emitting => "emitting",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
