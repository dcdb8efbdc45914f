//! Append-only run log.
//!
//! Every recovered failure is written twice: a one-line summary to the short
//! log and a full JSON record to the detailed log (one record per line via
//! `serde_jsonlines::append_json_lines`). The log is an explicit collaborator
//! handed to each job; there is no process-wide log state.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// Which job produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Topology,
    Crawl,
}

/// The operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogScope {
    ListReports,
    MetadataQuery,
    GrantAdmin,
    RetryQuery,
    RevokeAdmin,
    Checkpoint,
}

impl LogScope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListReports => "list_reports",
            Self::MetadataQuery => "metadata_query",
            Self::GrantAdmin => "grant_admin",
            Self::RetryQuery => "retry_query",
            Self::RevokeAdmin => "revoke_admin",
            Self::Checkpoint => "checkpoint",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Topology => "topology",
            Self::Crawl => "crawl",
        })
    }
}

impl fmt::Display for LogScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub timestamp: DateTime<Utc>,
    pub job: JobKind,
    pub scope: LogScope,
    pub workspace_id: Option<String>,
    pub workspace_name: Option<String>,
    pub dataset_id: Option<String>,
    pub message: String,
    /// Error display followed by every `source()` in the chain.
    pub error_chain: Vec<String>,
    /// `Debug` rendering of the error.
    pub detail: Option<String>,
}

impl RunLogEntry {
    #[must_use]
    pub fn new(job: JobKind, scope: LogScope, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            job,
            scope,
            workspace_id: None,
            workspace_name: None,
            dataset_id: None,
            message: message.into(),
            error_chain: Vec::new(),
            detail: None,
        }
    }

    #[must_use]
    pub fn workspace(mut self, id: &str, name: Option<&str>) -> Self {
        self.workspace_id = Some(id.to_string());
        self.workspace_name = name.map(str::to_string);
        self
    }

    #[must_use]
    pub fn dataset(mut self, id: &str) -> Self {
        self.dataset_id = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn error(mut self, error: &(dyn std::error::Error + 'static)) -> Self {
        let mut chain = vec![error.to_string()];
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        self.error_chain = chain;
        self.detail = Some(format!("{error:?}"));
        self
    }

    /// The short-log line: `{ts} [{job}] {scope} {context}: {message}`.
    #[must_use]
    pub fn summary_line(&self) -> String {
        let mut context = String::new();
        if let Some(id) = &self.workspace_id {
            context.push_str(" workspace=");
            context.push_str(id);
            if let Some(name) = &self.workspace_name {
                context.push_str(&format!(" ({name})"));
            }
        }
        if let Some(id) = &self.dataset_id {
            context.push_str(" dataset=");
            context.push_str(id);
        }
        let short_error = self
            .error_chain
            .first()
            .map(|e| format!(" - {e}"))
            .unwrap_or_default();
        format!(
            "{} [{}] {}{context}: {}{short_error}",
            self.timestamp.to_rfc3339(),
            self.job,
            self.scope,
            self.message,
        )
    }
}

/// Writes [`RunLogEntry`] records to the short and detailed log files.
pub struct RunLog {
    short_path: PathBuf,
    detail_path: PathBuf,
    enabled: bool,
    recorded: AtomicUsize,
}

impl RunLog {
    /// Create a log writing to the two given files. Parent directories are
    /// created; existing files are appended to.
    ///
    /// # Errors
    ///
    /// Returns `JobError::Io` if a parent directory cannot be created.
    pub fn new(short_path: PathBuf, detail_path: PathBuf) -> Result<Self, JobError> {
        for path in [&short_path, &detail_path] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(JobError::io(parent))?;
            }
        }
        Ok(Self {
            short_path,
            detail_path,
            enabled: true,
            recorded: AtomicUsize::new(0),
        })
    }

    /// A log that only emits tracing events.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            short_path: PathBuf::new(),
            detail_path: PathBuf::new(),
            enabled: false,
            recorded: AtomicUsize::new(0),
        }
    }

    /// Record an entry. Write failures are reported through `tracing` only.
    pub fn record(&self, entry: &RunLogEntry) {
        self.recorded.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(
            job = %entry.job,
            scope = %entry.scope,
            workspace_id = entry.workspace_id.as_deref().unwrap_or(""),
            dataset_id = entry.dataset_id.as_deref().unwrap_or(""),
            error = entry.error_chain.first().map_or("", String::as_str),
            "{}",
            entry.message
        );

        if !self.enabled {
            return;
        }
        if let Err(error) = self.append_short(entry) {
            tracing::error!(path = %self.short_path.display(), %error, "failed to write error log");
        }
        if let Err(error) = serde_jsonlines::append_json_lines(&self.detail_path, [entry]) {
            tracing::error!(path = %self.detail_path.display(), %error, "failed to write detail log");
        }
    }

    /// Number of entries recorded through this log.
    #[must_use]
    pub fn recorded(&self) -> usize {
        self.recorded.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn short_path(&self) -> &Path {
        &self.short_path
    }

    #[must_use]
    pub fn detail_path(&self) -> &Path {
        &self.detail_path
    }

    fn append_short(&self, entry: &RunLogEntry) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.short_path)?;
        writeln!(file, "{}", entry.summary_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_api::ApiError;

    fn temp_log(dir: &Path) -> RunLog {
        RunLog::new(dir.join("logs/errors.log"), dir.join("logs/errors.detail.jsonl")).unwrap()
    }

    #[test]
    fn record_appends_to_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let log = temp_log(dir.path());
        let error = ApiError::Api {
            status: 500,
            message: "backend down".into(),
        };

        log.record(
            &RunLogEntry::new(JobKind::Topology, LogScope::ListReports, "report listing failed")
                .workspace("W1", Some("Finance"))
                .error(&error),
        );
        log.record(
            &RunLogEntry::new(JobKind::Crawl, LogScope::RevokeAdmin, "revoke failed")
                .workspace("W2", None),
        );

        let short = std::fs::read_to_string(log.short_path()).unwrap();
        let lines: Vec<_> = short.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[topology] list_reports workspace=W1 (Finance)"));
        assert!(lines[0].contains("API error (500): backend down"));
        assert!(lines[1].contains("[crawl] revoke_admin workspace=W2: revoke failed"));

        let entries = serde_jsonlines::json_lines::<RunLogEntry, _>(log.detail_path())
            .unwrap()
            .collect::<std::io::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].workspace_name.as_deref(), Some("Finance"));
        assert!(entries[0].detail.as_deref().unwrap().contains("backend down"));
        assert_eq!(log.recorded(), 2);
    }

    #[test]
    fn disabled_log_counts_without_writing() {
        let log = RunLog::disabled();
        log.record(&RunLogEntry::new(
            JobKind::Crawl,
            LogScope::MetadataQuery,
            "query failed",
        ));
        assert_eq!(log.recorded(), 1);
    }

    #[test]
    fn error_chain_follows_sources() {
        #[derive(Debug, thiserror::Error)]
        #[error("outer")]
        struct Outer(#[source] ApiError);

        let entry = RunLogEntry::new(JobKind::Crawl, LogScope::GrantAdmin, "grant failed")
            .error(&Outer(ApiError::NotFound("group".into())));
        assert_eq!(entry.error_chain, vec!["outer", "not found: group"]);
    }
}
