//! # prism-jobs
//!
//! The two Prism jobs and the files they read and write.
//!
//! - [`TopologyAuditor`] walks the tenant and flattens it into audit rows
//! - [`Crawler`] runs the partition query over the deduplicated
//!   workspace → dataset index, elevating access when a query fails
//! - [`RunLog`] records every recovered failure to the short and detailed
//!   error logs
//! - [`tables`] and [`persist`] own the CSV and JSON artifacts

pub mod crawler;
pub mod error;
pub mod persist;
pub mod progress;
pub mod run_log;
pub mod tables;
pub mod topology;

mod test_support;

pub use crawler::{CrawlSettings, CrawlSummary, Crawler};
pub use error::JobError;
pub use progress::JobProgress;
pub use run_log::{JobKind, LogScope, RunLog, RunLogEntry};
pub use tables::{CsvPartitionSink, PartitionSink};
pub use topology::{TopologyAuditor, TopologyReport, TopologySummary};
