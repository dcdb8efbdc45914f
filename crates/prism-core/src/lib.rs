//! # prism-core
//!
//! Core types and error types for Prism.
//!
//! This crate provides the foundational types shared across all Prism crates:
//! - Tenant entities as returned by the listing API (workspaces, reports,
//!   datasets, dataflows, data sources)
//! - Output row shapes for the topology audit and the partition crawl
//! - The deduplicated workspace → dataset index and resume planning over it
//! - The per-dataset crawl state machine
//! - Cross-cutting error types

pub mod checkpoint;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod index;

pub use checkpoint::{CheckpointMarker, ResumePoint};
pub use entities::{AuditRow, DataSource, Dataflow, Dataset, PartitionRow, Report, Workspace};
pub use enums::CrawlState;
pub use errors::CoreError;
pub use index::{CrawlPlan, WorkspaceDatasetIndex};
