//! Entity structs for tenant objects and the rows the jobs emit.

mod audit_row;
mod data_source;
mod partition;
mod tenant;

pub use audit_row::AuditRow;
pub use data_source::DataSource;
pub use partition::PartitionRow;
pub use tenant::{Dataflow, Dataset, Report, Workspace};
