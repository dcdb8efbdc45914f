//! CSV artifacts: the topology table and the append-only partition table.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use prism_core::{AuditRow, PartitionRow};

use crate::error::JobError;

/// Topology CSV header, in column order.
pub const AUDIT_COLUMNS: [&str; 9] = [
    "WorkspaceName",
    "WorkspaceId",
    "ReportName",
    "DatasetId",
    "DatasetName",
    "DataflowName",
    "DataSource",
    "DataSourceType",
    "ConnectionDetails",
];

/// Partition CSV header, in column order.
pub const PARTITION_COLUMNS: [&str; 4] =
    ["WorkspaceId", "DatasetId", "PartitionName", "QueryDefinition"];

fn create_parent(path: &Path) -> Result<(), JobError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(JobError::io(parent))?;
    }
    Ok(())
}

/// Write the whole topology table. The header is always written, so an
/// empty tenant still yields a well-formed file.
///
/// # Errors
///
/// Returns `JobError` if the file cannot be created or a row fails to encode.
pub fn write_audit_rows(path: &Path, rows: &[AuditRow]) -> Result<usize, JobError> {
    create_parent(path)?;
    let file = File::create(path).map_err(JobError::io(path))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(AUDIT_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(JobError::io(path))?;
    Ok(rows.len())
}

/// Read a topology table written by [`write_audit_rows`]. Columns are matched
/// by header name; blank cells read as absent.
///
/// # Errors
///
/// Returns `JobError` if the file cannot be opened or a row does not parse.
pub fn read_audit_rows(path: &Path) -> Result<Vec<AuditRow>, JobError> {
    let file = File::open(path).map_err(JobError::io(path))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

/// Destination for crawled partition rows.
pub trait PartitionSink {
    /// Persist one row before returning.
    ///
    /// # Errors
    ///
    /// Returns `JobError` if the row cannot be written.
    fn append(&mut self, row: &PartitionRow) -> Result<(), JobError>;
}

impl PartitionSink for Vec<PartitionRow> {
    fn append(&mut self, row: &PartitionRow) -> Result<(), JobError> {
        self.push(row.clone());
        Ok(())
    }
}

/// Partition CSV written one flushed row at a time.
pub struct CsvPartitionSink {
    path: PathBuf,
    writer: csv::Writer<File>,
    written: usize,
}

impl CsvPartitionSink {
    /// Start a fresh table, truncating any previous run's output.
    ///
    /// # Errors
    ///
    /// Returns `JobError` if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, JobError> {
        create_parent(path)?;
        let file = File::create(path).map_err(JobError::io(path))?;
        Self::with_header(path, file)
    }

    /// Continue an existing table. The header is written only if the file
    /// is new or empty.
    ///
    /// # Errors
    ///
    /// Returns `JobError` if the file cannot be opened.
    pub fn append_to(path: &Path) -> Result<Self, JobError> {
        create_parent(path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(JobError::io(path))?;
        let is_empty = file.metadata().map_err(JobError::io(path))?.len() == 0;
        if is_empty {
            Self::with_header(path, file)
        } else {
            Ok(Self {
                path: path.to_path_buf(),
                writer: Self::builder().from_writer(file),
                written: 0,
            })
        }
    }

    fn builder() -> csv::WriterBuilder {
        let mut builder = csv::WriterBuilder::new();
        builder.has_headers(false);
        builder
    }

    fn with_header(path: &Path, file: File) -> Result<Self, JobError> {
        let mut writer = Self::builder().from_writer(file);
        writer.write_record(PARTITION_COLUMNS)?;
        writer.flush().map_err(JobError::io(path))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer,
            written: 0,
        })
    }

    /// Rows written through this sink (not counting earlier runs).
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PartitionSink for CsvPartitionSink {
    fn append(&mut self, row: &PartitionRow) -> Result<(), JobError> {
        self.writer.serialize(row)?;
        self.writer.flush().map_err(JobError::io(&self.path))?;
        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use prism_core::{DataSource, Dataflow, Dataset, Report, Workspace};

    fn partition(name: &str) -> PartitionRow {
        PartitionRow {
            workspace_id: "W1".into(),
            dataset_id: "D1".into(),
            partition_name: name.into(),
            query_definition: "let\n    Source = Sql.Database(\"dw\", \"fin\")\nin\n    Source".into(),
        }
    }

    fn read_partitions(path: &Path) -> Vec<PartitionRow> {
        csv::Reader::from_path(path)
            .unwrap()
            .deserialize()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn audit_rows_survive_csv_with_blank_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/topology.csv");
        let workspace = Workspace {
            id: "W1".into(),
            name: "Finance, EMEA".into(),
        };
        let report = Report {
            id: "R1".into(),
            name: "Ledger".into(),
            dataset_id: Some("D1".into()),
            workspace_id: "W1".into(),
        };
        let dataset = Dataset {
            id: "D1".into(),
            name: "Ledger Model".into(),
            workspace_id: "W1".into(),
        };
        let flow = Dataflow {
            id: "F1".into(),
            name: "Staging".into(),
            workspace_id: "W1".into(),
        };
        let source = DataSource {
            name: "dw/fin".into(),
            kind: "Sql".into(),
            connection_details: Some(r#"{"server":"dw","database":"fin"}"#.into()),
        };
        let rows = vec![
            AuditRow::for_report(&workspace, &report, &dataset, &source),
            AuditRow::for_dataflow(&workspace, &flow, &DataSource::none()),
        ];

        assert_eq!(write_audit_rows(&path, &rows).unwrap(), 2);
        let back = read_audit_rows(&path).unwrap();
        assert_eq!(back, rows);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(
            "WorkspaceName,WorkspaceId,ReportName,DatasetId,DatasetName,DataflowName,DataSource,DataSourceType,ConnectionDetails\n"
        ));
    }

    #[test]
    fn empty_topology_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topology.csv");
        write_audit_rows(&path, &[]).unwrap();
        assert!(read_audit_rows(&path).unwrap().is_empty());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap().lines().count(),
            1
        );
    }

    #[test]
    fn create_truncates_and_append_continues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partitions.csv");

        let mut sink = CsvPartitionSink::create(&path).unwrap();
        sink.append(&partition("p1")).unwrap();
        assert_eq!(sink.written(), 1);
        drop(sink);

        let mut sink = CsvPartitionSink::append_to(&path).unwrap();
        sink.append(&partition("p2")).unwrap();
        drop(sink);

        let names: Vec<_> = read_partitions(&path)
            .into_iter()
            .map(|r| r.partition_name)
            .collect();
        assert_eq!(names, vec!["p1", "p2"]);

        let mut sink = CsvPartitionSink::create(&path).unwrap();
        sink.append(&partition("p3")).unwrap();
        drop(sink);
        assert_eq!(read_partitions(&path).len(), 1);
    }

    #[test]
    fn append_to_new_file_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/partitions.csv");
        let mut sink = CsvPartitionSink::append_to(&path).unwrap();
        sink.append(&partition("p1")).unwrap();
        drop(sink);

        let rows = read_partitions(&path);
        assert_eq!(rows, vec![partition("p1")]);
    }

    #[test]
    fn rows_are_on_disk_before_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partitions.csv");
        let mut sink = CsvPartitionSink::create(&path).unwrap();
        sink.append(&partition("p1")).unwrap();

        assert_eq!(read_partitions(&path).len(), 1);
        drop(sink);
    }
}
