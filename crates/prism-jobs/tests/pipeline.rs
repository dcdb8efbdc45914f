//! Topology table → index → crawl, through the files on disk.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use prism_api::{AccessAdmin, ApiError, MetadataQuery, QueryRequest, QueryResult, QueryTable};
use prism_core::{AuditRow, CheckpointMarker, DataSource, Dataset, Report, ResumePoint, Workspace};
use prism_jobs::persist::{derive_index, load_checkpoint, load_index, save_index};
use prism_jobs::tables::{read_audit_rows, write_audit_rows};
use prism_jobs::{CrawlSettings, Crawler, CsvPartitionSink, RunLog};
use serde_json::{Map, Value};
use tempfile::TempDir;

/// Answers every query with one partition named after the dataset; datasets
/// in `locked` fail until their workspace has been granted.
#[derive(Default)]
struct Tenant {
    locked: HashSet<String>,
    granted: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl MetadataQuery for Tenant {
    async fn execute_query(&self, request: &QueryRequest<'_>) -> Result<QueryResult, ApiError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("query:{}/{}", request.workspace_id, request.dataset_id));
        if self.locked.contains(request.dataset_id)
            && !self.granted.lock().unwrap().contains(request.workspace_id)
        {
            return Err(ApiError::Unauthorized {
                status: 401,
                message: "not a member".into(),
            });
        }
        let mut row = Map::new();
        row.insert("[PartitionName]".into(), Value::from(request.dataset_id));
        row.insert("[QueryDefinition]".into(), Value::from("let Source = Sql.Database(...)"));
        Ok(QueryResult {
            tables: vec![QueryTable { rows: vec![row] }],
        })
    }
}

#[async_trait]
impl AccessAdmin for Tenant {
    async fn grant_admin(&self, workspace_id: &str, _user: &str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(format!("grant:{workspace_id}"));
        self.granted.lock().unwrap().insert(workspace_id.into());
        Ok(())
    }

    async fn revoke_admin(&self, workspace_id: &str, _user: &str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(format!("revoke:{workspace_id}"));
        self.granted.lock().unwrap().remove(workspace_id);
        Ok(())
    }
}

fn row(workspace_id: &str, dataset_id: &str, server: &str) -> AuditRow {
    let workspace = Workspace {
        id: workspace_id.into(),
        name: format!("Workspace {workspace_id}"),
    };
    let report = Report {
        id: format!("R-{dataset_id}"),
        name: "Report".into(),
        dataset_id: Some(dataset_id.into()),
        workspace_id: workspace_id.into(),
    };
    let dataset = Dataset {
        id: dataset_id.into(),
        name: "Model".into(),
        workspace_id: workspace_id.into(),
    };
    let source = DataSource {
        name: server.into(),
        kind: "Sql".into(),
        connection_details: Some(format!(r#"{{"server":"{server}","database":"dw"}}"#)),
    };
    AuditRow::for_report(&workspace, &report, &dataset, &source)
}

fn settings() -> CrawlSettings {
    CrawlSettings {
        operator_upn: "auditor@contoso.com".into(),
        query: "EVALUATE INFO.PARTITIONS()".into(),
        include_nulls: true,
    }
}

fn write_topology(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("topology.csv");
    let rows = vec![
        row("W1", "D1", "yourdatawarehouse.database.windows.net"),
        row("W1", "D1", "yourdatawarehouse.database.windows.net"),
        row("W1", "D9", "someothersql.database.windows.net"),
        row("W2", "D2", "yourdatawarehouse.database.windows.net"),
        row("W3", "D3", "yourdatawarehouse.database.windows.net"),
    ];
    write_audit_rows(&path, &rows).unwrap();
    path
}

fn read_partitions(path: &std::path::Path) -> Vec<(String, String)> {
    csv::Reader::from_path(path)
        .unwrap()
        .records()
        .map(|r| {
            let r = r.unwrap();
            (r[0].to_string(), r[1].to_string())
        })
        .collect()
}

#[test]
fn topology_table_survives_a_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let path = write_topology(&dir);

    let rows = read_audit_rows(&path).unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[2].dataset_id.as_deref(), Some("D9"));
    assert!(rows.iter().all(AuditRow::is_consistent));
}

#[test]
fn index_keeps_only_matching_unique_pairs() {
    let dir = TempDir::new().unwrap();
    let (index, stats) = derive_index(&write_topology(&dir), "yourdatawarehouse").unwrap();

    assert_eq!(stats.rows_read, 5);
    assert_eq!(stats.rows_matched, 4);
    assert_eq!(stats.pairs, 3);
    assert!(index.contains("W1", "D1"));
    assert!(!index.contains("W1", "D9"));

    let saved = dir.path().join("workspace_datasets.json");
    save_index(&saved, &index).unwrap();
    assert_eq!(load_index(&saved).unwrap(), index);
}

#[tokio::test]
async fn interrupted_crawl_resumes_from_checkpoint() {
    let dir = TempDir::new().unwrap();
    let (index, _) = derive_index(&write_topology(&dir), "yourdatawarehouse").unwrap();
    let partitions = dir.path().join("partitions.csv");
    let marker = dir.path().join("checkpoint.json");
    let settings = settings();
    let log = RunLog::new(dir.path().join("errors.log"), dir.path().join("errors.detail.jsonl"))
        .unwrap();

    // First run stops after W1, as if the process were killed there.
    let tenant = Tenant {
        locked: HashSet::from(["D1".to_string()]),
        ..Tenant::default()
    };
    let mut only_w1 = prism_core::WorkspaceDatasetIndex::new();
    only_w1.insert("W1", "D1");
    let mut sink = CsvPartitionSink::create(&partitions).unwrap();
    let summary = Crawler::new(&tenant, &tenant, &settings, &log)
        .with_checkpoint(marker.clone())
        .run(&only_w1, &ResumePoint::Fresh, &mut sink, &())
        .await
        .unwrap();
    drop(sink);
    assert_eq!(summary.datasets_after_elevation, 1);
    assert_eq!(
        *tenant.calls.lock().unwrap(),
        vec!["query:W1/D1", "grant:W1", "query:W1/D1", "revoke:W1"]
    );
    assert!(tenant.granted.lock().unwrap().is_empty());

    let checkpoint: CheckpointMarker = load_checkpoint(&marker).unwrap().unwrap();
    assert_eq!(checkpoint.last_completed_workspace, "W1");

    // Second run picks up after the marker and appends.
    let tenant = Tenant::default();
    let mut sink = CsvPartitionSink::append_to(&partitions).unwrap();
    let summary = Crawler::new(&tenant, &tenant, &settings, &log)
        .with_checkpoint(marker.clone())
        .run(&index, &ResumePoint::from(&checkpoint), &mut sink, &())
        .await
        .unwrap();
    drop(sink);

    assert_eq!(summary.workspaces_skipped, 1);
    assert_eq!(*tenant.calls.lock().unwrap(), vec!["query:W2/D2", "query:W3/D3"]);
    assert_eq!(
        read_partitions(&partitions),
        vec![
            ("W1".to_string(), "D1".to_string()),
            ("W2".to_string(), "D2".to_string()),
            ("W3".to_string(), "D3".to_string()),
        ]
    );
    assert_eq!(log.recorded(), 1);
}
