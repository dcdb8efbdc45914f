use std::path::PathBuf;

use prism_config::PrismConfig;
use prism_jobs::tables::write_audit_rows;
use prism_jobs::{TopologyAuditor, TopologySummary};
use serde::Serialize;

use crate::bootstrap;
use crate::cli::{GlobalFlags, TopologyArgs};
use crate::output::output;
use crate::progress::{self, Progress};

#[derive(Debug, Serialize)]
struct TopologyResponse {
    #[serde(flatten)]
    summary: TopologySummary,
    skipped_workspaces: Vec<String>,
    output: PathBuf,
    errors_logged: usize,
}

/// `prism topology`: audit the tenant and write the topology CSV.
pub async fn handle(
    args: &TopologyArgs,
    config: &PrismConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let client = bootstrap::connect(config).await?;
    let log = bootstrap::open_run_log(config)?;
    let progress = Progress::bar(progress::enabled(flags), "topology");

    let report = TopologyAuditor::new(&client, &log).run(&progress).await?;

    let path = args
        .out
        .clone()
        .unwrap_or_else(|| config.output.topology_csv_path());
    let written = write_audit_rows(&path, &report.rows)?;
    tracing::info!(path = %path.display(), rows = written, "wrote topology table");

    output(&TopologyResponse {
        summary: report.summary(),
        skipped_workspaces: report.skipped.iter().map(|w| w.id.clone()).collect(),
        output: path,
        errors_logged: log.recorded(),
    })
}
