use std::path::{Path, PathBuf};

use prism_config::{ConfigError, PrismConfig};
use prism_core::ResumePoint;
use prism_jobs::persist::{derive_index, load_checkpoint, load_index, save_index};
use prism_jobs::{CrawlSettings, CrawlSummary, Crawler, CsvPartitionSink, JobError};
use serde::Serialize;

use crate::bootstrap;
use crate::cli::{CrawlArgs, GlobalFlags};
use crate::output::output;
use crate::progress::{self, Progress};

#[derive(Debug, Serialize)]
struct CrawlResponse {
    #[serde(flatten)]
    summary: CrawlSummary,
    output: PathBuf,
    rows_written: usize,
    errors_logged: usize,
}

/// `prism crawl`: run the partition query over every indexed dataset.
pub async fn handle(
    args: &CrawlArgs,
    config: &PrismConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let config = effective_config(args, config)?;
    let settings = CrawlSettings {
        operator_upn: config.crawler.operator_upn.clone(),
        query: config.crawler.partition_query.clone(),
        include_nulls: config.crawler.include_nulls,
    };
    let index_path = args
        .index
        .clone()
        .unwrap_or_else(|| config.output.index_json_path());
    let partitions_path = args
        .out
        .clone()
        .unwrap_or_else(|| config.output.partitions_csv_path());
    let checkpoint_path = config.output.checkpoint_path();

    let resume = resume_point(args, &checkpoint_path)?;
    let index = if resume.is_resume() {
        load_index(&index_path)?
    } else {
        let topology_path = args
            .input
            .clone()
            .unwrap_or_else(|| config.output.topology_csv_path());
        let (index, _) = derive_index(&topology_path, &config.crawler.connection_filter)?;
        save_index(&index_path, &index)?;
        index
    };
    tracing::info!(
        workspaces = index.workspace_count(),
        datasets = index.pair_count(),
        resume = ?resume,
        "starting crawl"
    );

    let client = bootstrap::connect(&config).await?;
    let log = bootstrap::open_run_log(&config)?;
    let mut sink = if resume.is_resume() {
        CsvPartitionSink::append_to(&partitions_path)?
    } else {
        CsvPartitionSink::create(&partitions_path)?
    };
    let progress = Progress::bar(progress::enabled(flags), "crawl");

    let summary = Crawler::new(&client, &client, &settings, &log)
        .with_checkpoint(checkpoint_path)
        .run(&index, &resume, &mut sink, &progress)
        .await?;

    output(&CrawlResponse {
        summary,
        output: sink.path().to_path_buf(),
        rows_written: sink.written(),
        errors_logged: log.recorded(),
    })
}

/// Apply `--operator`, then require both the tenant and crawler sections
/// before any artifact is touched.
fn effective_config(args: &CrawlArgs, config: &PrismConfig) -> Result<PrismConfig, ConfigError> {
    let mut config = config.clone();
    if let Some(operator) = &args.operator {
        config.crawler.operator_upn.clone_from(operator);
    }
    config.require_tenant()?;
    config.require_crawler()?;
    Ok(config)
}

fn resume_point(args: &CrawlArgs, checkpoint_path: &Path) -> Result<ResumePoint, JobError> {
    if let Some(workspace_id) = &args.resume_from {
        return Ok(ResumePoint::From(workspace_id.clone()));
    }
    if args.resume {
        let marker = load_checkpoint(checkpoint_path)?
            .ok_or_else(|| JobError::MissingCheckpoint(checkpoint_path.to_path_buf()))?;
        tracing::info!(
            workspace = %marker.last_completed_workspace,
            completed_at = %marker.completed_at,
            "resuming after checkpoint"
        );
        return Ok(ResumePoint::from(&marker));
    }
    Ok(ResumePoint::Fresh)
}
