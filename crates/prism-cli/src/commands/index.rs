use std::path::PathBuf;

use prism_config::PrismConfig;
use prism_jobs::persist::{IndexStats, derive_index, save_index};
use serde::Serialize;

use crate::cli::IndexArgs;
use crate::output::output;

#[derive(Debug, Serialize)]
struct IndexResponse {
    #[serde(flatten)]
    stats: IndexStats,
    filter: String,
    output: PathBuf,
}

/// `prism index`: derive the workspace → dataset index from a topology CSV.
pub fn handle(args: &IndexArgs, config: &PrismConfig) -> anyhow::Result<()> {
    let input = args
        .input
        .clone()
        .unwrap_or_else(|| config.output.topology_csv_path());
    let filter = args
        .filter
        .clone()
        .unwrap_or_else(|| config.crawler.connection_filter.clone());
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| config.output.index_json_path());

    let (index, stats) = derive_index(&input, &filter)?;
    if index.is_empty() {
        tracing::warn!(input = %input.display(), %filter, "no dataset rows matched the connection filter");
    }
    save_index(&out, &index)?;

    output(&IndexResponse {
        stats,
        filter,
        output: out,
    })
}
