use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod global;

pub use global::GlobalFlags;

/// Top-level CLI parser for the `prism` binary.
#[derive(Debug, Parser)]
#[command(
    name = "prism",
    version,
    about = "Prism - Power BI tenant topology audit and partition-metadata crawl"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Extra config file layered over the global and project configs
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            quiet: self.quiet,
            verbose: self.verbose,
            config: self.config.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Audit every workspace's reports, datasets, dataflows and data sources
    Topology(TopologyArgs),
    /// Derive the workspace → dataset index from a topology CSV
    Index(IndexArgs),
    /// Extract partition metadata for every dataset in the index
    Crawl(CrawlArgs),
    /// Print the effective configuration with secrets redacted
    Config,
}

#[derive(Debug, Args)]
pub struct TopologyArgs {
    /// Output CSV (defaults to `output.dir/output.topology_csv`)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Topology CSV to read
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Substring matched against each row's connection details
    #[arg(long)]
    pub filter: Option<String>,

    /// Where to write the index JSON
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CrawlArgs {
    /// Resume at this workspace id (inclusive) using the persisted index
    #[arg(long, value_name = "WORKSPACE_ID", conflicts_with = "resume")]
    pub resume_from: Option<String>,

    /// Resume after the workspace recorded in the checkpoint marker
    #[arg(long)]
    pub resume: bool,

    /// Topology CSV the index is derived from on a fresh crawl
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Index JSON (written on a fresh crawl, read when resuming)
    #[arg(long)]
    pub index: Option<PathBuf>,

    /// Partition CSV
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Operator UPN granted admin on failure and impersonated by queries
    #[arg(long, value_name = "UPN")]
    pub operator: Option<String>,
}
