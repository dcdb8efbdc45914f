use prism_config::PrismConfig;

use crate::cli::{Commands, GlobalFlags};

pub mod config;
pub mod crawl;
pub mod index;
pub mod topology;

pub async fn dispatch(
    command: Commands,
    config: &PrismConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Topology(args) => topology::handle(&args, config, flags).await,
        Commands::Index(args) => index::handle(&args, config),
        Commands::Crawl(args) => crawl::handle(&args, config, flags).await,
        Commands::Config => config::handle(config),
    }
}
