use prism_config::PrismConfig;

use crate::output::output;

/// `prism config`: effective configuration after all layers, secrets masked.
pub fn handle(config: &PrismConfig) -> anyhow::Result<()> {
    output(&config.redacted())
}
