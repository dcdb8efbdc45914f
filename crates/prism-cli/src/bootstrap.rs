use std::time::Duration;

use anyhow::Context;
use prism_api::PowerBiClient;
use prism_config::PrismConfig;
use prism_jobs::RunLog;

use crate::cli::GlobalFlags;

/// Tokens are never refreshed; warn when one may not outlive a long crawl.
const EXPIRY_WARNING_SECS: i64 = 600;

pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<PrismConfig> {
    if let Some(path) = &flags.config
        && !path.exists()
    {
        anyhow::bail!("config file {} does not exist", path.display());
    }
    PrismConfig::load_with_dotenv(flags.config.as_deref()).context("failed to load configuration")
}

/// Resolve the run's bearer token and build the tenant client.
pub async fn connect(config: &PrismConfig) -> anyhow::Result<PowerBiClient> {
    let tenant = config.require_tenant()?;
    let token = prism_auth::resolve_token(tenant)
        .await
        .context("failed to acquire an access token")?;

    if token.is_near_expiry(EXPIRY_WARNING_SECS) {
        tracing::warn!(
            expires_at = ?token.expires_at,
            "access token expires within {} minutes and will not be refreshed",
            EXPIRY_WARNING_SECS / 60
        );
    }

    let client = PowerBiClient::new(
        &tenant.api_base_url,
        token,
        Duration::from_secs(tenant.timeout_secs),
    )?
    .with_page_size(tenant.page_size);
    Ok(client)
}

pub fn open_run_log(config: &PrismConfig) -> anyhow::Result<RunLog> {
    let log = RunLog::new(
        config.output.error_log_path(),
        config.output.error_detail_log_path(),
    )?;
    Ok(log)
}
