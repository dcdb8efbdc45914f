//! # prism-auth
//!
//! Identity provider for Prism.
//!
//! Yields one bearer token per run, either a pre-acquired static token from
//! configuration or one minted with the OAuth2 client-credentials flow. The
//! token is never refreshed; [`AccessToken::is_near_expiry`] lets the caller
//! warn when a long crawl is likely to outlive it.

pub mod client_credentials;
pub mod error;
pub mod expiry;
pub mod token;

pub use error::AuthError;
pub use token::AccessToken;

use prism_config::TenantConfig;

/// Resolve the bearer token for this run.
///
/// Priority: static `access_token` → client credentials.
///
/// # Errors
///
/// Returns `AuthError::NotConfigured` if neither source is configured, or
/// `AuthError::TokenRequest` if the client-credentials exchange fails.
pub async fn resolve_token(tenant: &TenantConfig) -> Result<AccessToken, AuthError> {
    if tenant.has_static_token() {
        tracing::debug!("using static access token from configuration");
        return Ok(AccessToken::from_jwt(tenant.access_token.clone()));
    }

    if tenant.has_client_credentials() {
        let client = reqwest::Client::builder()
            .user_agent("prism/0.1")
            .timeout(std::time::Duration::from_secs(tenant.timeout_secs))
            .build()
            .map_err(|e| AuthError::TokenRequest(format!("build http client: {e}")))?;
        return client_credentials::acquire(&client, tenant).await;
    }

    Err(AuthError::NotConfigured)
}
