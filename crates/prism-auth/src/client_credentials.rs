//! OAuth2 client-credentials exchange against the tenant's identity provider.

use chrono::Utc;
use prism_config::TenantConfig;
use serde::Deserialize;

use crate::error::AuthError;
use crate::token::AccessToken;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// Form-encoded request body for the token endpoint.
fn form_body(tenant: &TenantConfig) -> String {
    [
        ("grant_type", "client_credentials"),
        ("client_id", tenant.client_id.as_str()),
        ("client_secret", tenant.client_secret.as_str()),
        ("scope", tenant.scope.as_str()),
    ]
    .iter()
    .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
    .collect::<Vec<_>>()
    .join("&")
}

fn into_token(response: TokenResponse) -> AccessToken {
    let expires_at = response
        .expires_in
        .map(|secs| Utc::now() + chrono::TimeDelta::seconds(secs));
    let mut token = AccessToken::from_jwt(response.access_token);
    if token.expires_at.is_none() {
        token.expires_at = expires_at;
    }
    token
}

/// Mint a token for the configured service principal.
///
/// The client secret is only used for this request and never stored.
///
/// # Errors
///
/// Returns `AuthError::TokenRequest` if the request fails, the endpoint
/// returns a non-success status, or the response lacks `access_token`.
pub async fn acquire(
    client: &reqwest::Client,
    tenant: &TenantConfig,
) -> Result<AccessToken, AuthError> {
    let url = tenant.token_url();
    tracing::debug!(%url, client_id = %tenant.client_id, "requesting client-credentials token");

    let response = client
        .post(&url)
        .header(
            reqwest::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(form_body(tenant))
        .send()
        .await
        .map_err(|e| AuthError::TokenRequest(format!("send: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::TokenRequest(format!("{status}: {body}")));
    }

    let parsed = response
        .json::<TokenResponse>()
        .await
        .map_err(|e| AuthError::TokenRequest(format!("parse token response: {e}")))?;
    Ok(into_token(parsed))
}
