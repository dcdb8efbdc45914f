use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no tenant credentials configured; set tenant.access_token or tenant_id/client_id/client_secret")]
    NotConfigured,

    #[error("token request failed: {0}")]
    TokenRequest(String),

    #[error("{0}")]
    Other(String),
}
