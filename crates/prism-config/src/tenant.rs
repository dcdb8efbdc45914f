//! Tenant API and identity provider configuration.

use serde::{Deserialize, Serialize};

fn default_api_base_url() -> String {
    "https://api.powerbi.com/v1.0/myorg".to_string()
}

fn default_authority_url() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_scope() -> String {
    "https://analysis.windows.net/powerbi/api/.default".to_string()
}

/// Default HTTP timeout in seconds.
const fn default_timeout_secs() -> u64 {
    60
}

/// Default page size for the organization-scope workspace listing.
const fn default_page_size() -> u32 {
    5000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TenantConfig {
    /// Entra ID tenant (directory) id.
    #[serde(default)]
    pub tenant_id: String,

    /// Service principal application id.
    #[serde(default)]
    pub client_id: String,

    /// Service principal secret.
    #[serde(default)]
    pub client_secret: String,

    /// Pre-acquired bearer token. Takes precedence over client credentials.
    #[serde(default)]
    pub access_token: String,

    /// REST API root, e.g. `https://api.powerbi.com/v1.0/myorg`.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Token authority root.
    #[serde(default = "default_authority_url")]
    pub authority_url: String,

    /// OAuth2 scope requested for the bearer token.
    #[serde(default = "default_scope")]
    pub scope: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// `$top` used when paging through workspaces.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for TenantConfig {
    fn default() -> Self {
        Self {
            tenant_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            access_token: String::new(),
            api_base_url: default_api_base_url(),
            authority_url: default_authority_url(),
            scope: default_scope(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

impl TenantConfig {
    /// Whether a static bearer token is configured.
    pub fn has_static_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    /// Whether the client-credentials triple is complete.
    pub fn has_client_credentials(&self) -> bool {
        !self.tenant_id.is_empty() && !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Check if any credential source is available.
    pub fn is_configured(&self) -> bool {
        self.has_static_token() || self.has_client_credentials()
    }

    /// Token endpoint for the client-credentials flow.
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_url.trim_end_matches('/'),
            self.tenant_id
        )
    }
}
