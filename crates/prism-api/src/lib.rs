//! # prism-api
//!
//! Power BI tenant REST client for Prism.
//!
//! The jobs consume the tenant through three collaborator traits:
//! - [`TenantListing`]: organization-scope listing of workspaces, reports,
//!   datasets, dataflows and their data sources
//! - [`MetadataQuery`]: DAX queries against a dataset under impersonation
//! - [`AccessAdmin`]: granting and revoking workspace admin access
//!
//! [`PowerBiClient`] implements all three over `reqwest`.

pub mod admin;
pub mod datasources;
pub mod listing;
pub mod query;

mod error;
mod http;

pub use error::ApiError;
pub use query::{QueryRequest, QueryResult, QueryTable};

use async_trait::async_trait;
use prism_auth::AccessToken;
use prism_core::{DataSource, Dataflow, Dataset, Report, Workspace};

// ── Collaborator traits ────────────────────────────────────────────

/// Read-only listing operations.
#[async_trait]
pub trait TenantListing: Send + Sync {
    /// Every workspace visible at organization scope.
    async fn list_workspaces(&self) -> Result<Vec<Workspace>, ApiError>;
    async fn list_reports(&self, workspace: &Workspace) -> Result<Vec<Report>, ApiError>;
    async fn list_datasets(&self, workspace: &Workspace) -> Result<Vec<Dataset>, ApiError>;
    async fn list_dataflows(&self, workspace: &Workspace) -> Result<Vec<Dataflow>, ApiError>;
    async fn dataset_sources(&self, dataset: &Dataset) -> Result<Vec<DataSource>, ApiError>;
    async fn dataflow_sources(&self, dataflow: &Dataflow) -> Result<Vec<DataSource>, ApiError>;
}

/// Metadata queries executed against a dataset.
#[async_trait]
pub trait MetadataQuery: Send + Sync {
    async fn execute_query(&self, request: &QueryRequest<'_>) -> Result<QueryResult, ApiError>;
}

/// Workspace access administration. Grant and revoke are independent calls;
/// revoking a user who is not an admin is expected to fail.
#[async_trait]
pub trait AccessAdmin: Send + Sync {
    async fn grant_admin(&self, workspace_id: &str, user: &str) -> Result<(), ApiError>;
    async fn revoke_admin(&self, workspace_id: &str, user: &str) -> Result<(), ApiError>;
}

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client for the tenant API, authenticated with one bearer token for
/// its whole lifetime.
pub struct PowerBiClient {
    http: reqwest::Client,
    base_url: String,
    token: AccessToken,
    page_size: u32,
}

impl PowerBiClient {
    /// Create a client rooted at `base_url` (e.g. `https://api.powerbi.com/v1.0/myorg`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` fails to build.
    pub fn new(
        base_url: &str,
        token: AccessToken,
        timeout: std::time::Duration,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            http: reqwest::Client::builder()
                .user_agent("prism/0.1")
                .timeout(timeout)
                .build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            page_size: 5000,
        })
    }

    /// Page size used for the workspace listing.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .get(self.url(path))
            .header(reqwest::header::AUTHORIZATION, self.token.bearer())
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(self.url(path))
            .header(reqwest::header::AUTHORIZATION, self.token.bearer())
    }

    fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .delete(self.url(path))
            .header(reqwest::header::AUTHORIZATION, self.token.bearer())
    }
}

/// Escape one path segment.
pub(crate) fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}
