//! Tenant API error types.

use thiserror::Error;

/// Errors that can occur when calling the tenant API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 401 or 403 from the API.
    #[error("unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// 404 from the API.
    #[error("not found: {0}")]
    NotFound(String),

    /// API returned another non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The API returned 429 Too Many Requests.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// A metadata query returned an error payload with a success status.
    #[error("query error: {0}")]
    Query(String),

    /// Failed to parse an API response.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether the failure is an authorization refusal.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}
