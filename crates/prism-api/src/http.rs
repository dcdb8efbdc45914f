//! Shared HTTP response helpers.
//!
//! Centralizes status-code mapping so the endpoint modules stay focused on
//! request construction and response mapping. Nothing here retries.

use crate::error::ApiError;

/// Check an HTTP response for error statuses.
///
/// Returns the response unchanged on success. Maps:
/// - **401/403** → [`ApiError::Unauthorized`]
/// - **404** → [`ApiError::NotFound`]
/// - **429** → [`ApiError::RateLimited`] with `Retry-After` parsing (60 s
///   when absent or unparseable)
/// - any other non-success status → [`ApiError::Api`]
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == 429 {
        return Err(ApiError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }

    let code = status.as_u16();
    let message = resp.text().await.unwrap_or_default();
    Err(match code {
        401 | 403 => ApiError::Unauthorized {
            status: code,
            message,
        },
        404 => ApiError::NotFound(message),
        _ => ApiError::Api {
            status: code,
            message,
        },
    })
}

/// Parse the `Retry-After` header as seconds, falling back to 60 s.
fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    fn mock_response_with_retry_after(value: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(429)
                .header("Retry-After", value)
                .body(String::new())
                .unwrap(),
        )
    }

    #[test]
    fn parse_retry_after_from_header() {
        assert_eq!(parse_retry_after(&mock_response_with_retry_after("120")), 120);
    }

    #[test]
    fn parse_retry_after_non_numeric() {
        assert_eq!(
            parse_retry_after(&mock_response_with_retry_after("soon")),
            60
        );
    }

    #[tokio::test]
    async fn rate_limited_default() {
        let err = check_response(mock_response(429, "")).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::RateLimited {
                retry_after_secs: 60
            }
        ));
    }

    #[tokio::test]
    async fn forbidden_is_unauthorized() {
        let err = check_response(mock_response(403, "PowerBINotAuthorizedException"))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert!(err.to_string().contains("PowerBINotAuthorizedException"));
    }

    #[tokio::test]
    async fn unauthorized_401() {
        let err = check_response(mock_response(401, "")).await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized { status: 401, .. }));
    }

    #[tokio::test]
    async fn not_found() {
        let err = check_response(mock_response(404, "no such group"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "no such group"));
    }

    #[tokio::test]
    async fn server_error() {
        let err = check_response(mock_response(500, "")).await.unwrap_err();
        assert!(matches!(err, ApiError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn success_passes_through() {
        assert!(check_response(mock_response(200, "{}")).await.is_ok());
    }
}
