use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AuthError;

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

/// Read the `exp` claim of an Entra ID access token. The signature is not
/// checked; the result only drives the near-expiry warning.
///
/// # Errors
///
/// Returns `AuthError::Other` if the token is not a three-segment JWT, the
/// payload does not decode, or `exp` is missing or out of range.
pub fn decode_expiry(jwt: &str) -> Result<DateTime<Utc>, AuthError> {
    let mut segments = jwt.split('.');
    let (Some(_), Some(payload), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::Other("access token is not a JWT".into()));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::Other(format!("JWT payload is not base64url: {e}")))?;
    let claims: Claims = serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::Other(format!("JWT payload is not JSON: {e}")))?;
    let exp = claims
        .exp
        .ok_or_else(|| AuthError::Other("JWT has no exp claim".into()))?;
    DateTime::from_timestamp(exp, 0)
        .ok_or_else(|| AuthError::Other(format!("JWT exp {exp} is out of range")))
}
