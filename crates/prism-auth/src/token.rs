use std::fmt;

use chrono::{DateTime, Utc};

/// A bearer token for the tenant API, held for the whole run.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    /// Expiry if it could be determined (from `expires_in` or the JWT `exp`).
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    #[must_use]
    pub const fn new(secret: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { secret, expires_at }
    }

    /// Wrap a raw JWT, reading its expiry best-effort.
    #[must_use]
    pub fn from_jwt(jwt: String) -> Self {
        let expires_at = crate::expiry::decode_expiry(&jwt).ok();
        Self {
            secret: jwt,
            expires_at,
        }
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// `Authorization` header value.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.secret)
    }

    /// Check if the token is expired or expires within `buffer_secs`.
    /// Unknown expiry is treated as not near.
    #[must_use]
    pub fn is_near_expiry(&self, buffer_secs: i64) -> bool {
        self.expires_at.is_some_and(|expires_at| {
            expires_at <= Utc::now() + chrono::TimeDelta::seconds(buffer_secs)
        })
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
