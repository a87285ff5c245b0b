//! Explicit API session state.
//!
//! A [`SessionContext`] is built once at startup (login) and handed to the
//! HTTP client. Nothing else in the crate reads credentials from globals.

use crate::config::ApiConfig;
use crate::error::ApiError;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use uuid::Uuid;
use zeroize::Zeroizing;

pub struct SessionContext {
    id: String,
    base_url: String,
    token: Option<Zeroizing<String>>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    pub fn new(base_url: &str, token: Option<String>, ttl: Option<Duration>) -> Self {
        let created_at = Utc::now();
        Self {
            id: format!("session_{}", Uuid::new_v4().simple()),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()).map(Zeroizing::new),
            created_at,
            expires_at: ttl.map(|ttl| created_at + ttl),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        let ttl = (config.session_ttl_secs > 0)
            .then(|| i64::try_from(config.session_ttl_secs).ok())
            .flatten()
            .and_then(Duration::try_seconds);
        Self::new(&config.base_url, config.token.clone(), ttl)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Absolute URL for an API path such as `content/validate`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    /// Bearer token for the next request, or why there is none.
    pub fn bearer(&self) -> Result<&str, ApiError> {
        if self.is_expired(Utc::now()) {
            return Err(ApiError::SessionExpired);
        }
        self.token
            .as_ref()
            .map(|token| token.as_str())
            .ok_or(ApiError::Unauthenticated)
    }

    /// Tear the session down; the token buffer is zeroized on drop.
    pub fn logout(mut self) {
        tracing::debug!(session = %self.id, "session closed");
        self.token = None;
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("id", &self.id)
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
