//! Access token caching.
//!
//! The cache is an owned field of the client. The slot lock is held while a
//! refresh is in flight, so callers arriving during expiry wait for that one
//! refresh instead of issuing their own.

use super::CommerceError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

/// Token endpoint response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    /// Bearer token
    pub access_token: String,
    /// Lifetime in seconds from the moment of issue
    pub expires_in: i64,
}

/// Cached bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Bearer token
    pub value: String,
    /// First instant at which the token is no longer used
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Build from a grant received at `now`
    #[must_use]
    pub fn from_grant(grant: TokenGrant, now: DateTime<Utc>) -> Self {
        Self {
            value: grant.access_token,
            expires_at: now + Duration::seconds(grant.expires_in),
        }
    }

    /// Whether the token must be refreshed at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Something that can issue a fresh token
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Request a new token from the backend
    async fn fetch_token(&self) -> Result<TokenGrant, CommerceError>;
}

/// Single-slot token cache
#[derive(Debug, Default)]
pub struct TokenCache {
    slot: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a valid bearer token at `now`, fetching one if the slot is
    /// empty or expired.
    ///
    /// # Errors
    ///
    /// Returns the source's error if a refresh is needed and fails; the slot
    /// is left as it was.
    pub async fn bearer_at<S>(&self, source: &S, now: DateTime<Utc>) -> Result<String, CommerceError>
    where
        S: TokenSource + ?Sized,
    {
        let mut slot = self.slot.lock().await;
        if let Some(token) = slot.as_ref().filter(|t| !t.is_expired_at(now)) {
            return Ok(token.value.clone());
        }

        let token = AccessToken::from_grant(source.fetch_token().await?, now);
        debug!(expires_at = %token.expires_at, "Refreshed commerce access token");
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }

    /// Currently cached token, if any
    pub async fn current(&self) -> Option<AccessToken> {
        self.slot.lock().await.clone()
    }
}
