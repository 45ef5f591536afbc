//! Caller identity
//!
//! Bearer tokens are opaque session ids. The session store maps
//! `session:<token>` to the user id it was issued for.

use async_trait::async_trait;

use crate::cache::{CacheError, CacheHandle};

/// Session key prefix in the cache
pub const SESSION_KEY_PREFIX: &str = "session:";

/// Auth error type
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("session store error: {0}")]
    Store(#[from] CacheError),
}

/// Resolves a bearer token to the user id it belongs to.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// `Ok(None)` means the token is unknown or expired.
    async fn verify(&self, token: &str) -> Result<Option<String>, AuthError>;
}

/// [`TokenVerifier`] backed by sessions stored in the cache
///
/// While the store is unreachable every verification fails with
/// [`AuthError::Store`]; it recovers on its own once the store is back.
pub struct CacheSessionVerifier {
    cache: CacheHandle,
}

impl CacheSessionVerifier {
    pub fn new(cache: CacheHandle) -> Self {
        Self { cache }
    }
}

pub fn session_key(token: &str) -> String {
    format!("{SESSION_KEY_PREFIX}{token}")
}

#[async_trait]
impl TokenVerifier for CacheSessionVerifier {
    async fn verify(&self, token: &str) -> Result<Option<String>, AuthError> {
        let user_id = self.cache.get(&session_key(token)).await?;
        Ok(user_id.filter(|id| !id.is_empty()))
    }
}
