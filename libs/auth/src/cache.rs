//! Renewable token cache.
//!
//! Cache hits take the shared side of a reader/writer lock and never
//! block each other. Any call that reaches the wrapped provider holds
//! the exclusive side for the whole call, so at most one provider call
//! is in flight per cache.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::TokenError;
use crate::token::{ApiToken, TokenProvider};

/// What the cache currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TokenState {
    /// No token has been obtained yet.
    #[default]
    Empty,
    /// The last token the provider returned.
    Cached(ApiToken),
}

/// A [`TokenProvider`] that reuses the last token until asked to renew.
pub struct CachedTokenProvider {
    provider: Arc<dyn TokenProvider>,
    state: RwLock<TokenState>,
}

impl CachedTokenProvider {
    /// Wraps `provider` in a cache.
    ///
    /// If `provider` already is a cache it is returned as is, so wrapping
    /// twice never nests caches.
    pub fn reuse(provider: Arc<dyn TokenProvider>) -> Arc<Self> {
        if let Some(cache) = Arc::clone(&provider).as_cache() {
            return cache;
        }
        Arc::new(Self {
            provider,
            state: RwLock::new(TokenState::Empty),
        })
    }

    /// Returns a token.
    ///
    /// Without `renew`, a cached token is returned without contacting the
    /// provider. With `renew`, the provider is always called; on failure
    /// the previously cached token stays in place.
    pub async fn request(&self, renew: bool) -> Result<ApiToken, TokenError> {
        if !renew {
            if let TokenState::Cached(token) = &*self.state.read().await {
                return Ok(token.clone());
            }
        }

        let mut state = self.state.write().await;

        // Another caller may have filled the cache while we waited.
        if !renew {
            if let TokenState::Cached(token) = &*state {
                return Ok(token.clone());
            }
        }

        match self.provider.token(renew).await {
            Ok(token) => {
                debug!(renew, "Obtained API token from provider");
                *state = TokenState::Cached(token.clone());
                Ok(token)
            }
            Err(err) => {
                warn!(renew, error = %err, "Failed to obtain API token");
                Err(err)
            }
        }
    }

    /// Returns a snapshot of the cache state.
    pub async fn state(&self) -> TokenState {
        self.state.read().await.clone()
    }
}

impl std::fmt::Debug for CachedTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedTokenProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenProvider for CachedTokenProvider {
    async fn token(&self, renew: bool) -> Result<ApiToken, TokenError> {
        self.request(renew).await
    }

    fn as_cache(self: Arc<Self>) -> Option<Arc<CachedTokenProvider>> {
        Some(self)
    }
}
