//! API tokens and the provider trait.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::CachedTokenProvider;
use crate::error::TokenError;

/// An opaque bearer token.
///
/// `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the `Authorization` header value for this token.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

impl From<String> for ApiToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for ApiToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// A source of API tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync + 'static {
    /// Returns a token.
    ///
    /// With `renew` set the provider should fetch a new token even if it
    /// holds one. Providers may ignore the flag.
    async fn token(&self, renew: bool) -> Result<ApiToken, TokenError>;

    /// Returns `self` if this provider is already a [`CachedTokenProvider`].
    #[doc(hidden)]
    fn as_cache(self: Arc<Self>) -> Option<Arc<CachedTokenProvider>> {
        None
    }
}

/// A provider that always returns the same token.
#[derive(Clone)]
pub struct StaticToken(ApiToken);

impl StaticToken {
    pub fn new(token: impl Into<ApiToken>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticToken").field(&self.0).finish()
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self, _renew: bool) -> Result<ApiToken, TokenError> {
        if self.0.is_empty() {
            return Err(TokenError::Empty);
        }
        Ok(self.0.clone())
    }
}
