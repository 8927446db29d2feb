//! Error types for token acquisition.

use thiserror::Error;

/// Errors that can occur when acquiring an API token.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The provider produced an empty token.
    #[error("token provider returned an empty token")]
    Empty,

    /// The underlying provider failed.
    #[error("token provider failed: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TokenError {
    /// Wraps a provider failure.
    pub fn provider(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        TokenError::Provider(err.into())
    }
}
