//! Client errors.

use bmx_auth::TokenError;
use bmx_compound::DocumentError;
use thiserror::Error;

/// Errors returned by [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to get API token: {0}")]
    Token(#[from] TokenError),

    /// The API answered 401. Renew the token before retrying.
    #[error("not authenticated: the API rejected the token")]
    Unauthorized,

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The GraphQL endpoint answered 200 with an `errors` list.
    #[error("GraphQL query failed: {0}")]
    GraphQl(String),

    /// The response parsed but does not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

impl ClientError {
    /// Returns the HTTP status if the API answered with an error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized => Some(401),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
