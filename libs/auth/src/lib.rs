//! # bmx-auth
//!
//! API token sources for the bmx client.
//!
//! - [`TokenProvider`] is anything that can hand out a bearer token
//! - [`StaticToken`] always returns the token it was built with
//! - [`CachedTokenProvider`] wraps a provider and only calls it on a cache
//!   miss or when the caller asks for renewal
//!
//! Tokens are never expired on a timer. A caller that sees a request
//! rejected asks for a fresh token with `renew = true`.

mod cache;
mod error;
mod token;

pub use cache::{CachedTokenProvider, TokenState};
pub use error::TokenError;
pub use token::{ApiToken, StaticToken, TokenProvider};
