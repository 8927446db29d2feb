//! REST client for the access API.
//!
//! Wraps the compound-document endpoints for keychains and virtual keys.
//! Responses are assembled with [`bmx_compound`], so side-loaded virtual
//! keys, door releases and panels can be resolved from the returned
//! reference store.
//!
//! Tenants and their access points come from the GraphQL endpoint and are
//! keyed by [`bmx_id::TaggedId`]; doors are opened through the separate
//! unlock service.
//!
//! ```no_run
//! use std::sync::Arc;
//! use bmx_auth::StaticToken;
//! use bmx_client::{ApiClient, ClientConfig, models::AccessCodeStatus};
//! use bmx_id::Id;
//!
//! # async fn run() -> Result<(), bmx_client::ClientError> {
//! let client = ApiClient::new(Arc::new(StaticToken::new("token")), ClientConfig::default())?;
//! let keychains = client.keychains(Id::new(42), AccessCodeStatus::Active).await?;
//! for keychain in keychains.data() {
//!     let keys = keychain.relationships.virtual_keys.resolve_all(keychains.refs())?;
//!     println!("{}: {} keys", keychain.attributes.name, keys.len());
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod graphql;
pub mod models;

pub use client::ApiClient;
pub use config::{
    ClientConfig, DEFAULT_API_URL, DEFAULT_UNLOCK_URL, DEFAULT_USER_AGENT, PAGE_SIZE,
};
pub use error::ClientError;
