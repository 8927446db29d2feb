//! # bmx-id
//!
//! Identifier types shared by the bmx crates.
//!
//! ## Numeric IDs
//!
//! The REST API identifies every resource with an integer, but always
//! transports it as a JSON string (`"id": "31427903"`) so that no consumer
//! loses precision. [`Id`] wraps the integer and keeps that wire form.
//!
//! ## Tagged IDs
//!
//! The GraphQL and unlock APIs use composite IDs of the form
//! `{prefix}-{kind}-{number}`:
//!
//! - `prod-tenant-7648837`
//! - `prod-access_point-53449`
//!
//! Only the first two dashes are separators. The prefix is always `prod`.

mod error;
mod types;

pub use error::IdError;
pub use types::*;
