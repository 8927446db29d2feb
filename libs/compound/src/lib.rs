//! # bmx-compound
//!
//! Turns the API's compound documents into typed entities.
//!
//! ## Wire Format
//!
//! Every resource is a flat object whose `id` and `type` sit next to the
//! resource's own fields:
//!
//! ```json
//! {"id": "27861", "type": "panels", "attributes": {"name": "Front Door"}}
//! ```
//!
//! A response carries the requested resources in `data` and related
//! resources in `included`. Relationships are bare `{id, type}` pointers
//! into that combined set.
//!
//! ## Flow
//!
//! - [`accumulate_pages`] drives a [`PageSource`] until the last page
//! - [`assemble`] decodes the primary resources and builds a
//!   [`ReferenceStore`] from everything in the document
//! - [`TypedReference::resolve`] decodes a related resource on demand
//!
//! Nothing is cached: each resolution decodes the stored payload again.

mod decode;
mod document;
mod error;
mod pagination;
mod reference;
mod typeref;

pub use decode::decode_reference;
pub use document::{
    assemble, assemble_one, Links, PaginatedDocument, ResultWithReferences,
    ResultsWithReferences, SingleDocument,
};
pub use error::{DocumentError, ReferenceOrigin};
pub use pagination::{accumulate_pages, AccumulatedPages, Page, PageSource, FIRST_PAGE};
pub use reference::{ObjectType, RawReference, ReferenceStore};
pub use typeref::{resolve, ReferenceList, Relationship, TypedReference};

/// Re-export the ID type every reference is keyed by.
pub use bmx_id::Id;
