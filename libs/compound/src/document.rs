//! Compound-document assembly.
//!
//! A compound document pairs the requested (primary) resources with the
//! related resources the server side-loaded. Assembly decodes the primary
//! resources and indexes everything by ID so relationships can be
//! resolved later.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::decode::decode_reference;
use crate::error::{DocumentError, ReferenceOrigin};
use crate::reference::{RawReference, ReferenceStore};

/// Decoded primary resources plus the store their relationships resolve
/// against.
#[derive(Debug, Clone)]
pub struct ResultsWithReferences<T> {
    data: Vec<T>,
    refs: ReferenceStore,
}

impl<T> ResultsWithReferences<T> {
    /// The decoded primary resources, in document order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn refs(&self) -> &ReferenceStore {
        &self.refs
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_parts(self) -> (Vec<T>, ReferenceStore) {
        (self.data, self.refs)
    }
}

/// A single decoded primary resource plus its reference store.
#[derive(Debug, Clone)]
pub struct ResultWithReferences<T> {
    data: T,
    refs: ReferenceStore,
}

impl<T> ResultWithReferences<T> {
    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn refs(&self) -> &ReferenceStore {
        &self.refs
    }

    pub fn into_parts(self) -> (T, ReferenceStore) {
        (self.data, self.refs)
    }
}

/// Assembles a compound document.
///
/// Every primary and included resource must carry a payload. When an ID
/// appears more than once the later occurrence wins, except that a
/// primary resource is never shadowed by a side-loaded copy.
pub fn assemble<T: DeserializeOwned>(
    primary: Vec<RawReference>,
    included: Vec<RawReference>,
) -> Result<ResultsWithReferences<T>, DocumentError> {
    let mut data = Vec::with_capacity(primary.len());
    for raw in &primary {
        require_payload(raw, ReferenceOrigin::Primary)?;
        data.push(decode_reference::<T>(raw)?);
    }

    for raw in &included {
        require_payload(raw, ReferenceOrigin::Included)?;
    }

    // Included first so that primary resources overwrite side-loaded copies.
    let included_count = included.len();
    let mut refs = ReferenceStore::with_capacity(primary.len() + included_count);
    let mut shadowed = 0usize;
    for raw in included.into_iter().chain(primary) {
        let id = raw.id();
        if refs.insert(raw).is_some() {
            debug!(id = %id, "Replacing duplicate object in document");
            shadowed += 1;
        }
    }

    debug!(
        data_count = data.len(),
        refs_count = refs.len(),
        included_count,
        shadowed,
        "Assembled results with references"
    );

    Ok(ResultsWithReferences { data, refs })
}

/// Assembles a compound document whose primary member is a single
/// resource.
///
/// # Panics
///
/// Panics if assembly yields anything other than exactly one entity,
/// which would be a bug in [`assemble`].
pub fn assemble_one<T: DeserializeOwned>(
    primary: RawReference,
    included: Vec<RawReference>,
) -> Result<ResultWithReferences<T>, DocumentError> {
    let (data, refs) = assemble::<T>(vec![primary], included)?.into_parts();

    let count = data.len();
    let Ok([data]) = <[T; 1]>::try_from(data) else {
        panic!("BUG: expected exactly one decoded object, got {count}");
    };

    Ok(ResultWithReferences { data, refs })
}

fn require_payload(raw: &RawReference, origin: ReferenceOrigin) -> Result<(), DocumentError> {
    if raw.has_payload() {
        Ok(())
    } else {
        Err(DocumentError::MissingPayload {
            id: raw.id(),
            origin,
        })
    }
}

/// Links member of a paginated response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    /// URL of the next page, `null` on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

/// A response whose primary member is a list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginatedDocument {
    #[serde(default)]
    pub data: Vec<RawReference>,
    #[serde(default)]
    pub included: Vec<RawReference>,
    #[serde(default)]
    pub links: Links,
}

impl PaginatedDocument {
    /// Returns true if the server advertises another page.
    pub fn has_more(&self) -> bool {
        self.links.next.is_some()
    }
}

/// A response whose primary member is a single resource.
#[derive(Debug, Clone, Deserialize)]
pub struct SingleDocument {
    pub data: RawReference,
    #[serde(default)]
    pub included: Vec<RawReference>,
}

impl SingleDocument {
    pub fn assemble<T: DeserializeOwned>(self) -> Result<ResultWithReferences<T>, DocumentError> {
        assemble_one(self.data, self.included)
    }
}
