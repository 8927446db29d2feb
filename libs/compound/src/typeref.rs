//! Typed relationship pointers and their lazy resolution.

use std::fmt;
use std::marker::PhantomData;

use bmx_id::Id;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::decode::decode_reference;
use crate::error::DocumentError;
use crate::reference::{ObjectType, RawReference, ReferenceStore};

/// A `{id, type}` pointer that resolves to a `T`.
///
/// Holds no decoded data. Each call to [`TypedReference::resolve`]
/// decodes the referenced payload again, so callers that need the value
/// repeatedly should keep the result.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TypedReference<T> {
    id: Id,
    #[serde(rename = "type")]
    object_type: ObjectType,
    #[serde(skip)]
    target: PhantomData<fn() -> T>,
}

impl<T> TypedReference<T> {
    pub fn new(id: Id, object_type: impl Into<ObjectType>) -> Self {
        Self {
            id,
            object_type: object_type.into(),
            target: PhantomData,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn object_type(&self) -> &ObjectType {
        &self.object_type
    }

    /// Returns the untyped pointer.
    pub fn to_raw(&self) -> RawReference {
        RawReference::pointer(self.id, self.object_type.clone())
    }
}

impl<T: DeserializeOwned> TypedReference<T> {
    /// Looks the pointer up in `refs` and decodes the stored resource.
    pub fn resolve(&self, refs: &ReferenceStore) -> Result<T, DocumentError> {
        let raw = refs
            .get(self.id)
            .ok_or(DocumentError::ReferenceNotFound { id: self.id })?;
        decode_reference(raw)
    }
}

impl<T> From<&RawReference> for TypedReference<T> {
    fn from(raw: &RawReference) -> Self {
        Self::new(raw.id(), raw.object_type().clone())
    }
}

impl<T> Clone for TypedReference<T> {
    fn clone(&self) -> Self {
        Self::new(self.id, self.object_type.clone())
    }
}

impl<T> PartialEq for TypedReference<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.object_type == other.object_type
    }
}

impl<T> Eq for TypedReference<T> {}

impl<T> fmt::Debug for TypedReference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedReference")
            .field("id", &self.id)
            .field("type", &self.object_type)
            .finish()
    }
}

/// Resolves an optional pointer. An absent pointer resolves to `None`.
pub fn resolve<T: DeserializeOwned>(
    reference: Option<&TypedReference<T>>,
    refs: &ReferenceStore,
) -> Result<Option<T>, DocumentError> {
    reference.map(|r| r.resolve(refs)).transpose()
}

/// A to-one relationship: `{"data": {id, type}}` or `{"data": null}`.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Relationship<T> {
    #[serde(default)]
    data: Option<TypedReference<T>>,
}

impl<T> Relationship<T> {
    pub fn new(reference: Option<TypedReference<T>>) -> Self {
        Self { data: reference }
    }

    pub fn reference(&self) -> Option<&TypedReference<T>> {
        self.data.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }
}

impl<T: DeserializeOwned> Relationship<T> {
    pub fn resolve(&self, refs: &ReferenceStore) -> Result<Option<T>, DocumentError> {
        resolve(self.data.as_ref(), refs)
    }
}

impl<T> Default for Relationship<T> {
    fn default() -> Self {
        Self { data: None }
    }
}

impl<T> Clone for Relationship<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl<T> fmt::Debug for Relationship<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relationship")
            .field("data", &self.data)
            .finish()
    }
}

/// A to-many relationship: `{"data": [{id, type}, ...]}`.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ReferenceList<T> {
    #[serde(default)]
    data: Vec<TypedReference<T>>,
}

impl<T> ReferenceList<T> {
    pub fn new(references: Vec<TypedReference<T>>) -> Self {
        Self { data: references }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypedReference<T>> {
        self.data.iter()
    }

    pub fn get(&self, index: usize) -> Option<&TypedReference<T>> {
        self.data.get(index)
    }
}

impl<T: DeserializeOwned> ReferenceList<T> {
    /// Resolves every pointer, in order. Stops at the first failure.
    pub fn resolve_all(&self, refs: &ReferenceStore) -> Result<Vec<T>, DocumentError> {
        self.data.iter().map(|r| r.resolve(refs)).collect()
    }
}

impl<T> Default for ReferenceList<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

impl<T> Clone for ReferenceList<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl<T> fmt::Debug for ReferenceList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.data.iter()).finish()
    }
}

impl<'a, T> IntoIterator for &'a ReferenceList<T> {
    type Item = &'a TypedReference<T>;
    type IntoIter = std::slice::Iter<'a, TypedReference<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
