//! Raw references and the per-document reference store.

use std::borrow::Cow;
use std::collections::HashMap;

use bmx_id::Id;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The `type` tag of a resource, e.g. `keychains` or `panels`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectType(Cow<'static, str>);

impl ObjectType {
    /// Creates an object type from a static tag.
    #[must_use]
    pub const fn from_static(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectType {
    fn from(tag: &str) -> Self {
        Self(Cow::Owned(tag.to_string()))
    }
}

impl From<String> for ObjectType {
    fn from(tag: String) -> Self {
        Self(Cow::Owned(tag))
    }
}

/// A resource as it appears on the wire: `id`, `type` and every other
/// top-level field as an opaque payload.
///
/// A reference with no payload is a bare relationship pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireReference", into = "WireReference")]
pub struct RawReference {
    id: Id,
    object_type: ObjectType,
    payload: Option<Map<String, Value>>,
}

impl RawReference {
    /// Creates a bare pointer with no payload.
    pub fn pointer(id: Id, object_type: impl Into<ObjectType>) -> Self {
        Self {
            id,
            object_type: object_type.into(),
            payload: None,
        }
    }

    /// Creates a reference carrying the given payload fields.
    ///
    /// `id` and `type` keys inside `payload` are dropped; the envelope
    /// owns them.
    pub fn embedded(id: Id, object_type: impl Into<ObjectType>, payload: Map<String, Value>) -> Self {
        WireReference {
            id,
            object_type: object_type.into(),
            fields: payload,
        }
        .into()
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn object_type(&self) -> &ObjectType {
        &self.object_type
    }

    /// Returns the embedded fields, or `None` for a bare pointer.
    pub fn payload(&self) -> Option<&Map<String, Value>> {
        self.payload.as_ref()
    }

    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }
}

#[derive(Serialize, Deserialize)]
struct WireReference {
    id: Id,
    #[serde(rename = "type")]
    object_type: ObjectType,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl From<WireReference> for RawReference {
    fn from(mut wire: WireReference) -> Self {
        wire.fields.remove("id");
        wire.fields.remove("type");
        Self {
            id: wire.id,
            object_type: wire.object_type,
            payload: (!wire.fields.is_empty()).then_some(wire.fields),
        }
    }
}

impl From<RawReference> for WireReference {
    fn from(raw: RawReference) -> Self {
        Self {
            id: raw.id,
            object_type: raw.object_type,
            fields: raw.payload.unwrap_or_default(),
        }
    }
}

/// Every resource of one compound document, keyed by ID.
///
/// Filled once while the document is assembled and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    refs: HashMap<Id, RawReference>,
}

impl ReferenceStore {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            refs: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts `raw`, replacing any reference already stored under its ID.
    pub(crate) fn insert(&mut self, raw: RawReference) -> Option<RawReference> {
        self.refs.insert(raw.id, raw)
    }

    pub fn get(&self, id: Id) -> Option<&RawReference> {
        self.refs.get(&id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.refs.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Iterates over the stored references in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &RawReference> {
        self.refs.values()
    }
}
