//! Error types for document assembly and reference resolution.

use bmx_id::Id;
use thiserror::Error;

/// Which part of a compound document a reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceOrigin {
    /// The document's `data` member.
    Primary,
    /// The document's `included` member.
    Included,
}

impl std::fmt::Display for ReferenceOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceOrigin::Primary => write!(f, "primary"),
            ReferenceOrigin::Included => write!(f, "included"),
        }
    }
}

/// Errors that can occur when decoding compound documents.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A resource that must be embedded only carried `id` and `type`.
    #[error("{origin} object {id}: missing data field")]
    MissingPayload { id: Id, origin: ReferenceOrigin },

    /// The merged envelope and payload did not match the target type.
    #[error("object {id}: failed to decode reference data: {source}")]
    Decode {
        id: Id,
        #[source]
        source: serde_json::Error,
    },

    /// A relationship points at an ID the document does not contain.
    #[error("reference ID {id} not found")]
    ReferenceNotFound { id: Id },
}

impl DocumentError {
    /// Returns the ID of the offending reference.
    pub fn id(&self) -> Id {
        match self {
            DocumentError::MissingPayload { id, .. }
            | DocumentError::Decode { id, .. }
            | DocumentError::ReferenceNotFound { id } => *id,
        }
    }

    /// Returns true if this error is a dangling relationship.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentError::ReferenceNotFound { .. })
    }
}
