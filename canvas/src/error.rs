//! Error taxonomy for canvas operations.

use crate::object::ObjectId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CanvasError {
    /// A record could not be turned into a drawable object.
    #[error("malformed object: {0}")]
    MalformedObject(String),
    /// An object with this identity is already on the canvas.
    #[error("duplicate identity: {0}")]
    DuplicateIdentity(ObjectId),
    /// No object with this identity is on the canvas.
    #[error("object not found: {0}")]
    NotFound(ObjectId),
}

impl CanvasError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedObject(reason.into())
    }
}
