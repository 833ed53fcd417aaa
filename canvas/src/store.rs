//! Canvas state: the live set of drawable objects.
//!
//! `CanvasState` keeps objects in paint order (first inserted is drawn
//! first) with at most one entry per identity. Local edits go through
//! `insert_local` / `replace_local`; inbound records go through
//! `apply_remote`, which is last-write-wins per identity.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use tracing::error;

use crate::error::CanvasError;
use crate::object::{self, DrawableObject, ObjectId, Record};

/// Ordered, identity-keyed set of live objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasState {
    objects: Vec<DrawableObject>,
}

impl CanvasState {
    /// Create an empty canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a canvas from objects already in paint order.
    #[must_use]
    pub fn from_objects(objects: Vec<DrawableObject>) -> Self {
        Self { objects }
    }

    /// Add a newly created local object on top of the paint order.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::DuplicateIdentity`] if the identity is already
    /// present. Identity generation makes this unreachable in practice.
    pub fn insert_local(&mut self, obj: DrawableObject) -> Result<(), CanvasError> {
        if self.contains(obj.id()) {
            error!(id = %obj.id(), "canvas: duplicate identity on local insert");
            return Err(CanvasError::DuplicateIdentity(obj.id().clone()));
        }
        self.objects.push(obj);
        Ok(())
    }

    /// Replace an existing object after a local edit, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NotFound`] if no object has that identity.
    pub fn replace_local(&mut self, obj: DrawableObject) -> Result<(), CanvasError> {
        let Some(index) = self.position(obj.id()) else {
            return Err(CanvasError::NotFound(obj.id().clone()));
        };
        self.objects[index] = obj;
        Ok(())
    }

    /// Reconcile an inbound record: remove any object with the same identity,
    /// then append the decoded one. Returns the reconciled identity.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::MalformedObject`] without touching the canvas
    /// when the record cannot be decoded.
    pub fn apply_remote(&mut self, record: &Record) -> Result<ObjectId, CanvasError> {
        let obj = object::deserialize(record)?;
        let id = obj.id().clone();
        self.remove(&id);
        self.objects.push(obj);
        Ok(id)
    }

    /// Remove an object by identity, returning it if it was present.
    pub fn remove(&mut self, id: &ObjectId) -> Option<DrawableObject> {
        let index = self.position(id)?;
        Some(self.objects.remove(index))
    }

    /// Empty the canvas, returning what was on it in paint order.
    pub fn clear(&mut self) -> Vec<DrawableObject> {
        std::mem::take(&mut self.objects)
    }

    /// Replace the whole canvas, e.g. with a history snapshot.
    pub fn restore(&mut self, state: CanvasState) {
        self.objects = state.objects;
    }

    /// All objects in paint order.
    #[must_use]
    pub fn export_all(&self) -> &[DrawableObject] {
        &self.objects
    }

    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&DrawableObject> {
        self.objects.iter().find(|obj| obj.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn position(&self, id: &ObjectId) -> Option<usize> {
        self.objects.iter().position(|obj| obj.id() == id)
    }
}
