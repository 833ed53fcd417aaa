//! Sync protocol: local events out, inbound frames in.
//!
//! DESIGN
//! ======
//! The renderer reports exactly three local event kinds ([`LocalEvent`]);
//! each becomes at most one frame carrying only the affected object, so
//! message size is independent of canvas size. Inbound frames for the active
//! room are reconciled into the [`CanvasState`] by identity and the renderer
//! is told through its single [`Renderer::object_reconciled`] callback.
//!
//! ERROR HANDLING
//! ==============
//! A frame that fails to decode is logged and discarded here. Nothing
//! inbound ever propagates an error past this module.

#[cfg(test)]
#[path = "sync_test.rs"]
mod sync_test;

use frames::{Frame, SYSCALL_REMOVE, SYSCALL_UPDATE};
use tracing::{debug, info, warn};

use crate::object::{self, DrawableObject, ObjectId};
use crate::store::CanvasState;

/// What the renderer tells the protocol about local edits.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalEvent {
    /// A new object was committed (stroke finished, shape or text created).
    Finalized(DrawableObject),
    /// An existing object's properties were committed.
    Modified(DrawableObject),
    /// An object was deleted.
    Removed(ObjectId),
}

/// Receiver of reconciliation notices; typically the view that redraws.
pub trait Renderer {
    /// The object `id` was inserted, replaced or removed by a peer.
    /// `canvas` is the state after reconciliation.
    fn object_reconciled(&mut self, id: &ObjectId, canvas: &CanvasState);
}

/// Result of handling one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// The canvas changed for this identity.
    Reconciled(ObjectId),
    /// Not for this room, not a canvas frame, or a removal of an absent object.
    Ignored,
    /// Addressed to this room but undecodable; dropped.
    Discarded,
}

/// Per-participant protocol state: who we are and which room we are in.
#[derive(Debug, Clone)]
pub struct SyncProtocol {
    participant: String,
    room: Option<String>,
}

impl SyncProtocol {
    #[must_use]
    pub fn new(participant: impl Into<String>) -> Self {
        Self { participant: participant.into(), room: None }
    }

    #[must_use]
    pub fn participant(&self) -> &str {
        &self.participant
    }

    /// The active room, if joined.
    #[must_use]
    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    /// Enter `room`. Returns the join frame to send, or `None` when already
    /// in that room.
    pub fn join(&mut self, room: &str) -> Option<Frame> {
        if self.room.as_deref() == Some(room) {
            debug!(room, "sync: already joined");
            return None;
        }
        info!(room, participant = %self.participant, "sync: joining room");
        self.room = Some(room.to_owned());
        Some(Frame::join(room).with_from(self.participant.clone()))
    }

    /// Frame announcing a local event to the room, or `None` before joining.
    #[must_use]
    pub fn outbound(&self, event: &LocalEvent) -> Option<Frame> {
        let room = self.room.as_deref()?;
        let frame = match event {
            LocalEvent::Finalized(obj) | LocalEvent::Modified(obj) => {
                Frame::update(room, object::serialize(obj))
            }
            LocalEvent::Removed(id) => Frame::remove(room, id.as_str()),
        };
        Some(frame.with_from(self.participant.clone()))
    }

    /// Reconcile one inbound frame into `canvas`.
    pub fn inbound(&self, frame: &Frame, canvas: &mut CanvasState, renderer: &mut dyn Renderer) -> Inbound {
        let Some(active) = self.room.as_deref() else {
            return Inbound::Ignored;
        };
        if frame.room.as_deref() != Some(active) {
            debug!(syscall = %frame.syscall, room = ?frame.room, active, "sync: frame for other room ignored");
            return Inbound::Ignored;
        }

        let reconciled = match frame.syscall.as_str() {
            SYSCALL_UPDATE => match canvas.apply_remote(&frame.data) {
                Ok(id) => id,
                Err(e) => {
                    warn!(id = %frame.id, from = ?frame.from, error = %e, "sync: discarding update");
                    return Inbound::Discarded;
                }
            },
            SYSCALL_REMOVE => {
                let Some(id) = frame.data_str("id").filter(|id| !id.is_empty()) else {
                    warn!(id = %frame.id, from = ?frame.from, "sync: discarding remove without identity");
                    return Inbound::Discarded;
                };
                let id = ObjectId::from(id);
                if canvas.remove(&id).is_none() {
                    debug!(%id, from = ?frame.from, "sync: remove for absent object ignored");
                    return Inbound::Ignored;
                }
                id
            }
            _ => return Inbound::Ignored,
        };

        renderer.object_reconciled(&reconciled, canvas);
        Inbound::Reconciled(reconciled)
    }
}
