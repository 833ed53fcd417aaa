//! Participant-side core of the collaborative drawing surface.
//!
//! This crate owns everything a participant keeps in memory: the drawable
//! objects on the canvas, the local undo/redo history, and the protocol that
//! turns local edits into wire frames and inbound frames back into canvas
//! state. It performs no I/O; the host (the `cli`, or a browser shell) moves
//! [`frames::Frame`]s over a socket and calls into [`session::Session`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`object`] | Drawable object kinds, identity, record (de)serialization |
//! | [`store`] | `CanvasState`: the live, ordered object set |
//! | [`history`] | Snapshot stack with a cursor for undo/redo |
//! | [`sync`] | Local events to frames, inbound frames to reconciliation |
//! | [`session`] | Controller owning store, history and sync; toolbar commands |
//! | [`input`] | Tools and pen settings |
//! | [`error`] | `CanvasError` |
//! | [`consts`] | Default styles |

pub mod consts;
pub mod error;
pub mod history;
pub mod input;
pub mod object;
pub mod session;
pub mod store;
pub mod sync;

pub use error::CanvasError;
pub use object::{DrawableObject, ObjectId, ObjectKind, Point, Record};
pub use session::Session;
pub use store::CanvasState;
pub use sync::{Inbound, LocalEvent, Renderer, SyncProtocol};
