//! Session controller: the single owner of a participant's canvas.
//!
//! DESIGN
//! ======
//! `Session` owns the `CanvasState`, its `HistoryStack`, the `SyncProtocol`
//! and the pen. Every toolbar command is one method here; mutating commands
//! return the frames the host must send. Everything runs on the host's one
//! event queue, so nothing here locks.
//!
//! Local mutations are recorded in history after they apply. Remote
//! reconciliation never is: undo only walks back this participant's edits.
//! Undo and redo install a snapshot wholesale and announce the difference,
//! limited to objects whose live version this participant wrote last. A peer
//! write to an identity releases it, so a history step never re-broadcasts
//! over a peer's edit or removal.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::HashSet;

use frames::Frame;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::CanvasError;
use crate::history::HistoryStack;
use crate::input::{Pen, Tool};
use crate::object::{self, DrawableObject, ObjectId, ObjectKind, Point};
use crate::store::CanvasState;
use crate::sync::{Inbound, LocalEvent, Renderer, SyncProtocol};

pub struct Session {
    canvas: CanvasState,
    history: HistoryStack,
    sync: SyncProtocol,
    pen: Pen,
    selection_mode: bool,
    /// Identities whose latest write came from this participant.
    touched: HashSet<ObjectId>,
}

impl Session {
    /// Start a session with an empty canvas recorded as the oldest snapshot.
    #[must_use]
    pub fn new(participant: impl Into<String>) -> Self {
        let canvas = CanvasState::new();
        let mut history = HistoryStack::new();
        history.snapshot(&canvas);
        Self {
            canvas,
            history,
            sync: SyncProtocol::new(participant),
            pen: Pen::default(),
            selection_mode: false,
            touched: HashSet::new(),
        }
    }

    // --- Room ---

    /// Join `room`; `None` when already there.
    pub fn join(&mut self, room: &str) -> Option<Frame> {
        self.sync.join(room)
    }

    #[must_use]
    pub fn room(&self) -> Option<&str> {
        self.sync.room()
    }

    // --- Pen and mode ---

    pub fn select_tool(&mut self, tool: Tool) {
        self.pen.set_tool(tool);
    }

    pub fn set_color(&mut self, color: impl Into<String>) {
        self.pen.set_color(color);
    }

    pub fn set_width(&mut self, width: f64) {
        self.pen.set_width(width);
    }

    #[must_use]
    pub fn pen(&self) -> &Pen {
        &self.pen
    }

    /// Flip between freehand drawing and object selection. Returns the new mode.
    pub fn toggle_selection_mode(&mut self) -> bool {
        self.selection_mode = !self.selection_mode;
        self.selection_mode
    }

    #[must_use]
    pub fn selection_mode(&self) -> bool {
        self.selection_mode
    }

    // --- Local mutations ---

    /// Create a rectangle, ellipse or text object with default style,
    /// overridden by `initial`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::MalformedObject`] for unusable `initial` props.
    pub fn add_shape(&mut self, kind: ObjectKind, initial: &Value) -> Result<Vec<Frame>, CanvasError> {
        let obj = object::create(kind, initial, &self.pen)?;
        self.commit_new(obj)
    }

    /// Commit a finished freehand stroke drawn with the active tool.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::MalformedObject`] when `points` is empty.
    pub fn finish_stroke(&mut self, points: Vec<Point>) -> Result<Vec<Frame>, CanvasError> {
        let initial = serde_json::json!({ "points": points });
        let obj = object::create(ObjectKind::Stroke, &initial, &self.pen)?;
        self.commit_new(obj)
    }

    /// Commit a property edit of an object already on the canvas. An edit
    /// equal to the live object records and sends nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NotFound`] if the object is not on the canvas.
    pub fn commit_edit(&mut self, obj: DrawableObject) -> Result<Vec<Frame>, CanvasError> {
        if self.canvas.get(obj.id()) == Some(&obj) {
            debug!(id = %obj.id(), "session: edit unchanged");
            return Ok(Vec::new());
        }
        self.canvas.replace_local(obj.clone())?;
        self.touched.insert(obj.id().clone());
        self.history.snapshot(&self.canvas);
        Ok(self.announce(&[LocalEvent::Modified(obj)]))
    }

    /// Delete one object.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::NotFound`] if the object is not on the canvas.
    pub fn remove(&mut self, id: &ObjectId) -> Result<Vec<Frame>, CanvasError> {
        if self.canvas.remove(id).is_none() {
            return Err(CanvasError::NotFound(id.clone()));
        }
        self.touched.insert(id.clone());
        self.history.snapshot(&self.canvas);
        Ok(self.announce(&[LocalEvent::Removed(id.clone())]))
    }

    /// Remove everything. Recorded, so it can be undone.
    pub fn clear(&mut self) -> Vec<Frame> {
        if self.canvas.is_empty() {
            return Vec::new();
        }
        let removed = self.canvas.clear();
        self.history.snapshot(&self.canvas);
        let events: Vec<LocalEvent> = removed
            .into_iter()
            .map(|obj| {
                self.touched.insert(obj.id().clone());
                LocalEvent::Removed(obj.id().clone())
            })
            .collect();
        info!(count = events.len(), "session: canvas cleared");
        self.announce(&events)
    }

    /// Step back one snapshot. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Vec<Frame>> {
        let restored = self.history.undo()?;
        Some(self.install(restored))
    }

    /// Step forward one snapshot. `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<Vec<Frame>> {
        let restored = self.history.redo()?;
        Some(self.install(restored))
    }

    // --- Remote ---

    /// Reconcile one inbound frame. Never touches history; the peer now owns
    /// the identity's live version.
    pub fn receive(&mut self, frame: &Frame, renderer: &mut dyn Renderer) -> Inbound {
        let outcome = self.sync.inbound(frame, &mut self.canvas, renderer);
        if let Inbound::Reconciled(id) = &outcome {
            self.touched.remove(id);
        }
        outcome
    }

    // --- Reads ---

    /// Objects in paint order.
    #[must_use]
    pub fn objects(&self) -> &[DrawableObject] {
        self.canvas.export_all()
    }

    #[must_use]
    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    #[must_use]
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    // --- Helpers ---

    fn commit_new(&mut self, obj: DrawableObject) -> Result<Vec<Frame>, CanvasError> {
        self.canvas.insert_local(obj.clone())?;
        self.touched.insert(obj.id().clone());
        self.history.snapshot(&self.canvas);
        debug!(id = %obj.id(), kind = obj.kind().as_str(), "session: object finalized");
        Ok(self.announce(&[LocalEvent::Finalized(obj)]))
    }

    fn announce(&self, events: &[LocalEvent]) -> Vec<Frame> {
        events.iter().filter_map(|event| self.sync.outbound(event)).collect()
    }

    /// Install a history snapshot and announce what changed for objects this
    /// participant wrote last.
    fn install(&mut self, restored: CanvasState) -> Vec<Frame> {
        let previous = std::mem::take(&mut self.canvas);
        self.canvas.restore(restored);

        let mut events = Vec::new();
        for obj in self.canvas.export_all() {
            if !self.touched.contains(obj.id()) {
                continue;
            }
            match previous.get(obj.id()) {
                Some(before) if before == obj => {}
                Some(_) => events.push(LocalEvent::Modified(obj.clone())),
                None => events.push(LocalEvent::Finalized(obj.clone())),
            }
        }
        for obj in previous.export_all() {
            if self.touched.contains(obj.id()) && !self.canvas.contains(obj.id()) {
                events.push(LocalEvent::Removed(obj.id().clone()));
            }
        }
        debug!(changes = events.len(), cursor = ?self.history.cursor(), "session: history step");
        self.announce(&events)
    }
}
