//! Undo/redo history as a stack of whole-canvas snapshots.
//!
//! DESIGN
//! ======
//! Each snapshot is an independent copy of every live object. The cursor
//! points at the snapshot matching the current canvas; `None` means nothing
//! has been recorded yet. Recording while the cursor is behind the tail
//! discards the redo branch first. Memory is O(objects) per step and the
//! stack is unbounded, so the oldest snapshot (the empty canvas a session
//! starts from) stays reachable.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use tracing::debug;

use crate::object::DrawableObject;
use crate::store::CanvasState;

/// Immutable copy of the canvas at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    objects: Vec<DrawableObject>,
}

impl HistorySnapshot {
    fn capture(state: &CanvasState) -> Self {
        Self { objects: state.export_all().to_vec() }
    }

    /// Objects in paint order at capture time.
    #[must_use]
    pub fn objects(&self) -> &[DrawableObject] {
        &self.objects
    }

    fn to_state(&self) -> CanvasState {
        CanvasState::from_objects(self.objects.clone())
    }
}

/// Ordered snapshots plus a cursor.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    snapshots: Vec<HistorySnapshot>,
    cursor: Option<usize>,
}

impl HistoryStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current canvas. Prunes any redo branch, appends, and moves
    /// the cursor to the new tail.
    pub fn snapshot(&mut self, state: &CanvasState) {
        match self.cursor {
            Some(cursor) => self.snapshots.truncate(cursor + 1),
            None => self.snapshots.clear(),
        }
        self.snapshots.push(HistorySnapshot::capture(state));
        self.cursor = Some(self.snapshots.len() - 1);
    }

    /// Step back one snapshot. Returns a fresh copy of the canvas to install,
    /// or `None` when already at the oldest snapshot (or empty).
    #[must_use]
    pub fn undo(&mut self) -> Option<CanvasState> {
        let cursor = match self.cursor {
            Some(cursor) if cursor > 0 => cursor - 1,
            _ => {
                debug!(cursor = ?self.cursor, "history: nothing to undo");
                return None;
            }
        };
        let state = self.snapshots.get(cursor)?.to_state();
        self.cursor = Some(cursor);
        Some(state)
    }

    /// Step forward one snapshot. Returns a fresh copy of the canvas to
    /// install, or `None` when already at the newest snapshot (or empty).
    #[must_use]
    pub fn redo(&mut self) -> Option<CanvasState> {
        let cursor = match self.cursor {
            Some(cursor) if cursor + 1 < self.snapshots.len() => cursor + 1,
            _ => {
                debug!(cursor = ?self.cursor, "history: nothing to redo");
                return None;
            }
        };
        let state = self.snapshots.get(cursor)?.to_state();
        self.cursor = Some(cursor);
        Some(state)
    }

    /// Index of the current snapshot, `None` when empty.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Snapshot at the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&HistorySnapshot> {
        self.snapshots.get(self.cursor?)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor + 1 < self.snapshots.len())
    }

    /// Number of reachable snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
