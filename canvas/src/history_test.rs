use super::*;
use crate::input::Pen;
use crate::object::{ObjectKind, Shape, create};

fn rect() -> DrawableObject {
    create(ObjectKind::Rectangle, &serde_json::Value::Null, &Pen::default()).unwrap()
}

/// Apply `n` inserts, recording after each, starting from a recorded empty canvas.
fn recorded_inserts(n: usize) -> (CanvasState, HistoryStack) {
    let mut state = CanvasState::new();
    let mut history = HistoryStack::new();
    history.snapshot(&state);
    for _ in 0..n {
        state.insert_local(rect()).unwrap();
        history.snapshot(&state);
    }
    (state, history)
}

#[test]
fn empty_history_has_no_cursor_and_noops() {
    let mut history = HistoryStack::new();
    assert_eq!(history.cursor(), None);
    assert!(history.is_empty());
    assert!(history.undo().is_none());
    assert!(history.redo().is_none());
    assert_eq!(history.cursor(), None);
}

#[test]
fn single_snapshot_cannot_undo() {
    let mut history = HistoryStack::new();
    history.snapshot(&CanvasState::new());
    assert_eq!(history.cursor(), Some(0));
    assert!(!history.can_undo());
    assert!(history.undo().is_none());
    assert_eq!(history.cursor(), Some(0));
}

#[test]
fn undo_n_times_returns_to_empty_and_redo_restores() {
    let n = 5;
    let (state, mut history) = recorded_inserts(n);
    let before = state.clone();

    for _ in 1..n {
        history.undo().expect("undo should step back");
    }
    let emptied = history.undo().expect("undo should step back");
    assert!(emptied.is_empty());
    assert_eq!(state.len(), n);
    assert!(history.undo().is_none());

    for _ in 1..n {
        history.redo().expect("redo should step forward");
    }
    let restored = history.redo().expect("redo should step forward");
    assert_eq!(restored, before);
    assert!(history.redo().is_none());
}

#[test]
fn snapshot_after_undo_prunes_redo_branch() {
    let (_, mut history) = recorded_inserts(4);
    assert_eq!(history.len(), 5);

    let k = 2;
    history.undo().unwrap();
    let mut current = history.undo().unwrap();
    assert!(history.can_redo());

    current.insert_local(rect()).unwrap();
    history.snapshot(&current);

    assert_eq!(history.len(), 5 - k + 1);
    assert_eq!(history.cursor(), Some(history.len() - 1));
    assert!(!history.can_redo());
    assert!(history.redo().is_none());
}

#[test]
fn snapshots_are_isolated_from_live_mutation() {
    let mut state = CanvasState::new();
    let mut history = HistoryStack::new();
    let obj = rect();
    state.insert_local(obj.clone()).unwrap();
    history.snapshot(&state);

    let mut edited = obj.clone();
    if let Shape::Rectangle(r) = edited.shape_mut() {
        r.width = 999.0;
    }
    state.replace_local(edited).unwrap();

    let stored = history.current().unwrap();
    assert_eq!(stored.objects(), std::slice::from_ref(&obj));
}

#[test]
fn returned_states_are_fresh_copies() {
    let (_, mut history) = recorded_inserts(2);
    let mut restored = history.undo().unwrap();
    restored.clear();
    let again = history.redo().and_then(|_| history.undo()).unwrap();
    assert_eq!(again.len(), 1);
}

#[test]
fn long_runs_still_undo_back_to_empty() {
    let n = 250;
    let (_, mut history) = recorded_inserts(n);
    assert_eq!(history.len(), n + 1);

    let mut undos = 0;
    let mut last = None;
    while let Some(state) = history.undo() {
        undos += 1;
        last = Some(state);
    }
    assert_eq!(undos, n);
    assert!(last.unwrap().is_empty());
    assert_eq!(history.cursor(), Some(0));
}
