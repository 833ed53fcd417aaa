//! Room service: join, part, and fan-out.
//!
//! DESIGN
//! ======
//! A room is created by its first join and evicted by its last part. The
//! relay never inspects frame content; `broadcast` copies one frame to every
//! connection in the room except the excluded sender.
//!
//! ERROR HANDLING
//! ==============
//! Delivery is best effort. A peer whose queue is full or closed misses that
//! frame; nothing is buffered for it and the sender is not told.

#[cfg(test)]
#[path = "room_test.rs"]
mod room_test;

use frames::Frame;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info};
use uuid::Uuid;

use crate::state::{AppState, RoomState};

/// Add `client_id` to `room`, creating the room if needed. Returns the
/// number of connections now in the room. Joining twice is harmless.
pub async fn join_room(state: &AppState, room: &str, client_id: Uuid, tx: mpsc::Sender<Frame>) -> usize {
    let mut rooms = state.rooms.write().await;
    let room_state = rooms.entry(room.to_owned()).or_insert_with(RoomState::new);
    room_state.clients.insert(client_id, tx);
    let clients = room_state.clients.len();
    info!(room, %client_id, clients, "client joined room");
    clients
}

/// Remove `client_id` from `room`. Evicts the room when it empties.
pub async fn part_room(state: &AppState, room: &str, client_id: Uuid) {
    let mut rooms = state.rooms.write().await;
    let Some(room_state) = rooms.get_mut(room) else {
        return;
    };

    room_state.clients.remove(&client_id);
    let remaining = room_state.clients.len();
    info!(room, %client_id, remaining, "client left room");

    if remaining == 0 {
        rooms.remove(room);
        info!(room, "evicted empty room");
    }
}

/// Send `frame` to every client in `room` except `exclude`. Returns how many
/// peers accepted it.
pub async fn broadcast(state: &AppState, room: &str, frame: &Frame, exclude: Option<Uuid>) -> usize {
    let rooms = state.rooms.read().await;
    let Some(room_state) = rooms.get(room) else {
        return 0;
    };

    let mut delivered = 0;
    for (client_id, tx) in &room_state.clients {
        if exclude == Some(*client_id) {
            continue;
        }
        match tx.try_send(frame.clone()) {
            Ok(()) => delivered += 1,
            Err(TrySendError::Full(_)) => {
                debug!(room, %client_id, id = %frame.id, "peer queue full; frame dropped");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(room, %client_id, id = %frame.id, "peer queue closed; frame dropped");
            }
        }
    }
    delivered
}
