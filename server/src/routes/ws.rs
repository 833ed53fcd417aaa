//! WebSocket handler: room-scoped frame relay.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID and enters a `select!` loop:
//! - Incoming client frames → decode + dispatch by syscall prefix
//! - Frames from room peers → forward to client
//!
//! The relay is a dumb forwarder. `canvas:*` frames are copied verbatim to
//! the other connections in the sender's room and never echoed back.
//! Content is not validated; peers discard what they cannot decode.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → send `session:connected` with `client_id`
//! 2. `room:join` → part previous room (if any), join the new one
//! 3. `canvas:*` → broadcast to room peers, excluding sender
//! 4. Close → part room (evicting it when empty)
//!
//! Inbound frames may be JSON text or protobuf binary; outbound frames are
//! always protobuf binary.

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use frames::{FRAME_MESSAGE, Frame, SYSCALL_CONNECTED, SYSCALL_ERROR, Status};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services;
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();

    // Per-connection channel for receiving frames from room peers.
    let (client_tx, mut client_rx) = mpsc::channel::<Frame>(state.client_channel_capacity);

    let welcome = Frame::request(SYSCALL_CONNECTED, serde_json::json!({ "client_id": client_id.to_string() }));
    if send_frame(&mut sink, &welcome).await.is_err() {
        return;
    }

    info!(%client_id, "ws: client connected");

    // The room this connection is in, if any.
    let mut current_room: Option<String> = None;

    loop {
        tokio::select! {
            msg = stream.next() => {
                let Some(Ok(msg)) = msg else { break };
                let decoded = match msg {
                    Message::Text(text) => Some(decode_text(text.as_str())),
                    Message::Binary(bytes) => Some(decode_binary(&bytes)),
                    Message::Close(_) => break,
                    Message::Ping(_) | Message::Pong(_) => None,
                };
                let Some(decoded) = decoded else { continue };

                let replies = match decoded {
                    Ok(frame) => process_inbound(&state, &mut current_room, client_id, &client_tx, frame).await,
                    Err(reason) => {
                        warn!(%client_id, %reason, "ws: undecodable inbound frame");
                        vec![gateway_error(None, reason)]
                    }
                };
                if send_all(&mut sink, &replies).await.is_err() {
                    break;
                }
            }
            Some(frame) = client_rx.recv() => {
                if send_frame(&mut sink, &frame).await.is_err() {
                    break;
                }
            }
        }
    }

    if let Some(room) = current_room {
        services::room::part_room(&state, &room, client_id).await;
    }
    info!(%client_id, "ws: client disconnected");
}

// =============================================================================
// FRAME DISPATCH
// =============================================================================

/// Handle one decoded inbound frame and return frames for the sender.
///
/// Kept apart from the socket so tests can drive dispatch directly.
async fn process_inbound(
    state: &AppState,
    current_room: &mut Option<String>,
    client_id: Uuid,
    client_tx: &mpsc::Sender<Frame>,
    req: Frame,
) -> Vec<Frame> {
    match req.prefix() {
        "room" => handle_room(state, current_room, client_id, client_tx, &req).await,
        "canvas" => {
            forward_canvas(state, current_room.as_deref(), client_id, &req).await;
            Vec::new()
        }
        prefix => {
            warn!(%client_id, syscall = %req.syscall, "ws: unknown prefix");
            let message = format!("unknown prefix: {prefix}");
            vec![gateway_error(Some(&req), message)]
        }
    }
}

async fn handle_room(
    state: &AppState,
    current_room: &mut Option<String>,
    client_id: Uuid,
    client_tx: &mpsc::Sender<Frame>,
    req: &Frame,
) -> Vec<Frame> {
    let op = req.syscall.split_once(':').map_or("", |(_, op)| op);
    if op != "join" {
        return vec![gateway_error(Some(req), format!("unknown room op: {op}"))];
    }

    let Some(room) = req.room.as_deref().or_else(|| req.data_str("room")).filter(|r| !r.is_empty()) else {
        return vec![gateway_error(Some(req), "room required".to_owned())];
    };

    if current_room.as_deref() == Some(room) {
        debug!(%client_id, room, "ws: already in room");
        return Vec::new();
    }
    if let Some(previous) = current_room.take() {
        services::room::part_room(state, &previous, client_id).await;
    }
    services::room::join_room(state, room, client_id, client_tx.clone()).await;
    *current_room = Some(room.to_owned());
    Vec::new()
}

async fn forward_canvas(state: &AppState, current_room: Option<&str>, client_id: Uuid, req: &Frame) {
    let Some(room) = current_room else {
        warn!(%client_id, id = %req.id, syscall = %req.syscall, "ws: canvas frame before join dropped");
        return;
    };
    let delivered = services::room::broadcast(state, room, req, Some(client_id)).await;
    debug!(%client_id, room, id = %req.id, syscall = %req.syscall, delivered, "ws: forwarded");
}

// =============================================================================
// HELPERS
// =============================================================================

type WsSink = SplitSink<WebSocket, Message>;

fn decode_text(text: &str) -> Result<Frame, String> {
    serde_json::from_str(text).map_err(|e| format!("invalid json frame: {e}"))
}

fn decode_binary(bytes: &[u8]) -> Result<Frame, String> {
    frames::decode_frame(bytes).map_err(|e| format!("invalid binary frame: {e}"))
}

/// Error reply to the sender. Correlated with `parent` when it decoded.
fn gateway_error(parent: Option<&Frame>, message: String) -> Frame {
    match parent {
        Some(req) => Frame { syscall: SYSCALL_ERROR.to_owned(), ..req.error(message) },
        None => Frame {
            status: Status::Error,
            ..Frame::request(SYSCALL_ERROR, serde_json::json!({ FRAME_MESSAGE: message }))
        },
    }
}

async fn send_all(sink: &mut WsSink, replies: &[Frame]) -> Result<(), axum::Error> {
    for frame in replies {
        send_frame(sink, frame).await?;
    }
    Ok(())
}

async fn send_frame(sink: &mut WsSink, frame: &Frame) -> Result<(), axum::Error> {
    if frame.status == Status::Error {
        let message = frame.data_str(FRAME_MESSAGE).unwrap_or("-");
        warn!(id = %frame.id, syscall = %frame.syscall, message, "ws: send frame status=Error");
    } else {
        debug!(id = %frame.id, syscall = %frame.syscall, "ws: send frame");
    }
    let bytes = frames::encode_frame(frame);
    sink.send(Message::Binary(bytes.into())).await
}
