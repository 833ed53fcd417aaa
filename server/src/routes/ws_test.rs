use std::net::SocketAddr;

use canvas::{CanvasState, Inbound, ObjectId, ObjectKind, Renderer, Session};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpStream;
use tokio::time::{Duration, Instant, sleep, timeout};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::*;
use crate::state::test_helpers;

// =============================================================================
// DISPATCH (no socket)
// =============================================================================

fn rect_update(room: &str) -> Frame {
    Frame::update(room, json!({"id": "x1", "kind": "rectangle", "props": {"left": 1.0}}))
}

async fn assert_channel_empty(rx: &mut mpsc::Receiver<Frame>) {
    assert!(
        timeout(Duration::from_millis(80), rx.recv()).await.is_err(),
        "expected channel to remain empty"
    );
}

#[tokio::test]
async fn canvas_frame_is_forwarded_to_peers_not_sender() {
    let state = AppState::default();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let (tx_a, mut rx_a) = mpsc::channel(8);
    let (tx_b, mut rx_b) = mpsc::channel(8);
    let mut room_a = None;
    let mut room_b = None;

    assert!(process_inbound(&state, &mut room_a, a, &tx_a, Frame::join("r1")).await.is_empty());
    assert!(process_inbound(&state, &mut room_b, b, &tx_b, Frame::join("r1")).await.is_empty());
    assert_eq!(room_a.as_deref(), Some("r1"));

    let update = rect_update("r1");
    let replies = process_inbound(&state, &mut room_a, a, &tx_a, update.clone()).await;
    assert!(replies.is_empty());

    let received = timeout(Duration::from_millis(200), rx_b.recv())
        .await
        .expect("forward timed out")
        .expect("channel closed");
    assert_eq!(received, update);
    assert_channel_empty(&mut rx_a).await;
}

#[tokio::test]
async fn canvas_frame_before_join_is_dropped() {
    let state = AppState::default();
    let a = Uuid::new_v4();
    let (tx_a, mut rx_a) = mpsc::channel(8);
    let mut room = None;

    let replies = process_inbound(&state, &mut room, a, &tx_a, rect_update("r1")).await;
    assert!(replies.is_empty());
    assert!(!test_helpers::room_exists(&state, "r1").await);
    assert_channel_empty(&mut rx_a).await;
}

#[tokio::test]
async fn join_reads_room_from_data_when_envelope_has_none() {
    let state = AppState::default();
    let a = Uuid::new_v4();
    let (tx_a, _rx_a) = mpsc::channel(8);
    let mut room = None;

    let req = Frame::request(frames::SYSCALL_JOIN, json!({"room": "r9"}));
    assert!(process_inbound(&state, &mut room, a, &tx_a, req).await.is_empty());
    assert_eq!(room.as_deref(), Some("r9"));
    assert_eq!(test_helpers::room_size(&state, "r9").await, 1);
}

#[tokio::test]
async fn join_without_room_is_rejected() {
    let state = AppState::default();
    let a = Uuid::new_v4();
    let (tx_a, _rx_a) = mpsc::channel(8);
    let mut room = None;

    let req = Frame::request(frames::SYSCALL_JOIN, json!({}));
    let replies = process_inbound(&state, &mut room, a, &tx_a, req.clone()).await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].syscall, SYSCALL_ERROR);
    assert_eq!(replies[0].status, Status::Error);
    assert_eq!(replies[0].parent_id.as_deref(), Some(req.id.as_str()));
    assert!(room.is_none());
}

#[tokio::test]
async fn joining_another_room_parts_the_previous_one() {
    let state = AppState::default();
    let a = Uuid::new_v4();
    let (tx_a, _rx_a) = mpsc::channel(8);
    let mut room = None;

    process_inbound(&state, &mut room, a, &tx_a, Frame::join("r1")).await;
    process_inbound(&state, &mut room, a, &tx_a, Frame::join("r1")).await;
    assert_eq!(test_helpers::room_size(&state, "r1").await, 1);

    process_inbound(&state, &mut room, a, &tx_a, Frame::join("r2")).await;
    assert_eq!(room.as_deref(), Some("r2"));
    assert!(!test_helpers::room_exists(&state, "r1").await);
    assert_eq!(test_helpers::room_size(&state, "r2").await, 1);
}

#[tokio::test]
async fn unknown_prefix_gets_gateway_error() {
    let state = AppState::default();
    let a = Uuid::new_v4();
    let (tx_a, _rx_a) = mpsc::channel(8);
    let mut room = None;

    let req = Frame::request("cursor:move", json!({}));
    let replies = process_inbound(&state, &mut room, a, &tx_a, req.clone()).await;
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].syscall, SYSCALL_ERROR);
    assert_eq!(replies[0].parent_id.as_deref(), Some(req.id.as_str()));
    assert_eq!(replies[0].data_str(FRAME_MESSAGE), Some("unknown prefix: cursor"));
}

#[test]
fn undecodable_input_maps_to_uncorrelated_error() {
    let reason = decode_text("{not json").unwrap_err();
    assert!(reason.starts_with("invalid json frame"));
    assert!(decode_binary(&[0xff, 0xff, 0xff]).is_err());

    let err = gateway_error(None, reason.clone());
    assert_eq!(err.syscall, SYSCALL_ERROR);
    assert_eq!(err.status, Status::Error);
    assert_eq!(err.parent_id, None);
    assert_eq!(err.data_str(FRAME_MESSAGE), Some(reason.as_str()));
}

#[test]
fn text_and_binary_decode_to_same_frame() {
    let frame = rect_update("r1");
    let text = serde_json::to_string(&frame).unwrap();
    assert_eq!(decode_text(&text).unwrap(), frame);
    assert_eq!(decode_binary(&frames::encode_frame(&frame)).unwrap(), frame);
}

#[tokio::test]
async fn healthz_reports_fixed_status() {
    let axum::Json(body) = crate::routes::healthz().await;
    assert_eq!(body, json!({"status": "canvas relay running"}));
}

// =============================================================================
// END TO END
// =============================================================================

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Quiet;

impl Renderer for Quiet {
    fn object_reconciled(&mut self, _id: &ObjectId, _canvas: &CanvasState) {}
}

async fn spawn_relay() -> (SocketAddr, AppState) {
    let state = AppState::new(64);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = crate::routes::app(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

/// Connect and consume the welcome frame.
async fn connect(addr: SocketAddr) -> Client {
    let (mut ws, _) = connect_async(format!("ws://{addr}/api/ws")).await.unwrap();
    let welcome = recv_frame(&mut ws).await.expect("welcome frame");
    assert_eq!(welcome.syscall, SYSCALL_CONNECTED);
    assert!(welcome.data_str("client_id").is_some());
    ws
}

async fn send(ws: &mut Client, frame: &Frame) {
    ws.send(WsMessage::Binary(frames::encode_frame(frame).into())).await.unwrap();
}

/// Next decoded frame, or `None` after a short quiet period.
async fn recv_frame(ws: &mut Client) -> Option<Frame> {
    loop {
        let msg = timeout(Duration::from_millis(300), ws.next()).await.ok()??.ok()?;
        if let WsMessage::Binary(bytes) = msg {
            return Some(frames::decode_frame(&bytes).unwrap());
        }
    }
}

async fn wait_for_room(state: &AppState, room: &str, size: usize) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while test_helpers::room_size(state, room).await != size {
        assert!(Instant::now() < deadline, "room {room} never reached {size} clients");
        sleep(Duration::from_millis(10)).await;
    }
}

async fn join(ws: &mut Client, session: &mut Session, room: &str) {
    let frame = session.join(room).expect("join frame");
    send(ws, &frame).await;
}

#[tokio::test]
async fn update_reaches_room_peer_but_not_other_room_or_sender() {
    let (addr, state) = spawn_relay().await;
    let (mut ws_a, mut ws_b, mut ws_c) = (connect(addr).await, connect(addr).await, connect(addr).await);
    let mut alice = Session::new("alice");
    let mut bob = Session::new("bob");
    let mut carol = Session::new("carol");

    join(&mut ws_a, &mut alice, "r1").await;
    join(&mut ws_b, &mut bob, "r1").await;
    join(&mut ws_c, &mut carol, "r2").await;
    wait_for_room(&state, "r1", 2).await;
    wait_for_room(&state, "r2", 1).await;

    let outgoing = alice.add_shape(ObjectKind::Rectangle, &json!({})).unwrap();
    assert_eq!(outgoing.len(), 1);
    send(&mut ws_a, &outgoing[0]).await;
    let created = alice.objects()[0].id().clone();

    let at_bob = recv_frame(&mut ws_b).await.expect("bob should receive the update");
    assert_eq!(at_bob, outgoing[0]);
    assert_eq!(bob.receive(&at_bob, &mut Quiet), Inbound::Reconciled(created.clone()));
    assert_eq!(bob.objects(), alice.objects());

    assert!(recv_frame(&mut ws_c).await.is_none(), "r2 must not see r1 traffic");
    assert!(carol.objects().is_empty());
    assert!(recv_frame(&mut ws_a).await.is_none(), "sender must not get its own update");
}

#[tokio::test]
async fn undo_propagates_as_removal() {
    let (addr, state) = spawn_relay().await;
    let (mut ws_a, mut ws_b) = (connect(addr).await, connect(addr).await);
    let mut alice = Session::new("alice");
    let mut bob = Session::new("bob");
    join(&mut ws_a, &mut alice, "r1").await;
    join(&mut ws_b, &mut bob, "r1").await;
    wait_for_room(&state, "r1", 2).await;

    for frame in alice.finish_stroke(vec![canvas::Point::new(1.0, 1.0), canvas::Point::new(2.0, 3.0)]).unwrap() {
        send(&mut ws_a, &frame).await;
    }
    let created = recv_frame(&mut ws_b).await.unwrap();
    bob.receive(&created, &mut Quiet);
    assert_eq!(bob.objects().len(), 1);

    for frame in alice.undo().unwrap() {
        send(&mut ws_a, &frame).await;
    }
    let removal = recv_frame(&mut ws_b).await.unwrap();
    assert_eq!(removal.syscall, frames::SYSCALL_REMOVE);
    bob.receive(&removal, &mut Quiet);
    assert!(bob.objects().is_empty());
}

#[tokio::test]
async fn text_json_frames_are_accepted_and_relayed_as_binary() {
    let (addr, state) = spawn_relay().await;
    let (mut ws_a, mut ws_b) = (connect(addr).await, connect(addr).await);

    let join_a = serde_json::to_string(&Frame::join("r1")).unwrap();
    let join_b = serde_json::to_string(&Frame::join("r1")).unwrap();
    ws_a.send(WsMessage::Text(join_a.into())).await.unwrap();
    ws_b.send(WsMessage::Text(join_b.into())).await.unwrap();
    wait_for_room(&state, "r1", 2).await;

    let update = rect_update("r1");
    ws_a.send(WsMessage::Text(serde_json::to_string(&update).unwrap().into())).await.unwrap();
    assert_eq!(recv_frame(&mut ws_b).await, Some(update));
}

#[tokio::test]
async fn garbage_gets_error_reply_and_connection_survives() {
    let (addr, state) = spawn_relay().await;
    let (mut ws_a, mut ws_b) = (connect(addr).await, connect(addr).await);

    ws_a.send(WsMessage::Binary(vec![0xff, 0x01].into())).await.unwrap();
    let err = recv_frame(&mut ws_a).await.expect("error reply");
    assert_eq!(err.syscall, SYSCALL_ERROR);
    assert_eq!(err.status, Status::Error);

    send(&mut ws_a, &Frame::join("r1")).await;
    send(&mut ws_b, &Frame::join("r1")).await;
    wait_for_room(&state, "r1", 2).await;
    send(&mut ws_a, &rect_update("r1")).await;
    assert!(recv_frame(&mut ws_b).await.is_some());
}

#[tokio::test]
async fn disconnect_evicts_empty_room() {
    let (addr, state) = spawn_relay().await;
    let mut ws_a = connect(addr).await;
    send(&mut ws_a, &Frame::join("r1")).await;
    wait_for_room(&state, "r1", 1).await;

    ws_a.close(None).await.unwrap();
    drop(ws_a);
    wait_for_room(&state, "r1", 0).await;
    assert!(!test_helpers::room_exists(&state, "r1").await);
}
