//! Shared relay state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the room registry: each live room maps connection ids to the
//! sender half of that connection's outbound queue. Rooms exist only while
//! at least one connection is in them. No object state is kept here.

use std::collections::HashMap;
use std::sync::Arc;

use frames::Frame;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::config::DEFAULT_CLIENT_CHANNEL_CAPACITY;

// =============================================================================
// ROOM STATE
// =============================================================================

/// Connections currently in one room.
#[derive(Default)]
pub struct RoomState {
    /// Connected clients: `client_id` -> sender for outgoing frames.
    pub clients: HashMap<Uuid, mpsc::Sender<Frame>>,
}

impl RoomState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state. Clone is required by Axum; the registry is
/// Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RwLock<HashMap<String, RoomState>>>,
    /// Bound of each connection's outbound queue.
    pub client_channel_capacity: usize,
}

impl AppState {
    #[must_use]
    pub fn new(client_channel_capacity: usize) -> Self {
        Self { rooms: Arc::new(RwLock::new(HashMap::new())), client_channel_capacity: client_channel_capacity.max(1) }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_CHANNEL_CAPACITY)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
