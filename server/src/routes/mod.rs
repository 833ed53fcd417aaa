//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router: the websocket relay at `/api/ws` and a fixed health
//! record at `/healthz`. CORS is open; every request is traced.

pub mod ws;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub const HEALTH_STATUS: &str = "canvas relay running";

/// Build the relay router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": HEALTH_STATUS }))
}
