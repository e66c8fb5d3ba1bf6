//! hostpulse agent: simulated (and optionally real) hosts streamed as JSON
//! snapshots to every connected WebSocket client.

pub mod config;
pub mod generator;
pub mod sampler;
pub mod state;
pub mod types;
pub mod ws;

use axum::{routing::get, Router};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
}
