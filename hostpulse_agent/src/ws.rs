//! WebSocket upgrade and per-connection handler: replays the latest snapshot
//! of every host, then forwards each new snapshot as it is published.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use crate::state::AppState;

use std::sync::atomic::Ordering;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let clients = state.client_count.fetch_add(1, Ordering::Relaxed) + 1;
    info!(clients, "client connected");

    // Ensure we decrement on disconnect (drop).
    struct ClientGuard(AppState);
    impl Drop for ClientGuard {
        fn drop(&mut self) {
            let left = self.0.client_count.fetch_sub(1, Ordering::Relaxed) - 1;
            info!(clients = left, "client disconnected");
        }
    }
    let _guard = ClientGuard(state.clone());

    let (mut rx, replay) = state.subscribe().await;
    let (mut sink, mut incoming) = socket.split();

    for js in replay {
        if sink.send(Message::Text(js)).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            published = rx.recv() => match published {
                Ok(js) => {
                    if sink.send(Message::Text(js)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "slow client, snapshots dropped");
                }
                Err(RecvError::Closed) => break,
            },
            msg = incoming.next() => match msg {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
}
