//! Realtime channel for agent clients.
//!
//! The server only pushes JSON events; client frames are drained and
//! ignored. The bearer token is checked before the session joins the
//! registry; a bad token closes the channel with policy code 1008.

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use tracing::debug;

use crate::state::AppState;

/// Query parameters for the realtime endpoint.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Bearer credential presented at connection time.
    pub token: String,
}

/// Upgrade handler for `GET /ws?token=...`.
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket, params.token))
}

async fn handle_socket(state: AppState, mut socket: WebSocket, token: String) {
    if token != state.config.agent_ws_token {
        debug!("realtime connection rejected: invalid token");
        let _ = socket
            .send(Message::Close(Some(CloseFrame {
                code: close_code::POLICY,
                reason: "invalid credentials".into(),
            })))
            .await;
        return;
    }

    let (id, mut events) = state.notifier.connect().await;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(payload) => {
                    if socket.send(Message::Text(payload)).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
            incoming = socket.recv() => match incoming {
                // Push-only channel: inbound frames are drained and dropped.
                Some(Ok(_)) => {}
                Some(Err(_)) | None => break,
            },
        }
    }

    state.notifier.disconnect(id).await;
}
