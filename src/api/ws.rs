//! Realtime channel handling
//!
//! Each socket is connection-scoped: it pumps inbound frames into the
//! session's worker queue and forwards the session's broadcast events back
//! out. Session state itself outlives any socket.

use super::types::{ClientMessage, ServerEvent, TurnFailure};
use super::AppState;
use crate::store::SessionStore;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::BroadcastStream;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, session_id, state))
}

async fn handle_socket(socket: WebSocket, session_id: String, state: AppState) {
    tracing::info!(session_id = %session_id, "Client connected");

    let (mut ws_tx, mut ws_rx) = socket.split();

    // An unknown id is created fresh, never rejected.
    let snapshot = state.sessions.store().create_if_absent(&session_id).await;
    let events_rx = state.sessions.subscribe(&session_id).await;

    // All outbound traffic for this socket funnels through one queue so
    // broadcast events and connection-local errors cannot interleave a frame.
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<ServerEvent>(64);

    let send_task = tokio::spawn(async move {
        while let Some(event) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize outbound event");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(json)).await.is_err() {
                tracing::debug!("WebSocket send failed, client disconnected");
                break;
            }
        }
    });

    if outbound_tx
        .send(ServerEvent::History { data: snapshot })
        .await
        .is_err()
    {
        send_task.abort();
        return;
    }

    // Fan the session's broadcast events out to this socket.
    let forward_tx = outbound_tx.clone();
    let forward_task = tokio::spawn(async move {
        let mut events = BroadcastStream::new(events_rx);
        while let Some(event) = events.next().await {
            // Lagged receivers skip dropped events rather than dying.
            let Ok(event) = event else { continue };
            if forward_tx.send(ServerEvent::from(event)).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = ws_rx.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "WebSocket receive error");
                break;
            }
        };

        match serde_json::from_str::<ClientMessage>(&text) {
            Ok(inbound) => {
                state
                    .sessions
                    .send_message(&session_id, inbound.message)
                    .await;
            }
            Err(e) => {
                // Connection-local: a malformed frame concerns only this
                // socket, not every subscriber to the session.
                let _ = outbound_tx
                    .send(ServerEvent::Error {
                        data: TurnFailure {
                            error: format!("Malformed message: {e}"),
                            retry_after_ms: 0,
                        },
                    })
                    .await;
            }
        }
    }

    tracing::info!(session_id = %session_id, "Client disconnected");
    forward_task.abort();
    send_task.abort();
}
