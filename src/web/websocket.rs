//! WebSocket handler for live snapshot streaming.

use crate::web::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::{
    extract::{State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use std::time::SystemTime;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// A connected dashboard client.
#[derive(Debug, Clone)]
pub struct Client {
    pub id: Uuid,
    pub connected_at: SystemTime,
}

/// WebSocket upgrade handler.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let connected = state.clients.read().await.len();
    if connected >= state.max_websocket_connections {
        warn!(
            "Rejecting WebSocket client: {} of {} connections in use",
            connected, state.max_websocket_connections
        );
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Handle a WebSocket connection.
async fn handle_websocket(socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();
    info!("WebSocket client connected: {}", client_id);

    state.clients.write().await.insert(
        client_id,
        Client {
            id: client_id,
            connected_at: SystemTime::now(),
        },
    );

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.snapshots.subscribe();

    // Clients only listen; incoming frames are drained until close.
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    info!("WebSocket client {} disconnected", client_id);
                    break;
                }
                Ok(_) => debug!("Ignoring message from {}", client_id),
                Err(e) => {
                    warn!("WebSocket error for client {}: {}", client_id, e);
                    break;
                }
            }
        }
    });

    let mut closing = state.shutdown.subscribe();
    let mut send_task = tokio::spawn(async move {
        if *closing.borrow() {
            return;
        }
        loop {
            let view = tokio::select! {
                received = rx.recv() => match received {
                    Ok(view) => view,
                    Err(RecvError::Lagged(skipped)) => {
                        debug!("Client {} skipped {} snapshots", client_id, skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = closing.changed() => break,
            };
            match serde_json::to_string(&view) {
                Ok(json_string) => {
                    if let Err(e) = sender.send(Message::Text(json_string)).await {
                        warn!("Failed to send message to client {}: {}", client_id, e);
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to serialize snapshot for client {}: {}", client_id, e);
                }
            }
        }
        let _ = sender.close().await;
    });

    // Wait for either task to complete, then stop the other
    tokio::select! {
        _ = &mut recv_task => {
            debug!("Receive task completed for client {}", client_id);
            send_task.abort();
        }
        _ = &mut send_task => {
            debug!("Send task completed for client {}", client_id);
            recv_task.abort();
        }
    }

    state.clients.write().await.remove(&client_id);
    info!("WebSocket client disconnected: {}", client_id);
}

/// Number of connected WebSocket clients.
pub async fn connected_client_count(state: &AppState) -> usize {
    state.clients.read().await.len()
}
