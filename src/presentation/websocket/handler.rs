//! WebSocket Connection Handler
//!
//! Owns the socket for one connection: a writer task drains the session's
//! outgoing queue and sends keep-alive pings, while the reader loop feeds
//! text frames into the [`Gateway`].

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};

use super::gateway::Gateway;
use super::messages::ServerEvent;
use crate::config::WebSocketSettings;
use crate::startup::AppState;

/// WebSocket upgrade handler
///
/// The upgrade is anonymous; identity is bound later by `authenticate`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let settings = state.settings.websocket.clone();
    let gateway = state.gateway.clone();

    ws.max_message_size(settings.max_message_size)
        .max_frame_size(settings.max_frame_size)
        .on_upgrade(move |socket| handle_socket(socket, gateway, settings))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, gateway: Arc<Gateway>, settings: WebSocketSettings) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();

    let mut session = gateway.open_session(tx);
    let connection_id = session.connection_id();
    tracing::debug!(%connection_id, "New WebSocket connection");

    let ping_every = Duration::from_secs(settings.ping_interval_secs.max(1));
    let mut writer = tokio::spawn(async move {
        let mut ping = interval(ping_every);
        ping.tick().await; // Skip first immediate tick

        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    let text = match serde_json::to_string(&event) {
                        Ok(t) => t,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize event");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    if sink.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
        let _ = sink.close().await;
    });

    let idle_timeout = Duration::from_secs(settings.idle_timeout_secs.max(1));

    // Main message loop
    loop {
        tokio::select! {
            frame = timeout(idle_timeout, stream.next()) => {
                match frame {
                    Ok(Some(Ok(Message::Text(text)))) => {
                        gateway.handle_text(&mut session, text.as_str()).await;
                    }
                    Ok(Some(Ok(Message::Close(_)))) | Ok(None) => {
                        tracing::debug!(%connection_id, "Connection closed by client");
                        break;
                    }
                    Ok(Some(Ok(_))) => {
                        // Ping, pong and binary frames only count as activity
                    }
                    Ok(Some(Err(e))) => {
                        tracing::debug!(%connection_id, error = %e, "WebSocket error");
                        break;
                    }
                    Err(_) => {
                        tracing::info!(%connection_id, "Idle timeout, closing connection");
                        break;
                    }
                }
            }
            _ = &mut writer => {
                tracing::debug!(%connection_id, "Writer stopped");
                break;
            }
        }
    }

    // Cleanup
    gateway.disconnect(&mut session);
    drop(session);
    writer.abort();
}
