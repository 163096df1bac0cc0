//! WebSocket relay endpoint

use crate::hub::HubHandle;
use crate::protocol::ClientEvent;
use crate::ServerState;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use std::sync::Arc;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<ServerState>>) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Pump frames between one socket and the hub until either side closes
async fn handle_socket(mut socket: WebSocket, hub: HubHandle) {
    let (id, mut outbox) = hub.register();

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => hub.send(id, event),
                    Err(err) => tracing::warn!(%id, "dropping malformed frame: {}", err),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    tracing::debug!(%id, "socket error: {}", err);
                    break;
                }
            },
            outgoing = outbox.recv() => match outgoing {
                Some(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(err) => {
                            tracing::error!(%id, "failed to encode event: {}", err);
                            continue;
                        }
                    };
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    hub.disconnect(id);
}
