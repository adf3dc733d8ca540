use crate::room::Admission;
use crate::router::AppState;
use axum::Json;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use confide_core::{PeerId, RoomToken, SignalMessage};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
pub struct JoinQuery {
    pub room: Option<String>,
}

pub async fn ws_handler(
    Query(query): Query<JoinQuery>,
    State(state): State<Arc<AppState>>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let Some(Ok(room)) = query.room.map(RoomToken::new) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "room is required" })),
        )
            .into_response();
    };

    match ws {
        Ok(ws) => ws
            .on_upgrade(move |socket| handle_socket(socket, room, state))
            .into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

async fn handle_socket(socket: WebSocket, room: RoomToken, state: Arc<AppState>) {
    let peer_id = PeerId::new();
    info!("New WebSocket connection {} for room '{}'", peer_id, room);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.signaling.add_peer(peer_id.clone(), tx);

    if state.registry.join(&room, peer_id.clone()).await == Admission::Full {
        state.signaling.remove_peer(&peer_id);
        if let Ok(json) = SignalMessage::Full.encode() {
            let _ = sender.send(Message::Text(json.into())).await;
        }
        let _ = sender.send(Message::Close(None)).await;
        info!("Rejected {}: room '{}' is full", peer_id, room);
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();
        let room = room.clone();
        let peer_id = peer_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match SignalMessage::decode(text.as_str()) {
                        Ok(signal) if signal.is_relayable() => {
                            state.registry.relay(&room, peer_id.clone(), signal).await;
                        }
                        Ok(signal) => {
                            warn!("Ignoring client-sent {} from {}", signal.kind(), peer_id);
                        }
                        Err(e) => warn!("Invalid SignalMessage from {}: {}", peer_id, e),
                    },
                    Message::Close(_) => break,
                    Message::Ping(_) | Message::Pong(_) => {
                        debug!("Keep-alive from {}", peer_id);
                    }
                    Message::Binary(_) => warn!("Ignoring binary frame from {}", peer_id),
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.registry.leave(&room, peer_id.clone()).await;
    state.signaling.remove_peer(&peer_id);
    info!("WebSocket disconnected: {}", peer_id);
}
