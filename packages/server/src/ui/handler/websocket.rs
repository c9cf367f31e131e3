//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionHandle, ConnectionIdFactory, Timestamp},
    ui::state::{AppState, ConnectQuery},
    usecase::{ConnectUserUseCase, DisconnectUserUseCase},
};

/// `GET /ws?userId=<id>`
///
/// The upgrade is always accepted. Without a usable `userId` the connection
/// only receives broadcasts.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.user_id))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: Option<String>) {
    let (mut sender, mut receiver) = socket.split();

    // Outbound events for this connection are queued here
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = ConnectionHandle::new(ConnectionIdFactory::generate(), tx, Timestamp::now());
    let connection_id = handle.id;

    let connect_usecase = ConnectUserUseCase::new(state.presence.clone(), state.gateway.clone());
    let label = match connect_usecase.execute(user_id, handle).await {
        Ok(user_id) => {
            tracing::info!("Connection '{}' registered as '{}'", connection_id, user_id);
            user_id.into_string()
        }
        Err(e) => {
            tracing::warn!("Connection '{}' not registered: {}", connection_id, e);
            "anonymous".to_string()
        }
    };

    let recv_label = label.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", recv_label, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    // Messages are submitted over HTTP; inbound frames carry no commands
                    tracing::debug!("Ignoring inbound text from '{}': {}", recv_label, text);
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", recv_label);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    let disconnect_usecase =
        DisconnectUserUseCase::new(state.presence.clone(), state.gateway.clone());
    match disconnect_usecase.execute(connection_id).await {
        Some(user_id) => tracing::info!("User '{}' disconnected", user_id),
        None => tracing::info!("Connection '{}' ({}) closed", connection_id, label),
    }
}
