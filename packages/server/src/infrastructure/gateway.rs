//! WebSocket implementation of the Connection Gateway.
//!
//! Keeps every accepted transport connection (registered or anonymous) so
//! broadcasts reach all of them, and resolves direct pushes through the
//! presence registry.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    domain::{
        ConnectionGateway, ConnectionHandle, ConnectionId, Message, OnlineSet,
        PresenceRepository, UserId,
    },
    infrastructure::dto::websocket::{NewMessageEvent, OnlineUsersEvent},
};

#[derive(Default)]
struct Connections {
    handles: HashMap<ConnectionId, ConnectionHandle>,
    /// Version of the last online set broadcast
    last_broadcast_version: Option<u64>,
}

impl Connections {
    /// Queue `payload` for every attached connection. Returns how many accepted it.
    fn broadcast_all(&self, payload: &str) -> usize {
        self.handles
            .values()
            .filter(|handle| {
                let sent = handle.send(payload.to_string());
                if !sent {
                    tracing::debug!("Skipping stale connection '{}'", handle.id);
                }
                sent
            })
            .count()
    }
}

fn encode<T: Serialize>(event: &T) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!("Failed to serialize outbound event: {}", e);
            None
        }
    }
}

pub struct WebSocketGateway {
    presence: Arc<dyn PresenceRepository>,
    connections: Mutex<Connections>,
}

impl WebSocketGateway {
    pub fn new(presence: Arc<dyn PresenceRepository>) -> Self {
        Self {
            presence,
            connections: Mutex::new(Connections::default()),
        }
    }

    /// Number of attached transport connections, anonymous ones included.
    pub async fn connection_count(&self) -> usize {
        self.connections.lock().await.handles.len()
    }
}

#[async_trait]
impl ConnectionGateway for WebSocketGateway {
    async fn attach(&self, handle: ConnectionHandle) {
        // Held across the snapshot so no presence broadcast interleaves
        // between reading the set and queueing it.
        let mut connections = self.connections.lock().await;
        let online = self.presence.snapshot().await;
        if let Some(payload) = encode(&OnlineUsersEvent::from(&online)) {
            handle.send(payload);
        }
        tracing::debug!("Attached connection '{}'", handle.id);
        connections.handles.insert(handle.id, handle);
    }

    async fn detach(&self, connection_id: &ConnectionId) -> bool {
        let mut connections = self.connections.lock().await;
        connections.handles.remove(connection_id).is_some()
    }

    async fn send_to_user(&self, user_id: &UserId, message: &Message) -> bool {
        let Some(handle) = self.presence.lookup(user_id).await else {
            tracing::debug!("User '{}' is not connected; push dropped", user_id);
            return false;
        };
        if handle.is_closed() {
            tracing::warn!(
                "Connection '{}' of user '{}' is closed; push dropped",
                handle.id,
                user_id
            );
            return false;
        }
        let Some(payload) = encode(&NewMessageEvent::from(message)) else {
            return false;
        };
        if handle.send(payload) {
            true
        } else {
            tracing::warn!(
                "Connection '{}' of user '{}' went stale; push dropped",
                handle.id,
                user_id
            );
            false
        }
    }

    async fn broadcast_online_users(&self, online: &OnlineSet) -> usize {
        let mut connections = self.connections.lock().await;
        if let Some(last) = connections.last_broadcast_version
            && online.version <= last
        {
            tracing::debug!(
                "Skipping presence broadcast v{} (v{} already sent)",
                online.version,
                last
            );
            return 0;
        }
        connections.last_broadcast_version = Some(online.version);

        let Some(payload) = encode(&OnlineUsersEvent::from(online)) else {
            return 0;
        };
        let delivered = connections.broadcast_all(&payload);
        tracing::info!(
            "Broadcasted online users v{} ({} online) to {} connections",
            online.version,
            online.len(),
            delivered
        );
        delivered
    }
}
