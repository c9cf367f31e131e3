//! Server state shared by all handlers.

use serde::Deserialize;
use std::sync::Arc;

use crate::{
    domain::{ConnectionGateway, MessageRepository, PresenceRepository},
    infrastructure::{
        WebSocketGateway,
        repository::{InMemoryMessageRepository, InMemoryPresenceRepository},
    },
};

/// Query parameters of the WebSocket handshake
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    /// Identity asserted by the already-authenticated client; optional
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Shared application state
pub struct AppState {
    /// Message Store
    pub messages: Arc<dyn MessageRepository>,
    /// Presence Registry
    pub presence: Arc<dyn PresenceRepository>,
    /// Connection Gateway over the presence registry
    pub gateway: Arc<dyn ConnectionGateway>,
}

impl AppState {
    /// Wire a message store and a presence registry to a WebSocket gateway.
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        presence: Arc<dyn PresenceRepository>,
    ) -> Self {
        let gateway = Arc::new(WebSocketGateway::new(presence.clone()));
        Self {
            messages,
            presence,
            gateway,
        }
    }

    /// State backed entirely by in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryMessageRepository::new()),
            Arc::new(InMemoryPresenceRepository::new()),
        )
    }
}
