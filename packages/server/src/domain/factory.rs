//! Domain factories for creating identifiers.

use super::value_object::{ConnectionId, ConversationId, MessageId};

/// Factory for generating MessageId instances.
pub struct MessageIdFactory;

impl MessageIdFactory {
    /// Generate a new MessageId with a random UUID v4.
    pub fn generate() -> MessageId {
        MessageId::from_uuid(uuid::Uuid::new_v4())
    }
}

/// Factory for generating ConversationId instances.
pub struct ConversationIdFactory;

impl ConversationIdFactory {
    /// Generate a new ConversationId with a random UUID v4.
    pub fn generate() -> ConversationId {
        ConversationId::from_uuid(uuid::Uuid::new_v4())
    }
}

/// Factory for generating ConnectionId instances.
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// Generate a new ConnectionId with a random UUID v4.
    pub fn generate() -> ConnectionId {
        ConnectionId::from_uuid(uuid::Uuid::new_v4())
    }
}
