//! Core domain models for the chat service.

use tokio::sync::mpsc::UnboundedSender;

use super::value_object::{
    ConnectionId, ConversationId, MessageBody, MessageId, ParticipantPair, Timestamp, UserId,
};

/// A persisted one-to-one chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub body: MessageBody,
    pub created_at: Timestamp,
}

impl Message {
    /// Create a new message
    pub fn new(
        id: MessageId,
        sender_id: UserId,
        receiver_id: UserId,
        body: MessageBody,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            sender_id,
            receiver_id,
            body,
            created_at,
        }
    }
}

/// The persistent grouping of all messages between two users.
///
/// Holds message references in insertion order, which is creation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: ParticipantPair,
    pub message_ids: Vec<MessageId>,
    pub created_at: Timestamp,
}

impl Conversation {
    /// Create a new empty conversation
    pub fn new(id: ConversationId, participants: ParticipantPair, created_at: Timestamp) -> Self {
        Self {
            id,
            participants,
            message_ids: Vec::new(),
            created_at,
        }
    }

    /// Append a message reference. A reference already present is not added twice.
    pub fn append(&mut self, message_id: MessageId) {
        if !self.message_ids.contains(&message_id) {
            self.message_ids.push(message_id);
        }
    }
}

/// Opaque handle to one live, bidirectional real-time connection.
///
/// Cloning the handle shares the underlying channel; the writer task owning
/// the receiving half forwards queued payloads to the socket.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    sender: UnboundedSender<String>,
    pub connected_at: Timestamp,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, sender: UnboundedSender<String>, connected_at: Timestamp) -> Self {
        Self {
            id,
            sender,
            connected_at,
        }
    }

    /// Queue a payload for this connection.
    ///
    /// Returns `false` when the connection has already gone away (stale handle).
    pub fn send(&self, payload: String) -> bool {
        self.sender.send(payload).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// The set of currently reachable users, derived from the presence registry.
///
/// `version` increases on every registry mutation, so two sets can be
/// ordered by recency.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OnlineSet {
    pub version: u64,
    pub user_ids: Vec<UserId>,
}

impl OnlineSet {
    pub fn new(version: u64, mut user_ids: Vec<UserId>) -> Self {
        user_ids.sort();
        Self { version, user_ids }
    }

    pub fn len(&self) -> usize {
        self.user_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty()
    }
}
