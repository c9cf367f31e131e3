//! Repository traits.
//!
//! The domain defines what it needs from storage; `infrastructure` provides
//! the implementations (dependency inversion).

use async_trait::async_trait;

use super::{
    entity::{ConnectionHandle, Conversation, Message, OnlineSet},
    error::RepositoryError,
    value_object::{ConnectionId, ConversationId, MessageBody, MessageId, UserId},
};

/// Message Store: durable persistence of messages and the conversations grouping them.
///
/// Messages and conversations are create/read only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find the conversation for the unordered pair `{user_a, user_b}`.
    async fn find_conversation(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Option<Conversation>, RepositoryError>;

    /// Create the conversation for `{user_a, user_b}`.
    ///
    /// If a concurrent caller created it first, the existing conversation is
    /// returned instead of a duplicate.
    async fn create_conversation(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Conversation, RepositoryError>;

    /// Atomic find-or-create for `{user_a, user_b}`.
    async fn find_or_create_conversation(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Conversation, RepositoryError>;

    /// Persist a new message with a fresh id and creation time.
    async fn create_message(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        body: MessageBody,
    ) -> Result<Message, RepositoryError>;

    /// Append a message reference to a conversation, after all earlier ones.
    async fn append_message_to_conversation(
        &self,
        conversation_id: &ConversationId,
        message_id: &MessageId,
    ) -> Result<(), RepositoryError>;

    /// Create a message and append it to `conversation_id` in one step.
    ///
    /// Either both writes happen or neither does; a failed append leaves no
    /// orphan message behind.
    async fn persist_message(
        &self,
        conversation_id: &ConversationId,
        sender_id: UserId,
        receiver_id: UserId,
        body: MessageBody,
    ) -> Result<Message, RepositoryError>;

    /// Messages between `{user_a, user_b}` in creation order.
    ///
    /// Returns an empty list when the pair has no conversation yet.
    async fn get_messages_for_conversation(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Vec<Message>, RepositoryError>;
}

/// Presence Registry: process-wide mapping from user to live connection.
///
/// At most one entry per user; registering again replaces the previous
/// handle. Every mutation that changes the registry returns the resulting
/// [`OnlineSet`], stamped with a fresh version.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresenceRepository: Send + Sync {
    /// Insert or overwrite the entry for `user_id`.
    async fn register(&self, user_id: UserId, handle: ConnectionHandle) -> OnlineSet;

    /// Remove the entry for `user_id`. `None` when there was no entry.
    async fn unregister(&self, user_id: &UserId) -> Option<OnlineSet>;

    /// Remove the entry owned by `connection_id`, if that connection still owns one.
    async fn unregister_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Option<(UserId, OnlineSet)>;

    async fn lookup(&self, user_id: &UserId) -> Option<ConnectionHandle>;

    /// Current online set.
    async fn snapshot(&self) -> OnlineSet;
}
