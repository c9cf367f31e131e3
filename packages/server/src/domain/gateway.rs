//! Connection Gateway seen from the domain.
//!
//! Use cases talk to live connections only through this trait; the
//! WebSocket implementation lives in `infrastructure::gateway`.

use async_trait::async_trait;

use super::{
    entity::{ConnectionHandle, Message, OnlineSet},
    value_object::{ConnectionId, UserId},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectionGateway: Send + Sync {
    /// Track an accepted transport connection so it receives broadcasts.
    ///
    /// The connection is sent the current online set right away.
    async fn attach(&self, handle: ConnectionHandle);

    /// Stop tracking a connection. Returns `false` if it was not attached.
    async fn detach(&self, connection_id: &ConnectionId) -> bool;

    /// Push `message` to the live connection of `user_id`.
    ///
    /// Returns `false` when the user is not connected or the connection went
    /// stale; the payload is dropped, never queued.
    async fn send_to_user(&self, user_id: &UserId, message: &Message) -> bool;

    /// Broadcast the online set to every attached connection.
    ///
    /// A set older than one already broadcast is skipped. Returns the number
    /// of connections the event was queued for.
    async fn broadcast_online_users(&self, online: &OnlineSet) -> usize;
}
