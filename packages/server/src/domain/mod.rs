//! Domain layer for the chat service.
//!
//! This module contains business logic that is independent of
//! data transfer objects (DTOs) and infrastructure concerns.

pub mod entity;
pub mod error;
pub mod factory;
pub mod gateway;
pub mod repository;
pub mod value_object;

pub use entity::{ConnectionHandle, Conversation, Message, OnlineSet};
pub use error::{RepositoryError, ValueObjectError};
pub use factory::{ConnectionIdFactory, ConversationIdFactory, MessageIdFactory};
pub use gateway::ConnectionGateway;
pub use repository::{MessageRepository, PresenceRepository};
pub use value_object::{
    ConnectionId, ConversationId, MessageBody, MessageId, ParticipantPair, Timestamp, UserId,
};
