//! WebSocket event DTOs.
//!
//! Every outbound frame is a JSON object whose `type` names the channel.

use serde::{Deserialize, Serialize};

use super::message::MessageDto;
use crate::domain::{Message, OnlineSet};

/// Event type enum
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventType {
    OnlineUsers,
    NewMessage,
}

/// Full online-user set, sent on every presence change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUsersEvent {
    pub r#type: EventType,
    pub user_ids: Vec<String>,
}

impl From<&OnlineSet> for OnlineUsersEvent {
    fn from(online: &OnlineSet) -> Self {
        Self {
            r#type: EventType::OnlineUsers,
            user_ids: online
                .user_ids
                .iter()
                .map(|id| id.as_str().to_string())
                .collect(),
        }
    }
}

/// Message pushed to its recipient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessageEvent {
    pub r#type: EventType,
    pub message: MessageDto,
}

impl From<&Message> for NewMessageEvent {
    fn from(message: &Message) -> Self {
        Self {
            r#type: EventType::NewMessage,
            message: MessageDto::from(message),
        }
    }
}
