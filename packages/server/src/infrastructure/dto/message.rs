//! Message DTO shared by the HTTP API and WebSocket events.

use hanashi_shared::time::timestamp_to_jst_rfc3339;
use serde::{Deserialize, Serialize};

use crate::domain::Message;

/// Wire representation of a persisted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub body: String,
    pub created_at: String, // ISO 8601
}

impl From<&Message> for MessageDto {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            sender_id: message.sender_id.as_str().to_string(),
            receiver_id: message.receiver_id.as_str().to_string(),
            body: message.body.as_str().to_string(),
            created_at: timestamp_to_jst_rfc3339(message.created_at.value()),
        }
    }
}
