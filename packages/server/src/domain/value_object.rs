//! Value Objects for domain models.
//!
//! Value Objects are immutable objects that represent values in the domain.
//! They are compared by their value, not by identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ValueObjectError;

/// Maximum length of a user identifier
pub const USER_ID_MAX_LENGTH: usize = 100;

/// Maximum length of a message body
pub const MESSAGE_BODY_MAX_LENGTH: usize = 10000;

/// User identifier value object.
///
/// The identity is asserted by the external authentication layer and is
/// never re-verified here; only its shape is validated. Surrounding
/// whitespace is not part of the id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId.
    ///
    /// # Errors
    ///
    /// Returns `ValueObjectError::UserIdEmpty` for an empty or blank string
    /// and `ValueObjectError::UserIdTooLong` above [`USER_ID_MAX_LENGTH`].
    pub fn new(id: String) -> Result<Self, ValueObjectError> {
        let trimmed_len = id.trim().len();
        if trimmed_len == 0 {
            return Err(ValueObjectError::UserIdEmpty);
        }
        let id = if trimmed_len == id.len() {
            id
        } else {
            id.trim().to_string()
        };
        let len = id.chars().count();
        if len > USER_ID_MAX_LENGTH {
            return Err(ValueObjectError::UserIdTooLong {
                max: USER_ID_MAX_LENGTH,
                actual: len,
            });
        }
        Ok(Self(id))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! uuid_value_object {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Wrap an already generated UUID.
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
    // Ids that are read back from storage also get a parser.
    ($(#[$meta:meta])* $name:ident, $error:ident) => {
        uuid_value_object!($(#[$meta])* $name);

        impl $name {
            /// Parse from the hyphenated UUID string form.
            pub fn parse(id: &str) -> Result<Self, ValueObjectError> {
                uuid::Uuid::parse_str(id)
                    .map(Self)
                    .map_err(|_| ValueObjectError::$error(id.to_string()))
            }
        }
    };
}

uuid_value_object!(
    /// Message identifier value object (UUID v4).
    MessageId,
    MessageIdInvalidFormat
);

uuid_value_object!(
    /// Conversation identifier value object (UUID v4).
    ConversationId,
    ConversationIdInvalidFormat
);

uuid_value_object!(
    /// Identifier of one live real-time connection (UUID v4).
    ConnectionId
);

/// Message body value object.
///
/// Represents the text of a chat message with validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody(String);

impl MessageBody {
    /// Create a new MessageBody.
    ///
    /// # Errors
    ///
    /// Returns `ValueObjectError::MessageBodyEmpty` for an empty string and
    /// `ValueObjectError::MessageBodyTooLong` above [`MESSAGE_BODY_MAX_LENGTH`].
    pub fn new(body: String) -> Result<Self, ValueObjectError> {
        if body.is_empty() {
            return Err(ValueObjectError::MessageBodyEmpty);
        }
        let len = body.chars().count();
        if len > MESSAGE_BODY_MAX_LENGTH {
            return Err(ValueObjectError::MessageBodyTooLong {
                max: MESSAGE_BODY_MAX_LENGTH,
                actual: len,
            });
        }
        Ok(Self(body))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for MessageBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp value object.
///
/// Represents a Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create a new Timestamp from Unix milliseconds.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Current time.
    pub fn now() -> Self {
        Self(hanashi_shared::time::get_jst_timestamp())
    }

    /// Get the inner i64 value.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unordered pair of conversation participants.
///
/// The two ids are stored in canonical (sorted) order, so `{A, B}` and
/// `{B, A}` are equal and hash identically. This is the natural key of a
/// conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantPair {
    low: UserId,
    high: UserId,
}

impl ParticipantPair {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// The lexicographically smaller participant.
    pub fn low(&self) -> &UserId {
        &self.low
    }

    /// The lexicographically greater participant.
    pub fn high(&self) -> &UserId {
        &self.high
    }
}
