//! Authentication context.
//!
//! Credentials are verified by the external auth middleware, which forwards
//! the verified user id in the [`USER_ID_HEADER`] header. This extractor
//! only reads it; it never re-validates credentials.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::error::ApiError;

/// Header carrying the verified user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller of a request
///
/// The raw header value; normalization happens in `UserId::new`, the same
/// as for the WebSocket handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.trim().is_empty())
            .map(|value| AuthUser(value.to_string()))
            .ok_or(ApiError::Unauthorized)
    }
}
