//! Mapping of use case errors to HTTP responses.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    domain::RepositoryError,
    infrastructure::dto::http::{ErrorDetailDto, ErrorResponseDto},
    usecase::{GetMessagesError, SendMessageError},
};

#[derive(Debug, Error)]
pub enum ApiError {
    /// No authenticated user on the request
    #[error("Not authorized to access this route")]
    Unauthorized,

    /// Rejected input (missing sender, receiver or body, malformed JSON)
    #[error("{0}")]
    BadRequest(String),

    /// Storage failure; nothing was persisted
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SendMessageError> for ApiError {
    fn from(err: SendMessageError) -> Self {
        match err {
            SendMessageError::Validation(e) => ApiError::BadRequest(e.to_string()),
            SendMessageError::Persistence(e) => {
                tracing::error!("Failed to persist message: {}", e);
                ApiError::Internal(err_message(&e))
            }
        }
    }
}

impl From<GetMessagesError> for ApiError {
    fn from(err: GetMessagesError) -> Self {
        match err {
            GetMessagesError::Validation(e) => ApiError::BadRequest(e.to_string()),
            GetMessagesError::Persistence(e) => {
                tracing::error!("Failed to load messages: {}", e);
                ApiError::Internal(err_message(&e))
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection);
        ApiError::BadRequest(rejection.body_text())
    }
}

fn err_message(err: &RepositoryError) -> String {
    format!("Message store error: {err}")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponseDto {
            success: false,
            error: ErrorDetailDto {
                message: self.to_string(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}
