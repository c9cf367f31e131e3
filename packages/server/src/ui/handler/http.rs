//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    infrastructure::dto::{
        http::{ApiResponse, SendMessageRequest},
        message::MessageDto,
    },
    ui::{auth::AuthUser, error::ApiError, extract::ApiJson, state::AppState},
    usecase::{GetMessagesUseCase, SendMessageUseCase},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// `POST /api/v1/message/send/{receiver_id}`
///
/// Responds with the persisted message whether or not the recipient was
/// online.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    AuthUser(sender_id): AuthUser,
    Path(receiver_id): Path<String>,
    ApiJson(request): ApiJson<SendMessageRequest>,
) -> Result<Json<ApiResponse<MessageDto>>, ApiError> {
    let usecase = SendMessageUseCase::new(state.messages.clone(), state.gateway.clone());
    let outcome = usecase
        .execute(sender_id, receiver_id, request.message)
        .await?;

    Ok(Json(ApiResponse::ok(MessageDto::from(&outcome.message))))
}

/// `GET /api/v1/message/get-message/{participant_id}`
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    AuthUser(viewer_id): AuthUser,
    Path(participant_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<MessageDto>>>, ApiError> {
    let usecase = GetMessagesUseCase::new(state.messages.clone());
    let messages = usecase.execute(viewer_id, participant_id).await?;

    Ok(Json(ApiResponse::ok(
        messages.iter().map(MessageDto::from).collect(),
    )))
}

/// `GET /api/v1/presence/online`: current online user ids
pub async fn get_online_users(
    State(state): State<Arc<AppState>>,
    AuthUser(_viewer_id): AuthUser,
) -> Json<ApiResponse<Vec<String>>> {
    let online = state.presence.snapshot().await;

    Json(ApiResponse::ok(
        online.user_ids.into_iter().map(|id| id.into_string()).collect(),
    ))
}
