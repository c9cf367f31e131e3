//! Route table.

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{
    auth::USER_ID_HEADER,
    handler::{get_messages, get_online_users, health_check, send_message, websocket_handler},
    state::AppState,
};

/// Build the application router.
///
/// When `frontend_origin` is set, cross-origin requests with credentials are
/// allowed from that origin only.
pub fn build_router(state: Arc<AppState>, frontend_origin: Option<HeaderValue>) -> Router {
    let router = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/v1/message/send/{receiver_id}", post(send_message))
        .route(
            "/api/v1/message/get-message/{participant_id}",
            get(get_messages),
        )
        .route("/api/v1/presence/online", get(get_online_users))
        .route("/ws", get(websocket_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    match frontend_origin {
        Some(origin) => router.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(USER_ID_HEADER)])
                .allow_credentials(true),
        ),
        None => router,
    }
}
