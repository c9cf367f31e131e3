//! Server startup.

use std::sync::Arc;

use axum::http::HeaderValue;
use tokio::net::TcpListener;

use crate::{
    config::ServerConfig,
    domain::MessageRepository,
    error::ServerError,
    infrastructure::repository::{
        InMemoryMessageRepository, InMemoryPresenceRepository, SqliteMessageRepository,
    },
};

use super::{router::build_router, signal::shutdown_signal, state::AppState};

/// Build the state for `config` and serve until a shutdown signal arrives.
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let messages: Arc<dyn MessageRepository> = match &config.database_url {
        Some(url) => Arc::new(SqliteMessageRepository::connect(url).await?),
        None => {
            tracing::info!("No database configured; messages are kept in memory");
            Arc::new(InMemoryMessageRepository::new())
        }
    };
    let state = Arc::new(AppState::new(
        messages,
        Arc::new(InMemoryPresenceRepository::new()),
    ));

    let frontend_origin = config
        .frontend_origin
        .as_deref()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ServerError::InvalidOrigin(origin.to_string()))
        })
        .transpose()?;

    let app = build_router(state, frontend_origin);
    let listener = TcpListener::bind(config.addr()).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
