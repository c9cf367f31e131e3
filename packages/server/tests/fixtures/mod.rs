//! Test fixtures: an in-process server on an ephemeral port plus WebSocket helpers.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::StreamExt;
use hanashi_server::ui::{AppState, build_router};
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestServer {
    addr: SocketAddr,
    pub state: Arc<AppState>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a server backed by in-memory stores.
    pub async fn start() -> Self {
        Self::with_state(AppState::in_memory()).await
    }

    pub async fn with_state(state: AppState) -> Self {
        let state = Arc::new(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");
        let app = build_router(state.clone(), None);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, user_id: Option<&str>) -> String {
        match user_id {
            Some(id) => format!("ws://{}/ws?userId={}", self.addr, id),
            None => format!("ws://{}/ws", self.addr),
        }
    }

    pub async fn connect(&self, user_id: Option<&str>) -> WsClient {
        let (ws, _) = connect_async(self.ws_url(user_id))
            .await
            .expect("Failed to connect WebSocket");
        ws
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Next JSON event, or `None` if nothing arrives within `wait`.
pub async fn next_event_within(ws: &mut WsClient, wait: Duration) -> Option<serde_json::Value> {
    loop {
        let frame = tokio::time::timeout(wait, ws.next()).await.ok()??.ok()?;
        if frame.is_text() {
            let text = frame.into_text().ok()?;
            return serde_json::from_str(&text).ok();
        }
    }
}

pub async fn next_event(ws: &mut WsClient) -> serde_json::Value {
    next_event_within(ws, Duration::from_secs(3))
        .await
        .expect("Expected a WebSocket event")
}

/// Read events until an `online-users` event equal to `expected` arrives.
/// Skipped events are returned so callers can assert on them.
pub async fn wait_for_online(ws: &mut WsClient, expected: &[&str]) -> Vec<serde_json::Value> {
    let expected = serde_json::json!(expected);
    let mut skipped = Vec::new();
    loop {
        let event = next_event(ws).await;
        if event["type"] == "online-users" && event["userIds"] == expected {
            return skipped;
        }
        skipped.push(event);
    }
}
