//! Data transfer objects for the HTTP API and WebSocket events.

pub mod http;
pub mod message;
pub mod websocket;
