//! Infrastructure layer: storage backends, the WebSocket gateway and wire DTOs.

pub mod dto;
pub mod gateway;
pub mod repository;

pub use gateway::WebSocketGateway;
