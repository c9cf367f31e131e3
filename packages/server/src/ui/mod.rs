//! HTTP/WebSocket server: routing, handlers and startup.

pub mod auth;
pub mod error;
pub mod extract;
mod handler;
pub mod router;
mod runner;
mod signal;
pub mod state;

pub use router::build_router;
pub use runner::run;
pub use state::AppState;
