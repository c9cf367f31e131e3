//! One-to-one chat server library.
//!
//! Tracks which users are reachable over a live WebSocket connection,
//! persists conversations and messages, and pushes each new message to its
//! recipient when they are online.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry point
pub use ui::run as run_server;
