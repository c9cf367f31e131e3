//! SQLite 実装

pub mod message;

pub use message::SqliteMessageRepository;
