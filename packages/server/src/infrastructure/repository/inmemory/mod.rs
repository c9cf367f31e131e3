//! インメモリ実装

pub mod message;
pub mod presence;

pub use message::InMemoryMessageRepository;
pub use presence::InMemoryPresenceRepository;
