//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - Conversation state stores (in-memory, file, Redis)

pub mod storage;

pub use storage::{FileStateStore, InMemoryStateStore, RedisStateStore};
