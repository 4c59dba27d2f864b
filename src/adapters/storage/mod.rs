//! Storage Adapters
//!
//! Implementations of the ConversationStateStore port.
//!
//! ## Available Adapters
//!
//! - **InMemoryStateStore** - Stores state in memory (testing/development)
//! - **FileStateStore** - One JSON file per conversation on disk
//! - **RedisStateStore** - One Redis key per conversation, optional TTL
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileStateStore, InMemoryStateStore};
//!
//! // Single process, survives restarts
//! let store = FileStateStore::new("./data/conversations");
//!
//! // Testing: in-memory storage
//! let store = InMemoryStateStore::new();
//! ```

mod file_state_store;
mod in_memory_state_store;
mod redis_state_store;

pub use file_state_store::FileStateStore;
pub use in_memory_state_store::InMemoryStateStore;
pub use redis_state_store::RedisStateStore;
