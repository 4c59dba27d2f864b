//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `ConversationStateStore` - Per-conversation dialog state persistence

mod state_store;

pub use state_store::{ConversationStateStore, StateStoreError};
