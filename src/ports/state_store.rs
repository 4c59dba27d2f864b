//! Conversation State Store Port - Interface for persisting dialog state.
//!
//! The store keeps one opaque blob per conversation. It never inspects the
//! blob; serialization is owned by the turn handler.

use async_trait::async_trait;

use crate::domain::foundation::ConversationId;

/// Errors that can occur during state store operations
#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("State store unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StateStoreError {
    fn from(err: std::io::Error) -> Self {
        StateStoreError::Io(err.to_string())
    }
}

/// Port for loading and saving per-conversation dialog state
#[async_trait]
pub trait ConversationStateStore: Send + Sync {
    /// Load the stored blob
    ///
    /// # Returns
    /// `None` if the conversation has no stored state
    ///
    /// # Errors
    /// Returns `StateStoreError` if the store cannot be read
    async fn load(&self, conversation_id: &ConversationId)
        -> Result<Option<String>, StateStoreError>;

    /// Replace the stored blob
    ///
    /// # Errors
    /// Returns `StateStoreError` if the write fails; the previous blob is
    /// then still in place
    async fn save(&self, conversation_id: &ConversationId, blob: &str)
        -> Result<(), StateStoreError>;

    /// Remove the stored blob; missing state is not an error
    async fn delete(&self, conversation_id: &ConversationId) -> Result<(), StateStoreError>;
}
