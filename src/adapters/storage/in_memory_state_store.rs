//! In-Memory Conversation State Store Adapter
//!
//! Stores dialog state blobs in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStateStore, StateStoreError};

/// In-memory storage for dialog state
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateStore {
    blobs: Arc<RwLock<HashMap<ConversationId, String>>>,
    saves: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
}

impl InMemoryStateStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.blobs.write().await.clear();
    }

    /// Get the number of stored conversations
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    /// Number of successful saves since creation
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make subsequent saves fail with `Unavailable` (useful for tests)
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConversationStateStore for InMemoryStateStore {
    async fn load(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<String>, StateStoreError> {
        let blobs = self.blobs.read().await;
        Ok(blobs.get(conversation_id).cloned())
    }

    async fn save(
        &self,
        conversation_id: &ConversationId,
        blob: &str,
    ) -> Result<(), StateStoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StateStoreError::Unavailable(
                "in-memory store is rejecting writes".to_string(),
            ));
        }
        let mut blobs = self.blobs.write().await;
        blobs.insert(conversation_id.clone(), blob.to_string());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, conversation_id: &ConversationId) -> Result<(), StateStoreError> {
        self.blobs.write().await.remove(conversation_id);
        Ok(())
    }
}
