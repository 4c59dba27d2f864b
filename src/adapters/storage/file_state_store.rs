//! File-based Conversation State Store Adapter
//!
//! Stores one JSON blob per conversation under a base directory. Writes go
//! to a temporary file first and are renamed into place, so a reader sees
//! either the old blob or the new one.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStateStore, StateStoreError};

/// File-based storage for dialog state
#[derive(Debug, Clone)]
pub struct FileStateStore {
    base_path: PathBuf,
}

impl FileStateStore {
    /// Create a new file store with a base directory
    ///
    /// The directory is created on first save.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the state file path for a conversation
    fn state_file_path(&self, conversation_id: &ConversationId) -> PathBuf {
        self.base_path
            .join(format!("{}.json", file_stem(conversation_id)))
    }

    fn temp_file_path(&self, conversation_id: &ConversationId) -> PathBuf {
        self.base_path.join(format!(
            ".{}.{}.tmp",
            file_stem(conversation_id),
            Uuid::new_v4()
        ))
    }
}

/// Channel ids may contain path separators; everything outside a small
/// safe set is percent-encoded.
fn file_stem(conversation_id: &ConversationId) -> String {
    let mut stem = String::with_capacity(conversation_id.as_str().len());
    for byte in conversation_id.as_str().bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' => stem.push(byte as char),
            _ => stem.push_str(&format!("%{:02X}", byte)),
        }
    }
    stem
}

#[async_trait]
impl ConversationStateStore for FileStateStore {
    async fn load(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<String>, StateStoreError> {
        let file_path = self.state_file_path(conversation_id);

        match fs::read_to_string(&file_path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(
        &self,
        conversation_id: &ConversationId,
        blob: &str,
    ) -> Result<(), StateStoreError> {
        fs::create_dir_all(&self.base_path).await?;

        let temp_path = self.temp_file_path(conversation_id);
        let written = match fs::write(&temp_path, blob).await {
            Ok(()) => fs::rename(&temp_path, self.state_file_path(conversation_id)).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        tracing::trace!(conversation_id = %conversation_id, bytes = blob.len(), "State written");
        Ok(())
    }

    async fn delete(&self, conversation_id: &ConversationId) -> Result<(), StateStoreError> {
        match fs::remove_file(self.state_file_path(conversation_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (FileStateStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStateStore::new(temp_dir.path().join("state"));
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_file_store_save_and_load() {
        let (store, _temp) = setup();
        let id = ConversationId::new();

        store.save(&id, r#"{"turn_count":1}"#).await.unwrap();

        let loaded = store.load(&id).await.unwrap();
        assert_eq!(loaded.as_deref(), Some(r#"{"turn_count":1}"#));
    }

    #[tokio::test]
    async fn test_file_store_load_missing_is_none() {
        let (store, _temp) = setup();

        let loaded = store.load(&ConversationId::new()).await.unwrap();

        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_file_store_overwrite_leaves_no_temp_files() {
        let (store, _temp) = setup();
        let id = ConversationId::new();

        store.save(&id, "first").await.unwrap();
        store.save(&id, "second").await.unwrap();

        assert_eq!(store.load(&id).await.unwrap().as_deref(), Some("second"));
        let entries: Vec<_> = std::fs::read_dir(store.base_path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].ends_with(".json"));
    }

    #[tokio::test]
    async fn test_file_store_failed_save_removes_temp_file() {
        let (store, _temp) = setup();
        let id = ConversationId::from_string("blocked").unwrap();
        // A non-empty directory where the state file belongs makes the rename fail.
        let blocker = store.state_file_path(&id);
        std::fs::create_dir_all(blocker.join("inner")).unwrap();

        let result = store.save(&id, "blob").await;

        assert!(matches!(result, Err(StateStoreError::Io(_))));
        let entries: Vec<_> = std::fs::read_dir(store.base_path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["blocked.json".to_string()]);
    }

    #[tokio::test]
    async fn test_file_store_delete_is_idempotent() {
        let (store, _temp) = setup();
        let id = ConversationId::new();
        store.save(&id, "blob").await.unwrap();

        store.delete(&id).await.unwrap();
        store.delete(&id).await.unwrap();

        assert!(store.load(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_escapes_unsafe_ids() {
        let (store, _temp) = setup();
        let id = ConversationId::from_string("../msteams:19/abc").unwrap();

        store.save(&id, "blob").await.unwrap();

        assert_eq!(store.load(&id).await.unwrap().as_deref(), Some("blob"));
        assert!(store
            .state_file_path(&id)
            .starts_with(store.base_path()));
        assert_eq!(file_stem(&id), "%2E%2E%2Fmsteams%3A19%2Fabc");
    }

    #[tokio::test]
    async fn test_file_store_distinct_conversations() {
        let (store, _temp) = setup();
        let a = ConversationId::from_string("a").unwrap();
        let b = ConversationId::from_string("b").unwrap();

        store.save(&a, "blob-a").await.unwrap();
        store.save(&b, "blob-b").await.unwrap();

        assert_eq!(store.load(&a).await.unwrap().as_deref(), Some("blob-a"));
        assert_eq!(store.load(&b).await.unwrap().as_deref(), Some("blob-b"));
    }
}
