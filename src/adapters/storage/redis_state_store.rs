//! Redis-backed conversation state store for multi-process deployments.
//!
//! Each conversation is one string key `<prefix>:<conversation_id>`.
//! Saves are a single `SET` (with `EX` when a TTL is configured), so a
//! write either replaces the blob or leaves it untouched.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::config::RedisConfig;
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStateStore, StateStoreError};

#[derive(Clone)]
pub struct RedisStateStore {
    conn: MultiplexedConnection,
    key_prefix: String,
    ttl_secs: Option<u64>,
}

impl RedisStateStore {
    /// Create a store over an established connection.
    pub fn new(conn: MultiplexedConnection, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
            ttl_secs: None,
        }
    }

    /// Expire idle conversations after `ttl_secs`. Every save refreshes it.
    pub fn with_ttl(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = (ttl_secs > 0).then_some(ttl_secs);
        self
    }

    /// Connect using the configured URL, timeout, prefix and TTL.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the URL is invalid or the server cannot be
    /// reached within the timeout.
    pub async fn connect(config: &RedisConfig) -> Result<Self, StateStoreError> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| StateStoreError::Unavailable(e.to_string()))?;

        let conn = tokio::time::timeout(
            config.timeout(),
            client.get_multiplexed_tokio_connection(),
        )
        .await
        .map_err(|_| StateStoreError::Unavailable("connection timed out".to_string()))?
        .map_err(|e| StateStoreError::Unavailable(e.to_string()))?;

        tracing::info!(key_prefix = %config.key_prefix, "Connected to Redis state store");
        Ok(Self::new(conn, config.key_prefix.clone()).with_ttl(config.ttl_secs))
    }
}

fn state_key(prefix: &str, conversation_id: &ConversationId) -> String {
    format!("{}:{}", prefix, conversation_id)
}

fn backend_error(e: redis::RedisError) -> StateStoreError {
    if e.is_io_error() || e.is_connection_dropped() || e.is_timeout() {
        StateStoreError::Unavailable(e.to_string())
    } else {
        StateStoreError::Backend(e.to_string())
    }
}

#[async_trait]
impl ConversationStateStore for RedisStateStore {
    async fn load(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Option<String>, StateStoreError> {
        let key = state_key(&self.key_prefix, conversation_id);
        let mut conn = self.conn.clone();

        conn.get::<_, Option<String>>(&key)
            .await
            .map_err(backend_error)
    }

    async fn save(
        &self,
        conversation_id: &ConversationId,
        blob: &str,
    ) -> Result<(), StateStoreError> {
        let key = state_key(&self.key_prefix, conversation_id);
        let mut conn = self.conn.clone();

        match self.ttl_secs {
            Some(ttl) => redis::cmd("SET")
                .arg(&key)
                .arg(blob)
                .arg("EX")
                .arg(ttl)
                .query_async::<_, ()>(&mut conn)
                .await
                .map_err(backend_error),
            None => conn.set::<_, _, ()>(&key, blob).await.map_err(backend_error),
        }
    }

    async fn delete(&self, conversation_id: &ConversationId) -> Result<(), StateStoreError> {
        let key = state_key(&self.key_prefix, conversation_id);
        let mut conn = self.conn.clone();

        conn.del::<_, ()>(&key).await.map_err(backend_error)
    }
}

impl std::fmt::Debug for RedisStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStateStore")
            .field("key_prefix", &self.key_prefix)
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
