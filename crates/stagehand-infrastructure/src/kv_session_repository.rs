//! Key-value-backed SessionRepository implementation.
//!
//! Serializes sessions as JSON under a namespaced key
//! (`{namespace}:session:{user_id}`) and retries transient store failures
//! with bounded backoff before failing the request. A failed save leaves the
//! previously persisted session untouched; partial sessions are never
//! written.

use crate::kv::KeyValueStore;
use async_trait::async_trait;
use stagehand_core::action::UserId;
use stagehand_core::error::{Result, StagehandError};
use stagehand_core::session::{Session, SessionRepository};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// [`SessionRepository`] over any [`KeyValueStore`].
pub struct KvSessionRepository {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
    max_retries: u32,
    backoff: Duration,
}

impl KvSessionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            max_retries: 2,
            backoff: Duration::from_millis(50),
        }
    }

    /// Overrides the retry policy for transient store errors.
    pub fn with_retry(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.backoff = backoff;
        self
    }

    fn key(&self, user_id: UserId) -> String {
        format!("{}:session:{}", self.namespace, user_id)
    }

    async fn with_backoff<T, F, Fut>(&self, op_name: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(op = op_name, attempt, error = %err, "transient store error, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl SessionRepository for KvSessionRepository {
    async fn find(&self, user_id: UserId) -> Result<Option<Session>> {
        let key = self.key(user_id);
        let raw = self.with_backoff("get", || self.store.get(&key)).await?;
        match raw {
            Some(bytes) => {
                let session = serde_json::from_slice(&bytes)
                    .map_err(|e| StagehandError::serialization(e.to_string()))?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, session: &Session, ttl: Duration) -> Result<()> {
        let key = self.key(session.user_id);
        let bytes = serde_json::to_vec(session)
            .map_err(|e| StagehandError::serialization(e.to_string()))?;
        self.with_backoff("set", || self.store.set(&key, bytes.clone(), Some(ttl)))
            .await
    }

    async fn delete(&self, user_id: UserId) -> Result<()> {
        let key = self.key(user_id);
        self.with_backoff("delete", || self.store.delete(&key))
            .await
    }
}
