//! Process-local session store.

use super::{NewSession, SessionId, SessionRecord, SessionStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

/// In-memory store backed by a map and an id sequence.
///
/// Ids start at 1 and are never reused within the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    records: RwLock<HashMap<SessionId, SessionRecord>>,
    sequence: AtomicI64,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: NewSession) -> Result<SessionId, StoreError> {
        let session_id = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.records
            .write()
            .await
            .insert(session_id, SessionRecord::from_new(session_id, session));
        Ok(session_id)
    }

    async fn get(&self, session_id: SessionId) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.records.read().await.get(&session_id).cloned())
    }

    async fn delete(&self, session_id: SessionId) -> Result<bool, StoreError> {
        Ok(self.records.write().await.remove(&session_id).is_some())
    }

    async fn exists(&self, session_id: SessionId) -> Result<bool, StoreError> {
        Ok(self.records.read().await.contains_key(&session_id))
    }
}
