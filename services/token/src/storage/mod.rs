//! Credential store: one record per outstanding refresh token.
//!
//! Implementations must make create/get/delete of a single record atomic
//! and a freshly created id visible to any caller immediately. `delete`
//! reports whether it actually removed something; the rotation engine
//! relies on that to let only one of two racing refreshes win.

pub mod memory;
pub mod redis;

pub use memory::MemorySessionStore;
pub use self::redis::RedisSessionStore;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Store-assigned surrogate key of a session.
pub type SessionId = i64;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Session {session_id} is corrupt: {reason}")]
    Corrupt { session_id: SessionId, reason: String },
}

impl From<::redis::RedisError> for StoreError {
    fn from(err: ::redis::RedisError) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Client context captured at issuance or last rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub user_agent: String,
    pub address: String,
}

impl Fingerprint {
    pub fn new(user_agent: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            address: address.into(),
        }
    }
}

/// A session about to be persisted; the store assigns its id.
#[derive(Clone, PartialEq, Eq)]
pub struct NewSession {
    pub subject: String,
    pub secret_hash: String,
    pub fingerprint: Fingerprint,
}

/// A persisted session.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub subject: String,
    /// bcrypt hash of the refresh secret
    pub secret_hash: String,
    pub fingerprint: Fingerprint,
}

impl SessionRecord {
    pub fn from_new(session_id: SessionId, session: NewSession) -> Self {
        Self {
            session_id,
            subject: session.subject,
            secret_hash: session.secret_hash,
            fingerprint: session.fingerprint,
        }
    }
}

impl fmt::Debug for NewSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewSession")
            .field("subject", &self.subject)
            .field("secret_hash", &"<redacted>")
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl fmt::Debug for SessionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRecord")
            .field("session_id", &self.session_id)
            .field("subject", &self.subject)
            .field("secret_hash", &"<redacted>")
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// Keyed store of session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session and return its id.
    async fn create(&self, session: NewSession) -> Result<SessionId, StoreError>;

    /// Point lookup by id.
    async fn get(&self, session_id: SessionId) -> Result<Option<SessionRecord>, StoreError>;

    /// Remove a session. `Ok(false)` if it was already absent.
    async fn delete(&self, session_id: SessionId) -> Result<bool, StoreError>;

    async fn exists(&self, session_id: SessionId) -> Result<bool, StoreError>;
}
