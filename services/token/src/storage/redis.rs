use super::{Fingerprint, NewSession, SessionId, SessionRecord, SessionStore, StoreError};
use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use tracing::debug;

const FIELD_SUBJECT: &str = "subject";
const FIELD_SECRET_HASH: &str = "secret_hash";
const FIELD_USER_AGENT: &str = "user_agent";
const FIELD_ADDRESS: &str = "address";

/// Redis-backed session store.
///
/// Ids come from `INCR {prefix}:seq`; each record is a hash at
/// `{prefix}:{id}` written in a single `MULTI/EXEC`.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisSessionStore {
    pub async fn connect(redis_url: &str, prefix: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            prefix: prefix.into(),
        })
    }
}

fn sequence_key(prefix: &str) -> String {
    format!("{prefix}:seq")
}

fn record_key(prefix: &str, session_id: SessionId) -> String {
    format!("{prefix}:{session_id}")
}

fn parse_record(
    session_id: SessionId,
    mut fields: HashMap<String, String>,
) -> Result<SessionRecord, StoreError> {
    let mut take = |name: &str| {
        fields.remove(name).ok_or_else(|| StoreError::Corrupt {
            session_id,
            reason: format!("missing field {name}"),
        })
    };

    let subject = take(FIELD_SUBJECT)?;
    let secret_hash = take(FIELD_SECRET_HASH)?;
    let user_agent = take(FIELD_USER_AGENT)?;
    let address = take(FIELD_ADDRESS)?;

    Ok(SessionRecord {
        session_id,
        subject,
        secret_hash,
        fingerprint: Fingerprint {
            user_agent,
            address,
        },
    })
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn create(&self, session: NewSession) -> Result<SessionId, StoreError> {
        let mut conn = self.conn.clone();
        let session_id: SessionId = conn.incr(sequence_key(&self.prefix), 1).await?;
        let key = record_key(&self.prefix, session_id);

        let _: () = redis::pipe()
            .atomic()
            .hset_multiple(
                &key,
                &[
                    (FIELD_SUBJECT, session.subject.as_str()),
                    (FIELD_SECRET_HASH, session.secret_hash.as_str()),
                    (FIELD_USER_AGENT, session.fingerprint.user_agent.as_str()),
                    (FIELD_ADDRESS, session.fingerprint.address.as_str()),
                ],
            )
            .ignore()
            .query_async(&mut conn)
            .await?;

        debug!(session_id, key = %key, "Stored session");
        Ok(session_id)
    }

    async fn get(&self, session_id: SessionId) -> Result<Option<SessionRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let fields: HashMap<String, String> =
            conn.hgetall(record_key(&self.prefix, session_id)).await?;

        if fields.is_empty() {
            return Ok(None);
        }
        parse_record(session_id, fields).map(Some)
    }

    async fn delete(&self, session_id: SessionId) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(record_key(&self.prefix, session_id)).await?;
        Ok(removed > 0)
    }

    async fn exists(&self, session_id: SessionId) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(record_key(&self.prefix, session_id)).await?;
        Ok(exists)
    }
}
