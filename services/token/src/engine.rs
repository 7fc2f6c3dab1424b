//! Token lifecycle engine: issuance, validation, rotation and fingerprint
//! binding.
//!
//! The engine keeps no mutable state of its own. Every operation is a short
//! sequence of store calls on the one session it acts on, so concurrent
//! requests never need an application-level lock. Two refreshes racing on
//! the same session are settled by `SessionStore::delete`: only the caller
//! that actually removes the old record goes on to mint a new pair.

use crate::config::{Config, StoreBackend};
use crate::error::TokenError;
use crate::jwt::{AccessClaims, AccessTokenCodec, JwtCodec};
use crate::metrics;
use crate::notify::{AddressChange, AnomalyNotifier, NoopNotifier, WebhookNotifier};
use crate::refresh::{RefreshSecret, SecretHasher};
use crate::storage::{
    Fingerprint, MemorySessionStore, NewSession, RedisSessionStore, SessionId, SessionRecord,
    SessionStore,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Access token plus the raw refresh secret, returned exactly once.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    /// Hex form of the refresh secret; wire encoding is up to the caller.
    pub refresh_token: String,
    pub session_id: SessionId,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("session_id", &self.session_id)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct RotationEngine {
    store: Arc<dyn SessionStore>,
    codec: Arc<dyn AccessTokenCodec>,
    hasher: SecretHasher,
    notifier: Arc<dyn AnomalyNotifier>,
}

impl RotationEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        codec: Arc<dyn AccessTokenCodec>,
        hasher: SecretHasher,
        notifier: Arc<dyn AnomalyNotifier>,
    ) -> Self {
        Self {
            store,
            codec,
            hasher,
            notifier,
        }
    }

    /// Wire up the collaborators selected by `config`.
    ///
    /// # Errors
    ///
    /// Fails if the Redis backend is unreachable or the webhook client
    /// cannot be built.
    pub async fn from_config(config: &Config) -> Result<Self, TokenError> {
        let store: Arc<dyn SessionStore> = match &config.store {
            StoreBackend::Memory => {
                warn!("Using in-memory session store; sessions are lost on restart");
                Arc::new(MemorySessionStore::new())
            }
            StoreBackend::Redis { url, key_prefix } => {
                Arc::new(RedisSessionStore::connect(url, key_prefix.clone()).await?)
            }
        };

        let notifier: Arc<dyn AnomalyNotifier> = match &config.webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone(), config.webhook_timeout)?),
            None => Arc::new(NoopNotifier),
        };

        let codec = Arc::new(JwtCodec::new(&config.signing_secret, config.access_token_ttl));
        let hasher = SecretHasher::new(config.bcrypt_cost)?;

        Ok(Self::new(store, codec, hasher, notifier))
    }

    /// Start a new session for `subject` bound to the given fingerprint.
    #[instrument(skip(self, user_agent, address))]
    pub async fn issue(
        &self,
        subject: &str,
        user_agent: &str,
        address: &str,
    ) -> Result<TokenPair, TokenError> {
        let pair = self
            .mint(subject, Fingerprint::new(user_agent, address))
            .await?;
        metrics::record_tokens_issued("login");
        Ok(pair)
    }

    /// Signature, structure and expiry check. Never touches the store.
    pub fn validate(&self, access_token: &str) -> Result<AccessClaims, TokenError> {
        self.codec.decode(access_token)
    }

    /// Gate for every protected operation: a valid token whose session
    /// still exists.
    pub async fn authenticate(&self, access_token: &str) -> Result<SessionRecord, TokenError> {
        let claims = self.validate(access_token).map_err(|e| {
            debug!(error = %e, "Access token rejected");
            TokenError::Unauthorized
        })?;

        self.store
            .get(claims.session_id)
            .await?
            .ok_or(TokenError::Unauthorized)
    }

    /// Exchange a token pair for a new one, retiring the old session.
    #[instrument(skip_all)]
    pub async fn refresh(
        &self,
        access_token: &str,
        refresh_token: &str,
        user_agent: &str,
        address: &str,
    ) -> Result<TokenPair, TokenError> {
        let result = self
            .rotate(access_token, refresh_token, Fingerprint::new(user_agent, address))
            .await;

        match &result {
            Ok(_) => {
                metrics::record_refresh("rotated");
                metrics::record_tokens_issued("rotation");
            }
            Err(e) => metrics::record_refresh(e.code()),
        }
        result
    }

    /// Delete a session. `Ok(false)` if it was already gone.
    pub async fn invalidate(&self, session_id: SessionId) -> Result<bool, TokenError> {
        let removed = self.store.delete(session_id).await?;
        if removed {
            metrics::record_session_revoked("logout");
            info!(session_id, "Session invalidated");
        }
        Ok(removed)
    }

    /// Authenticate `access_token` and delete its session.
    pub async fn logout(&self, access_token: &str) -> Result<SessionRecord, TokenError> {
        let record = self.authenticate(access_token).await?;
        self.invalidate(record.session_id).await?;
        Ok(record)
    }

    async fn rotate(
        &self,
        access_token: &str,
        refresh_token: &str,
        current: Fingerprint,
    ) -> Result<TokenPair, TokenError> {
        let claims = self.validate(access_token).map_err(|e| {
            debug!(error = %e, "Access token rejected on refresh");
            TokenError::Unauthorized
        })?;

        let record = self
            .store
            .get(claims.session_id)
            .await?
            .ok_or(TokenError::Unauthorized)?;

        let presented = RefreshSecret::from_hex(refresh_token)?;
        if !self.hasher.verify(presented.as_bytes(), &record.secret_hash).await {
            warn!(session_id = record.session_id, "Refresh secret mismatch");
            return Err(TokenError::Unauthorized);
        }

        if current.user_agent != record.fingerprint.user_agent {
            warn!(
                session_id = record.session_id,
                subject = %record.subject,
                "User agent changed; terminating session"
            );
            match self.store.delete(record.session_id).await {
                Ok(_) => metrics::record_session_revoked("device_mismatch"),
                Err(e) => error!(
                    session_id = record.session_id,
                    error = %e,
                    "Failed to delete session after user agent change"
                ),
            }
            return Err(TokenError::Forbidden);
        }

        let address_change = (current.address != record.fingerprint.address).then(|| {
            AddressChange {
                subject: record.subject.clone(),
                old_address: record.fingerprint.address.clone(),
                new_address: current.address.clone(),
            }
        });

        match self.store.delete(record.session_id).await {
            Ok(true) => metrics::record_session_revoked("rotation"),
            Ok(false) => {
                warn!(
                    session_id = record.session_id,
                    "Session already rotated by a concurrent refresh"
                );
                return Err(TokenError::Unauthorized);
            }
            Err(e) => return Err(TokenError::issuance(format!("failed to retire session: {e}"))),
        }

        if let Some(change) = address_change {
            warn!(
                subject = %change.subject,
                old_address = %change.old_address,
                new_address = %change.new_address,
                "Session used from a new address"
            );
            self.notifier.notify(change);
        }

        let pair = self.mint(&record.subject, current).await?;
        info!(
            old_session_id = record.session_id,
            new_session_id = pair.session_id,
            "Rotated session"
        );
        Ok(pair)
    }

    /// Create a session and its token pair. All-or-nothing: a signing
    /// failure removes the record it just created.
    async fn mint(&self, subject: &str, fingerprint: Fingerprint) -> Result<TokenPair, TokenError> {
        let secret = RefreshSecret::generate();
        let secret_hash = self.hasher.hash(&secret).await?;

        let session_id = self
            .store
            .create(NewSession {
                subject: subject.to_string(),
                secret_hash,
                fingerprint,
            })
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to persist session");
                TokenError::issuance(format!("session store: {e}"))
            })?;

        let claims = AccessClaims::new(subject, session_id, self.codec.ttl());
        let access_token = match self.codec.encode(&claims) {
            Ok(token) => token,
            Err(e) => {
                error!(session_id, error = %e, "Access token signing failed");
                self.discard(session_id).await;
                return Err(TokenError::issuance("access token signing failed"));
            }
        };

        info!(session_id, subject = %subject, "Issued token pair");
        Ok(TokenPair {
            access_token,
            refresh_token: secret.to_hex(),
            session_id,
        })
    }

    async fn discard(&self, session_id: SessionId) {
        match self.store.delete(session_id).await {
            Ok(_) => metrics::record_session_revoked("compensation"),
            Err(e) => error!(
                session_id,
                error = %e,
                "Failed to remove session after signing failure"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SigningSecret;
    use std::collections::HashMap;
    use std::time::Duration;

    fn engine(store: Arc<MemorySessionStore>) -> RotationEngine {
        let secret = SigningSecret::new(b"unit-test-signing-secret-0123456789".to_vec()).unwrap();
        RotationEngine::new(
            store,
            Arc::new(JwtCodec::new(&secret, Duration::from_secs(60))),
            SecretHasher::new(SecretHasher::MIN_COST).unwrap(),
            Arc::new(NoopNotifier),
        )
    }

    #[tokio::test]
    async fn test_issue_stores_hash_not_secret() {
        let store = Arc::new(MemorySessionStore::new());
        let engine = engine(store.clone());

        let pair = engine.issue("u1", "A", "1.1.1.1").await.unwrap();
        let record = store.get(pair.session_id).await.unwrap().unwrap();

        assert_ne!(record.secret_hash, pair.refresh_token);
        assert!(!record.secret_hash.contains(&pair.refresh_token));
        assert_eq!(record.fingerprint, Fingerprint::new("A", "1.1.1.1"));
    }

    #[tokio::test]
    async fn test_validate_does_not_need_session() {
        let store = Arc::new(MemorySessionStore::new());
        let engine = engine(store.clone());

        let pair = engine.issue("u1", "A", "1.1.1.1").await.unwrap();
        store.delete(pair.session_id).await.unwrap();

        let claims = engine.validate(&pair.access_token).unwrap();
        assert_eq!(claims.session_id, pair.session_id);
        assert!(engine.authenticate(&pair.access_token).await.is_err());
    }

    #[tokio::test]
    async fn test_token_pair_debug_is_redacted() {
        let engine = engine(Arc::new(MemorySessionStore::new()));
        let pair = engine.issue("u1", "A", "1.1.1.1").await.unwrap();
        let rendered = format!("{pair:?}");

        assert!(!rendered.contains(&pair.refresh_token));
        assert!(!rendered.contains(&pair.access_token));
    }

    #[tokio::test]
    async fn test_from_config_memory_backend() {
        let vars: HashMap<String, String> = [
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
            ("BCRYPT_COST", "4"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let config = Config::from_map(&vars).unwrap();

        let engine = RotationEngine::from_config(&config).await.unwrap();
        let pair = engine.issue("u1", "A", "1.1.1.1").await.unwrap();

        assert_eq!(
            engine.authenticate(&pair.access_token).await.unwrap().subject,
            "u1"
        );
    }
}
