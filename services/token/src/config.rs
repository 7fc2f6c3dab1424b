//! Centralized configuration for the session token service.
//!
//! All configuration is loaded from environment variables (and an optional
//! `.env` file) and validated at startup.

use crate::error::TokenError;
use crate::refresh::SecretHasher;
use rand::RngCore;
use rand::rngs::OsRng;
use rust_common::{LogFormat, TracingConfig};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use tracing::warn;
use zeroize::Zeroizing;

/// Minimum accepted length of the HMAC signing key, in bytes.
pub const MIN_SIGNING_SECRET_LEN: usize = 32;

/// Symmetric key used to sign access tokens.
///
/// Loaded once at startup; there is no in-process rotation.
#[derive(Clone)]
pub struct SigningSecret(Zeroizing<Vec<u8>>);

impl SigningSecret {
    /// Wrap raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the key is shorter than
    /// [`MIN_SIGNING_SECRET_LEN`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let bytes = Zeroizing::new(bytes.into());
        if bytes.len() < MIN_SIGNING_SECRET_LEN {
            return Err(TokenError::config(format!(
                "JWT_SECRET must be at least {MIN_SIGNING_SECRET_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bytes))
    }

    /// Random per-process key. Tokens do not survive a restart.
    #[must_use]
    pub fn random() -> Self {
        let mut bytes = Zeroizing::new(vec![0u8; 64]);
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// Credential store backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local map; sessions vanish on restart
    Memory,
    /// Redis server
    Redis {
        /// Connection URL
        url: String,
        /// Key namespace
        key_prefix: String,
    },
}

/// Session token service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    // Server settings
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Honour `X-Forwarded-For` / `X-Real-IP` for the client address
    pub trust_proxy_headers: bool,

    // Token settings
    /// HMAC key for access tokens
    pub signing_secret: SigningSecret,
    /// Access token validity window
    pub access_token_ttl: Duration,
    /// bcrypt cost for refresh secret hashes
    pub bcrypt_cost: u32,

    // Collaborators
    /// Credential store backend
    pub store: StoreBackend,
    /// Anomaly sink; `None` disables notifications
    pub webhook_url: Option<String>,
    /// Per-request timeout of anomaly notifications
    pub webhook_timeout: Duration,

    // Observability
    /// Tracing subscriber settings
    pub tracing: TracingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, TokenError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an explicit set of variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing or invalid.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, TokenError> {
        Self::from_lookup(|name| vars.get(name).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, TokenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var(&lookup, "PORT", 8877)?;
        let trust_proxy_headers = parse_var(&lookup, "TRUST_PROXY_HEADERS", false)?;

        let signing_secret = parse_signing_secret(&lookup)?;
        let access_token_ttl = Duration::from_secs(parse_var(&lookup, "ACCESS_TOKEN_TTL", 86_400)?);
        if access_token_ttl.is_zero() {
            return Err(TokenError::config("ACCESS_TOKEN_TTL must be positive"));
        }
        let bcrypt_cost = parse_var(&lookup, "BCRYPT_COST", 10)?;
        SecretHasher::check_cost(bcrypt_cost)?;

        let store = match lookup("STORE_BACKEND")
            .unwrap_or_else(|| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "redis" => StoreBackend::Redis {
                url: lookup("REDIS_URL").unwrap_or_else(|| "redis://127.0.0.1:6379".to_string()),
                key_prefix: lookup("REDIS_KEY_PREFIX").unwrap_or_else(|| "session".to_string()),
            },
            other => {
                return Err(TokenError::config(format!(
                    "Invalid STORE_BACKEND: {other} (expected memory or redis)"
                )));
            }
        };

        let webhook_url = match lookup("WEBHOOK_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => {
                reqwest::Url::parse(&url)
                    .map_err(|e| TokenError::config(format!("Invalid WEBHOOK_URL: {e}")))?;
                Some(url)
            }
            None => None,
        };
        let webhook_timeout = Duration::from_millis(parse_var(&lookup, "WEBHOOK_TIMEOUT_MS", 5_000)?);

        let log_format = lookup("LOG_FORMAT")
            .map(|s| s.parse::<LogFormat>())
            .transpose()
            .map_err(|e| TokenError::config(e.to_string()))?
            .unwrap_or_default();
        let tracing = TracingConfig::default()
            .with_service_name("session-token-service")
            .with_log_level(lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()))
            .with_format(log_format);

        Ok(Self {
            host,
            port,
            trust_proxy_headers,
            signing_secret,
            access_token_ttl,
            bcrypt_cost,
            store,
            webhook_url,
            webhook_timeout,
            tracing,
        })
    }
}

/// Parse a variable with a default value.
fn parse_var<T, F>(lookup: &F, name: &str, default: T) -> Result<T, TokenError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| TokenError::config(format!("Invalid {name}: {e}"))),
        None => Ok(default),
    }
}

fn parse_signing_secret<F>(lookup: &F) -> Result<SigningSecret, TokenError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("JWT_SECRET") {
        Some(secret) => SigningSecret::new(secret.into_bytes()),
        None if parse_var(lookup, "JWT_SECRET_INSECURE_DEV", false)? => {
            warn!("JWT_SECRET not set; using a random signing key, tokens will not survive a restart");
            Ok(SigningSecret::random())
        }
        None => Err(TokenError::config("JWT_SECRET is required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_map(&vars(&[("JWT_SECRET", SECRET)])).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8877);
        assert_eq!(config.access_token_ttl, Duration::from_secs(86_400));
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.store, StoreBackend::Memory);
        assert!(config.webhook_url.is_none());
        assert!(!config.trust_proxy_headers);
        assert_eq!(config.tracing.format, LogFormat::Json);
        assert_eq!(config.signing_secret.as_bytes(), SECRET.as_bytes());
    }

    #[test]
    fn test_missing_secret_rejected() {
        let err = Config::from_map(&HashMap::new()).unwrap_err();
        assert!(matches!(err, TokenError::Config(_)));
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = Config::from_map(&vars(&[("JWT_SECRET", "medods")])).unwrap_err();
        assert!(err.to_string().contains("at least 32 bytes"));
    }

    #[test]
    fn test_insecure_dev_secret() {
        let config = Config::from_map(&vars(&[("JWT_SECRET_INSECURE_DEV", "true")])).unwrap();
        assert_eq!(config.signing_secret.as_bytes().len(), 64);
    }

    #[test]
    fn test_redis_backend() {
        let config = Config::from_map(&vars(&[
            ("JWT_SECRET", SECRET),
            ("STORE_BACKEND", "Redis"),
            ("REDIS_URL", "redis://cache:6379/2"),
        ]))
        .unwrap();

        assert_eq!(
            config.store,
            StoreBackend::Redis {
                url: "redis://cache:6379/2".to_string(),
                key_prefix: "session".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        for (name, value) in [
            ("PORT", "http"),
            ("BCRYPT_COST", "3"),
            ("BCRYPT_COST", "40"),
            ("ACCESS_TOKEN_TTL", "0"),
            ("STORE_BACKEND", "postgres"),
            ("WEBHOOK_URL", "not a url"),
            ("LOG_FORMAT", "xml"),
            ("TRUST_PROXY_HEADERS", "yes please"),
        ] {
            let result = Config::from_map(&vars(&[("JWT_SECRET", SECRET), (name, value)]));
            assert!(result.is_err(), "{name}={value} should be rejected");
        }
    }

    #[test]
    fn test_empty_webhook_disables_notifications() {
        let config = Config::from_map(&vars(&[("JWT_SECRET", SECRET), ("WEBHOOK_URL", "  ")])).unwrap();
        assert!(config.webhook_url.is_none());
    }

    #[test]
    fn test_signing_secret_debug_is_redacted() {
        let secret = SigningSecret::new(SECRET).unwrap();
        assert!(!format!("{secret:?}").contains(SECRET));
    }
}
