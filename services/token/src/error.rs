//! Error taxonomy of the token lifecycle engine.
//!
//! Store, hashing and signing failures are converted into one of these
//! variants at the engine boundary. The HTTP layer maps variants to status
//! codes and never echoes the inner messages.

use crate::storage::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Device fingerprint mismatch - session terminated")]
    Forbidden,

    #[error("Token issuance failed: {0}")]
    IssuanceFailed(String),

    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TokenError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    pub fn issuance(msg: impl Into<String>) -> Self {
        Self::IssuanceFailed(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable machine-readable code, used for logs and metric labels.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => TOKEN_BAD_REQUEST,
            Self::InvalidToken(_) | Self::Unauthorized => TOKEN_UNAUTHORIZED,
            Self::Forbidden => TOKEN_DEVICE_MISMATCH,
            Self::IssuanceFailed(_) => TOKEN_ISSUANCE_FAILED,
            Self::Store(_) => TOKEN_STORE_ERROR,
            Self::Config(_) => TOKEN_CONFIG_ERROR,
            Self::Internal(_) => TOKEN_INTERNAL_ERROR,
        }
    }

    /// Transient backend failures; the same request may succeed later.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_) | Self::IssuanceFailed(_))
    }
}

pub const TOKEN_BAD_REQUEST: &str = "TOKEN_BAD_REQUEST";
pub const TOKEN_UNAUTHORIZED: &str = "TOKEN_UNAUTHORIZED";
pub const TOKEN_DEVICE_MISMATCH: &str = "TOKEN_DEVICE_MISMATCH";
pub const TOKEN_ISSUANCE_FAILED: &str = "TOKEN_ISSUANCE_FAILED";
pub const TOKEN_STORE_ERROR: &str = "TOKEN_STORE_ERROR";
pub const TOKEN_CONFIG_ERROR: &str = "TOKEN_CONFIG_ERROR";
pub const TOKEN_INTERNAL_ERROR: &str = "TOKEN_INTERNAL_ERROR";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_kinds_share_a_code() {
        assert_eq!(TokenError::Unauthorized.code(), TOKEN_UNAUTHORIZED);
        assert_eq!(
            TokenError::invalid_token("bad signature").code(),
            TOKEN_UNAUTHORIZED
        );
    }

    #[test]
    fn test_retryability() {
        assert!(TokenError::issuance("store down").is_retryable());
        assert!(TokenError::Store(StoreError::Backend("timeout".into())).is_retryable());
        assert!(!TokenError::Forbidden.is_retryable());
        assert!(!TokenError::bad_request("hex").is_retryable());
    }

    #[test]
    fn test_store_error_conversion() {
        let err: TokenError = StoreError::Backend("connection reset".into()).into();
        assert!(matches!(err, TokenError::Store(_)));
        assert_eq!(err.code(), TOKEN_STORE_ERROR);
    }
}
