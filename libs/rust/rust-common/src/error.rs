//! Centralized error type for the shared platform helpers.
//!
//! Service crates wrap these into their own taxonomy at their boundary;
//! nothing here is ever shown to an HTTP client verbatim.

use thiserror::Error;

/// Common error type for platform operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// HTTP request or client construction failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A configuration value is missing or malformed
    #[error("Invalid configuration for {key}: {reason}")]
    Config {
        /// Name of the offending setting
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// The global tracing subscriber could not be installed
    #[error("Tracing initialisation failed: {0}")]
    Tracing(String),

    /// Remote endpoint answered with a non-success status
    #[error("Remote endpoint returned status {0}")]
    UnexpectedStatus(u16),
}

impl PlatformError {
    /// Check if this error is retryable.
    ///
    /// Transport timeouts, connection failures and 5xx answers are
    /// transient; everything else will fail the same way again.
    ///
    /// # Examples
    ///
    /// ```
    /// use rust_common::PlatformError;
    ///
    /// assert!(PlatformError::UnexpectedStatus(503).is_retryable());
    /// assert!(!PlatformError::config("PORT", "not a number").is_retryable());
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::UnexpectedStatus(status) => *status >= 500,
            _ => false,
        }
    }

    /// Create a configuration error for the given setting.
    #[must_use]
    pub fn config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a tracing initialisation error.
    #[must_use]
    pub fn tracing(msg: impl Into<String>) -> Self {
        Self::Tracing(msg.into())
    }
}
