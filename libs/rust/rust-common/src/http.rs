//! Outbound HTTP client configuration.
//!
//! Callbacks to third-party sinks are fire-and-forget, so the client used
//! for them must give up quickly instead of holding a task open.

use crate::error::PlatformError;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Whole-request timeout (default: 10s)
    pub timeout: Duration,
    /// Connection timeout (default: 3s)
    pub connect_timeout: Duration,
    /// Pool idle timeout (default: 90s)
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host (default: 4)
    pub pool_max_idle_per_host: usize,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(3),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 4,
            user_agent: concat!("session-token/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    /// Preset for best-effort webhook delivery.
    ///
    /// The connect timeout never exceeds the request timeout.
    #[must_use]
    pub fn for_callbacks(timeout: Duration) -> Self {
        Self {
            timeout,
            connect_timeout: timeout.min(Duration::from_secs(3)),
            ..Self::default()
        }
    }

    /// Override the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override pool settings.
    #[must_use]
    pub const fn with_pool_config(mut self, idle_timeout: Duration, max_idle: usize) -> Self {
        self.pool_idle_timeout = idle_timeout;
        self.pool_max_idle_per_host = max_idle;
        self
    }
}

/// Build a configured HTTP client with rustls TLS.
///
/// # Errors
///
/// Returns an error if the client cannot be built (e.g., TLS initialization fails).
///
/// # Examples
///
/// ```
/// use rust_common::{HttpConfig, build_http_client};
/// use std::time::Duration;
///
/// let config = HttpConfig::for_callbacks(Duration::from_secs(2));
/// let client = build_http_client(&config).expect("Failed to build client");
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, PlatformError> {
    let client = ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(&config.user_agent)
        .use_rustls_tls()
        .build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_preset_caps_connect_timeout() {
        let config = HttpConfig::for_callbacks(Duration::from_secs(30));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(3));

        let config = HttpConfig::for_callbacks(Duration::from_millis(500));
        assert_eq!(config.connect_timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_config_builder() {
        let config = HttpConfig::default()
            .with_user_agent("test-agent")
            .with_pool_config(Duration::from_secs(5), 1);

        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.pool_max_idle_per_host, 1);
        assert!(config.user_agent.len() > 0);
    }

    #[test]
    fn test_build_client() {
        let config = HttpConfig::for_callbacks(Duration::from_secs(1));
        assert!(build_http_client(&config).is_ok());
    }
}
