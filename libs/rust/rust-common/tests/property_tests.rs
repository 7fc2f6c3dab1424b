//! Property-based tests for rust-common crate.

use proptest::prelude::*;
use rust_common::{HttpConfig, LogFormat, PlatformError};
use std::time::Duration;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Status-based retryability is decided by the 5xx class alone.
    #[test]
    fn prop_status_retryability_follows_server_class(status in 100u16..600) {
        let err = PlatformError::UnexpectedStatus(status);
        prop_assert_eq!(err.is_retryable(), status >= 500);
    }

    /// Configuration errors are never retryable, whatever the message.
    #[test]
    fn prop_config_errors_not_retryable(
        key in "[A-Z_]{1,20}",
        reason in "[a-zA-Z0-9 ]{1,50}",
    ) {
        let err = PlatformError::config(key.clone(), reason.clone());
        prop_assert!(!err.is_retryable());
        let rendered = err.to_string();
        prop_assert!(rendered.contains(&key));
        prop_assert!(rendered.contains(&reason));
    }

    /// Unknown log formats are rejected rather than silently defaulted.
    #[test]
    fn prop_unknown_log_format_rejected(s in "[a-z]{1,12}") {
        let parsed = s.parse::<LogFormat>();
        match s.as_str() {
            "json" | "text" | "pretty" => prop_assert!(parsed.is_ok()),
            _ => prop_assert!(parsed.is_err()),
        }
    }

    /// The callback preset never lets connecting outlast the request.
    #[test]
    fn prop_callback_connect_timeout_bounded(millis in 1u64..120_000) {
        let timeout = Duration::from_millis(millis);
        let config = HttpConfig::for_callbacks(timeout);
        prop_assert!(config.connect_timeout <= config.timeout);
        prop_assert_eq!(config.timeout, timeout);
    }
}
