//! Prometheus metrics for the session token service.

use crate::error::TokenError;
use once_cell::sync::Lazy;
use prometheus::{CounterVec, Encoder, TextEncoder, register_counter_vec};

/// Token pairs issued, by `reason` (login|rotation).
pub static TOKENS_ISSUED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_token_tokens_issued_total",
        "Total number of token pairs issued",
        &["reason"]
    )
    .expect("Failed to register tokens_issued metric")
});

/// Refresh attempts, by `outcome` (rotated or an error code).
pub static REFRESH_ATTEMPTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_token_refresh_total",
        "Total number of refresh attempts",
        &["outcome"]
    )
    .expect("Failed to register refresh metric")
});

/// Sessions deleted, by `reason`.
pub static SESSIONS_REVOKED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_token_sessions_revoked_total",
        "Total number of sessions deleted",
        &["reason"]
    )
    .expect("Failed to register sessions_revoked metric")
});

/// Anomaly notifications, by `status` (sent|failed|skipped).
pub static ANOMALY_NOTIFICATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "session_token_anomaly_notifications_total",
        "Total number of address change notifications",
        &["status"]
    )
    .expect("Failed to register anomaly_notifications metric")
});

pub fn record_tokens_issued(reason: &str) {
    TOKENS_ISSUED.with_label_values(&[reason]).inc();
}

pub fn record_refresh(outcome: &str) {
    REFRESH_ATTEMPTS.with_label_values(&[outcome]).inc();
}

pub fn record_session_revoked(reason: &str) {
    SESSIONS_REVOKED.with_label_values(&[reason]).inc();
}

pub fn record_anomaly_notification(status: &str) {
    ANOMALY_NOTIFICATIONS.with_label_values(&[status]).inc();
}

/// Render every registered metric in the Prometheus text format.
pub fn render() -> Result<String, TokenError> {
    Lazy::force(&TOKENS_ISSUED);
    Lazy::force(&REFRESH_ATTEMPTS);
    Lazy::force(&SESSIONS_REVOKED);
    Lazy::force(&ANOMALY_NOTIFICATIONS);

    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| TokenError::internal(format!("metrics encoding failed: {e}")))?;
    String::from_utf8(buffer).map_err(|e| TokenError::internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_tokens_issued() {
        record_tokens_issued("login");
        let value = TOKENS_ISSUED.with_label_values(&["login"]).get();
        assert!(value > 0.0);
    }

    #[test]
    fn test_record_session_revoked() {
        record_session_revoked("device_mismatch");
        let value = SESSIONS_REVOKED
            .with_label_values(&["device_mismatch"])
            .get();
        assert!(value > 0.0);
    }

    #[test]
    fn test_render_contains_families() {
        record_refresh("rotated");
        let text = render().unwrap();
        assert!(text.contains("session_token_refresh_total"));
    }
}
