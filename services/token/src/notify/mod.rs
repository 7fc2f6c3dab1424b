//! Anomaly notification when a session resurfaces from a new address.
//!
//! Delivery is best-effort: `notify` returns immediately, and nothing that
//! happens to the notification can affect the refresh that triggered it.

pub mod webhook;

pub use webhook::WebhookNotifier;

use crate::metrics;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Payload sent to the anomaly sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressChange {
    #[serde(rename = "guid")]
    pub subject: String,
    #[serde(rename = "old_ip")]
    pub old_address: String,
    #[serde(rename = "new_ip")]
    pub new_address: String,
}

/// Fire-and-forget sink for address changes.
pub trait AnomalyNotifier: Send + Sync {
    /// Dispatch without waiting for delivery.
    fn notify(&self, change: AddressChange);
}

/// Used when no sink is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl AnomalyNotifier for NoopNotifier {
    fn notify(&self, change: AddressChange) {
        metrics::record_anomaly_notification("skipped");
        debug!(
            subject = %change.subject,
            old_address = %change.old_address,
            new_address = %change.new_address,
            "No anomaly sink configured"
        );
    }
}
