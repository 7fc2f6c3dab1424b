use super::{AddressChange, AnomalyNotifier};
use crate::error::TokenError;
use crate::metrics;
use rust_common::{HttpConfig, PlatformError, build_http_client};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Posts address changes as JSON to a configured URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookNotifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, TokenError> {
        let client = build_http_client(&HttpConfig::for_callbacks(timeout))
            .map_err(|e| TokenError::config(format!("webhook client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Deliver one notification and wait for the answer.
    #[instrument(skip(self, change), fields(endpoint = %self.endpoint))]
    pub async fn deliver(&self, change: &AddressChange) -> Result<(), PlatformError> {
        let response = self.client.post(&self.endpoint).json(change).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlatformError::UnexpectedStatus(status.as_u16()));
        }
        Ok(())
    }
}

impl AnomalyNotifier for WebhookNotifier {
    fn notify(&self, change: AddressChange) {
        let notifier = self.clone();

        tokio::spawn(async move {
            match notifier.deliver(&change).await {
                Ok(()) => {
                    metrics::record_anomaly_notification("sent");
                    info!(
                        subject = %change.subject,
                        old_address = %change.old_address,
                        new_address = %change.new_address,
                        "Address change notification delivered"
                    );
                }
                Err(e) => {
                    metrics::record_anomaly_notification("failed");
                    warn!(
                        subject = %change.subject,
                        error = %e,
                        retryable = e.is_retryable(),
                        "Address change notification failed"
                    );
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_endpoint() {
        let notifier =
            WebhookNotifier::new("http://hooks.internal/anomaly", Duration::from_secs(1)).unwrap();
        assert_eq!(notifier.endpoint(), "http://hooks.internal/anomaly");
    }
}
