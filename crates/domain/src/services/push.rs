//! Push delivery seam.
//!
//! Provides the payload shape shown by the service worker and a trait for
//! sending it to stored browser subscriptions.

use std::sync::Mutex;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::PushSubscription;

/// Error type for push delivery.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("Push delivery is not configured")]
    NotConfigured,

    #[error("Invalid push subscription: {0}")]
    InvalidSubscription(String),

    #[error("Failed to sign or encrypt push message: {0}")]
    Encoding(String),

    #[error("Push endpoint is gone")]
    EndpointGone,

    #[error("Push delivery failed: {0}")]
    Delivery(String),
}

/// What a notification says and where tapping it leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayloadData {
    pub url: String,
}

/// JSON document delivered to the service worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub body: String,
    pub url: String,
    pub icon: String,
    pub badge: String,
    pub data: PushPayloadData,
}

impl PushMessage {
    pub fn into_payload(self, icon: &str, badge: &str) -> PushPayload {
        PushPayload {
            data: PushPayloadData {
                url: self.url.clone(),
            },
            title: self.title,
            body: self.body,
            url: self.url,
            icon: icon.to_string(),
            badge: badge.to_string(),
        }
    }
}

/// Result of delivering to one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The push service reported the subscription as expired.
    Expired,
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeliveryOutcome::Delivered => "delivered",
            DeliveryOutcome::Expired => "expired",
            DeliveryOutcome::Failed(_) => "failed",
        }
    }
}

impl From<Result<(), PushError>> for DeliveryOutcome {
    fn from(result: Result<(), PushError>) -> Self {
        match result {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(PushError::EndpointGone) => DeliveryOutcome::Expired,
            Err(e) => DeliveryOutcome::Failed(e.to_string()),
        }
    }
}

/// Counts from a best-effort fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkDeliveryReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

impl BulkDeliveryReport {
    pub fn from_outcomes(outcomes: &[DeliveryOutcome]) -> Self {
        let successful = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            total: outcomes.len(),
            successful,
            failed: outcomes.len() - successful,
        }
    }
}

/// Push delivery trait.
#[async_trait::async_trait]
pub trait PushService: Send + Sync {
    /// Delivers one message to one subscription. Never retries.
    async fn send(&self, subscription: &PushSubscription, message: &PushMessage)
        -> DeliveryOutcome;

    /// Whether real delivery is configured.
    fn is_enabled(&self) -> bool;

    /// Delivers to every subscription in parallel. Failures are counted, not
    /// retried.
    async fn send_bulk(
        &self,
        subscriptions: &[PushSubscription],
        message: &PushMessage,
    ) -> BulkDeliveryReport {
        let outcomes = join_all(subscriptions.iter().map(|sub| self.send(sub, message))).await;

        for (sub, outcome) in subscriptions.iter().zip(&outcomes) {
            metrics::counter!("push_deliveries_total", "outcome" => outcome.label()).increment(1);
            if let DeliveryOutcome::Failed(reason) = outcome {
                tracing::warn!(endpoint = %sub.endpoint, reason = %reason, "Push delivery failed");
            }
        }

        BulkDeliveryReport::from_outcomes(&outcomes)
    }
}

/// Push service for development and testing.
///
/// Logs and records messages instead of sending them.
#[derive(Debug, Default)]
pub struct MockPushService {
    /// Whether to simulate failures for testing.
    pub simulate_failure: bool,
    sent: Mutex<Vec<(String, PushMessage)>>,
}

impl MockPushService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock service that fails every delivery.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Endpoint and message of every delivery attempted so far.
    pub fn sent(&self) -> Vec<(String, PushMessage)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl PushService for MockPushService {
    async fn send(
        &self,
        subscription: &PushSubscription,
        message: &PushMessage,
    ) -> DeliveryOutcome {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((subscription.endpoint.clone(), message.clone()));
        }

        if self.simulate_failure {
            tracing::warn!(
                endpoint = %subscription.endpoint,
                "Mock push service simulating failure"
            );
            return DeliveryOutcome::Failed("Simulated failure".to_string());
        }

        tracing::info!(
            endpoint = %subscription.endpoint,
            title = %message.title,
            url = %message.url,
            "Mock: Would send push notification"
        );

        DeliveryOutcome::Delivered
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(n: usize) -> PushSubscription {
        PushSubscription {
            endpoint: format!("https://push.example/{}", n),
            p256dh: "key".to_string(),
            auth: "auth".to_string(),
        }
    }

    fn message() -> PushMessage {
        PushMessage {
            title: "Hack - Kickoff".to_string(),
            body: "Opening".to_string(),
            url: "https://xl.example/dashboard?slot=1".to_string(),
        }
    }

    #[test]
    fn test_payload_copies_url_into_data() {
        let payload = message().into_payload("/icon-192x192.png", "/badge.png");
        assert_eq!(payload.data.url, payload.url);
        assert_eq!(payload.icon, "/icon-192x192.png");

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["data"]["url"], "https://xl.example/dashboard?slot=1");
        assert_eq!(json["badge"], "/badge.png");
    }

    #[test]
    fn test_outcome_from_result() {
        assert_eq!(DeliveryOutcome::from(Ok(())), DeliveryOutcome::Delivered);
        assert_eq!(
            DeliveryOutcome::from(Err(PushError::EndpointGone)),
            DeliveryOutcome::Expired
        );
        assert!(matches!(
            DeliveryOutcome::from(Err(PushError::Delivery("503".into()))),
            DeliveryOutcome::Failed(_)
        ));
    }

    #[test]
    fn test_bulk_report_counts_expired_as_failed() {
        let report = BulkDeliveryReport::from_outcomes(&[
            DeliveryOutcome::Delivered,
            DeliveryOutcome::Expired,
            DeliveryOutcome::Failed("x".into()),
        ]);
        assert_eq!(report.total, 3);
        assert_eq!(report.successful, 1);
        assert_eq!(report.failed, 2);
    }

    #[tokio::test]
    async fn test_mock_send_bulk_records_every_subscription() {
        let service = MockPushService::new();
        let subs: Vec<_> = (0..3).map(subscription).collect();

        let report = service.send_bulk(&subs, &message()).await;

        assert_eq!(report.successful, 3);
        assert_eq!(service.sent_count(), 3);
        assert!(!service.is_enabled());
    }

    #[tokio::test]
    async fn test_failing_mock_reports_failures() {
        let service = MockPushService::failing();
        let subs: Vec<_> = (0..2).map(subscription).collect();

        let report = service.send_bulk(&subs, &message()).await;

        assert_eq!(report.successful, 0);
        assert_eq!(report.failed, 2);
    }

    #[tokio::test]
    async fn test_send_bulk_with_no_subscriptions() {
        let service = MockPushService::new();
        let report = service.send_bulk(&[], &message()).await;
        assert_eq!(report, BulkDeliveryReport::default());
    }
}
