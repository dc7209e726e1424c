// Notification dispatch for status changes and admin messages. Delivery
// failures are logged and swallowed: the triggering request must succeed
// whether or not the notification went out.
use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::config;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification dispatch failed: {0}")]
    Dispatch(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub recipient: Option<String>,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn status_change(
        entity_label: &str,
        record_id: &str,
        status: &str,
        recipient: Option<String>,
    ) -> Self {
        Self {
            recipient,
            subject: format!("{} status update", entity_label),
            body: format!("{} {} is now {}", entity_label, record_id, status),
        }
    }

    pub fn message(recipient: &str, subject: &str, body: &str) -> Self {
        Self {
            recipient: Some(recipient.to_string()),
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Posts notifications to the configured webhook (the admin email relay)
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), url: url.into() }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = json!({
            "recipient": notification.recipient,
            "subject": notification.subject,
            "body": notification.body,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Dispatch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotifyError::Dispatch(format!(
                "webhook returned status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Used when no webhook is configured
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::debug!("notification dispatch disabled, dropping: {}", notification.subject);
        Ok(())
    }
}

pub fn from_config() -> Box<dyn Notifier> {
    match &config::config().content.notify_webhook_url {
        Some(url) => Box::new(WebhookNotifier::new(url.clone())),
        None => Box::new(NoopNotifier),
    }
}

/// Dispatch through the configured notifier, swallowing failures.
/// Returns whether delivery succeeded.
pub async fn dispatch(notification: &Notification) -> bool {
    match from_config().send(notification).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("notification dispatch failed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CapturingNotifier {
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Notifier for CapturingNotifier {
        async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn status_change_notifications_carry_context() {
        let notifier = CapturingNotifier { sent: Mutex::new(Vec::new()) };
        let note = Notification::status_change(
            "Membership renewal",
            "a1",
            "approved",
            Some("john@example.com".to_string()),
        );
        notifier.send(&note).await.unwrap();

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient.as_deref(), Some("john@example.com"));
        assert!(sent[0].body.contains("approved"));
    }

    #[tokio::test]
    async fn dispatch_without_webhook_is_a_successful_noop() {
        // Default config carries no webhook URL
        let note = Notification::status_change("Event signup", "b2", "declined", None);
        assert!(dispatch(&note).await);
    }

    #[tokio::test]
    async fn unreachable_webhook_reports_failure() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/notify");
        let note = Notification::message("x@example.com", "Hello", "World");
        assert!(notifier.send(&note).await.is_err());
    }
}
