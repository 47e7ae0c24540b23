//! Chat webhook notifier.

use std::time::Duration;

use serde::Serialize;

use super::{AlertSink, Notifier, format_message};
use crate::domain::TrackingEvent;
use crate::error::TrackerError;

/// JSON body accepted by Discord-compatible webhooks.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    username: &'a str,
}

/// Posts each event as a chat message to a webhook URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    username: String,
}

impl WebhookNotifier {
    /// Creates a notifier posting to `url` under the display name
    /// `username`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotifyError`] if the HTTP client cannot be
    /// built.
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TrackerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TrackerError::NotifyError(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            username: username.into(),
        })
    }

    fn payload<'a>(&'a self, content: &'a str) -> WebhookPayload<'a> {
        WebhookPayload {
            content,
            username: &self.username,
        }
    }

    /// Posts one message.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotifyError`] if the request fails or the
    /// webhook answers with a non-2xx status.
    pub async fn post(&self, content: &str) -> Result<(), TrackerError> {
        let response = self
            .client
            .post(&self.url)
            .json(&self.payload(content))
            .send()
            .await
            .map_err(|e| TrackerError::NotifyError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::NotifyError(format!(
                "webhook returned status {status}"
            )));
        }
        Ok(())
    }
}

impl Notifier for WebhookNotifier {
    async fn notify(&self, event: &TrackingEvent) -> Result<(), TrackerError> {
        self.post(&format_message(event)).await?;
        tracing::debug!(event = event.event_type_str(), "webhook delivered");
        Ok(())
    }
}

impl AlertSink for WebhookNotifier {
    /// Mentions the subscriber in front of the event message.
    async fn deliver(&self, subscriber: &str, event: &TrackingEvent) -> Result<(), TrackerError> {
        self.post(&format!("<@{subscriber}> {}", format_message(event)))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn notifier(url: &str) -> WebhookNotifier {
        let Ok(notifier) = WebhookNotifier::new(url, "MineStalker", Duration::from_secs(1)) else {
            panic!("client should build");
        };
        notifier
    }

    #[test]
    fn payload_carries_content_and_username() {
        let notifier = notifier("http://localhost/hook");
        let Ok(json) = serde_json::to_value(notifier.payload("hello **world**")) else {
            panic!("payload should encode");
        };
        assert_eq!(
            json,
            serde_json::json!({"content": "hello **world**", "username": "MineStalker"})
        );
    }

    #[tokio::test]
    async fn unreachable_webhook_is_a_notify_error() {
        let event = TrackingEvent::ServerOffline {
            address: "h".to_string(),
            port: 30000,
            name: "Home".to_string(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        };
        let notifier = notifier("http://127.0.0.1:9/hook");
        assert!(matches!(
            notifier.notify(&event).await,
            Err(TrackerError::NotifyError(_))
        ));
        assert!(matches!(
            notifier.deliver("42", &event).await,
            Err(TrackerError::NotifyError(_))
        ));
    }
}
