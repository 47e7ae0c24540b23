//! Outbound notifications for tracking events.
//!
//! Each [`Notifier`] receives events one at a time. [`dispatch`] fans a
//! cycle's events out to every configured notifier, pacing deliveries so a
//! burst of joins does not trip the receiver's rate limit.
//! [`AlertNotifier`] narrows delivery to subscribers whose alerts match.

pub mod alerts;
pub mod webhook;

use std::future::Future;
use std::time::Duration;

pub use alerts::{AlertNotifier, AlertSink};
pub use webhook::WebhookNotifier;

use crate::domain::TrackingEvent;
use crate::error::TrackerError;

/// A sink for tracking events.
pub trait Notifier: std::fmt::Debug + Send + Sync {
    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotifyError`] if delivery fails.
    fn notify(&self, event: &TrackingEvent) -> impl Future<Output = Result<(), TrackerError>> + Send;
}

/// The notifiers the service can run side by side.
#[derive(Debug)]
pub enum Channel {
    /// Every event to one shared webhook.
    Webhook(WebhookNotifier),
    /// Matching events to individual subscribers through a webhook.
    Alerts(AlertNotifier<WebhookNotifier>),
}

impl Notifier for Channel {
    async fn notify(&self, event: &TrackingEvent) -> Result<(), TrackerError> {
        match self {
            Self::Webhook(notifier) => notifier.notify(event).await,
            Self::Alerts(notifier) => notifier.notify(event).await,
        }
    }
}

/// Renders `event` as a human-readable chat message.
#[must_use]
pub fn format_message(event: &TrackingEvent) -> String {
    match event {
        TrackingEvent::PlayerJoin { player, name, .. } => {
            format!("Player **{player}** joined server **{name}**")
        }
        TrackingEvent::PlayerLeave { player, name, .. } => {
            format!("Player **{player}** left server **{name}**")
        }
        TrackingEvent::ServerOnline {
            address, port, name, ..
        } => format!("Server **{name}** ({address}:{port}) is now **ONLINE**"),
        TrackingEvent::ServerOffline {
            address, port, name, ..
        } => format!("Server **{name}** ({address}:{port}) is now **OFFLINE**"),
    }
}

/// Sends every event to every notifier in order, sleeping `delay` after
/// each event. Failures are logged and skipped. Returns the number of
/// successful deliveries.
pub async fn dispatch<N: Notifier>(
    notifiers: &[N],
    events: &[TrackingEvent],
    delay: Duration,
) -> usize {
    if notifiers.is_empty() {
        return 0;
    }

    let mut delivered = 0;
    for event in events {
        for notifier in notifiers {
            match notifier.notify(event).await {
                Ok(()) => delivered += 1,
                Err(e) => tracing::warn!(
                    event = event.event_type_str(),
                    server = %event.key(),
                    error = %e,
                    "notification failed"
                ),
            }
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
    delivered
}
