//! Per-subscriber alerts layered on a delivery sink.

use std::future::Future;

use super::Notifier;
use crate::domain::TrackingEvent;
use crate::error::TrackerError;
use crate::service::AlertService;

/// Delivers one event to one subscriber.
pub trait AlertSink: std::fmt::Debug + Send + Sync {
    /// Sends `event` to `subscriber`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NotifyError`] if delivery fails.
    fn deliver(
        &self,
        subscriber: &str,
        event: &TrackingEvent,
    ) -> impl Future<Output = Result<(), TrackerError>> + Send;
}

/// Forwards each event to the subscribers whose alerts match it.
#[derive(Debug)]
pub struct AlertNotifier<S> {
    alerts: AlertService,
    sink: S,
}

impl<S: AlertSink> AlertNotifier<S> {
    /// Creates a notifier resolving recipients through `alerts`.
    #[must_use]
    pub fn new(alerts: AlertService, sink: S) -> Self {
        Self { alerts, sink }
    }
}

impl<S: AlertSink> Notifier for AlertNotifier<S> {
    async fn notify(&self, event: &TrackingEvent) -> Result<(), TrackerError> {
        let recipients = self.alerts.recipients(event).await?;
        let mut failed = 0_usize;
        for subscriber in &recipients {
            if let Err(e) = self.sink.deliver(subscriber, event).await {
                tracing::warn!(subscriber, error = %e, "alert delivery failed");
                failed += 1;
            }
        }
        if failed > 0 {
            return Err(TrackerError::NotifyError(format!(
                "{failed} of {} alerts undelivered",
                recipients.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Mutex;

    use chrono::{DateTime, Utc};

    use super::*;
    use crate::domain::ServerKey;
    use crate::persistence::SqliteStore;

    #[derive(Debug, Default)]
    struct Inbox {
        delivered: Mutex<Vec<(String, &'static str)>>,
        refuse: Option<&'static str>,
    }

    impl AlertSink for Inbox {
        async fn deliver(
            &self,
            subscriber: &str,
            event: &TrackingEvent,
        ) -> Result<(), TrackerError> {
            if self.refuse == Some(subscriber) {
                return Err(TrackerError::NotifyError("blocked".to_string()));
            }
            if let Ok(mut delivered) = self.delivered.lock() {
                delivered.push((subscriber.to_string(), event.event_type_str()));
            }
            Ok(())
        }
    }

    async fn alerts() -> AlertService {
        let Ok(store) = SqliteStore::in_memory().await else {
            panic!("in-memory store should open");
        };
        let service = AlertService::new(store);
        let _ = service.subscribe_player("fan", "amy").await;
        let _ = service.subscribe_player("other", "amy").await;
        let _ = service.subscribe_server("admin", &ServerKey::new("h", 1)).await;
        service
    }

    fn join(player: &str) -> TrackingEvent {
        TrackingEvent::PlayerJoin {
            address: "h".to_string(),
            port: 1,
            player: player.to_string(),
            name: "Home".to_string(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn offline() -> TrackingEvent {
        TrackingEvent::ServerOffline {
            address: "h".to_string(),
            port: 1,
            name: "Home".to_string(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn events_reach_only_matching_subscribers() {
        let notifier = AlertNotifier::new(alerts().await, Inbox::default());
        assert!(notifier.notify(&join("amy")).await.is_ok());
        assert!(notifier.notify(&join("bob")).await.is_ok());
        assert!(notifier.notify(&offline()).await.is_ok());

        let Ok(delivered) = notifier.sink.delivered.lock() else {
            panic!("lock poisoned");
        };
        assert_eq!(
            *delivered,
            vec![
                ("fan".to_string(), "player_join"),
                ("other".to_string(), "player_join"),
                ("admin".to_string(), "server_offline"),
            ]
        );
    }

    #[tokio::test]
    async fn one_failed_delivery_does_not_block_the_rest() {
        let sink = Inbox {
            refuse: Some("fan"),
            ..Inbox::default()
        };
        let notifier = AlertNotifier::new(alerts().await, sink);
        assert!(matches!(
            notifier.notify(&join("amy")).await,
            Err(TrackerError::NotifyError(_))
        ));
        let Ok(delivered) = notifier.sink.delivered.lock() else {
            panic!("lock poisoned");
        };
        assert_eq!(*delivered, vec![("other".to_string(), "player_join")]);
    }
}
