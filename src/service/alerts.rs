//! Alert subscriptions and event-to-subscriber matching.

use crate::domain::{ServerKey, TrackingEvent};
use crate::error::TrackerError;
use crate::persistence::models::{PlayerAlert, ServerAlert};
use crate::persistence::{SqliteStore, alerts};

/// Every alert one subscriber holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertList {
    /// Followed players.
    pub players: Vec<PlayerAlert>,
    /// Followed servers.
    pub servers: Vec<ServerAlert>,
}

/// Manages alert subscriptions and resolves who to alert for an event.
///
/// Player alerts fire on joins and leaves of the exact player name. Server
/// alerts fire when that `(address, port)` goes online or offline.
#[derive(Debug, Clone)]
pub struct AlertService {
    store: SqliteStore,
}

impl AlertService {
    /// Creates a service over `store`.
    #[must_use]
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Follows `player` for `subscriber`. Returns `false` if already
    /// followed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] for a blank name or
    /// subscriber, or a persistence error.
    pub async fn subscribe_player(
        &self,
        subscriber: &str,
        player: &str,
    ) -> Result<bool, TrackerError> {
        require("subscriber", subscriber)?;
        require("player name", player)?;
        alerts::insert_player_alert(self.store.pool(), player, subscriber).await
    }

    /// Stops following `player` for `subscriber`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::AlertNotFound`] if no such alert exists, or
    /// a persistence error.
    pub async fn unsubscribe_player(
        &self,
        subscriber: &str,
        player: &str,
    ) -> Result<(), TrackerError> {
        if alerts::delete_player_alert(self.store.pool(), player, subscriber).await? {
            Ok(())
        } else {
            Err(TrackerError::AlertNotFound(format!("{subscriber} -> {player}")))
        }
    }

    /// Follows the server at `key` for `subscriber`. Returns `false` if
    /// already followed.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidRequest`] for a blank address or
    /// subscriber, or a persistence error.
    pub async fn subscribe_server(
        &self,
        subscriber: &str,
        key: &ServerKey,
    ) -> Result<bool, TrackerError> {
        require("subscriber", subscriber)?;
        require("server address", &key.address)?;
        alerts::insert_server_alert(self.store.pool(), key, subscriber).await
    }

    /// Stops following the server at `key` for `subscriber`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::AlertNotFound`] if no such alert exists, or
    /// a persistence error.
    pub async fn unsubscribe_server(
        &self,
        subscriber: &str,
        key: &ServerKey,
    ) -> Result<(), TrackerError> {
        if alerts::delete_server_alert(self.store.pool(), key, subscriber).await? {
            Ok(())
        } else {
            Err(TrackerError::AlertNotFound(format!("{subscriber} -> {key}")))
        }
    }

    /// Every alert held by `subscriber`. Empty for unknown subscribers.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn alerts_of(&self, subscriber: &str) -> Result<AlertList, TrackerError> {
        Ok(AlertList {
            players: alerts::player_alerts_of(self.store.pool(), subscriber).await?,
            servers: alerts::server_alerts_of(self.store.pool(), subscriber).await?,
        })
    }

    /// Subscribers to alert for `event`.
    ///
    /// # Errors
    ///
    /// Returns a persistence error.
    pub async fn recipients(&self, event: &TrackingEvent) -> Result<Vec<String>, TrackerError> {
        match event {
            TrackingEvent::PlayerJoin { player, .. } | TrackingEvent::PlayerLeave { player, .. } => {
                alerts::player_subscribers(self.store.pool(), player).await
            }
            TrackingEvent::ServerOnline { .. } | TrackingEvent::ServerOffline { .. } => {
                alerts::server_subscribers(self.store.pool(), &event.key()).await
            }
        }
    }
}

fn require(what: &str, value: &str) -> Result<(), TrackerError> {
    if value.trim().is_empty() {
        return Err(TrackerError::InvalidRequest(format!("{what} must not be empty")));
    }
    Ok(())
}
