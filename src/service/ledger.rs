//! Sighting ledger: applies tracking events to the interval tables.

use crate::domain::{ServerKey, TrackingEvent};
use crate::error::TrackerError;
use crate::persistence::{SqliteStore, entities, sightings};

/// Effect of applying a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A sighting was opened.
    Opened,
    /// A sighting was closed (with its player sightings, for servers).
    Closed,
    /// The ledger already matched the event.
    Unchanged,
}

/// Counts for one batch of events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    /// Events that opened or closed a sighting.
    pub applied: usize,
    /// Events that found the ledger already in the desired state.
    pub unchanged: usize,
    /// Events dropped as consistency violations.
    pub dropped: usize,
    /// Events that failed on storage errors.
    pub failed: usize,
}

/// Applies [`TrackingEvent`]s to the sighting tables, one transaction per
/// event.
///
/// Events must arrive in priority order: a server's online event before
/// its joins, its offline event before the leaves that it already covers.
#[derive(Debug, Clone)]
pub struct SightingLedger {
    store: SqliteStore,
}

impl SightingLedger {
    /// Creates a ledger over `store`.
    #[must_use]
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Applies every event in order. Failures are logged and counted; they
    /// never stop the remaining events.
    pub async fn apply_all(&self, events: &[TrackingEvent]) -> ApplySummary {
        let mut summary = ApplySummary::default();
        for event in events {
            match self.apply(event).await {
                Ok(ApplyOutcome::Opened | ApplyOutcome::Closed) => summary.applied += 1,
                Ok(ApplyOutcome::Unchanged) => summary.unchanged += 1,
                Err(e) if e.is_consistency_violation() => {
                    tracing::warn!(
                        event = event.event_type_str(),
                        server = %event.key(),
                        player = event.player().unwrap_or_default(),
                        error = %e,
                        "event dropped"
                    );
                    summary.dropped += 1;
                }
                Err(e) => {
                    tracing::error!(
                        event = event.event_type_str(),
                        server = %event.key(),
                        error = %e,
                        "failed to record event"
                    );
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// Applies one event atomically. The event's timestamp is used as
    /// "now" for every row it touches.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NoOpenServerSighting`] for a player event on
    /// a server without an open sighting, [`TrackerError::UnknownPlayer`]
    /// for a leave by a never-recorded player, and
    /// [`TrackerError::PersistenceError`] on database failure. Nothing is
    /// written when an error is returned.
    pub async fn apply(&self, event: &TrackingEvent) -> Result<ApplyOutcome, TrackerError> {
        let now = event.timestamp();
        let key = event.key();
        match event {
            TrackingEvent::ServerOnline { name, game, .. } => {
                let mut tx = self.store.begin().await?;
                let server_id = entities::upsert_server(&mut tx, &key, name, game, now).await?;
                let outcome = if sightings::open_server_sighting(&mut tx, server_id)
                    .await?
                    .is_some()
                {
                    ApplyOutcome::Unchanged
                } else {
                    sightings::insert_server_sighting(&mut tx, server_id, now).await?;
                    ApplyOutcome::Opened
                };
                commit(tx).await?;
                Ok(outcome)
            }

            TrackingEvent::ServerOffline { .. } => {
                let mut tx = self.store.begin().await?;
                let Some(sighting_id) = sightings::open_server_sighting_for(&mut tx, &key).await?
                else {
                    tracing::debug!(server = %key, "offline for server without open sighting");
                    return Ok(ApplyOutcome::Unchanged);
                };
                let players = sightings::close_server_sighting(&mut tx, sighting_id, now).await?;
                commit(tx).await?;
                tracing::debug!(server = %key, players, "server sighting closed");
                Ok(ApplyOutcome::Closed)
            }

            TrackingEvent::PlayerJoin { player, .. } => {
                let mut tx = self.store.begin().await?;
                let sighting_id = require_open_sighting(&mut tx, &key).await?;
                let player_id = entities::upsert_player(&mut tx, player).await?;
                if sightings::open_player_sighting(&mut tx, sighting_id, player_id)
                    .await?
                    .is_some()
                {
                    return Ok(ApplyOutcome::Unchanged);
                }
                sightings::insert_player_sighting(&mut tx, sighting_id, player_id, now).await?;
                commit(tx).await?;
                Ok(ApplyOutcome::Opened)
            }

            TrackingEvent::PlayerLeave { player, .. } => {
                let mut tx = self.store.begin().await?;
                let sighting_id = require_open_sighting(&mut tx, &key).await?;
                let Some(player_id) = entities::find_player_id(&mut tx, player).await? else {
                    return Err(TrackerError::UnknownPlayer(player.clone()));
                };
                let closed =
                    sightings::close_player_sighting(&mut tx, sighting_id, player_id, now).await?;
                commit(tx).await?;
                Ok(if closed == 0 {
                    ApplyOutcome::Unchanged
                } else {
                    ApplyOutcome::Closed
                })
            }
        }
    }
}

async fn require_open_sighting(
    conn: &mut sqlx::SqliteConnection,
    key: &ServerKey,
) -> Result<i64, TrackerError> {
    sightings::open_server_sighting_for(conn, key)
        .await?
        .ok_or_else(|| TrackerError::NoOpenServerSighting {
            address: key.address.clone(),
            port: key.port,
        })
}

async fn commit(tx: sqlx::Transaction<'_, sqlx::Sqlite>) -> Result<(), TrackerError> {
    tx.commit()
        .await
        .map_err(|e| TrackerError::PersistenceError(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
    }

    async fn ledger() -> SightingLedger {
        let Ok(store) = SqliteStore::in_memory().await else {
            panic!("in-memory store should open");
        };
        SightingLedger::new(store)
    }

    fn online(address: &str, port: u16, secs: i64) -> TrackingEvent {
        TrackingEvent::ServerOnline {
            address: address.to_string(),
            port,
            name: "Srv".to_string(),
            game: "minetest".to_string(),
            timestamp: at(secs),
        }
    }

    fn offline(address: &str, port: u16, secs: i64) -> TrackingEvent {
        TrackingEvent::ServerOffline {
            address: address.to_string(),
            port,
            name: "Srv".to_string(),
            timestamp: at(secs),
        }
    }

    fn join(address: &str, port: u16, player: &str, secs: i64) -> TrackingEvent {
        TrackingEvent::PlayerJoin {
            address: address.to_string(),
            port,
            player: player.to_string(),
            name: "Srv".to_string(),
            timestamp: at(secs),
        }
    }

    fn leave(address: &str, port: u16, player: &str, secs: i64) -> TrackingEvent {
        TrackingEvent::PlayerLeave {
            address: address.to_string(),
            port,
            player: player.to_string(),
            name: "Srv".to_string(),
            timestamp: at(secs),
        }
    }

    async fn count(ledger: &SightingLedger, sql: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(ledger.store.pool())
            .await
            .unwrap_or(-1)
    }

    #[tokio::test]
    async fn online_is_idempotent() {
        let ledger = ledger().await;
        assert!(matches!(
            ledger.apply(&online("h", 1, 10)).await,
            Ok(ApplyOutcome::Opened)
        ));
        assert!(matches!(
            ledger.apply(&online("h", 1, 20)).await,
            Ok(ApplyOutcome::Unchanged)
        ));
        assert_eq!(count(&ledger, "SELECT COUNT(*) FROM server_sightings").await, 1);
        assert_eq!(count(&ledger, "SELECT COUNT(*) FROM servers").await, 1);
    }

    #[tokio::test]
    async fn offline_without_open_sighting_is_a_no_op() {
        let ledger = ledger().await;
        assert!(matches!(
            ledger.apply(&offline("h", 1, 10)).await,
            Ok(ApplyOutcome::Unchanged)
        ));
        assert_eq!(count(&ledger, "SELECT COUNT(*) FROM server_sightings").await, 0);
    }

    #[tokio::test]
    async fn offline_cascades_to_player_sightings() {
        let ledger = ledger().await;
        let summary = ledger
            .apply_all(&[
                online("5.6.7.8", 30000, 10),
                join("5.6.7.8", 30000, "amy", 10),
                join("5.6.7.8", 30000, "bob", 10),
                offline("5.6.7.8", 30000, 50),
                leave("5.6.7.8", 30000, "amy", 50),
            ])
            .await;

        // The trailing leave finds the server already closed.
        assert_eq!(summary.applied, 4);
        assert_eq!(summary.dropped, 1);
        assert_eq!(
            count(
                &ledger,
                "SELECT COUNT(*) FROM server_sightings WHERE disconnected_at IS NULL"
            )
            .await,
            0
        );
        assert_eq!(
            count(
                &ledger,
                "SELECT COUNT(*) FROM player_sightings WHERE disconnected_at IS NULL"
            )
            .await,
            0
        );
        assert_eq!(
            count(
                &ledger,
                "SELECT COUNT(*) FROM player_sightings ps \
                 JOIN server_sightings ss ON ps.server_sighting_id = ss.id \
                 WHERE ps.disconnected_at = ss.disconnected_at"
            )
            .await,
            2
        );
    }

    #[tokio::test]
    async fn join_without_open_server_is_rejected() {
        let ledger = ledger().await;
        let result = ledger.apply(&join("h", 1, "amy", 10)).await;
        assert!(matches!(
            result,
            Err(TrackerError::NoOpenServerSighting { ref address, port: 1 }) if address == "h"
        ));
        assert_eq!(count(&ledger, "SELECT COUNT(*) FROM player_sightings").await, 0);
        assert_eq!(count(&ledger, "SELECT COUNT(*) FROM server_sightings").await, 0);
        assert_eq!(count(&ledger, "SELECT COUNT(*) FROM players").await, 0);
    }

    #[tokio::test]
    async fn join_after_server_closed_is_rejected() {
        let ledger = ledger().await;
        let _ = ledger.apply_all(&[online("h", 1, 10), offline("h", 1, 20)]).await;
        let summary = ledger.apply_all(&[join("h", 1, "amy", 30)]).await;
        assert_eq!(summary.dropped, 1);
        assert_eq!(count(&ledger, "SELECT COUNT(*) FROM player_sightings").await, 0);
    }

    #[tokio::test]
    async fn repeated_join_keeps_one_open_sighting() {
        let ledger = ledger().await;
        let _ = ledger.apply(&online("h", 1, 10)).await;
        assert!(matches!(
            ledger.apply(&join("h", 1, "amy", 10)).await,
            Ok(ApplyOutcome::Opened)
        ));
        assert!(matches!(
            ledger.apply(&join("h", 1, "amy", 20)).await,
            Ok(ApplyOutcome::Unchanged)
        ));
        assert_eq!(count(&ledger, "SELECT COUNT(*) FROM player_sightings").await, 1);
    }

    #[tokio::test]
    async fn leave_closes_only_that_player() {
        let ledger = ledger().await;
        let _ = ledger
            .apply_all(&[online("h", 1, 10), join("h", 1, "amy", 10), join("h", 1, "bob", 10)])
            .await;

        assert!(matches!(
            ledger.apply(&leave("h", 1, "amy", 30)).await,
            Ok(ApplyOutcome::Closed)
        ));
        assert!(matches!(
            ledger.apply(&leave("h", 1, "amy", 40)).await,
            Ok(ApplyOutcome::Unchanged)
        ));
        assert_eq!(
            count(
                &ledger,
                "SELECT COUNT(*) FROM player_sightings WHERE disconnected_at IS NULL"
            )
            .await,
            1
        );
    }

    #[tokio::test]
    async fn leave_by_unknown_player_is_rejected() {
        let ledger = ledger().await;
        let _ = ledger.apply(&online("h", 1, 10)).await;
        let result = ledger.apply(&leave("h", 1, "ghost", 20)).await;
        assert!(matches!(result, Err(TrackerError::UnknownPlayer(ref p)) if p == "ghost"));
    }

    #[tokio::test]
    async fn rejoin_after_leave_opens_new_interval() {
        let ledger = ledger().await;
        let summary = ledger
            .apply_all(&[
                online("h", 1, 10),
                join("h", 1, "amy", 10),
                leave("h", 1, "amy", 20),
                join("h", 1, "amy", 30),
            ])
            .await;
        assert_eq!(summary.applied, 4);
        assert_eq!(count(&ledger, "SELECT COUNT(*) FROM player_sightings").await, 2);
        assert_eq!(
            count(
                &ledger,
                "SELECT COUNT(*) FROM player_sightings WHERE disconnected_at IS NULL"
            )
            .await,
            1
        );
    }

    #[tokio::test]
    async fn server_back_online_opens_new_episode() {
        let ledger = ledger().await;
        let _ = ledger
            .apply_all(&[online("h", 1, 10), offline("h", 1, 20), online("h", 1, 30)])
            .await;
        assert_eq!(count(&ledger, "SELECT COUNT(*) FROM server_sightings").await, 2);
        assert_eq!(
            count(
                &ledger,
                "SELECT COUNT(*) FROM server_sightings WHERE disconnected_at IS NULL"
            )
            .await,
            1
        );
    }
}
