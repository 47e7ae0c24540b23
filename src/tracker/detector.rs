//! Listing diff: turns two successive listings into tracking events.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::domain::{
    ServerState, TrackedServer, TrackerState, TrackingEvent, sort_by_priority,
};

/// Owns the [`TrackerState`] and rewrites it on every [`detect`] call.
///
/// Exactly one detector exists per poll loop, so the cache is never shared
/// between in-flight cycles.
///
/// [`detect`]: EventDetector::detect
#[derive(Debug, Default)]
pub struct EventDetector {
    state: TrackerState,
}

impl EventDetector {
    /// Creates a detector with an empty cache. The first listing reports
    /// every server and player as new.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cache as of the last detection.
    #[must_use]
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// Diffs `listing` against the cached state, replaces the cache, and
    /// returns the cycle's events sorted by priority.
    pub fn detect(&mut self, listing: &[ServerState], now: DateTime<Utc>) -> Vec<TrackingEvent> {
        let (events, next) = diff(&self.state, listing, now);
        tracing::debug!(
            events = events.len(),
            tracked = next.len(),
            "listing diffed"
        );
        self.state = next;
        events
    }
}

/// Computes the events between `previous` and `listing` and the state that
/// replaces `previous`.
///
/// Offline detection works per address: a server whose address is still
/// listed under another port is not reported offline, yet its old port is
/// dropped from the returned state.
#[must_use]
pub fn diff(
    previous: &TrackerState,
    listing: &[ServerState],
    now: DateTime<Utc>,
) -> (Vec<TrackingEvent>, TrackerState) {
    let mut next = TrackerState::new();
    let mut accepted = Vec::with_capacity(listing.len());
    for server in listing {
        if server.address.is_empty() {
            continue;
        }
        let key = server.key();
        if next.contains(&key) {
            tracing::debug!(server = %key, "duplicate listing entry skipped");
            continue;
        }
        next.insert(
            key,
            TrackedServer {
                name: server.name.clone(),
                game: server.game.clone(),
                players: server.player_set(),
            },
        );
        accepted.push(server);
    }

    let mut events = Vec::new();
    for (key, tracked) in previous.iter() {
        if next.contains_address(&key.address) {
            continue;
        }
        events.push(TrackingEvent::ServerOffline {
            address: key.address.clone(),
            port: key.port,
            name: tracked.name.clone(),
            timestamp: now,
        });
        for player in &tracked.players {
            events.push(TrackingEvent::PlayerLeave {
                address: key.address.clone(),
                port: key.port,
                player: player.clone(),
                name: tracked.name.clone(),
                timestamp: now,
            });
        }
    }

    let no_players = BTreeSet::new();
    for server in accepted {
        let key = server.key();
        let prev = previous.get(&key);
        if prev.is_none() {
            events.push(TrackingEvent::ServerOnline {
                address: server.address.clone(),
                port: server.port,
                name: server.name.clone(),
                game: server.game.clone(),
                timestamp: now,
            });
        }

        let prev_players = prev.map_or(&no_players, |tracked| &tracked.players);
        let players = next.get(&key).map_or(&no_players, |tracked| &tracked.players);
        for player in players.difference(prev_players) {
            events.push(TrackingEvent::PlayerJoin {
                address: server.address.clone(),
                port: server.port,
                player: player.clone(),
                name: server.name.clone(),
                timestamp: now,
            });
        }
        for player in prev_players.difference(players) {
            events.push(TrackingEvent::PlayerLeave {
                address: server.address.clone(),
                port: server.port,
                player: player.clone(),
                name: server.name.clone(),
                timestamp: now,
            });
        }
    }

    sort_by_priority(&mut events);
    (events, next)
}
