//! Events produced by diffing two successive listings.
//!
//! A [`TrackingEvent`] lives for one poll cycle: the detector emits it, the
//! sighting ledger applies it and the notifiers announce it. It is never
//! stored as such.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ServerKey;

/// A detected transition between two poll cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TrackingEvent {
    /// A server `(address, port)` appeared in the listing.
    ServerOnline {
        /// Server address.
        address: String,
        /// Server port.
        port: u16,
        /// Listed server name.
        name: String,
        /// Listed game identifier.
        game: String,
        /// Cycle timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A previously listed server address disappeared.
    ServerOffline {
        /// Server address.
        address: String,
        /// Server port.
        port: u16,
        /// Last known server name.
        name: String,
        /// Cycle timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A player appeared on a server.
    PlayerJoin {
        /// Server address.
        address: String,
        /// Server port.
        port: u16,
        /// Player name.
        player: String,
        /// Server name.
        name: String,
        /// Cycle timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A player vanished from a server, or the server went away.
    PlayerLeave {
        /// Server address.
        address: String,
        /// Server port.
        port: u16,
        /// Player name.
        player: String,
        /// Server name.
        name: String,
        /// Cycle timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl TrackingEvent {
    /// Returns the server address of this event.
    #[must_use]
    pub fn address(&self) -> &str {
        match self {
            Self::ServerOnline { address, .. }
            | Self::ServerOffline { address, .. }
            | Self::PlayerJoin { address, .. }
            | Self::PlayerLeave { address, .. } => address,
        }
    }

    /// Returns the server port of this event.
    #[must_use]
    pub const fn port(&self) -> u16 {
        match self {
            Self::ServerOnline { port, .. }
            | Self::ServerOffline { port, .. }
            | Self::PlayerJoin { port, .. }
            | Self::PlayerLeave { port, .. } => *port,
        }
    }

    /// Returns the `(address, port)` key of this event.
    #[must_use]
    pub fn key(&self) -> ServerKey {
        ServerKey::new(self.address(), self.port())
    }

    /// Returns the server name carried by this event.
    #[must_use]
    pub fn server_name(&self) -> &str {
        match self {
            Self::ServerOnline { name, .. }
            | Self::ServerOffline { name, .. }
            | Self::PlayerJoin { name, .. }
            | Self::PlayerLeave { name, .. } => name,
        }
    }

    /// Returns the player name for player events.
    #[must_use]
    pub fn player(&self) -> Option<&str> {
        match self {
            Self::PlayerJoin { player, .. } | Self::PlayerLeave { player, .. } => Some(player),
            Self::ServerOnline { .. } | Self::ServerOffline { .. } => None,
        }
    }

    /// Returns the cycle timestamp of this event.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ServerOnline { timestamp, .. }
            | Self::ServerOffline { timestamp, .. }
            | Self::PlayerJoin { timestamp, .. }
            | Self::PlayerLeave { timestamp, .. } => *timestamp,
        }
    }

    /// Application priority: online, offline, join, leave.
    #[must_use]
    pub const fn priority(&self) -> u8 {
        match self {
            Self::ServerOnline { .. } => 1,
            Self::ServerOffline { .. } => 2,
            Self::PlayerJoin { .. } => 3,
            Self::PlayerLeave { .. } => 4,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::ServerOnline { .. } => "server_online",
            Self::ServerOffline { .. } => "server_offline",
            Self::PlayerJoin { .. } => "player_join",
            Self::PlayerLeave { .. } => "player_leave",
        }
    }
}

/// Stable-sorts a cycle's events by [`TrackingEvent::priority`].
///
/// Events of the same kind keep their detection order.
pub fn sort_by_priority(events: &mut [TrackingEvent]) {
    events.sort_by_key(TrackingEvent::priority);
}
