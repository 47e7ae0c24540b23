//! Row models returned by the read queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ServerState;

/// A row of the `servers` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    /// Auto-increment row ID.
    pub id: i64,
    /// Server address.
    pub address: String,
    /// Server port.
    pub port: u16,
    /// Most recently listed name.
    pub name: String,
    /// Most recently listed game identifier.
    pub game: String,
    /// First time the server was listed.
    pub first_seen: DateTime<Utc>,
    /// Last time the server came online or was refreshed.
    pub last_seen: DateTime<Utc>,
}

/// One presence interval of a player on a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSightingRecord {
    /// Player name as stored.
    pub player: String,
    /// Server address.
    pub address: String,
    /// Server port.
    pub port: u16,
    /// Server name at the time of the query.
    pub server_name: String,
    /// Start of the interval.
    pub connected_at: DateTime<Utc>,
    /// End of the interval; `None` while the player is still online.
    pub disconnected_at: Option<DateTime<Utc>>,
}

/// One presence interval of a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSightingRecord {
    /// Start of the interval.
    pub seen_at: DateTime<Utc>,
    /// End of the interval; `None` while the server is still listed.
    pub disconnected_at: Option<DateTime<Utc>>,
}

/// An archived listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Auto-increment row ID.
    pub id: i64,
    /// Capture time.
    pub timestamp: DateTime<Utc>,
    /// Listed servers, in listing order.
    pub servers: Vec<ServerState>,
}

/// One server's entry within an archived listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// Capture time of the containing snapshot.
    pub timestamp: DateTime<Utc>,
    /// The archived server state.
    pub server: ServerState,
}

/// A subscriber's alert on one player name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAlert {
    /// Auto-increment row ID.
    pub id: i64,
    /// Player name, matched exactly.
    pub player: String,
    /// Opaque subscriber identity (a chat user ID).
    pub subscriber: String,
}

/// A subscriber's alert on one server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAlert {
    /// Auto-increment row ID.
    pub id: i64,
    /// Server address.
    pub address: String,
    /// Server port.
    pub port: u16,
    /// Opaque subscriber identity (a chat user ID).
    pub subscriber: String,
}
