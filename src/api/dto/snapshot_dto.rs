//! Snapshot archive DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ServerState;
use crate::persistence::models::{Snapshot, SnapshotEntry};

/// A server as captured in a snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct SnapshotServerDto {
    /// Server address.
    pub address: String,
    /// Server port.
    pub port: u16,
    /// Listed name.
    pub name: String,
    /// Game identifier.
    pub game: String,
    /// Reported client count.
    pub clients: u32,
    /// Connected player names.
    pub player_list: Vec<String>,
    /// Installed mods, if published.
    pub mods: Vec<String>,
}

impl From<ServerState> for SnapshotServerDto {
    fn from(server: ServerState) -> Self {
        Self {
            address: server.address,
            port: server.port,
            name: server.name,
            game: server.game,
            clients: server.clients,
            player_list: server.player_list,
            mods: server.mods,
        }
    }
}

/// Response body for `GET /snapshots/latest`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SnapshotDto {
    /// Capture time.
    pub timestamp: DateTime<Utc>,
    /// Every server in the captured listing.
    pub servers: Vec<SnapshotServerDto>,
}

impl From<Snapshot> for SnapshotDto {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            timestamp: snapshot.timestamp,
            servers: snapshot.servers.into_iter().map(Into::into).collect(),
        }
    }
}

/// One archived state of a single server.
#[derive(Debug, Serialize, ToSchema)]
pub struct SnapshotEntryDto {
    /// Capture time of the containing snapshot.
    pub timestamp: DateTime<Utc>,
    /// The server as captured.
    pub server: SnapshotServerDto,
}

impl From<SnapshotEntry> for SnapshotEntryDto {
    fn from(entry: SnapshotEntry) -> Self {
        Self {
            timestamp: entry.timestamp,
            server: entry.server.into(),
        }
    }
}
