//! Player and server history DTOs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::persistence::models::{PlayerSightingRecord, ServerRecord, ServerSightingRecord};

/// One interval a player spent on a server.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerSightingDto {
    /// Server address.
    pub address: String,
    /// Server port.
    pub port: u16,
    /// Current name of the server.
    pub server_name: String,
    /// When the player was first seen on the server.
    pub connected_at: DateTime<Utc>,
    /// When the player left; `null` while still online.
    pub disconnected_at: Option<DateTime<Utc>>,
}

impl From<PlayerSightingRecord> for PlayerSightingDto {
    fn from(record: PlayerSightingRecord) -> Self {
        Self {
            address: record.address,
            port: record.port,
            server_name: record.server_name,
            connected_at: record.connected_at,
            disconnected_at: record.disconnected_at,
        }
    }
}

/// One interval a server was listed.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServerSightingDto {
    /// When the server appeared in the listing.
    pub seen_at: DateTime<Utc>,
    /// When it disappeared; `null` while still listed.
    pub disconnected_at: Option<DateTime<Utc>>,
}

impl From<ServerSightingRecord> for ServerSightingDto {
    fn from(record: ServerSightingRecord) -> Self {
        Self {
            seen_at: record.seen_at,
            disconnected_at: record.disconnected_at,
        }
    }
}

/// Stored identity of a tracked server.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServerInfoDto {
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
    /// Last time the server came online.
    pub last_seen: DateTime<Utc>,
}

impl From<ServerRecord> for ServerInfoDto {
    fn from(record: ServerRecord) -> Self {
        Self {
            address: record.address,
            port: record.port,
            name: record.name,
            game: record.game,
            first_seen: record.first_seen,
            last_seen: record.last_seen,
        }
    }
}
