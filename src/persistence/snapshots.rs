//! Snapshot archive: write-once copies of whole listings.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::models::{Snapshot, SnapshotEntry};
use super::{db_error, port_from_db};
use crate::domain::{ServerKey, ServerState};
use crate::error::TrackerError;

type SnapshotServerRow = (String, i64, String, String, String, i64, String);

fn encode_names(names: &[String]) -> Result<String, TrackerError> {
    serde_json::to_string(names).map_err(|e| TrackerError::SerializationError(e.to_string()))
}

fn decode_names(json: &str) -> Result<Vec<String>, TrackerError> {
    serde_json::from_str(json).map_err(|e| TrackerError::SerializationError(e.to_string()))
}

fn server_from_row(row: SnapshotServerRow) -> Result<ServerState, TrackerError> {
    let (address, port, name, game, mods, clients, player_list) = row;
    Ok(ServerState {
        address,
        port: port_from_db(port)?,
        name,
        game,
        clients: u32::try_from(clients).unwrap_or(0),
        player_list: decode_names(&player_list)?,
        mods: decode_names(&mods)?,
    })
}

/// Stores `servers` as one snapshot taken at `timestamp`, all rows in one
/// transaction. Returns the snapshot ID.
///
/// # Errors
///
/// Returns [`TrackerError::SerializationError`] if a name list cannot be
/// encoded, or [`TrackerError::PersistenceError`] on database failure. In
/// both cases nothing is written.
pub async fn insert_snapshot(
    pool: &SqlitePool,
    timestamp: DateTime<Utc>,
    servers: &[ServerState],
) -> Result<i64, TrackerError> {
    let mut tx = pool.begin().await.map_err(db_error)?;

    let snapshot_id =
        sqlx::query_scalar::<_, i64>("INSERT INTO snapshots (timestamp) VALUES (?1) RETURNING id")
            .bind(timestamp)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error)?;

    for server in servers {
        let player_list = encode_names(&server.player_list)?;
        let mods = encode_names(&server.mods)?;
        sqlx::query(
            "INSERT INTO snapshot_servers \
             (snapshot_id, address, port, name, game, mods, clients, player_list) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(snapshot_id)
        .bind(&server.address)
        .bind(i64::from(server.port))
        .bind(&server.name)
        .bind(&server.game)
        .bind(mods)
        .bind(i64::from(server.clients))
        .bind(player_list)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;
    }

    tx.commit().await.map_err(db_error)?;
    Ok(snapshot_id)
}

/// Loads the most recent snapshot with all of its servers.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure or a
/// [`TrackerError::SerializationError`] if a stored name list is corrupt.
pub async fn latest_snapshot(pool: &SqlitePool) -> Result<Option<Snapshot>, TrackerError> {
    let Some((id, timestamp)) = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
        "SELECT id, timestamp FROM snapshots ORDER BY timestamp DESC, id DESC LIMIT 1",
    )
    .fetch_optional(pool)
    .await
    .map_err(db_error)?
    else {
        return Ok(None);
    };

    let rows = sqlx::query_as::<_, SnapshotServerRow>(
        "SELECT address, port, name, game, mods, clients, player_list \
         FROM snapshot_servers WHERE snapshot_id = ?1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    let servers = rows
        .into_iter()
        .map(server_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(Snapshot {
        id,
        timestamp,
        servers,
    }))
}

/// Loads every archived state of the server at `key`, newest first.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure or a
/// [`TrackerError::SerializationError`] if a stored name list is corrupt.
pub async fn snapshot_history(
    pool: &SqlitePool,
    key: &ServerKey,
) -> Result<Vec<SnapshotEntry>, TrackerError> {
    let rows = sqlx::query_as::<_, (DateTime<Utc>, String, i64, String, String, String, i64, String)>(
        "SELECT snap.timestamp, s.address, s.port, s.name, s.game, s.mods, s.clients, s.player_list \
         FROM snapshot_servers s \
         JOIN snapshots snap ON s.snapshot_id = snap.id \
         WHERE s.address = ?1 AND s.port = ?2 \
         ORDER BY snap.timestamp DESC, snap.id DESC",
    )
    .bind(&key.address)
    .bind(i64::from(key.port))
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    rows.into_iter()
        .map(|(timestamp, address, port, name, game, mods, clients, player_list)| {
            let server = server_from_row((address, port, name, game, mods, clients, player_list))?;
            Ok(SnapshotEntry { timestamp, server })
        })
        .collect()
}
