//! Open/close statements for server and player sightings.
//!
//! Every function runs on the caller's connection so existence checks and
//! the writes they gate share one transaction.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use super::db_error;
use crate::domain::ServerKey;
use crate::error::TrackerError;

/// Returns the open sighting of `server_id`, if any.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn open_server_sighting(
    conn: &mut SqliteConnection,
    server_id: i64,
) -> Result<Option<i64>, TrackerError> {
    sqlx::query_scalar::<_, i64>(
        "SELECT id FROM server_sightings \
         WHERE server_id = ?1 AND disconnected_at IS NULL LIMIT 1",
    )
    .bind(server_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(db_error)
}

/// Returns the open sighting of the server at `key`, if any.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn open_server_sighting_for(
    conn: &mut SqliteConnection,
    key: &ServerKey,
) -> Result<Option<i64>, TrackerError> {
    sqlx::query_scalar::<_, i64>(
        "SELECT ss.id FROM server_sightings ss \
         JOIN servers s ON ss.server_id = s.id \
         WHERE s.address = ?1 AND s.port = ?2 AND ss.disconnected_at IS NULL LIMIT 1",
    )
    .bind(&key.address)
    .bind(i64::from(key.port))
    .fetch_optional(&mut *conn)
    .await
    .map_err(db_error)
}

/// Opens a new server sighting starting at `now`.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure,
/// including when the server already has an open sighting.
pub async fn insert_server_sighting(
    conn: &mut SqliteConnection,
    server_id: i64,
    now: DateTime<Utc>,
) -> Result<i64, TrackerError> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO server_sightings (server_id, seen_at) VALUES (?1, ?2) RETURNING id",
    )
    .bind(server_id)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error)
}

/// Closes a server sighting and every player sighting still open under
/// it. Returns the number of player sightings closed.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn close_server_sighting(
    conn: &mut SqliteConnection,
    sighting_id: i64,
    now: DateTime<Utc>,
) -> Result<u64, TrackerError> {
    sqlx::query(
        "UPDATE server_sightings SET disconnected_at = ?1 \
         WHERE id = ?2 AND disconnected_at IS NULL",
    )
    .bind(now)
    .bind(sighting_id)
    .execute(&mut *conn)
    .await
    .map_err(db_error)?;

    let players = sqlx::query(
        "UPDATE player_sightings SET disconnected_at = ?1 \
         WHERE server_sighting_id = ?2 AND disconnected_at IS NULL",
    )
    .bind(now)
    .bind(sighting_id)
    .execute(&mut *conn)
    .await
    .map_err(db_error)?;

    Ok(players.rows_affected())
}

/// Returns the open sighting of `player_id` under `server_sighting_id`.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn open_player_sighting(
    conn: &mut SqliteConnection,
    server_sighting_id: i64,
    player_id: i64,
) -> Result<Option<i64>, TrackerError> {
    sqlx::query_scalar::<_, i64>(
        "SELECT id FROM player_sightings \
         WHERE server_sighting_id = ?1 AND player_id = ?2 AND disconnected_at IS NULL LIMIT 1",
    )
    .bind(server_sighting_id)
    .bind(player_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(db_error)
}

/// Opens a player sighting under `server_sighting_id` starting at `now`.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn insert_player_sighting(
    conn: &mut SqliteConnection,
    server_sighting_id: i64,
    player_id: i64,
    now: DateTime<Utc>,
) -> Result<i64, TrackerError> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO player_sightings (server_sighting_id, player_id, seen_at) \
         VALUES (?1, ?2, ?3) RETURNING id",
    )
    .bind(server_sighting_id)
    .bind(player_id)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error)
}

/// Closes the open sighting of `player_id` under `server_sighting_id`.
/// Returns the number of rows closed (0 or 1).
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn close_player_sighting(
    conn: &mut SqliteConnection,
    server_sighting_id: i64,
    player_id: i64,
    now: DateTime<Utc>,
) -> Result<u64, TrackerError> {
    let result = sqlx::query(
        "UPDATE player_sightings SET disconnected_at = ?1 \
         WHERE server_sighting_id = ?2 AND player_id = ?3 AND disconnected_at IS NULL",
    )
    .bind(now)
    .bind(server_sighting_id)
    .bind(player_id)
    .execute(&mut *conn)
    .await
    .map_err(db_error)?;

    Ok(result.rows_affected())
}
