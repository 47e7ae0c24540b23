//! Read projections over the sighting tables.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::models::{PlayerSightingRecord, ServerSightingRecord};
use super::{db_error, port_from_db};
use crate::domain::ServerKey;
use crate::error::TrackerError;

/// All sightings of players whose name matches `name` case-insensitively,
/// newest first.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn player_history(
    pool: &SqlitePool,
    name: &str,
) -> Result<Vec<PlayerSightingRecord>, TrackerError> {
    let rows = sqlx::query_as::<
        _,
        (String, String, i64, String, DateTime<Utc>, Option<DateTime<Utc>>),
    >(
        "SELECT p.name, s.address, s.port, s.name, ps.seen_at, ps.disconnected_at \
         FROM player_sightings ps \
         JOIN players p ON ps.player_id = p.id \
         JOIN server_sightings ss ON ps.server_sighting_id = ss.id \
         JOIN servers s ON ss.server_id = s.id \
         WHERE LOWER(p.name) = LOWER(?1) \
         ORDER BY ps.seen_at DESC, ps.id DESC",
    )
    .bind(name)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    rows.into_iter()
        .map(
            |(player, address, port, server_name, connected_at, disconnected_at)| {
                Ok(PlayerSightingRecord {
                    player,
                    address,
                    port: port_from_db(port)?,
                    server_name,
                    connected_at,
                    disconnected_at,
                })
            },
        )
        .collect()
}

/// All sightings of the server at `key`, newest first.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn server_history(
    pool: &SqlitePool,
    key: &ServerKey,
) -> Result<Vec<ServerSightingRecord>, TrackerError> {
    let rows = sqlx::query_as::<_, (DateTime<Utc>, Option<DateTime<Utc>>)>(
        "SELECT ss.seen_at, ss.disconnected_at \
         FROM server_sightings ss \
         JOIN servers s ON ss.server_id = s.id \
         WHERE s.address = ?1 AND s.port = ?2 \
         ORDER BY ss.seen_at DESC, ss.id DESC",
    )
    .bind(&key.address)
    .bind(i64::from(key.port))
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    Ok(rows
        .into_iter()
        .map(|(seen_at, disconnected_at)| ServerSightingRecord {
            seen_at,
            disconnected_at,
        })
        .collect())
}
