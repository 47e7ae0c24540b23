//! Entity store: servers and players keyed by their natural keys.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use super::models::ServerRecord;
use super::{db_error, port_from_db};
use crate::domain::ServerKey;
use crate::error::TrackerError;

/// Inserts the server or refreshes its name, game and `last_seen`.
/// `first_seen` is only written on insert. Returns the server ID.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn upsert_server(
    conn: &mut SqliteConnection,
    key: &ServerKey,
    name: &str,
    game: &str,
    now: DateTime<Utc>,
) -> Result<i64, TrackerError> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO servers (address, port, name, game, first_seen, last_seen) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?5) \
         ON CONFLICT (address, port) DO UPDATE SET \
             name = excluded.name, game = excluded.game, last_seen = excluded.last_seen \
         RETURNING id",
    )
    .bind(&key.address)
    .bind(i64::from(key.port))
    .bind(name)
    .bind(game)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error)
}

/// Inserts the player if missing and returns its ID.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn upsert_player(conn: &mut SqliteConnection, name: &str) -> Result<i64, TrackerError> {
    // The no-op update makes RETURNING yield the existing row on conflict.
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO players (name) VALUES (?1) \
         ON CONFLICT (name) DO UPDATE SET name = excluded.name \
         RETURNING id",
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error)
}

/// Looks up a player ID by exact (case-sensitive) name.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn find_player_id(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<Option<i64>, TrackerError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM players WHERE name = ?1")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error)
}

/// Returns `true` if any player name matches `name` case-insensitively.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn player_exists(pool: &SqlitePool, name: &str) -> Result<bool, TrackerError> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM players WHERE LOWER(name) = LOWER(?1))",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(db_error)
}

/// Loads the `servers` row for `key`.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn load_server(
    pool: &SqlitePool,
    key: &ServerKey,
) -> Result<Option<ServerRecord>, TrackerError> {
    let row = sqlx::query_as::<_, (i64, String, i64, String, String, DateTime<Utc>, DateTime<Utc>)>(
        "SELECT id, address, port, name, game, first_seen, last_seen \
         FROM servers WHERE address = ?1 AND port = ?2",
    )
    .bind(&key.address)
    .bind(i64::from(key.port))
    .fetch_optional(pool)
    .await
    .map_err(db_error)?;

    row.map(|(id, address, port, name, game, first_seen, last_seen)| {
        Ok(ServerRecord {
            id,
            address,
            port: port_from_db(port)?,
            name,
            game,
            first_seen,
            last_seen,
        })
    })
    .transpose()
}
