//! Alert subscriptions: which subscribers follow which players and servers.

use sqlx::SqlitePool;

use super::models::{PlayerAlert, ServerAlert};
use super::{db_error, port_from_db};
use crate::domain::ServerKey;
use crate::error::TrackerError;

/// Subscribes `subscriber` to `player`. Returns `false` if the alert
/// already existed.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn insert_player_alert(
    pool: &SqlitePool,
    player: &str,
    subscriber: &str,
) -> Result<bool, TrackerError> {
    let result = sqlx::query(
        "INSERT INTO player_alerts (player_name, subscriber) VALUES (?1, ?2) \
         ON CONFLICT (player_name, subscriber) DO NOTHING",
    )
    .bind(player)
    .bind(subscriber)
    .execute(pool)
    .await
    .map_err(db_error)?;
    Ok(result.rows_affected() > 0)
}

/// Removes the alert of `subscriber` on `player`. Returns `false` if there
/// was none.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn delete_player_alert(
    pool: &SqlitePool,
    player: &str,
    subscriber: &str,
) -> Result<bool, TrackerError> {
    let result =
        sqlx::query("DELETE FROM player_alerts WHERE player_name = ?1 AND subscriber = ?2")
            .bind(player)
            .bind(subscriber)
            .execute(pool)
            .await
            .map_err(db_error)?;
    Ok(result.rows_affected() > 0)
}

/// Player alerts held by `subscriber`, oldest first.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn player_alerts_of(
    pool: &SqlitePool,
    subscriber: &str,
) -> Result<Vec<PlayerAlert>, TrackerError> {
    let rows = sqlx::query_as::<_, (i64, String, String)>(
        "SELECT id, player_name, subscriber FROM player_alerts WHERE subscriber = ?1 ORDER BY id",
    )
    .bind(subscriber)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    Ok(rows
        .into_iter()
        .map(|(id, player, subscriber)| PlayerAlert {
            id,
            player,
            subscriber,
        })
        .collect())
}

/// Subscribers following `player`. The name match is exact, letter case
/// included.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn player_subscribers(
    pool: &SqlitePool,
    player: &str,
) -> Result<Vec<String>, TrackerError> {
    sqlx::query_scalar::<_, String>(
        "SELECT subscriber FROM player_alerts WHERE player_name = ?1 ORDER BY id",
    )
    .bind(player)
    .fetch_all(pool)
    .await
    .map_err(db_error)
}

/// Subscribes `subscriber` to the server at `key`. Returns `false` if the
/// alert already existed.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn insert_server_alert(
    pool: &SqlitePool,
    key: &ServerKey,
    subscriber: &str,
) -> Result<bool, TrackerError> {
    let result = sqlx::query(
        "INSERT INTO server_alerts (address, port, subscriber) VALUES (?1, ?2, ?3) \
         ON CONFLICT (address, port, subscriber) DO NOTHING",
    )
    .bind(&key.address)
    .bind(i64::from(key.port))
    .bind(subscriber)
    .execute(pool)
    .await
    .map_err(db_error)?;
    Ok(result.rows_affected() > 0)
}

/// Removes the alert of `subscriber` on the server at `key`. Returns
/// `false` if there was none.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn delete_server_alert(
    pool: &SqlitePool,
    key: &ServerKey,
    subscriber: &str,
) -> Result<bool, TrackerError> {
    let result = sqlx::query(
        "DELETE FROM server_alerts WHERE address = ?1 AND port = ?2 AND subscriber = ?3",
    )
    .bind(&key.address)
    .bind(i64::from(key.port))
    .bind(subscriber)
    .execute(pool)
    .await
    .map_err(db_error)?;
    Ok(result.rows_affected() > 0)
}

/// Server alerts held by `subscriber`, oldest first.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn server_alerts_of(
    pool: &SqlitePool,
    subscriber: &str,
) -> Result<Vec<ServerAlert>, TrackerError> {
    let rows = sqlx::query_as::<_, (i64, String, i64, String)>(
        "SELECT id, address, port, subscriber FROM server_alerts WHERE subscriber = ?1 ORDER BY id",
    )
    .bind(subscriber)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    rows.into_iter()
        .map(|(id, address, port, subscriber)| {
            Ok(ServerAlert {
                id,
                address,
                port: port_from_db(port)?,
                subscriber,
            })
        })
        .collect()
}

/// Subscribers following the server at `key`.
///
/// # Errors
///
/// Returns a [`TrackerError::PersistenceError`] on database failure.
pub async fn server_subscribers(
    pool: &SqlitePool,
    key: &ServerKey,
) -> Result<Vec<String>, TrackerError> {
    sqlx::query_scalar::<_, String>(
        "SELECT subscriber FROM server_alerts WHERE address = ?1 AND port = ?2 ORDER BY id",
    )
    .bind(&key.address)
    .bind(i64::from(key.port))
    .fetch_all(pool)
    .await
    .map_err(db_error)
}
