//! SQLite connection pool and schema migration.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::db_error;
use crate::error::TrackerError;

/// Handle to the tracker database.
///
/// Cheap to clone; all clones share one `sqlx::SqlitePool`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wraps an existing connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `url` and runs migrations.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] if the URL is invalid, the
    /// database cannot be opened, or a migration fails.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, TrackerError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(db_error)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(acquire_timeout)
            .connect_with(options)
            .await
            .map_err(db_error)?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Opens a private in-memory database with the schema applied.
    ///
    /// The pool is pinned to a single connection that never expires, since
    /// an in-memory database lives only as long as its connection.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] if SQLite cannot be
    /// opened or the schema cannot be applied.
    pub async fn in_memory() -> Result<Self, TrackerError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(db_error)?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(db_error)?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Applies pending migrations from `migrations/`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), TrackerError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| TrackerError::PersistenceError(e.to_string()))
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Starts a transaction. Dropping it without commit rolls back.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PersistenceError`] if no connection is
    /// available.
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>, TrackerError> {
        self.pool.begin().await.map_err(db_error)
    }
}
