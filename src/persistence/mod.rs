//! Persistence layer: SQLite entity store, sighting ledger tables, the
//! snapshot archive and alert subscriptions.
//!
//! Statement helpers take a `&mut SqliteConnection` so the caller decides
//! the transaction boundary; read queries run directly on the pool.

pub mod alerts;
pub mod entities;
pub mod history;
pub mod models;
pub mod sightings;
pub mod snapshots;
pub mod store;

pub use store::SqliteStore;

use crate::error::TrackerError;

/// Maps a driver error onto [`TrackerError::PersistenceError`].
pub(crate) fn db_error(e: sqlx::Error) -> TrackerError {
    TrackerError::PersistenceError(e.to_string())
}

/// Converts a stored port column back to `u16`.
pub(crate) fn port_from_db(port: i64) -> Result<u16, TrackerError> {
    u16::try_from(port)
        .map_err(|_| TrackerError::PersistenceError(format!("stored port out of range: {port}")))
}
