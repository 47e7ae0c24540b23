//! Query service: read-only history lookups for the HTTP layer.

use crate::domain::ServerKey;
use crate::error::TrackerError;
use crate::persistence::models::{
    PlayerSightingRecord, ServerRecord, ServerSightingRecord, Snapshot, SnapshotEntry,
};
use crate::persistence::{SqliteStore, entities, history, snapshots};

/// Read-side facade over the store.
///
/// Unknown identities fail with a not-found error; known identities
/// without history yield an empty sequence. Results are newest first.
#[derive(Debug, Clone)]
pub struct HistoryService {
    store: SqliteStore,
}

impl HistoryService {
    /// Creates a service over `store`.
    #[must_use]
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    /// Sightings of the player named `name` (any letter case).
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::PlayerNotFound`] if no player matches, or a
    /// persistence error.
    pub async fn player_history(
        &self,
        name: &str,
    ) -> Result<Vec<PlayerSightingRecord>, TrackerError> {
        if !entities::player_exists(self.store.pool(), name).await? {
            return Err(TrackerError::PlayerNotFound(name.to_string()));
        }
        history::player_history(self.store.pool(), name).await
    }

    /// Stored identity row of the server at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ServerNotFound`] for an unknown server, or a
    /// persistence error.
    pub async fn server_info(&self, key: &ServerKey) -> Result<ServerRecord, TrackerError> {
        entities::load_server(self.store.pool(), key)
            .await?
            .ok_or_else(|| not_found(key))
    }

    /// Online intervals of the server at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ServerNotFound`] for an unknown server, or a
    /// persistence error.
    pub async fn server_history(
        &self,
        key: &ServerKey,
    ) -> Result<Vec<ServerSightingRecord>, TrackerError> {
        self.server_info(key).await?;
        history::server_history(self.store.pool(), key).await
    }

    /// Archived states of the server at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ServerNotFound`] for an unknown server, or a
    /// persistence or serialization error.
    pub async fn snapshot_history(
        &self,
        key: &ServerKey,
    ) -> Result<Vec<SnapshotEntry>, TrackerError> {
        self.server_info(key).await?;
        snapshots::snapshot_history(self.store.pool(), key).await
    }

    /// The most recent archived listing.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::SnapshotNotFound`] before the first archive,
    /// or a persistence or serialization error.
    pub async fn latest_snapshot(&self) -> Result<Snapshot, TrackerError> {
        snapshots::latest_snapshot(self.store.pool())
            .await?
            .ok_or(TrackerError::SnapshotNotFound)
    }
}

fn not_found(key: &ServerKey) -> TrackerError {
    TrackerError::ServerNotFound {
        address: key.address.clone(),
        port: key.port,
    }
}
