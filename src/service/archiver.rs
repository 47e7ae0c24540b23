//! Interval-gated archiving of raw listings.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::ServerListing;
use crate::error::TrackerError;
use crate::persistence::{SqliteStore, snapshots};

/// Saves a full copy of the listing at most once per interval.
///
/// The gate is checked once per poll cycle against wall-clock time, so the
/// effective cadence rounds up to a multiple of the poll interval and
/// drifts with slow cycles.
#[derive(Debug)]
pub struct SnapshotArchiver {
    store: SqliteStore,
    interval: TimeDelta,
    last_saved: Option<DateTime<Utc>>,
}

impl SnapshotArchiver {
    /// Creates an archiver that saves when more than `interval` has passed
    /// since the last successful save. The first call always saves.
    #[must_use]
    pub fn new(store: SqliteStore, interval: Duration) -> Self {
        Self {
            store,
            interval: TimeDelta::from_std(interval).unwrap_or(TimeDelta::MAX),
            last_saved: None,
        }
    }

    /// Time of the last successful save.
    #[must_use]
    pub const fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    /// Returns `true` if a save at `now` would pass the gate.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.last_saved
            .is_none_or(|last| now.signed_duration_since(last) > self.interval)
    }

    /// Archives `listing` if the gate is open. Returns the new snapshot ID,
    /// or `None` when the gate was closed.
    ///
    /// # Errors
    ///
    /// Returns the storage or serialization error of the failed save. The
    /// gate stays open so the next cycle retries.
    pub async fn maybe_archive(
        &mut self,
        listing: &ServerListing,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>, TrackerError> {
        if !self.is_due(now) {
            return Ok(None);
        }
        let id = snapshots::insert_snapshot(self.store.pool(), now, &listing.list).await?;
        self.last_saved = Some(now);
        tracing::info!(snapshot_id = id, servers = listing.len(), "listing archived");
        Ok(Some(id))
    }
}
