//! The poll loop: fetch, archive, detect, record, notify.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::{ApplySummary, SightingLedger, SnapshotArchiver};
use crate::error::TrackerError;
use crate::fetch::ListingFetcher;
use crate::notify::{self, Notifier};
use crate::tracker::EventDetector;

/// Outcome of one successful poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based index of this cycle among successful fetches.
    pub cycle: u64,
    /// Entries in the fetched listing.
    pub servers: usize,
    /// Events detected against the previous listing.
    pub events: usize,
    /// How the ledger handled those events.
    pub ledger: ApplySummary,
    /// ID of the snapshot saved this cycle, if the archive gate was open.
    pub snapshot_id: Option<i64>,
    /// Successful notifier deliveries.
    pub notified: usize,
}

/// Drives the tracker once per interval until cancelled.
///
/// The first successful cycle sees every listed server as new. Its events
/// populate the ledger but are not sent to notifiers unless
/// [`Poller::notify_on_first_cycle`] is enabled.
#[derive(Debug)]
pub struct Poller<F, N> {
    fetcher: F,
    detector: EventDetector,
    ledger: SightingLedger,
    archiver: SnapshotArchiver,
    notifiers: Vec<N>,
    notify_delay: Duration,
    notify_first_cycle: bool,
    cycles: u64,
}

impl<F: ListingFetcher, N: Notifier> Poller<F, N> {
    /// Creates a poller with no notifiers.
    #[must_use]
    pub fn new(fetcher: F, ledger: SightingLedger, archiver: SnapshotArchiver) -> Self {
        Self {
            fetcher,
            detector: EventDetector::new(),
            ledger,
            archiver,
            notifiers: Vec::new(),
            notify_delay: Duration::ZERO,
            notify_first_cycle: false,
            cycles: 0,
        }
    }

    /// Sets the notifiers events are dispatched to.
    #[must_use]
    pub fn with_notifiers(mut self, notifiers: Vec<N>) -> Self {
        self.notifiers = notifiers;
        self
    }

    /// Sets the pause after each dispatched event.
    #[must_use]
    pub const fn with_notify_delay(mut self, delay: Duration) -> Self {
        self.notify_delay = delay;
        self
    }

    /// Whether the first cycle's events are dispatched.
    #[must_use]
    pub const fn notify_on_first_cycle(mut self, enabled: bool) -> Self {
        self.notify_first_cycle = enabled;
        self
    }

    /// Number of successful cycles so far.
    #[must_use]
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// The event detector and its current state.
    #[must_use]
    pub const fn detector(&self) -> &EventDetector {
        &self.detector
    }

    /// Runs one cycle stamped with `now`.
    ///
    /// A failed archive save is logged and the cycle carries on; ledger
    /// and notifier failures are absorbed per event.
    ///
    /// # Errors
    ///
    /// Returns the fetch error when the listing cannot be retrieved. The
    /// tracker state is left untouched so the next cycle diffs against the
    /// last good listing.
    pub async fn run_cycle(&mut self, now: DateTime<Utc>) -> Result<CycleReport, TrackerError> {
        let listing = self.fetcher.fetch().await?;
        self.cycles += 1;

        let snapshot_id = match self.archiver.maybe_archive(&listing, now).await {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(error = %e, "snapshot save failed");
                None
            }
        };

        let events = self.detector.detect(&listing.list, now);
        let ledger = self.ledger.apply_all(&events).await;

        let notified = if self.cycles == 1 && !self.notify_first_cycle {
            tracing::info!(
                events = events.len(),
                "first cycle, skipping notifications"
            );
            0
        } else {
            notify::dispatch(&self.notifiers, &events, self.notify_delay).await
        };

        Ok(CycleReport {
            cycle: self.cycles,
            servers: listing.len(),
            events: events.len(),
            ledger,
            snapshot_id,
            notified,
        })
    }

    /// Runs a cycle every `interval` until `cancel` fires. The first cycle
    /// starts immediately. Cancellation is observed between cycles; a
    /// cycle in progress runs to completion.
    pub async fn run(mut self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(interval_secs = interval.as_secs(), "poller started");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            match self.run_cycle(Utc::now()).await {
                Ok(report) => tracing::info!(
                    cycle = report.cycle,
                    servers = report.servers,
                    events = report.events,
                    applied = report.ledger.applied,
                    dropped = report.ledger.dropped,
                    failed = report.ledger.failed,
                    notified = report.notified,
                    "cycle complete"
                ),
                Err(e) => tracing::warn!(error = %e, "cycle skipped"),
            }
        }

        tracing::info!(cycles = self.cycles, "poller stopped");
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use chrono::TimeZone;

    use super::*;
    use crate::domain::{ServerListing, ServerState, TrackingEvent};
    use crate::persistence::SqliteStore;

    #[derive(Debug, Default)]
    struct Scripted {
        listings: Mutex<VecDeque<Result<ServerListing, TrackerError>>>,
    }

    impl ListingFetcher for Scripted {
        async fn fetch(&self) -> Result<ServerListing, TrackerError> {
            self.listings
                .lock()
                .ok()
                .and_then(|mut q| q.pop_front())
                .unwrap_or_else(|| Err(TrackerError::FetchError("script exhausted".to_string())))
        }
    }

    #[derive(Debug, Default)]
    struct Counting {
        count: Mutex<usize>,
    }

    impl Notifier for Counting {
        async fn notify(&self, _event: &TrackingEvent) -> Result<(), TrackerError> {
            if let Ok(mut count) = self.count.lock() {
                *count += 1;
            }
            Ok(())
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
    }

    fn listing(players: &[&str]) -> ServerListing {
        ServerListing::new(vec![ServerState {
            address: "h".to_string(),
            port: 1,
            name: "Home".to_string(),
            player_list: players.iter().map(|p| (*p).to_string()).collect(),
            ..ServerState::default()
        }])
    }

    async fn poller(
        script: Vec<Result<ServerListing, TrackerError>>,
    ) -> Poller<Scripted, Counting> {
        let Ok(store) = SqliteStore::in_memory().await else {
            panic!("in-memory store should open");
        };
        let fetcher = Scripted {
            listings: Mutex::new(script.into()),
        };
        Poller::new(
            fetcher,
            SightingLedger::new(store.clone()),
            SnapshotArchiver::new(store, Duration::from_secs(300)),
        )
        .with_notifiers(vec![Counting::default()])
    }

    #[tokio::test]
    async fn first_cycle_records_but_does_not_notify() {
        let mut poller = poller(vec![Ok(listing(&["amy"])), Ok(listing(&["amy", "bob"]))]).await;

        let Ok(first) = poller.run_cycle(at(0)).await else {
            panic!("first cycle should succeed");
        };
        assert_eq!(first.events, 2);
        assert_eq!(first.ledger.applied, 2);
        assert_eq!(first.notified, 0);
        assert!(first.snapshot_id.is_some());

        let Ok(second) = poller.run_cycle(at(60)).await else {
            panic!("second cycle should succeed");
        };
        assert_eq!(second.cycle, 2);
        assert_eq!(second.events, 1);
        assert_eq!(second.notified, 1);
        assert_eq!(second.snapshot_id, None);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_state() {
        let mut poller = poller(vec![
            Ok(listing(&["amy"])),
            Err(TrackerError::FetchError("timeout".to_string())),
            Ok(listing(&["amy"])),
        ])
        .await;

        assert!(poller.run_cycle(at(0)).await.is_ok());
        assert!(matches!(
            poller.run_cycle(at(60)).await,
            Err(TrackerError::FetchError(_))
        ));
        assert_eq!(poller.cycles(), 1);
        assert_eq!(poller.detector().state().len(), 1);

        let Ok(third) = poller.run_cycle(at(120)).await else {
            panic!("third cycle should succeed");
        };
        assert_eq!(third.events, 0);
    }

    #[tokio::test]
    async fn failed_first_fetch_does_not_consume_the_quiet_cycle() {
        let mut poller = poller(vec![
            Err(TrackerError::FetchError("down".to_string())),
            Ok(listing(&["amy"])),
        ])
        .await;

        let _ = poller.run_cycle(at(0)).await;
        let Ok(report) = poller.run_cycle(at(60)).await else {
            panic!("cycle should succeed");
        };
        assert_eq!(report.cycle, 1);
        assert_eq!(report.notified, 0);
    }

    #[tokio::test]
    async fn first_cycle_notifies_when_enabled() {
        let mut poller = poller(vec![Ok(listing(&["amy"]))])
            .await
            .notify_on_first_cycle(true);
        let Ok(report) = poller.run_cycle(at(0)).await else {
            panic!("cycle should succeed");
        };
        assert_eq!(report.notified, 2);
    }

    #[tokio::test]
    async fn run_stops_when_cancelled() {
        let poller = poller(Vec::new()).await;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let handle = tokio::spawn(poller.run(Duration::from_secs(3600), cancel));
        let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(result, Ok(Ok(()))));
    }
}
