//! End-to-end poll cycles against an in-memory database.

#![allow(clippy::panic)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio_util::sync::CancellationToken;

use minestalker::domain::{ServerKey, ServerListing, ServerState, TrackingEvent};
use minestalker::error::TrackerError;
use minestalker::fetch::ListingFetcher;
use minestalker::notify::{Notifier, format_message};
use minestalker::persistence::SqliteStore;
use minestalker::service::{HistoryService, Poller, SightingLedger, SnapshotArchiver};

/// Serves queued listings, then repeats the last one.
#[derive(Debug, Default, Clone)]
struct QueuedFetcher {
    queue: Arc<Mutex<VecDeque<ServerListing>>>,
    last: Arc<Mutex<Option<ServerListing>>>,
}

impl QueuedFetcher {
    fn push(&self, listing: ServerListing) {
        if let Ok(mut queue) = self.queue.lock() {
            queue.push_back(listing);
        }
    }
}

impl ListingFetcher for QueuedFetcher {
    async fn fetch(&self) -> Result<ServerListing, TrackerError> {
        let next = self.queue.lock().ok().and_then(|mut q| q.pop_front());
        let Ok(mut last) = self.last.lock() else {
            return Err(TrackerError::FetchError("poisoned".to_string()));
        };
        if let Some(listing) = next {
            *last = Some(listing);
        }
        last.clone()
            .ok_or_else(|| TrackerError::FetchError("nothing queued".to_string()))
    }
}

#[derive(Debug, Default, Clone)]
struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingNotifier {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, event: &TrackingEvent) -> Result<(), TrackerError> {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(format_message(event));
        }
        Ok(())
    }
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

fn server(address: &str, name: &str, players: &[&str]) -> ServerState {
    ServerState {
        address: address.to_string(),
        port: 30000,
        name: name.to_string(),
        game: "minetest".to_string(),
        clients: u32::try_from(players.len()).unwrap_or(0),
        player_list: players.iter().map(|p| (*p).to_string()).collect(),
        mods: Vec::new(),
    }
}

async fn setup() -> (
    Poller<QueuedFetcher, RecordingNotifier>,
    QueuedFetcher,
    RecordingNotifier,
    HistoryService,
) {
    let Ok(store) = SqliteStore::in_memory().await else {
        panic!("in-memory store should open");
    };
    let fetcher = QueuedFetcher::default();
    let notifier = RecordingNotifier::default();
    let poller = Poller::new(
        fetcher.clone(),
        SightingLedger::new(store.clone()),
        SnapshotArchiver::new(store.clone(), Duration::from_secs(300)),
    )
    .with_notifiers(vec![notifier.clone()]);
    (poller, fetcher, notifier, HistoryService::new(store))
}

#[tokio::test]
async fn vanished_address_closes_server_and_player_sightings() {
    let (mut poller, fetcher, notifier, history) = setup().await;

    fetcher.push(ServerListing::new(vec![
        server("5.6.7.8", "Gone Soon", &["amy"]),
        server("1.2.3.4", "Stays", &[]),
    ]));
    fetcher.push(ServerListing::new(vec![server("1.2.3.4", "Stays", &[])]));

    let Ok(first) = poller.run_cycle(at(0)).await else {
        panic!("first cycle should succeed");
    };
    assert_eq!(first.events, 3);
    assert_eq!(first.notified, 0);

    let Ok(second) = poller.run_cycle(at(60)).await else {
        panic!("second cycle should succeed");
    };
    assert_eq!(second.events, 2);
    assert_eq!(second.ledger.applied, 1);
    assert_eq!(second.ledger.dropped, 1);

    let key = ServerKey::new("5.6.7.8", 30000);
    let Ok(server_history) = history.server_history(&key).await else {
        panic!("server history expected");
    };
    assert_eq!(server_history.len(), 1);
    assert!(server_history.iter().all(|s| s.disconnected_at == Some(at(60))));

    let Ok(player_history) = history.player_history("amy").await else {
        panic!("player history expected");
    };
    assert_eq!(player_history.len(), 1);
    assert!(player_history.iter().all(|s| s.disconnected_at == Some(at(60))));

    assert_eq!(
        notifier.messages(),
        vec![
            "Server **Gone Soon** (5.6.7.8:30000) is now **OFFLINE**".to_string(),
            "Player **amy** left server **Gone Soon**".to_string(),
        ]
    );
}

#[tokio::test]
async fn join_and_leave_round_trip_through_history() {
    let (mut poller, fetcher, notifier, history) = setup().await;

    fetcher.push(ServerListing::new(vec![server("h", "Home", &[])]));
    fetcher.push(ServerListing::new(vec![server("h", "Home", &["Bob"])]));
    fetcher.push(ServerListing::new(vec![server("h", "Home", &[])]));

    for secs in [0, 60, 120] {
        assert!(poller.run_cycle(at(secs)).await.is_ok());
    }

    let Ok(visits) = history.player_history("BOB").await else {
        panic!("player history expected");
    };
    assert_eq!(visits.len(), 1);
    let Some(visit) = visits.first() else {
        panic!("one visit");
    };
    assert_eq!(visit.connected_at, at(60));
    assert_eq!(visit.disconnected_at, Some(at(120)));
    assert_eq!(notifier.messages().len(), 2);

    let Ok(latest) = history.latest_snapshot().await else {
        panic!("first cycle archives");
    };
    assert_eq!(latest.timestamp, at(0));
}

#[tokio::test]
async fn run_exits_on_cancellation() {
    let (poller, fetcher, _notifier, history) = setup().await;
    fetcher.push(ServerListing::new(vec![server("h", "Home", &["amy"])]));

    let cancel = CancellationToken::new();
    let task = tokio::spawn(poller.run(Duration::from_millis(10), cancel.clone()));

    let mut recorded = false;
    for _ in 0..200 {
        if history.player_history("amy").await.is_ok() {
            recorded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(recorded, "first cycle should record amy");

    cancel.cancel();
    let joined = tokio::time::timeout(Duration::from_secs(5), task).await;
    assert!(matches!(joined, Ok(Ok(()))));
}
