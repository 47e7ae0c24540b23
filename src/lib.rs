//! # minestalker
//!
//! Presence tracker for a public game-server directory.
//!
//! The tracker polls the directory listing, diffs each listing against the
//! previous one, and records when servers come and go and when players
//! join and leave. Full listings are archived on a fixed cadence. A small
//! REST API serves the recorded history.
//!
//! ## Architecture
//!
//! ```text
//! Directory (HTTP JSON)
//!     │
//!     ├── ListingFetcher (fetch)
//!     │
//!     ├── Poller (service/)
//!     │     ├── SnapshotArchiver ── snapshot tables
//!     │     ├── EventDetector (tracker/)
//!     │     ├── SightingLedger ──── sighting tables
//!     │     └── Notifiers (notify/)
//!     │
//!     ├── SQLite Persistence (persistence/)
//!     │
//!     └── HistoryService ── REST Handlers (api/) ── Clients
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod notify;
pub mod persistence;
pub mod service;
pub mod tracker;
