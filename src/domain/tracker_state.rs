//! The detector's working memory between cycles.

use std::collections::{BTreeMap, BTreeSet};

use super::ServerKey;

/// What the tracker remembers about one listed `(address, port)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedServer {
    /// Last listed server name, reused for offline announcements.
    pub name: String,
    /// Last listed game identifier.
    pub game: String,
    /// Players present in the last listing.
    pub players: BTreeSet<String>,
}

/// Snapshot of the previous listing, keyed by `(address, port)`.
///
/// Built from one listing and replaced wholesale by the next; keys that are
/// absent from the newest listing are never carried over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerState {
    servers: BTreeMap<ServerKey, TrackedServer>,
}

impl TrackerState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tracked entry for `key`.
    #[must_use]
    pub fn get(&self, key: &ServerKey) -> Option<&TrackedServer> {
        self.servers.get(key)
    }

    /// Returns `true` if `key` is tracked.
    #[must_use]
    pub fn contains(&self, key: &ServerKey) -> bool {
        self.servers.contains_key(key)
    }

    /// Returns `true` if any port is tracked under `address`.
    #[must_use]
    pub fn contains_address(&self, address: &str) -> bool {
        self.servers
            .range(ServerKey::first_of(address)..)
            .next()
            .is_some_and(|(key, _)| key.address == address)
    }

    /// Iterates tracked servers in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&ServerKey, &TrackedServer)> {
        self.servers.iter()
    }

    /// Number of tracked `(address, port)` pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Returns `true` if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Records `server` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: ServerKey, server: TrackedServer) {
        self.servers.insert(key, server);
    }
}
