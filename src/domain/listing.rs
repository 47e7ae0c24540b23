//! Parsed server directory listing.
//!
//! The directory serves `{"list": [...]}` with one object per server. Field
//! names follow the directory's wire format on input (`gameid`,
//! `clients_list`) and the tracker's own names on output.
//!
//! Decoding is lenient: `null` reads as the field's default, and an entry
//! that still fails to decode (a port above 65535, a non-string player
//! name) is dropped on its own instead of failing the whole listing.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use super::ServerKey;

/// Luanti's default game port, used when an entry omits `port`.
const DEFAULT_PORT: u16 = 30000;

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn port_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    Ok(Option::<u16>::deserialize(deserializer)?.unwrap_or(DEFAULT_PORT))
}

/// Negative or oversized counts read as zero; the count is informational.
fn client_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<i64>::deserialize(deserializer)?
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0))
}

fn skip_malformed_entries<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<ServerState>, D::Error> {
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match ServerState::deserialize(value) {
            Ok(server) => Some(server),
            Err(e) => {
                tracing::debug!(index, error = %e, "malformed listing entry skipped");
                None
            }
        })
        .collect())
}

/// One server entry as published by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerState {
    /// Host name or IP address. Entries with an empty address are ignored
    /// by the tracker.
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    /// Game port.
    #[serde(default = "default_port", deserialize_with = "port_or_default")]
    pub port: u16,
    /// Display name of the server.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Game identifier.
    #[serde(
        default,
        rename(deserialize = "gameid"),
        deserialize_with = "null_as_default"
    )]
    pub game: String,
    /// Number of connected clients as reported by the server.
    #[serde(default, deserialize_with = "client_count")]
    pub clients: u32,
    /// Names of connected players.
    #[serde(
        default,
        rename(deserialize = "clients_list"),
        deserialize_with = "null_as_default"
    )]
    pub player_list: Vec<String>,
    /// Installed mods, when the server publishes them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub mods: Vec<String>,
}

impl ServerState {
    /// Returns the `(address, port)` key of this entry.
    #[must_use]
    pub fn key(&self) -> ServerKey {
        ServerKey::new(self.address.clone(), self.port)
    }

    /// Returns the de-duplicated set of player names.
    #[must_use]
    pub fn player_set(&self) -> BTreeSet<String> {
        self.player_list.iter().cloned().collect()
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            address: String::new(),
            port: DEFAULT_PORT,
            name: String::new(),
            game: String::new(),
            clients: 0,
            player_list: Vec::new(),
            mods: Vec::new(),
        }
    }
}

/// A full directory response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerListing {
    /// Listed servers, in directory order. Addresses are not unique.
    #[serde(default, deserialize_with = "skip_malformed_entries")]
    pub list: Vec<ServerState>,
}

impl ServerListing {
    /// Wraps a list of entries.
    #[must_use]
    pub fn new(list: Vec<ServerState>) -> Self {
        Self { list }
    }

    /// Number of listed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the directory listed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
