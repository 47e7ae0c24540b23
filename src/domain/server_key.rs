//! Composite server identity.
//!
//! [`ServerKey`] pairs an address with a port so that the tracker cache,
//! the ledger lookups and the read API all key servers the same way.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Natural key of a listed server: `(address, port)`.
///
/// Orders by address first, then port, so all ports of one address are
/// adjacent in a [`std::collections::BTreeMap`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServerKey {
    /// Host name or IP address as listed by the directory.
    pub address: String,
    /// Game port.
    pub port: u16,
}

impl ServerKey {
    /// Creates a key from an address and port.
    #[must_use]
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// Smallest key for `address`; used as a range start when scanning all
    /// ports of one address.
    #[must_use]
    pub fn first_of(address: &str) -> Self {
        Self::new(address, 0)
    }
}

impl fmt::Display for ServerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}
