//! Alert subscription DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use crate::service::AlertList;

/// A followed server.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServerAlertDto {
    /// Server address.
    pub address: String,
    /// Server port.
    pub port: u16,
}

/// Every alert one subscriber holds.
#[derive(Debug, Serialize, ToSchema)]
pub struct AlertListDto {
    /// Subscriber identity.
    pub subscriber: String,
    /// Followed player names.
    pub players: Vec<String>,
    /// Followed servers.
    pub servers: Vec<ServerAlertDto>,
}

impl AlertListDto {
    /// Builds the response for `subscriber` from its stored alerts.
    #[must_use]
    pub fn new(subscriber: String, list: AlertList) -> Self {
        Self {
            subscriber,
            players: list.players.into_iter().map(|a| a.player).collect(),
            servers: list
                .servers
                .into_iter()
                .map(|a| ServerAlertDto {
                    address: a.address,
                    port: a.port,
                })
                .collect(),
        }
    }
}
