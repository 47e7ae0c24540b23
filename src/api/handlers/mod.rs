//! REST endpoint handlers organized by resource.

pub mod alerts;
pub mod players;
pub mod servers;
pub mod snapshots;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(alerts::routes())
        .merge(players::routes())
        .merge(servers::routes())
        .merge(snapshots::routes())
}
