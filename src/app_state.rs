//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::{AlertService, HistoryService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Read-side history queries.
    pub history: Arc<HistoryService>,
    /// Alert subscription management.
    pub alerts: Arc<AlertService>,
}

impl AppState {
    /// Wraps the services for sharing across handlers.
    #[must_use]
    pub fn new(history: HistoryService, alerts: AlertService) -> Self {
        Self {
            history: Arc::new(history),
            alerts: Arc::new(alerts),
        }
    }
}
