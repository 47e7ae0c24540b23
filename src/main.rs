//! minestalker entry point.
//!
//! Starts the directory poller and the Axum HTTP server, and stops both
//! on Ctrl-C or SIGTERM.

use anyhow::Context;
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use minestalker::api;
use minestalker::app_state::AppState;
use minestalker::config::TrackerConfig;
use minestalker::fetch::HttpListingFetcher;
use minestalker::notify::{AlertNotifier, Channel, WebhookNotifier};
use minestalker::persistence::SqliteStore;
use minestalker::service::{
    AlertService, HistoryService, Poller, SightingLedger, SnapshotArchiver,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = TrackerConfig::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    tracing::info!(addr = %config.listen_addr, "starting minestalker");

    // Open the database
    let store = SqliteStore::connect(
        &config.database_url,
        config.database_max_connections,
        config.database_connect_timeout(),
    )
    .await
    .context("failed to open database")?;

    // Build the poller
    let fetcher = HttpListingFetcher::new(&config.server_list_url, config.fetch_timeout())?;
    let mut notifiers = Vec::new();
    if let Some(url) = &config.webhook_url {
        notifiers.push(Channel::Webhook(WebhookNotifier::new(
            url,
            &config.webhook_username,
            config.fetch_timeout(),
        )?));
    } else {
        tracing::info!("WEBHOOK_URL not set, event feed disabled");
    }
    if let Some(url) = &config.alert_webhook_url {
        let sink = WebhookNotifier::new(url, &config.webhook_username, config.fetch_timeout())?;
        notifiers.push(Channel::Alerts(AlertNotifier::new(
            AlertService::new(store.clone()),
            sink,
        )));
    } else {
        tracing::info!("ALERT_WEBHOOK_URL not set, subscriber alerts disabled");
    }
    let poller = Poller::new(
        fetcher,
        SightingLedger::new(store.clone()),
        SnapshotArchiver::new(store.clone(), config.snapshot_interval()),
    )
    .with_notifiers(notifiers)
    .with_notify_delay(config.notify_delay())
    .notify_on_first_cycle(config.notify_on_first_cycle);

    let cancel = CancellationToken::new();
    let poller_task = tokio::spawn(poller.run(config.update_interval(), cancel.clone()));

    // Build router
    let app_state = AppState::new(
        HistoryService::new(store.clone()),
        AlertService::new(store.clone()),
    );
    let app = Router::new().merge(api::build_router());
    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };
    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await;

    cancel.cancel();
    if let Err(e) = poller_task.await {
        tracing::error!(error = %e, "poller task failed");
    }
    store.pool().close().await;
    tracing::info!("shutdown complete");

    served.context("HTTP server failed")
}

/// Resolves on Ctrl-C or SIGTERM and cancels `cancel`.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
    cancel.cancel();
}
