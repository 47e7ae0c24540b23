//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI document covering every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "MineStalker", description = "Server and player presence history"),
    paths(
        handlers::alerts::list_alerts,
        handlers::alerts::follow_player,
        handlers::alerts::unfollow_player,
        handlers::alerts::follow_server,
        handlers::alerts::unfollow_server,
        handlers::players::player_history,
        handlers::servers::server_info,
        handlers::servers::server_history,
        handlers::servers::server_snapshots,
        handlers::snapshots::latest_snapshot,
        handlers::system::health_handler,
    ),
    tags(
        (name = "Alerts", description = "Join, leave, online and offline alert subscriptions"),
        (name = "Players", description = "Player presence history"),
        (name = "Servers", description = "Server identity and presence history"),
        (name = "Snapshots", description = "Archived directory listings"),
        (name = "System", description = "Service status"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::{ServerState, TrackingEvent};
    use crate::persistence::{SqliteStore, snapshots};
    use crate::service::{AlertService, HistoryService, SightingLedger};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
    }

    async fn app(with_snapshot: bool) -> Router {
        let Ok(store) = SqliteStore::in_memory().await else {
            panic!("in-memory store should open");
        };
        let ledger = SightingLedger::new(store.clone());
        let events = [
            TrackingEvent::ServerOnline {
                address: "play.example.org".to_string(),
                port: 30000,
                name: "Example".to_string(),
                game: "minetest".to_string(),
                timestamp: at(100),
            },
            TrackingEvent::PlayerJoin {
                address: "play.example.org".to_string(),
                port: 30000,
                player: "Amy".to_string(),
                name: "Example".to_string(),
                timestamp: at(100),
            },
        ];
        assert_eq!(ledger.apply_all(&events).await.applied, 2);

        if with_snapshot {
            let server = ServerState {
                address: "play.example.org".to_string(),
                name: "Example".to_string(),
                clients: 1,
                player_list: vec!["Amy".to_string()],
                ..ServerState::default()
            };
            assert!(snapshots::insert_snapshot(store.pool(), at(100), &[server]).await.is_ok());
        }

        build_router().with_state(AppState::new(
            HistoryService::new(store.clone()),
            AlertService::new(store),
        ))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, Method::GET, uri).await
    }

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let Ok(request) = Request::builder().method(method).uri(uri).body(Body::empty()) else {
            panic!("request should build");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("router is infallible");
        };
        let status = response.status();
        let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body should be readable");
        };
        if bytes.is_empty() {
            return (status, Value::Null);
        }
        let Ok(json) = serde_json::from_slice(&bytes) else {
            panic!("body should be JSON");
        };
        (status, json)
    }

    #[tokio::test]
    async fn player_history_lists_open_visit() {
        let (status, body) = get(app(false).await, "/api/v1/players/amy/history").await;
        assert_eq!(status, StatusCode::OK);
        let Some(visits) = body.as_array() else {
            panic!("array expected");
        };
        assert_eq!(visits.len(), 1);
        let Some(visit) = visits.first() else {
            panic!("one visit");
        };
        assert_eq!(visit["server_name"], "Example");
        assert_eq!(visit["port"], 30000);
        assert!(visit["disconnected_at"].is_null());
    }

    #[tokio::test]
    async fn unknown_player_is_404_with_error_body() {
        let (status, body) = get(app(false).await, "/api/v1/players/nobody/history").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 2001);
    }

    #[tokio::test]
    async fn server_endpoints() {
        let (status, body) = get(app(false).await, "/api/v1/servers/play.example.org/30000").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Example");

        let (status, body) =
            get(app(false).await, "/api/v1/servers/play.example.org/30000/history").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let (status, _) = get(app(false).await, "/api/v1/servers/play.example.org/30001").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = get(app(false).await, "/api/v1/servers/play.example.org/port").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1001);
    }

    #[tokio::test]
    async fn snapshots_before_and_after_archive() {
        let (status, _) = get(app(false).await, "/api/v1/snapshots/latest").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = get(app(true).await, "/api/v1/snapshots/latest").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["servers"][0]["player_list"][0], "Amy");

        let (status, body) =
            get(app(true).await, "/api/v1/servers/play.example.org/30000/snapshots").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["server"]["clients"], 1);
    }

    #[tokio::test]
    async fn health() {
        let (status, body) = get(app(false).await, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn player_alert_lifecycle() {
        let app = app(false).await;
        let uri = "/api/v1/subscribers/42/alerts/players/Amy";

        let (status, body) = send(app.clone(), Method::PUT, uri).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["subscriber"], "42");
        assert_eq!(body["players"][0], "Amy");

        let (status, body) = send(app.clone(), Method::PUT, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["players"].as_array().map(Vec::len), Some(1));

        let (status, body) = send(app.clone(), Method::DELETE, uri).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (status, body) = send(app.clone(), Method::DELETE, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 2004);

        let (status, body) = get(app, "/api/v1/subscribers/42/alerts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["players"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn server_alert_lifecycle() {
        let app = app(false).await;
        let uri = "/api/v1/subscribers/42/alerts/servers/play.example.org/30000";

        let (status, body) = send(app.clone(), Method::PUT, uri).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["servers"][0]["address"], "play.example.org");
        assert_eq!(body["servers"][0]["port"], 30000);

        let (status, body) = send(
            app.clone(),
            Method::PUT,
            "/api/v1/subscribers/42/alerts/servers/play.example.org/port",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1001);

        let (status, _) = send(app.clone(), Method::DELETE, uri).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(app, Method::DELETE, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/players/{name}/history",
            "/api/v1/servers/{address}/{port}",
            "/api/v1/servers/{address}/{port}/history",
            "/api/v1/servers/{address}/{port}/snapshots",
            "/api/v1/snapshots/latest",
            "/api/v1/subscribers/{subscriber}/alerts",
            "/api/v1/subscribers/{subscriber}/alerts/players/{name}",
            "/api/v1/subscribers/{subscriber}/alerts/servers/{address}/{port}",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
