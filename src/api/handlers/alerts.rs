//! Alert subscription handlers: list, follow and unfollow players and
//! servers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};

use super::servers::server_key;
use crate::api::dto::AlertListDto;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, TrackerError};

async fn current(state: &AppState, subscriber: String) -> Result<Json<AlertListDto>, TrackerError> {
    let list = state.alerts.alerts_of(&subscriber).await?;
    Ok(Json(AlertListDto::new(subscriber, list)))
}

const fn created_or_ok(created: bool) -> StatusCode {
    if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    }
}

/// `GET /subscribers/{subscriber}/alerts`: Alerts held by a subscriber.
///
/// # Errors
///
/// Returns [`TrackerError::PersistenceError`] on storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/subscribers/{subscriber}/alerts",
    tag = "Alerts",
    summary = "List alerts",
    params(
        ("subscriber" = String, Path, description = "Subscriber identity"),
    ),
    responses(
        (status = 200, description = "Alerts of the subscriber", body = AlertListDto),
    )
)]
pub async fn list_alerts(
    State(state): State<AppState>,
    Path(subscriber): Path<String>,
) -> Result<Json<AlertListDto>, TrackerError> {
    current(&state, subscriber).await
}

/// `PUT /subscribers/{subscriber}/alerts/players/{name}`: Follow a player.
///
/// # Errors
///
/// Returns [`TrackerError::InvalidRequest`] for a blank name.
#[utoipa::path(
    put,
    path = "/api/v1/subscribers/{subscriber}/alerts/players/{name}",
    tag = "Alerts",
    summary = "Follow a player",
    description = "Alerts the subscriber whenever a player with exactly this name joins or leaves a server. Idempotent.",
    params(
        ("subscriber" = String, Path, description = "Subscriber identity"),
        ("name" = String, Path, description = "Player name, matched exactly"),
    ),
    responses(
        (status = 201, description = "Alert created", body = AlertListDto),
        (status = 200, description = "Alert already existed", body = AlertListDto),
        (status = 400, description = "Blank name", body = ErrorResponse),
    )
)]
pub async fn follow_player(
    State(state): State<AppState>,
    Path((subscriber, name)): Path<(String, String)>,
) -> Result<(StatusCode, Json<AlertListDto>), TrackerError> {
    let created = state.alerts.subscribe_player(&subscriber, &name).await?;
    Ok((created_or_ok(created), current(&state, subscriber).await?))
}

/// `DELETE /subscribers/{subscriber}/alerts/players/{name}`: Unfollow a
/// player.
///
/// # Errors
///
/// Returns [`TrackerError::AlertNotFound`] if the player was not followed.
#[utoipa::path(
    delete,
    path = "/api/v1/subscribers/{subscriber}/alerts/players/{name}",
    tag = "Alerts",
    summary = "Unfollow a player",
    params(
        ("subscriber" = String, Path, description = "Subscriber identity"),
        ("name" = String, Path, description = "Player name"),
    ),
    responses(
        (status = 204, description = "Alert removed"),
        (status = 404, description = "No such alert", body = ErrorResponse),
    )
)]
pub async fn unfollow_player(
    State(state): State<AppState>,
    Path((subscriber, name)): Path<(String, String)>,
) -> Result<StatusCode, TrackerError> {
    state.alerts.unsubscribe_player(&subscriber, &name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /subscribers/{subscriber}/alerts/servers/{address}/{port}`: Follow
/// a server.
///
/// # Errors
///
/// Returns [`TrackerError::InvalidRequest`] for a malformed port.
#[utoipa::path(
    put,
    path = "/api/v1/subscribers/{subscriber}/alerts/servers/{address}/{port}",
    tag = "Alerts",
    summary = "Follow a server",
    description = "Alerts the subscriber whenever the server goes online or offline. Idempotent.",
    params(
        ("subscriber" = String, Path, description = "Subscriber identity"),
        ("address" = String, Path, description = "Server address"),
        ("port" = u16, Path, description = "Server port"),
    ),
    responses(
        (status = 201, description = "Alert created", body = AlertListDto),
        (status = 200, description = "Alert already existed", body = AlertListDto),
        (status = 400, description = "Malformed port", body = ErrorResponse),
    )
)]
pub async fn follow_server(
    State(state): State<AppState>,
    Path((subscriber, address, port)): Path<(String, String, String)>,
) -> Result<(StatusCode, Json<AlertListDto>), TrackerError> {
    let key = server_key(address, &port)?;
    let created = state.alerts.subscribe_server(&subscriber, &key).await?;
    Ok((created_or_ok(created), current(&state, subscriber).await?))
}

/// `DELETE /subscribers/{subscriber}/alerts/servers/{address}/{port}`:
/// Unfollow a server.
///
/// # Errors
///
/// Returns [`TrackerError::AlertNotFound`] if the server was not followed.
#[utoipa::path(
    delete,
    path = "/api/v1/subscribers/{subscriber}/alerts/servers/{address}/{port}",
    tag = "Alerts",
    summary = "Unfollow a server",
    params(
        ("subscriber" = String, Path, description = "Subscriber identity"),
        ("address" = String, Path, description = "Server address"),
        ("port" = u16, Path, description = "Server port"),
    ),
    responses(
        (status = 204, description = "Alert removed"),
        (status = 400, description = "Malformed port", body = ErrorResponse),
        (status = 404, description = "No such alert", body = ErrorResponse),
    )
)]
pub async fn unfollow_server(
    State(state): State<AppState>,
    Path((subscriber, address, port)): Path<(String, String, String)>,
) -> Result<StatusCode, TrackerError> {
    let key = server_key(address, &port)?;
    state.alerts.unsubscribe_server(&subscriber, &key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Alert routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/subscribers/{subscriber}/alerts", get(list_alerts))
        .route(
            "/subscribers/{subscriber}/alerts/players/{name}",
            put(follow_player).delete(unfollow_player),
        )
        .route(
            "/subscribers/{subscriber}/alerts/servers/{address}/{port}",
            put(follow_server).delete(unfollow_server),
        )
}
