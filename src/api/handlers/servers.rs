//! Server info, presence history and snapshot history handlers.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ServerInfoDto, ServerSightingDto, SnapshotEntryDto};
use crate::app_state::AppState;
use crate::domain::ServerKey;
use crate::error::{ErrorResponse, TrackerError};

/// Builds a [`ServerKey`] from raw path segments.
pub(crate) fn server_key(address: String, port: &str) -> Result<ServerKey, TrackerError> {
    let port = port
        .parse::<u16>()
        .map_err(|_| TrackerError::InvalidRequest(format!("invalid port: {port}")))?;
    Ok(ServerKey::new(address, port))
}

/// `GET /servers/{address}/{port}`: Stored server identity.
///
/// # Errors
///
/// Returns [`TrackerError::ServerNotFound`] for an untracked server and
/// [`TrackerError::InvalidRequest`] for a malformed port.
#[utoipa::path(
    get,
    path = "/api/v1/servers/{address}/{port}",
    tag = "Servers",
    summary = "Server info",
    params(
        ("address" = String, Path, description = "Server address"),
        ("port" = u16, Path, description = "Server port"),
    ),
    responses(
        (status = 200, description = "Server info", body = ServerInfoDto),
        (status = 400, description = "Malformed port", body = ErrorResponse),
        (status = 404, description = "Server never seen", body = ErrorResponse),
    )
)]
pub async fn server_info(
    State(state): State<AppState>,
    Path((address, port)): Path<(String, String)>,
) -> Result<Json<ServerInfoDto>, TrackerError> {
    let key = server_key(address, &port)?;
    Ok(Json(state.history.server_info(&key).await?.into()))
}

/// `GET /servers/{address}/{port}/history`: Online intervals of a server.
///
/// # Errors
///
/// Returns [`TrackerError::ServerNotFound`] for an untracked server and
/// [`TrackerError::InvalidRequest`] for a malformed port.
#[utoipa::path(
    get,
    path = "/api/v1/servers/{address}/{port}/history",
    tag = "Servers",
    summary = "Server history",
    description = "Returns every interval the server was listed, newest first.",
    params(
        ("address" = String, Path, description = "Server address"),
        ("port" = u16, Path, description = "Server port"),
    ),
    responses(
        (status = 200, description = "Server sightings", body = Vec<ServerSightingDto>),
        (status = 400, description = "Malformed port", body = ErrorResponse),
        (status = 404, description = "Server never seen", body = ErrorResponse),
    )
)]
pub async fn server_history(
    State(state): State<AppState>,
    Path((address, port)): Path<(String, String)>,
) -> Result<Json<Vec<ServerSightingDto>>, TrackerError> {
    let key = server_key(address, &port)?;
    let history = state.history.server_history(&key).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// `GET /servers/{address}/{port}/snapshots`: Archived states of a server.
///
/// # Errors
///
/// Returns [`TrackerError::ServerNotFound`] for an untracked server and
/// [`TrackerError::InvalidRequest`] for a malformed port.
#[utoipa::path(
    get,
    path = "/api/v1/servers/{address}/{port}/snapshots",
    tag = "Servers",
    summary = "Server snapshot history",
    description = "Returns the server's entry from every archived listing that contains it, newest first.",
    params(
        ("address" = String, Path, description = "Server address"),
        ("port" = u16, Path, description = "Server port"),
    ),
    responses(
        (status = 200, description = "Archived states", body = Vec<SnapshotEntryDto>),
        (status = 400, description = "Malformed port", body = ErrorResponse),
        (status = 404, description = "Server never seen", body = ErrorResponse),
    )
)]
pub async fn server_snapshots(
    State(state): State<AppState>,
    Path((address, port)): Path<(String, String)>,
) -> Result<Json<Vec<SnapshotEntryDto>>, TrackerError> {
    let key = server_key(address, &port)?;
    let entries = state.history.snapshot_history(&key).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Server routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/servers/{address}/{port}", get(server_info))
        .route("/servers/{address}/{port}/history", get(server_history))
        .route("/servers/{address}/{port}/snapshots", get(server_snapshots))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_must_fit_u16() {
        assert!(matches!(
            server_key("h".to_string(), "30000"),
            Ok(ref k) if k.port == 30000
        ));
        assert!(matches!(
            server_key("h".to_string(), "70000"),
            Err(TrackerError::InvalidRequest(_))
        ));
        assert!(matches!(
            server_key("h".to_string(), "abc"),
            Err(TrackerError::InvalidRequest(_))
        ));
    }
}
