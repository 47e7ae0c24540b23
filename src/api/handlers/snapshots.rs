//! Snapshot archive handler.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::SnapshotDto;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, TrackerError};

/// `GET /snapshots/latest`: The most recently archived listing.
///
/// # Errors
///
/// Returns [`TrackerError::SnapshotNotFound`] before the first archive.
#[utoipa::path(
    get,
    path = "/api/v1/snapshots/latest",
    tag = "Snapshots",
    summary = "Latest snapshot",
    description = "Returns the newest archived copy of the directory listing.",
    responses(
        (status = 200, description = "Latest snapshot", body = SnapshotDto),
        (status = 404, description = "Nothing archived yet", body = ErrorResponse),
    )
)]
pub async fn latest_snapshot(
    State(state): State<AppState>,
) -> Result<Json<SnapshotDto>, TrackerError> {
    Ok(Json(state.history.latest_snapshot().await?.into()))
}

/// Snapshot routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/snapshots/latest", get(latest_snapshot))
}
