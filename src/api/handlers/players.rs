//! Player history handler.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::PlayerSightingDto;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, TrackerError};

/// `GET /players/{name}/history`: Every server visit of a player.
///
/// # Errors
///
/// Returns [`TrackerError::PlayerNotFound`] if the player was never seen.
#[utoipa::path(
    get,
    path = "/api/v1/players/{name}/history",
    tag = "Players",
    summary = "Player history",
    description = "Returns every recorded server visit of the player, newest first. The name is matched case-insensitively; a visit still in progress has a null `disconnected_at`.",
    params(
        ("name" = String, Path, description = "Player name"),
    ),
    responses(
        (status = 200, description = "Player sightings", body = Vec<PlayerSightingDto>),
        (status = 404, description = "Player never seen", body = ErrorResponse),
    )
)]
pub async fn player_history(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<PlayerSightingDto>>, TrackerError> {
    let history = state.history.player_history(&name).await?;
    Ok(Json(history.into_iter().map(Into::into).collect()))
}

/// Player routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/players/{name}/history", get(player_history))
}
