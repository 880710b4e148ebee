use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{Guess, Player};
use crate::AppState;

#[derive(Deserialize)]
pub struct PlayerQuery {
    pub id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub player: Player,
    pub active_guess: Option<Guess>,
}

/// GET /api/players?id={id}: fetch a player, creating it on first visit
pub async fn get_or_create(
    State(state): State<AppState>,
    query: Result<Query<PlayerQuery>, QueryRejection>,
) -> Result<Json<PlayerView>, AppError> {
    let Query(query) = query?;
    let id = query.id.unwrap_or_default();
    let now = Utc::now().timestamp_millis();

    let player = state.engine.get_or_create_player(&id, now).await?;
    let active_guess = state.engine.active_guess(&id).await?;

    Ok(Json(PlayerView {
        player,
        active_guess,
    }))
}
