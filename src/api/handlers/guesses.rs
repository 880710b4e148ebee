use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::game::Resolution;
use crate::models::{Direction, Guess};
use crate::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceGuessRequest {
    pub player_id: Option<String>,
    pub direction: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRef {
    pub player_id: Option<String>,
}

#[derive(Serialize)]
pub struct GuessView {
    pub guess: Guess,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/guesses: place a guess at the current price
pub async fn place(
    State(state): State<AppState>,
    body: Result<Json<PlaceGuessRequest>, JsonRejection>,
) -> Result<Json<GuessView>, AppError> {
    let Json(body) = body?;
    let (Some(player_id), Some(direction)) = (body.player_id, body.direction) else {
        return Err(AppError::Validation("Player ID and direction required".into()));
    };
    let direction: Direction = direction.parse().map_err(AppError::Validation)?;

    // Unknown player and active guess are reported even when the price is down
    state.engine.check_can_place(&player_id).await?;

    let quote = state.prices.current_price().await?;
    let now = Utc::now().timestamp_millis();
    let guess = state
        .engine
        .place_guess(&player_id, direction, quote.price, now)
        .await?;

    Ok(Json(GuessView { guess }))
}

/// POST /api/guesses/resolve: resolve the active guess if it is due
pub async fn resolve(
    State(state): State<AppState>,
    body: Result<Json<PlayerRef>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = body?;
    let player_id = body.player_id.unwrap_or_default();
    if player_id.trim().is_empty() {
        return Err(AppError::Validation("Player ID required".into()));
    }

    let quote = state.prices.current_price().await?;
    let now = Utc::now().timestamp_millis();

    match state.engine.resolve_guess(&player_id, quote.price, now).await? {
        Resolution::Pending => Ok(Json(json!({ "resolved": false }))),
        Resolution::Resolved {
            guess,
            score_change,
            player,
        } => Ok(Json(json!({
            "resolved": true,
            "guess": guess,
            "scoreChange": score_change,
            "player": player,
        }))),
    }
}

/// DELETE /api/guesses/resolve?playerId={id}: abandon the active guess
pub async fn clear(
    State(state): State<AppState>,
    query: Result<Query<PlayerRef>, QueryRejection>,
) -> Result<Json<Value>, AppError> {
    let Query(query) = query?;
    let player_id = query.player_id.unwrap_or_default();
    state.engine.clear_guess(&player_id).await?;

    Ok(Json(json!({ "success": true })))
}
