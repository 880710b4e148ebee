use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

/// Always healthy: storage degrades to memory instead of failing.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage = state.engine.storage().mode();
    (StatusCode::OK, Json(json!({ "status": "healthy", "storage": storage })))
}
