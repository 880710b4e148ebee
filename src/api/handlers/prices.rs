use axum::extract::State;
use axum::Json;

use crate::errors::AppError;
use crate::price::PriceQuote;
use crate::AppState;

/// GET /api/prices: current BTC/USD quote
pub async fn current(State(state): State<AppState>) -> Result<Json<PriceQuote>, AppError> {
    let quote = state.prices.current_price().await?;
    Ok(Json(quote))
}
