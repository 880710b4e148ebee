use sqlx::{FromRow, PgPool};

use super::BackendError;
use crate::models::Guess;

/// Database row for the guesses table. Enum columns are stored as text.
#[derive(Debug, Clone, FromRow)]
struct GuessRow {
    player_id: String,
    direction: String,
    price_at_guess: f64,
    timestamp: i64,
    resolved: bool,
    result: Option<String>,
    resolved_price: Option<f64>,
    resolved_at: Option<i64>,
}

impl TryFrom<GuessRow> for Guess {
    type Error = BackendError;

    fn try_from(row: GuessRow) -> Result<Self, Self::Error> {
        let direction = row.direction.parse().map_err(BackendError::Transient)?;
        let result = row
            .result
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(BackendError::Transient)?;

        Ok(Guess {
            player_id: row.player_id,
            direction,
            price_at_guess: row.price_at_guess,
            timestamp: row.timestamp,
            resolved: row.resolved,
            result,
            resolved_price: row.resolved_price,
            resolved_at: row.resolved_at,
        })
    }
}

const GUESS_COLUMNS: &str =
    "player_id, direction, price_at_guess, timestamp, resolved, result, resolved_price, resolved_at";

/// Newest unresolved guess for a player.
pub async fn get_active_guess(pool: &PgPool, player_id: &str) -> Result<Option<Guess>, BackendError> {
    let sql = format!(
        "SELECT {GUESS_COLUMNS} FROM guesses \
         WHERE player_id = $1 AND resolved = FALSE \
         ORDER BY timestamp DESC LIMIT 1"
    );
    let row = sqlx::query_as::<_, GuessRow>(&sql)
        .bind(player_id)
        .fetch_optional(pool)
        .await?;

    row.map(Guess::try_from).transpose()
}

/// Insert a guess or overwrite the one with the same `(player_id, timestamp)`.
pub async fn upsert_guess(pool: &PgPool, guess: &Guess) -> Result<(), BackendError> {
    sqlx::query(
        r#"
        INSERT INTO guesses
            (player_id, direction, price_at_guess, timestamp, resolved, result, resolved_price, resolved_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (player_id, timestamp) DO UPDATE
            SET direction = $2,
                price_at_guess = $3,
                resolved = $5,
                result = $6,
                resolved_price = $7,
                resolved_at = $8
        "#,
    )
    .bind(&guess.player_id)
    .bind(guess.direction.as_str())
    .bind(guess.price_at_guess)
    .bind(guess.timestamp)
    .bind(guess.resolved)
    .bind(guess.result.map(|r| r.as_str()))
    .bind(guess.resolved_price)
    .bind(guess.resolved_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_guess(pool: &PgPool, player_id: &str, timestamp: i64) -> Result<(), BackendError> {
    sqlx::query("DELETE FROM guesses WHERE player_id = $1 AND timestamp = $2")
        .bind(player_id)
        .bind(timestamp)
        .execute(pool)
        .await?;

    Ok(())
}
