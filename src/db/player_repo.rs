use sqlx::PgPool;

use super::BackendError;
use crate::models::Player;

/// Get a player by id.
pub async fn get_player(pool: &PgPool, id: &str) -> Result<Option<Player>, BackendError> {
    let player = sqlx::query_as::<_, Player>(
        "SELECT id, score, created_at FROM players WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(player)
}

/// Insert or overwrite a player record.
pub async fn upsert_player(pool: &PgPool, player: &Player) -> Result<(), BackendError> {
    sqlx::query(
        r#"
        INSERT INTO players (id, score, created_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE SET score = $2, created_at = $3
        "#,
    )
    .bind(&player.id)
    .bind(player.score)
    .bind(player.created_at)
    .execute(pool)
    .await?;

    Ok(())
}
