use async_trait::async_trait;
use sqlx::PgPool;

use super::{guess_repo, player_repo, BackendError, StorageBackend};
use crate::models::{Guess, Player};

/// Primary backend over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StorageBackend for PgBackend {
    async fn get_player(&self, id: &str) -> Result<Option<Player>, BackendError> {
        player_repo::get_player(&self.pool, id).await
    }

    async fn save_player(&self, player: &Player) -> Result<(), BackendError> {
        player_repo::upsert_player(&self.pool, player).await
    }

    async fn get_active_guess(&self, player_id: &str) -> Result<Option<Guess>, BackendError> {
        guess_repo::get_active_guess(&self.pool, player_id).await
    }

    async fn save_guess(&self, guess: &Guess) -> Result<(), BackendError> {
        guess_repo::upsert_guess(&self.pool, guess).await
    }

    async fn delete_guess(&self, player_id: &str, timestamp: i64) -> Result<(), BackendError> {
        guess_repo::delete_guess(&self.pool, player_id, timestamp).await
    }
}
