pub mod guess_repo;
pub mod memory;
pub mod player_repo;
pub mod postgres;
pub mod storage;

pub use memory::MemoryStore;
pub use postgres::PgBackend;
pub use storage::{Storage, StorageMode};

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::{Guess, Player};

/// Postgres SQLSTATE for `undefined_table`.
const UNDEFINED_TABLE: &str = "42P01";

#[derive(Debug, Error)]
pub enum BackendError {
    /// The backing table/collection does not exist. Never recovers within
    /// the process, so the facade stops talking to the primary.
    #[error("missing resource: {0}")]
    MissingResource(String),

    /// Network, auth, pool exhaustion, bad rows. Worth retrying next call.
    #[error("backend error: {0}")]
    Transient(String),
}

impl BackendError {
    pub fn is_missing_resource(&self) -> bool {
        matches!(self, BackendError::MissingResource(_))
    }
}

impl From<sqlx::Error> for BackendError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some(UNDEFINED_TABLE) {
                return BackendError::MissingResource(db_err.message().to_string());
            }
        }
        BackendError::Transient(e.to_string())
    }
}

/// Durable operations the game needs from a primary store.
///
/// Implementations must round-trip every `Player` and `Guess` field verbatim,
/// including absence of the optional resolution fields, so that records stay
/// interchangeable with the in-memory fallback.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get_player(&self, id: &str) -> Result<Option<Player>, BackendError>;

    async fn save_player(&self, player: &Player) -> Result<(), BackendError>;

    /// Newest unresolved guess for the player.
    async fn get_active_guess(&self, player_id: &str) -> Result<Option<Guess>, BackendError>;

    /// Upsert keyed by `(player_id, timestamp)`.
    async fn save_guess(&self, guess: &Guess) -> Result<(), BackendError>;

    async fn delete_guess(&self, player_id: &str, timestamp: i64) -> Result<(), BackendError>;
}

/// Build a lazily-connecting pool. No connection is attempted until the first
/// query, so an unreachable database never blocks start-up.
pub fn init_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect_lazy(database_url)?;

    Ok(pool)
}

/// Apply the bundled schema migrations.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
