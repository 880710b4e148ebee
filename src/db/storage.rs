use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use metrics::{counter, gauge};
use serde::Serialize;

use super::{BackendError, MemoryStore, StorageBackend};
use crate::models::{Guess, Player};

/// Which store is currently serving calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Primary configured and still eligible.
    Primary,
    /// Primary was configured but has been permanently disabled.
    Degraded,
    /// No primary configured; memory only.
    Memory,
}

/// Storage facade over an optional primary backend and the in-memory fallback.
///
/// Every call tries the primary first. A missing-resource error disables the
/// primary for the rest of the process; any other error is logged and only
/// that call is served from memory. Callers never see backend errors.
pub struct Storage {
    primary: Option<Arc<dyn StorageBackend>>,
    primary_disabled: AtomicBool,
    fallback: MemoryStore,
}

impl Storage {
    pub fn new(primary: Option<Arc<dyn StorageBackend>>) -> Self {
        gauge!("storage_primary_enabled").set(if primary.is_some() { 1.0 } else { 0.0 });
        Self {
            primary,
            primary_disabled: AtomicBool::new(false),
            fallback: MemoryStore::new(),
        }
    }

    /// Memory-only storage.
    pub fn in_memory() -> Self {
        Self::new(None)
    }

    pub fn mode(&self) -> StorageMode {
        match self.primary {
            None => StorageMode::Memory,
            Some(_) if self.primary_disabled.load(Ordering::Acquire) => StorageMode::Degraded,
            Some(_) => StorageMode::Primary,
        }
    }

    /// Direct access to the fallback store.
    pub fn fallback(&self) -> &MemoryStore {
        &self.fallback
    }

    /// Clear the fallback and stop using the primary. Test isolation only.
    pub fn reset(&self) {
        self.disable_primary();
        self.fallback.reset();
    }

    fn active_primary(&self) -> Option<&dyn StorageBackend> {
        if self.primary_disabled.load(Ordering::Acquire) {
            return None;
        }
        self.primary.as_deref()
    }

    fn disable_primary(&self) {
        self.primary_disabled.store(true, Ordering::Release);
        gauge!("storage_primary_enabled").set(0.0);
    }

    async fn with_fallback<'a, T, Fut>(
        &'a self,
        op: &'static str,
        primary_op: impl FnOnce(&'a dyn StorageBackend) -> Fut,
        fallback_op: impl FnOnce(&MemoryStore) -> T,
    ) -> T
    where
        Fut: Future<Output = Result<T, BackendError>>,
    {
        if let Some(db) = self.active_primary() {
            match primary_op(db).await {
                Ok(value) => return value,
                Err(e) if e.is_missing_resource() => {
                    tracing::warn!(
                        op,
                        error = %e,
                        "Primary store resource missing, switching to in-memory storage"
                    );
                    counter!("storage_fallback_total", "op" => op, "reason" => "missing_resource")
                        .increment(1);
                    self.disable_primary();
                }
                Err(e) => {
                    tracing::error!(op, error = %e, "Primary store error, serving call from memory");
                    counter!("storage_fallback_total", "op" => op, "reason" => "transient")
                        .increment(1);
                }
            }
        }

        fallback_op(&self.fallback)
    }

    pub async fn get_player(&self, id: &str) -> Option<Player> {
        self.with_fallback("get_player", |db| db.get_player(id), |mem| mem.get_player(id))
            .await
    }

    pub async fn save_player(&self, player: &Player) {
        self.with_fallback(
            "save_player",
            |db| db.save_player(player),
            |mem| mem.save_player(player),
        )
        .await
    }

    pub async fn get_active_guess(&self, player_id: &str) -> Option<Guess> {
        self.with_fallback(
            "get_active_guess",
            |db| db.get_active_guess(player_id),
            |mem| mem.get_active_guess(player_id),
        )
        .await
    }

    pub async fn save_guess(&self, guess: &Guess) {
        self.with_fallback(
            "save_guess",
            |db| db.save_guess(guess),
            |mem| mem.save_guess(guess),
        )
        .await
    }

    pub async fn delete_guess(&self, player_id: &str, timestamp: i64) {
        self.with_fallback(
            "delete_guess",
            |db| db.delete_guess(player_id, timestamp),
            |mem| mem.delete_guess(player_id, timestamp),
        )
        .await
    }
}
