use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use btc_prophet::db::{BackendError, MemoryStore, Storage, StorageBackend};
use btc_prophet::game::GameEngine;
use btc_prophet::models::{Guess, Player};
use btc_prophet::price::{PriceError, PriceQuote, PriceSource};

#[allow(dead_code)]
pub const T0: i64 = 1_700_000_000_000;

/// How the scripted primary answers the next calls.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Healthy,
    MissingResource,
    Transient,
}

/// Primary backend backed by its own memory map, with switchable faults.
#[allow(dead_code)]
pub struct ScriptedPrimary {
    pub data: MemoryStore,
    fault: Mutex<Fault>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedPrimary {
    pub fn new(fault: Fault) -> Arc<Self> {
        Arc::new(Self {
            data: MemoryStore::new(),
            fault: Mutex::new(fault),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_fault(&self, fault: Fault) {
        *self.fault.lock() = fault;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match *self.fault.lock() {
            Fault::Healthy => Ok(()),
            Fault::MissingResource => Err(BackendError::MissingResource(
                "relation \"guesses\" does not exist".into(),
            )),
            Fault::Transient => Err(BackendError::Transient("pool timed out".into())),
        }
    }
}

#[async_trait]
impl StorageBackend for ScriptedPrimary {
    async fn get_player(&self, id: &str) -> Result<Option<Player>, BackendError> {
        self.check()?;
        Ok(self.data.get_player(id))
    }

    async fn save_player(&self, player: &Player) -> Result<(), BackendError> {
        self.check()?;
        self.data.save_player(player);
        Ok(())
    }

    async fn get_active_guess(&self, player_id: &str) -> Result<Option<Guess>, BackendError> {
        self.check()?;
        Ok(self.data.get_active_guess(player_id))
    }

    async fn save_guess(&self, guess: &Guess) -> Result<(), BackendError> {
        self.check()?;
        self.data.save_guess(guess);
        Ok(())
    }

    async fn delete_guess(&self, player_id: &str, timestamp: i64) -> Result<(), BackendError> {
        self.check()?;
        self.data.delete_guess(player_id, timestamp);
        Ok(())
    }
}

/// Price source that returns whatever the test sets; `None` means unreachable.
#[allow(dead_code)]
pub struct FixedPrice {
    price: Mutex<Option<f64>>,
}

#[allow(dead_code)]
impl FixedPrice {
    pub fn new(price: f64) -> Arc<Self> {
        Arc::new(Self {
            price: Mutex::new(Some(price)),
        })
    }

    pub fn unavailable() -> Arc<Self> {
        Arc::new(Self {
            price: Mutex::new(None),
        })
    }

    pub fn set(&self, price: f64) {
        *self.price.lock() = Some(price);
    }

    pub fn set_unavailable(&self) {
        *self.price.lock() = None;
    }
}

#[async_trait]
impl PriceSource for FixedPrice {
    async fn current_price(&self) -> Result<PriceQuote, PriceError> {
        let price = *self.price.lock();
        price
            .map(|price| PriceQuote {
                price,
                as_of: chrono::Utc::now().timestamp_millis(),
            })
            .ok_or_else(|| PriceError::Unexpected("price source unreachable".into()))
    }
}

/// Engine over memory-only storage.
#[allow(dead_code)]
pub fn memory_engine() -> GameEngine {
    GameEngine::new(Arc::new(Storage::in_memory()))
}
