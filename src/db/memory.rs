use std::collections::HashMap;

use parking_lot::RwLock;

use crate::models::{Guess, Player};

/// In-process fallback store. Nothing survives a restart.
///
/// Each call takes the lock once, so individual operations are atomic, but
/// there is no locking across calls.
#[derive(Debug, Default)]
pub struct MemoryStore {
    players: RwLock<HashMap<String, Player>>,
    guesses: RwLock<HashMap<String, Vec<Guess>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_player(&self, id: &str) -> Option<Player> {
        self.players.read().get(id).cloned()
    }

    pub fn save_player(&self, player: &Player) {
        self.players.write().insert(player.id.clone(), player.clone());
    }

    /// All guesses for a player, in no particular order.
    pub fn get_guesses(&self, player_id: &str) -> Vec<Guess> {
        self.guesses.read().get(player_id).cloned().unwrap_or_default()
    }

    /// Replace the entry with the same timestamp, else append.
    pub fn save_guess(&self, guess: &Guess) {
        let mut guesses = self.guesses.write();
        let list = guesses.entry(guess.player_id.clone()).or_default();
        match list.iter_mut().find(|g| g.timestamp == guess.timestamp) {
            Some(existing) => *existing = guess.clone(),
            None => list.push(guess.clone()),
        }
    }

    pub fn delete_guess(&self, player_id: &str, timestamp: i64) {
        let mut guesses = self.guesses.write();
        if let Some(list) = guesses.get_mut(player_id) {
            list.retain(|g| g.timestamp != timestamp);
            if list.is_empty() {
                guesses.remove(player_id);
            }
        }
    }

    pub fn get_active_guess(&self, player_id: &str) -> Option<Guess> {
        self.get_guesses(player_id)
            .into_iter()
            .filter(Guess::is_active)
            .max_by_key(|g| g.timestamp)
    }

    pub fn reset(&self) {
        self.players.write().clear();
        self.guesses.write().clear();
    }
}
