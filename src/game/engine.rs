use std::sync::Arc;

use metrics::counter;

use super::resolution::judge;
use super::GameError;
use crate::db::Storage;
use crate::models::{Direction, Guess, Player};

/// Outcome of a resolve check.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// No active guess, window still open, or price unchanged.
    Pending,
    Resolved {
        guess: Guess,
        score_change: i64,
        /// Player after the score update; `None` if the record has vanished.
        player: Option<Player>,
    },
}

/// Guess lifecycle over the storage facade.
///
/// Holds no state of its own. Every time-dependent call takes `now` in
/// milliseconds since the epoch, so results depend only on stored records,
/// `now` and the supplied price.
#[derive(Clone)]
pub struct GameEngine {
    storage: Arc<Storage>,
}

fn validate_id(id: &str) -> Result<(), GameError> {
    if id.trim().is_empty() {
        return Err(GameError::Validation("Player ID required".into()));
    }
    Ok(())
}

impl GameEngine {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Fetch a player, creating it with a zero score on first reference.
    pub async fn get_or_create_player(&self, id: &str, now: i64) -> Result<Player, GameError> {
        validate_id(id)?;

        if let Some(player) = self.storage.get_player(id).await {
            return Ok(player);
        }

        let player = Player::new(id, now);
        self.storage.save_player(&player).await;
        tracing::info!(player_id = id, "Player created");
        Ok(player)
    }

    /// The player's unresolved guess, if any.
    pub async fn active_guess(&self, player_id: &str) -> Result<Option<Guess>, GameError> {
        validate_id(player_id)?;
        Ok(self.storage.get_active_guess(player_id).await)
    }

    /// Fails unless the player exists and has no unresolved guess.
    pub async fn check_can_place(&self, player_id: &str) -> Result<(), GameError> {
        validate_id(player_id)?;

        if self.storage.get_player(player_id).await.is_none() {
            return Err(GameError::NotFound("Player not found".into()));
        }

        if self.storage.get_active_guess(player_id).await.is_some() {
            return Err(GameError::Conflict("You already have an active guess".into()));
        }

        Ok(())
    }

    pub async fn place_guess(
        &self,
        player_id: &str,
        direction: Direction,
        current_price: f64,
        now: i64,
    ) -> Result<Guess, GameError> {
        validate_id(player_id)?;
        if !current_price.is_finite() || current_price <= 0.0 {
            return Err(GameError::Validation(format!(
                "price must be a positive number, got {current_price}"
            )));
        }

        // Not atomic with the write below; concurrent placements can race.
        self.check_can_place(player_id).await?;

        let guess = Guess::new(player_id, direction, current_price, now);
        self.storage.save_guess(&guess).await;

        counter!("guesses_placed_total").increment(1);
        tracing::info!(
            player_id,
            direction = %direction,
            price = current_price,
            "Guess placed"
        );

        Ok(guess)
    }

    /// Resolve the active guess if its window has passed and the price moved.
    ///
    /// Writes the resolved guess first, then the score. The two writes are
    /// not transactional: a failure in between leaves a resolved guess whose
    /// score change was never applied.
    pub async fn resolve_guess(
        &self,
        player_id: &str,
        current_price: f64,
        now: i64,
    ) -> Result<Resolution, GameError> {
        validate_id(player_id)?;

        let Some(active) = self.storage.get_active_guess(player_id).await else {
            return Ok(Resolution::Pending);
        };

        let Some(outcome) = judge(&active, current_price, now) else {
            return Ok(Resolution::Pending);
        };

        let resolved = Guess {
            resolved: true,
            result: Some(outcome.result),
            resolved_price: Some(current_price),
            resolved_at: Some(now),
            ..active
        };
        self.storage.save_guess(&resolved).await;

        let player = self.update_player_score(player_id, outcome.score_change).await;
        if player.is_none() {
            tracing::warn!(player_id, "Guess resolved for a player with no record");
        }

        counter!("guesses_resolved_total", "result" => outcome.result.as_str()).increment(1);
        tracing::info!(
            player_id,
            result = %outcome.result,
            from = resolved.price_at_guess,
            to = current_price,
            score_change = outcome.score_change,
            "Guess resolved"
        );

        Ok(Resolution::Resolved {
            guess: resolved,
            score_change: outcome.score_change,
            player,
        })
    }

    /// Read-modify-write of the player's score. Negative scores are allowed.
    pub async fn update_player_score(&self, id: &str, delta: i64) -> Option<Player> {
        let player = self.storage.get_player(id).await?;
        let updated = Player {
            score: player.score + delta,
            ..player
        };
        self.storage.save_player(&updated).await;
        Some(updated)
    }

    /// Remove the player's active guess. A no-op when there is none.
    pub async fn clear_guess(&self, player_id: &str) -> Result<(), GameError> {
        validate_id(player_id)?;

        let Some(guess) = self.storage.get_active_guess(player_id).await else {
            return Ok(());
        };

        self.storage.delete_guess(&guess.player_id, guess.timestamp).await;
        tracing::debug!(
            player_id,
            timestamp = guess.timestamp,
            "Guess cleared"
        );
        Ok(())
    }
}
