use crate::models::{Direction, Guess, GuessResult};

/// A guess cannot resolve until this many milliseconds after it was placed.
pub const RESOLUTION_WINDOW_MS: i64 = 60_000;

/// Result of judging a guess against a later price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub result: GuessResult,
    /// Always +1 or -1.
    pub score_change: i64,
}

/// Decide a guess, or `None` while it must keep waiting.
///
/// Waits while the window is still open, and also on an exactly unchanged
/// price, since a flat market says nothing about direction.
pub fn judge(guess: &Guess, current_price: f64, now: i64) -> Option<Outcome> {
    if guess.resolved {
        return None;
    }
    if now - guess.timestamp < RESOLUTION_WINDOW_MS {
        return None;
    }
    if current_price == guess.price_at_guess {
        return None;
    }

    let went_up = current_price > guess.price_at_guess;
    let correct = went_up == (guess.direction == Direction::Up);

    Some(if correct {
        Outcome {
            result: GuessResult::Win,
            score_change: 1,
        }
    } else {
        Outcome {
            result: GuessResult::Lose,
            score_change: -1,
        }
    })
}
