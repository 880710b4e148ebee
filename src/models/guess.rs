use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("Direction must be \"up\" or \"down\", got {other:?}")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GuessResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuessResult {
    Win,
    Lose,
}

impl GuessResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            GuessResult::Win => "win",
            GuessResult::Lose => "lose",
        }
    }
}

impl FromStr for GuessResult {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "win" => Ok(GuessResult::Win),
            "lose" => Ok(GuessResult::Lose),
            other => Err(format!("unknown guess result {other:?}")),
        }
    }
}

impl fmt::Display for GuessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Guess
// ---------------------------------------------------------------------------

/// A single up/down prediction.
///
/// `(player_id, timestamp)` identifies the record. The `result`,
/// `resolved_price` and `resolved_at` fields are only present once
/// `resolved` is true, and are omitted from the JSON shape otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guess {
    pub player_id: String,
    pub direction: Direction,
    pub price_at_guess: f64,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<GuessResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<i64>,
}

impl Guess {
    pub fn new(player_id: impl Into<String>, direction: Direction, price_at_guess: f64, now: i64) -> Self {
        Self {
            player_id: player_id.into(),
            direction,
            price_at_guess,
            timestamp: now,
            resolved: false,
            result: None,
            resolved_price: None,
            resolved_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.resolved
    }
}
