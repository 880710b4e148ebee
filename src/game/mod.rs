pub mod engine;
pub mod resolution;

pub use engine::{GameEngine, Resolution};
pub use resolution::{judge, Outcome, RESOLUTION_WINDOW_MS};

use thiserror::Error;

/// Errors the engine surfaces to callers. None of these are retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),
}
