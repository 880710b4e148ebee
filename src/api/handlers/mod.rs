pub mod guesses;
pub mod health;
pub mod metrics;
pub mod players;
pub mod prices;
