pub mod guess;
pub mod player;

pub use guess::{Direction, Guess, GuessResult};
pub use player::Player;
