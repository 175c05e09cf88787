pub mod base;
pub mod random;

pub use base::{GameView, Player};
pub use random::{RandomPlayer, WeightedRandomPlayer};
