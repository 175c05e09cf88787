#![warn(clippy::all)]
#![deny(rust_2018_idioms)]

pub mod board;
pub mod cli;
pub mod coords;
pub mod game;
pub mod players;
pub mod types;

pub use board::{Board, CatanMap, MapType, Tile};
pub use game::{
    ActionKind, GameAction, GameConfig, GameError, GameSnapshot, GameState, generate_playable_actions,
};
pub use players::{GameView, Player};
pub use types::{ActionPrompt, ActionType, Color, Resource};
