pub mod players;
pub mod stats;

pub use players::{CLI_PLAYERS, CliPlayer, PlayerInstance, create_player, print_player_help};
pub use stats::GameStats;
