use crate::game::action::GameAction;
use crate::players::{GameView, Player, RandomPlayer, WeightedRandomPlayer};

pub struct CliPlayer {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CLI_PLAYERS: &[CliPlayer] = &[
    CliPlayer {
        code: "R",
        name: "RandomPlayer",
        description: "Chooses actions at random.",
    },
    CliPlayer {
        code: "W",
        name: "WeightedRandomPlayer",
        description: "Random, but strongly prefers cities, settlements and development cards.",
    },
];

pub enum PlayerInstance {
    Random(RandomPlayer),
    WeightedRandom(WeightedRandomPlayer),
}

impl PlayerInstance {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerInstance::Random(_) => "Random",
            PlayerInstance::WeightedRandom(_) => "WeightedRandom",
        }
    }
}

impl Player for PlayerInstance {
    fn decide(&self, view: &GameView<'_>, actions: &[GameAction]) -> Option<GameAction> {
        match self {
            PlayerInstance::Random(p) => p.decide(view, actions),
            PlayerInstance::WeightedRandom(p) => p.decide(view, actions),
        }
    }
}

/// Builds a player from its code. With a seed the player's choices are repeatable.
pub fn create_player(code: &str, seed: Option<u64>) -> Option<PlayerInstance> {
    match code {
        "R" => Some(PlayerInstance::Random(
            seed.map_or_else(RandomPlayer::new, RandomPlayer::seeded),
        )),
        "W" => Some(PlayerInstance::WeightedRandom(
            seed.map_or_else(WeightedRandomPlayer::new, WeightedRandomPlayer::seeded),
        )),
        _ => None,
    }
}

pub fn print_player_help() {
    println!("Player Legend:");
    println!("{:<5} {:<25} {}", "CODE", "PLAYER", "DESCRIPTION");
    println!("{}", "-".repeat(80));
    for player in CLI_PLAYERS {
        println!("{:<5} {:<25} {}", player.code, player.name, player.description);
    }
}
