use std::collections::BTreeMap;
use std::time::Duration;

use crate::game::game::Game;
use crate::types::Color;

/// Aggregates results over a batch of simulated games.
#[derive(Debug, Default, Clone)]
pub struct GameStats {
    pub wins: BTreeMap<Color, u32>,
    pub results_by_player: BTreeMap<Color, Vec<u8>>,
    pub games: u32,
    pub unfinished: u32,
    pub total_ticks: u64,
    pub total_turns: u64,
    pub total_duration: Duration,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game(&mut self, game: &Game, duration: Duration) {
        self.games += 1;
        self.total_duration += duration;
        self.total_turns += u64::from(game.state.num_turns);
        self.total_ticks += game.state.actions.len() as u64;

        match game.winning_color() {
            Some(winner) => *self.wins.entry(winner).or_insert(0) += 1,
            None => self.unfinished += 1,
        }

        for color in &game.state.colors {
            self.results_by_player
                .entry(*color)
                .or_default()
                .push(game.state.actual_victory_points(*color));
        }
    }

    pub fn win_rate(&self, color: Color) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        let wins = self.wins.get(&color).copied().unwrap_or(0);
        wins as f64 / self.games as f64 * 100.0
    }

    pub fn avg_victory_points(&self, color: Color) -> f64 {
        match self.results_by_player.get(&color) {
            Some(vps) if !vps.is_empty() => {
                vps.iter().map(|v| f64::from(*v)).sum::<f64>() / vps.len() as f64
            }
            _ => 0.0,
        }
    }

    pub fn get_avg_ticks(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_ticks as f64 / self.games as f64
    }

    pub fn get_avg_turns(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games as f64
    }

    pub fn get_avg_duration(&self) -> Duration {
        if self.games == 0 {
            return Duration::ZERO;
        }
        self.total_duration / self.games
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use crate::players::RandomPlayer;

    #[test]
    fn records_one_entry_per_seat() {
        let config = GameConfig {
            num_players: 2,
            ..GameConfig::default()
        };
        let mut game = Game::new(config).unwrap();
        let players = [RandomPlayer::seeded(5), RandomPlayer::seeded(6)];
        game.play(&players).unwrap();

        let mut stats = GameStats::new();
        stats.record_game(&game, Duration::from_millis(10));
        assert_eq!(stats.games, 1);
        assert_eq!(stats.results_by_player.len(), 2);
        assert_eq!(stats.wins.values().sum::<u32>() + stats.unfinished, 1);
        assert_eq!(stats.get_avg_duration(), Duration::from_millis(10));
    }
}
