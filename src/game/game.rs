use tracing::{info, warn};
use uuid::Uuid;

use crate::game::action::{ActionRecord, GameAction};
use crate::game::{GameConfig, GameError, GameState};
use crate::players::{GameView, Player};
use crate::types::Color;

/// Turns after which an undecided game is abandoned.
pub const TURNS_LIMIT: u32 = 1000;

pub struct Game {
    pub id: Uuid,
    pub state: GameState,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Ok(Self {
            id: Uuid::new_v4(),
            state: GameState::new(config)?,
        })
    }

    /// Runs until someone wins, the turn limit hits, or a strategy gives up.
    /// `players` are seated in the game's color order.
    pub fn play<P: Player>(&mut self, players: &[P]) -> Result<Option<Color>, GameError> {
        while self.winning_color().is_none() && self.state.num_turns < TURNS_LIMIT {
            if self.play_tick(players)?.is_none() {
                warn!(game = %self.id, "no action chosen, stopping");
                break;
            }
        }
        info!(
            game = %self.id,
            winner = ?self.winning_color(),
            turns = self.state.num_turns,
            "game over"
        );
        Ok(self.winning_color())
    }

    /// Asks the seat whose decision is pending for one action and applies it.
    pub fn play_tick<P: Player>(&mut self, players: &[P]) -> Result<Option<ActionRecord>, GameError> {
        let Some(player) = players.get(self.state.current_player_index) else {
            return Ok(None);
        };
        if self.state.playable_actions().is_empty() {
            return Ok(None);
        }
        let view = GameView::new(&self.state);
        let Some(action) = player.decide(&view, self.state.playable_actions()) else {
            return Ok(None);
        };
        self.execute(action).map(Some)
    }

    pub fn execute(&mut self, action: GameAction) -> Result<ActionRecord, GameError> {
        self.state.execute(action)
    }

    pub fn winning_color(&self) -> Option<Color> {
        self.state.winner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::players::RandomPlayer;

    #[test]
    fn seeded_players_finish_a_game() {
        let mut game = Game::new(GameConfig::default()).unwrap();
        let players: Vec<RandomPlayer> = (0..4).map(RandomPlayer::seeded).collect();
        let winner = game.play(&players).unwrap();
        if let Some(color) = winner {
            assert!(game.state.actual_victory_points(color) >= 10);
        } else {
            assert_eq!(game.state.num_turns, TURNS_LIMIT);
        }
        assert!(game.state.actions.len() > 16);
    }

    #[test]
    fn illegal_choice_is_rejected_without_mutation() {
        struct Stubborn;
        impl Player for Stubborn {
            fn decide(&self, view: &GameView<'_>, _actions: &[GameAction]) -> Option<GameAction> {
                Some(GameAction::new(view.current_color(), crate::game::ActionKind::EndTurn))
            }
        }
        let mut game = Game::new(GameConfig::default()).unwrap();
        let before = game.state.clone();
        let err = game.play_tick(&[Stubborn, Stubborn, Stubborn, Stubborn]).unwrap_err();
        assert!(matches!(err, GameError::IllegalAction { .. }));
        assert_eq!(game.state, before);
    }
}
