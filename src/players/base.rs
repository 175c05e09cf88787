use crate::board::Board;
use crate::game::action::GameAction;
use crate::game::encoding::GameSnapshot;
use crate::game::resources::FreqDeck;
use crate::game::state::GameState;
use crate::types::{ActionPrompt, Color};

/// Decision policy for one seat. Must return one of `actions`; anything else
/// is rejected by the engine.
pub trait Player {
    fn decide(&self, view: &GameView<'_>, actions: &[GameAction]) -> Option<GameAction>;
}

/// Read-only window onto a game handed to strategies.
#[derive(Clone, Copy)]
pub struct GameView<'a> {
    state: &'a GameState,
}

impl<'a> GameView<'a> {
    pub fn new(state: &'a GameState) -> Self {
        Self { state }
    }

    pub fn current_color(&self) -> Color {
        self.state.current_color()
    }

    pub fn current_prompt(&self) -> ActionPrompt {
        self.state.current_prompt
    }

    pub fn colors(&self) -> &'a [Color] {
        &self.state.colors
    }

    pub fn board(&self) -> &'a Board {
        &self.state.board
    }

    pub fn playable_actions(&self) -> &'a [GameAction] {
        self.state.playable_actions()
    }

    /// Cards in hand for `color`. Opponents' hands are public in this engine.
    pub fn hand(&self, color: Color) -> Option<FreqDeck> {
        self.state.player(color).map(|p| p.resources)
    }

    pub fn visible_victory_points(&self, color: Color) -> u8 {
        self.state.visible_victory_points(color)
    }

    pub fn bank(&self) -> &'a FreqDeck {
        self.state.bank.resources()
    }

    pub fn winner(&self) -> Option<Color> {
        self.state.winner
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::from_state(self.state)
    }
}
