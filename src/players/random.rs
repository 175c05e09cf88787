use std::cell::RefCell;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::game::action::GameAction;
use crate::players::{GameView, Player};
use crate::types::ActionType;

/// Picks uniformly among the playable actions.
pub struct RandomPlayer {
    rng: RefCell<StdRng>,
}

impl RandomPlayer {
    pub fn new() -> Self {
        Self {
            rng: RefCell::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for RandomPlayer {
    fn decide(&self, _view: &GameView<'_>, actions: &[GameAction]) -> Option<GameAction> {
        actions.choose(&mut *self.rng.borrow_mut()).cloned()
    }
}

/// Random choice skewed towards building.
pub struct WeightedRandomPlayer {
    rng: RefCell<StdRng>,
}

impl WeightedRandomPlayer {
    pub fn new() -> Self {
        Self {
            rng: RefCell::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn weight(action: &GameAction) -> u32 {
        match action.action_type() {
            ActionType::BuildCity => 10_000,
            ActionType::BuildSettlement => 1_000,
            ActionType::BuyDevelopmentCard => 100,
            _ => 1,
        }
    }
}

impl Default for WeightedRandomPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for WeightedRandomPlayer {
    fn decide(&self, _view: &GameView<'_>, actions: &[GameAction]) -> Option<GameAction> {
        actions
            .choose_weighted(&mut *self.rng.borrow_mut(), Self::weight)
            .ok()
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{ActionKind, GameConfig, GameState};
    use crate::types::Color;

    #[test]
    fn seeded_random_player_is_repeatable() {
        let state = GameState::new(GameConfig::default()).unwrap();
        let view = GameView::new(&state);
        let a = RandomPlayer::seeded(3).decide(&view, state.playable_actions());
        let b = RandomPlayer::seeded(3).decide(&view, state.playable_actions());
        assert_eq!(a, b);
        assert!(state.playable_actions().contains(&a.unwrap()));
    }

    #[test]
    fn weighted_player_prefers_cities() {
        let actions = vec![
            GameAction::new(Color::Red, ActionKind::EndTurn),
            GameAction::new(Color::Red, ActionKind::BuildCity(4)),
        ];
        let state = GameState::new(GameConfig::default()).unwrap();
        let view = GameView::new(&state);
        let player = WeightedRandomPlayer::seeded(0);
        let cities = (0..100)
            .filter_map(|_| player.decide(&view, &actions))
            .filter(|a| a.action_type() == ActionType::BuildCity)
            .count();
        assert!(cities > 90);
    }

    #[test]
    fn empty_action_list_yields_nothing() {
        let state = GameState::new(GameConfig::default()).unwrap();
        let view = GameView::new(&state);
        assert!(RandomPlayer::seeded(1).decide(&view, &[]).is_none());
        assert!(WeightedRandomPlayer::seeded(1).decide(&view, &[]).is_none());
    }
}
