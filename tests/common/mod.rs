#![allow(dead_code)]

use hexsettle::game::{ActionKind, ActionResult, FreqDeck, GameAction, GameConfig, GameState};
use hexsettle::types::{Color, Resource};

pub const RESOURCES_PER_TYPE: u32 = 19;

pub fn new_game(num_players: usize) -> GameState {
    let config = GameConfig {
        num_players,
        ..GameConfig::default()
    };
    GameState::new(config).expect("valid config")
}

/// Completes initial placement by always taking the first playable action.
pub fn finish_setup(state: &mut GameState) {
    while state.is_initial_build_phase {
        let action = state.playable_actions()[0].clone();
        state.execute(action).expect("setup action applies");
    }
}

pub fn main_phase_game(num_players: usize) -> GameState {
    let mut state = new_game(num_players);
    finish_setup(&mut state);
    state
}

/// Rolls fixed dice for the color whose turn it is.
pub fn roll(state: &mut GameState, first: u8, second: u8) {
    let color = state.current_color();
    state
        .execute_with_result(
            GameAction::new(color, ActionKind::Roll),
            Some(ActionResult::Dice(first, second)),
        )
        .expect("roll applies");
}

/// Replaces a hand, moving cards through the bank so totals stay conserved.
pub fn set_hand(state: &mut GameState, color: Color, deck: FreqDeck) {
    let idx = state.color_index(color).expect("seated color");
    let current = state.players[idx].resources;
    state.players[idx].remove_resources(&current).unwrap();
    state.bank.receive(&current);
    state.bank.dispense(&deck).expect("bank covers hand");
    state.players[idx].add_resources(&deck);
    state.refresh_playable_actions().unwrap();
}

pub fn clear_hands(state: &mut GameState) {
    for color in state.colors.clone() {
        set_hand(state, color, FreqDeck::zero());
    }
}

pub fn hand(state: &GameState, color: Color) -> FreqDeck {
    state.player(color).expect("seated color").resources
}

pub fn resource_totals(state: &GameState) -> [u32; 5] {
    let mut totals = [0u32; 5];
    for resource in Resource::ALL {
        let mut total = u32::from(state.bank.available(resource));
        for player in &state.players {
            total += u32::from(player.resources.count(resource));
        }
        totals[resource.index()] = total;
    }
    totals
}

pub fn execute_kind(state: &mut GameState, kind: ActionKind) {
    let color = state.current_color();
    state
        .execute(GameAction::new(color, kind))
        .expect("action is playable");
}

pub fn action_kinds(state: &GameState) -> Vec<ActionKind> {
    state
        .playable_actions()
        .iter()
        .map(|action| action.kind.clone())
        .collect()
}
