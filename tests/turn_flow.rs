mod common;

use common::{
    action_kinds, clear_hands, execute_kind, hand, main_phase_game, resource_totals, roll, set_hand,
};
use hexsettle::GameError;
use hexsettle::game::{ActionKind, ActionResult, FreqDeck, GameAction, GameConfig, GameState};
use hexsettle::players::{GameView, Player, RandomPlayer};
use hexsettle::types::{ActionPrompt, Color, DevelopmentCard, Resource};

#[test]
fn roll_is_the_only_action_before_rolling() {
    let mut state = main_phase_game(4);
    set_hand(&mut state, Color::Red, FreqDeck::from_counts([5, 5, 5, 5, 5]));
    assert_eq!(action_kinds(&state), vec![ActionKind::Roll]);

    let before = state.clone();
    let err = state
        .execute(GameAction::new(Color::Red, ActionKind::EndTurn))
        .unwrap_err();
    assert!(matches!(err, GameError::IllegalAction { .. }));
    assert_eq!(state, before);
}

#[test]
fn end_turn_hands_over_to_next_seat() {
    let mut state = main_phase_game(3);
    roll(&mut state, 2, 3);
    assert!(action_kinds(&state).contains(&ActionKind::EndTurn));
    execute_kind(&mut state, ActionKind::EndTurn);

    assert_eq!(state.current_color(), Color::Blue);
    assert_eq!(state.num_turns, 1);
    assert_eq!(action_kinds(&state), vec![ActionKind::Roll]);
    assert!(!state.player(Color::Blue).unwrap().has_rolled);
}

#[test]
fn seven_forces_discards_before_robber() {
    let mut state = main_phase_game(4);
    clear_hands(&mut state);
    set_hand(&mut state, Color::Red, FreqDeck::from_counts([2, 2, 2, 2, 1]));
    set_hand(&mut state, Color::Orange, FreqDeck::from_counts([4, 4, 0, 0, 0]));
    set_hand(&mut state, Color::White, FreqDeck::from_counts([1, 1, 1, 1, 3]));
    roll(&mut state, 3, 4);

    assert_eq!(state.current_prompt, ActionPrompt::Discard);
    assert_eq!(state.current_color(), Color::Red);
    assert_eq!(action_kinds(&state), vec![ActionKind::Discard]);
    execute_kind(&mut state, ActionKind::Discard);
    assert_eq!(hand(&state, Color::Red).total(), 5);

    // White holds exactly seven and keeps them.
    assert_eq!(state.current_prompt, ActionPrompt::Discard);
    assert_eq!(state.current_color(), Color::Orange);
    execute_kind(&mut state, ActionKind::Discard);
    assert_eq!(hand(&state, Color::Orange).total(), 4);
    assert_eq!(hand(&state, Color::White).total(), 7);

    assert_eq!(state.current_prompt, ActionPrompt::MoveRobber);
    assert_eq!(state.current_color(), Color::Red);
    assert_eq!(resource_totals(&state), [19; 5]);
}

#[test]
fn seven_without_big_hands_goes_straight_to_robber() {
    let mut state = main_phase_game(2);
    clear_hands(&mut state);
    roll(&mut state, 6, 1);
    assert_eq!(state.current_prompt, ActionPrompt::MoveRobber);

    let robber = state.board.robber_coordinate();
    let land_tiles = state.board.map.land_tiles.len();
    assert_eq!(state.playable_actions().len(), land_tiles - 1);
    for action in state.playable_actions() {
        match action.kind {
            ActionKind::MoveRobber { coordinate, victim } => {
                assert_ne!(coordinate, robber);
                assert_eq!(victim, None, "empty hands cannot be robbed");
            }
            _ => panic!("unexpected {action}"),
        }
    }

    let target = state.playable_actions()[0].clone();
    state.execute(target).unwrap();
    assert_ne!(state.board.robber_coordinate(), robber);
    assert_eq!(state.current_prompt, ActionPrompt::PlayTurn);
}

#[test]
fn robber_steals_one_card_from_chosen_victim() {
    let mut state = main_phase_game(2);
    clear_hands(&mut state);
    set_hand(&mut state, Color::Blue, FreqDeck::single(Resource::Brick, 1));
    roll(&mut state, 5, 2);

    let steal = state
        .playable_actions()
        .iter()
        .find(|a| matches!(a.kind, ActionKind::MoveRobber { victim: Some(Color::Blue), .. }))
        .cloned()
        .expect("a tile next to blue");
    let record = state.execute(steal).unwrap();
    assert_eq!(record.result, Some(ActionResult::Stole(Some(Resource::Brick))));
    assert_eq!(hand(&state, Color::Red), FreqDeck::single(Resource::Brick, 1));
    assert!(hand(&state, Color::Blue).is_empty());
}

#[test]
fn building_pays_the_bank() {
    let mut state = main_phase_game(2);
    roll(&mut state, 4, 4);
    clear_hands(&mut state);
    set_hand(&mut state, Color::Red, FreqDeck::from_counts([1, 1, 0, 0, 0]));

    let road = state
        .playable_actions()
        .iter()
        .find(|a| matches!(a.kind, ActionKind::BuildRoad(_)))
        .cloned()
        .expect("red can extend a road");
    let roads_before = state.player(Color::Red).unwrap().roads_available;
    state.execute(road).unwrap();
    assert!(hand(&state, Color::Red).is_empty());
    assert_eq!(state.player(Color::Red).unwrap().roads_available, roads_before - 1);
    assert_eq!(resource_totals(&state), [19; 5]);
    assert!(
        !action_kinds(&state)
            .iter()
            .any(|k| matches!(k, ActionKind::BuildRoad(_)))
    );
}

#[test]
fn city_replaces_a_settlement() {
    let mut state = main_phase_game(2);
    roll(&mut state, 4, 4);
    set_hand(&mut state, Color::Red, FreqDeck::from_counts([0, 0, 0, 2, 3]));

    let city = state
        .playable_actions()
        .iter()
        .find(|a| matches!(a.kind, ActionKind::BuildCity(_)))
        .cloned()
        .expect("red can upgrade");
    let before = state.actual_victory_points(Color::Red);
    state.execute(city).unwrap();
    let red = state.player(Color::Red).unwrap();
    assert_eq!(red.cities_available, 3);
    assert_eq!(red.settlements_available, 4);
    assert_eq!(state.actual_victory_points(Color::Red), before + 1);
}

#[test]
fn hidden_victory_points_win_the_game() {
    let config = GameConfig {
        num_players: 2,
        vps_to_win: 3,
        ..GameConfig::default()
    };
    let mut state = GameState::new(config).unwrap();
    common::finish_setup(&mut state);
    assert_eq!(state.visible_victory_points(Color::Red), 2);

    state.players[0].add_dev_card(DevelopmentCard::VictoryPoint);
    state.refresh_playable_actions().unwrap();
    roll(&mut state, 2, 2);

    assert_eq!(state.winner, Some(Color::Red));
    assert_eq!(state.visible_victory_points(Color::Red), 2);
    assert!(state.playable_actions().is_empty());
    assert!(matches!(
        state.execute(GameAction::new(Color::Red, ActionKind::EndTurn)),
        Err(GameError::GameFinished)
    ));
}

#[test]
fn replaying_the_log_rebuilds_the_game() {
    let mut state = common::new_game(3);
    let players = [RandomPlayer::seeded(1), RandomPlayer::seeded(2), RandomPlayer::seeded(3)];
    for _ in 0..300 {
        if state.winner.is_some() {
            break;
        }
        let choice = {
            let view = GameView::new(&state);
            players[state.current_player_index].decide(&view, state.playable_actions())
        };
        state.execute(choice.unwrap()).unwrap();
    }

    let replayed = GameState::replay(state.config.clone(), &state.actions).unwrap();
    assert_eq!(replayed.players, state.players);
    assert_eq!(replayed.bank, state.bank);
    assert_eq!(replayed.board, state.board);
    assert_eq!(replayed.current_prompt, state.current_prompt);
    assert_eq!(replayed.playable_actions(), state.playable_actions());
}
