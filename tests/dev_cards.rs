mod common;

use common::{action_kinds, clear_hands, execute_kind, hand, main_phase_game, resource_totals, roll, set_hand};
use hexsettle::game::{ActionKind, ActionResult, DEVELOPMENT_CARD_COST, FreqDeck, GameAction, GameState};
use hexsettle::types::{ActionPrompt, Color, DevelopmentCard, Resource};

/// Red holds `card` from a previous turn and has rolled.
fn holding(card: DevelopmentCard) -> GameState {
    let mut state = main_phase_game(4);
    state.players[0].add_dev_card(card);
    state.players[0].start_turn();
    state.refresh_playable_actions().unwrap();
    roll(&mut state, 4, 4);
    clear_hands(&mut state);
    state
}

#[test]
fn bought_cards_wait_a_turn() {
    let mut state = main_phase_game(2);
    roll(&mut state, 4, 4);
    set_hand(&mut state, Color::Red, DEVELOPMENT_CARD_COST);

    let record = state
        .execute_with_result(
            GameAction::new(Color::Red, ActionKind::BuyDevelopmentCard),
            Some(ActionResult::Drew(DevelopmentCard::Knight)),
        )
        .unwrap();
    assert_eq!(record.result, Some(ActionResult::Drew(DevelopmentCard::Knight)));
    assert_eq!(state.bank.development_deck_len(), 24);
    assert!(hand(&state, Color::Red).is_empty());
    assert!(!action_kinds(&state).contains(&ActionKind::PlayKnightCard));
}

#[test]
fn knight_moves_the_robber_and_counts_towards_largest_army() {
    let mut state = holding(DevelopmentCard::Knight);
    state.players[0].played_dev_cards[DevelopmentCard::Knight.index()] = 2;
    state.refresh_playable_actions().unwrap();

    execute_kind(&mut state, ActionKind::PlayKnightCard);
    assert_eq!(state.current_prompt, ActionPrompt::MoveRobber);
    assert!(state.largest_army.is_held_by(Color::Red));
    assert_eq!(state.visible_victory_points(Color::Red), 4);

    let robber = state.playable_actions()[0].clone();
    state.execute(robber).unwrap();
    assert_eq!(state.current_prompt, ActionPrompt::PlayTurn);
    assert!(!action_kinds(&state).contains(&ActionKind::PlayKnightCard));
}

#[test]
fn monopoly_collects_from_every_opponent() {
    let mut state = holding(DevelopmentCard::Monopoly);
    set_hand(&mut state, Color::Blue, FreqDeck::from_counts([0, 0, 0, 3, 1]));
    set_hand(&mut state, Color::White, FreqDeck::single(Resource::Wheat, 2));

    execute_kind(&mut state, ActionKind::PlayMonopoly(Resource::Wheat));
    assert_eq!(hand(&state, Color::Red), FreqDeck::single(Resource::Wheat, 5));
    assert_eq!(hand(&state, Color::Blue), FreqDeck::single(Resource::Ore, 1));
    assert!(hand(&state, Color::White).is_empty());
    assert_eq!(resource_totals(&state), [19; 5]);
}

#[test]
fn year_of_plenty_draws_from_the_bank() {
    let mut state = holding(DevelopmentCard::YearOfPlenty);
    let pick = ActionKind::PlayYearOfPlenty(Resource::Brick, Some(Resource::Ore));
    assert!(action_kinds(&state).contains(&pick));

    let bank_brick = state.bank.available(Resource::Brick);
    execute_kind(&mut state, pick);
    assert_eq!(hand(&state, Color::Red), FreqDeck::from_counts([0, 1, 0, 0, 1]));
    assert_eq!(state.bank.available(Resource::Brick), bank_brick - 1);
}

#[test]
fn year_of_plenty_is_bounded_by_the_bank() {
    let mut state = holding(DevelopmentCard::YearOfPlenty);
    // Park almost everything with Blue.
    set_hand(&mut state, Color::Blue, FreqDeck::from_counts([19, 19, 19, 19, 18]));

    assert_eq!(
        action_kinds(&state)
            .into_iter()
            .filter(|kind| matches!(kind, ActionKind::PlayYearOfPlenty(..)))
            .collect::<Vec<_>>(),
        vec![ActionKind::PlayYearOfPlenty(Resource::Ore, None)]
    );
}

#[test]
fn road_building_grants_two_free_roads() {
    let mut state = holding(DevelopmentCard::RoadBuilding);
    let roads_before = state.player(Color::Red).unwrap().roads_available;
    execute_kind(&mut state, ActionKind::PlayRoadBuilding);
    assert_eq!(state.free_roads_available, 2);

    for remaining in [1, 0] {
        let kinds = action_kinds(&state);
        assert!(!kinds.is_empty());
        assert!(kinds.iter().all(|kind| matches!(kind, ActionKind::BuildRoad(_))));
        execute_kind(&mut state, kinds[0].clone());
        assert_eq!(state.free_roads_available, remaining);
    }

    assert_eq!(state.player(Color::Red).unwrap().roads_available, roads_before - 2);
    assert!(hand(&state, Color::Red).is_empty());
    assert!(action_kinds(&state).contains(&ActionKind::EndTurn));
}

#[test]
fn only_one_card_per_turn() {
    let mut state = holding(DevelopmentCard::Monopoly);
    state.players[0].add_dev_card(DevelopmentCard::YearOfPlenty);
    state.players[0].owned_at_start[DevelopmentCard::YearOfPlenty.index()] = true;
    state.refresh_playable_actions().unwrap();

    execute_kind(&mut state, ActionKind::PlayMonopoly(Resource::Ore));
    assert!(
        !action_kinds(&state)
            .iter()
            .any(|kind| matches!(kind, ActionKind::PlayYearOfPlenty(..)))
    );
}
