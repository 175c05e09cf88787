use std::collections::BTreeSet;

use itertools::Itertools;
use smallvec::SmallVec;

use crate::types::{ActionPrompt, BuildingKind, Color, DevelopmentCard, Resource};

use super::action::{ActionKind, GameAction, TradeOffer};
use super::bank::maritime_offers;
use super::players::PlayerState;
use super::resources::{
    CITY_COST, DEVELOPMENT_CARD_COST, FreqDeck, ROAD_COST, SETTLEMENT_COST,
};
use super::state::{GameError, GameState, MAX_TRADE_OFFERS_PER_TURN};

/// Every action the current color may take, in a stable order.
pub fn generate_playable_actions(state: &GameState) -> Result<Vec<GameAction>, GameError> {
    if state.winner.is_some() {
        return Ok(Vec::new());
    }
    let color = state.current_color();
    let prompt = state.current_prompt;
    let unknown = |reason| GameError::UnknownPrompt { prompt, reason };

    match prompt {
        ActionPrompt::BuildInitialSettlement => {
            if !state.is_initial_build_phase {
                return Err(unknown("initial placement is over"));
            }
            Ok(state
                .board
                .buildable_node_ids(color, true)
                .into_iter()
                .map(|node| GameAction::new(color, ActionKind::BuildSettlement(node)))
                .collect())
        }
        ActionPrompt::BuildInitialRoad => {
            let node = state
                .pending_settlement
                .ok_or_else(|| unknown("no settlement awaits its road"))?;
            Ok(state
                .board
                .buildable_edges_from(color, node)
                .into_iter()
                .map(|edge| GameAction::new(color, ActionKind::BuildRoad(edge)))
                .collect())
        }
        ActionPrompt::PlayTurn => {
            if state.is_initial_build_phase {
                return Err(unknown("main turn during initial placement"));
            }
            Ok(play_turn_actions(state, color))
        }
        ActionPrompt::MoveRobber => Ok(robber_actions(state, color)),
        ActionPrompt::Discard => Ok(vec![GameAction::new(color, ActionKind::Discard)]),
        ActionPrompt::DecideTrade => {
            let trade = state
                .current_trade
                .ok_or_else(|| unknown("no trade is pending"))?;
            let mut actions = vec![GameAction::new(color, ActionKind::RejectTrade(trade.offer))];
            if state.players[state.current_player_index]
                .resources
                .contains(&trade.offer.ask)
            {
                actions.push(GameAction::new(color, ActionKind::AcceptTrade(trade.offer)));
            }
            Ok(actions)
        }
        ActionPrompt::DecideAcceptees => {
            let trade = state
                .current_trade
                .ok_or_else(|| unknown("no trade is pending"))?;
            let mut actions = vec![GameAction::new(color, ActionKind::CancelTrade)];
            actions.extend(
                state
                    .colors
                    .iter()
                    .zip(&state.acceptees)
                    .filter(|(_, accepted)| **accepted)
                    .map(|(partner, _)| {
                        GameAction::new(
                            color,
                            ActionKind::ConfirmTrade {
                                offer: trade.offer,
                                partner: *partner,
                            },
                        )
                    }),
            );
            Ok(actions)
        }
    }
}

fn play_turn_actions(state: &GameState, color: Color) -> Vec<GameAction> {
    let player = &state.players[state.current_player_index];
    if state.free_roads_available > 0 {
        return state
            .board
            .buildable_edges(color)
            .into_iter()
            .map(|edge| GameAction::new(color, ActionKind::BuildRoad(edge)))
            .collect();
    }
    if !player.has_rolled {
        return vec![GameAction::new(color, ActionKind::Roll)];
    }

    let hand = &player.resources;
    let mut actions = Vec::new();
    if player.cities_available > 0 && hand.contains(&CITY_COST) {
        actions.extend(
            state
                .board
                .buildings_of(color, BuildingKind::Settlement)
                .map(|node| GameAction::new(color, ActionKind::BuildCity(node))),
        );
    }
    if player.settlements_available > 0 && hand.contains(&SETTLEMENT_COST) {
        actions.extend(
            state
                .board
                .buildable_node_ids(color, false)
                .into_iter()
                .map(|node| GameAction::new(color, ActionKind::BuildSettlement(node))),
        );
    }
    if player.roads_available > 0 && hand.contains(&ROAD_COST) {
        actions.extend(
            state
                .board
                .buildable_edges(color)
                .into_iter()
                .map(|edge| GameAction::new(color, ActionKind::BuildRoad(edge))),
        );
    }
    if hand.contains(&DEVELOPMENT_CARD_COST) && state.bank.development_deck_len() > 0 {
        actions.push(GameAction::new(color, ActionKind::BuyDevelopmentCard));
    }
    actions.extend(development_card_actions(state, player));

    let ports = state.board.get_player_port_resources(color);
    actions.extend(
        maritime_offers(hand, state.bank.resources(), &ports)
            .into_iter()
            .map(|offer| GameAction::new(color, ActionKind::MaritimeTrade(offer))),
    );
    if player.trades_offered_this_turn < MAX_TRADE_OFFERS_PER_TURN && !hand.is_empty() {
        actions.extend(
            domestic_offers(hand)
                .into_iter()
                .map(|offer| GameAction::new(color, ActionKind::OfferTrade(offer))),
        );
    }

    actions.push(GameAction::new(color, ActionKind::EndTurn));
    actions
}

fn development_card_actions(state: &GameState, player: &PlayerState) -> Vec<GameAction> {
    let color = player.color;
    let mut actions = Vec::new();
    if player.can_play_dev_card(DevelopmentCard::Knight) {
        actions.push(GameAction::new(color, ActionKind::PlayKnightCard));
    }
    if player.can_play_dev_card(DevelopmentCard::YearOfPlenty) {
        actions.extend(
            year_of_plenty_choices(state.bank.resources())
                .into_iter()
                .map(|(first, second)| {
                    GameAction::new(color, ActionKind::PlayYearOfPlenty(first, second))
                }),
        );
    }
    if player.can_play_dev_card(DevelopmentCard::Monopoly) {
        actions.extend(
            Resource::ALL
                .into_iter()
                .map(|resource| GameAction::new(color, ActionKind::PlayMonopoly(resource))),
        );
    }
    if player.can_play_dev_card(DevelopmentCard::RoadBuilding) && player.roads_available > 0 {
        actions.push(GameAction::new(color, ActionKind::PlayRoadBuilding));
    }
    actions
}

/// Unordered pairs the bank can pay out. When a pair cannot be covered, each
/// resource the bank still holds is offered on its own.
fn year_of_plenty_choices(bank: &FreqDeck) -> BTreeSet<(Resource, Option<Resource>)> {
    let mut choices = BTreeSet::new();
    for (first, second) in Resource::ALL
        .into_iter()
        .cartesian_product(Resource::ALL)
        .filter(|(first, second)| first <= second)
    {
        let pair = FreqDeck::from_resources([first, second]);
        if bank.contains(&pair) {
            choices.insert((first, Some(second)));
        } else {
            for single in [first, second] {
                if bank.can_draw(1, single) {
                    choices.insert((single, None));
                }
            }
        }
    }
    choices
}

/// Swaps of a held resource for any other: every one-for-one offer, then
/// every two-for-one offer.
fn domestic_offers(hand: &FreqDeck) -> Vec<TradeOffer> {
    (1..=2)
        .cartesian_product(Resource::ALL.into_iter().cartesian_product(Resource::ALL))
        .filter(|(amount, (give, ask))| give != ask && hand.can_draw(*amount, *give))
        .map(|(amount, (give, ask))| {
            TradeOffer::new(FreqDeck::single(give, amount), FreqDeck::single(ask, 1))
        })
        .collect()
}

fn robber_actions(state: &GameState, color: Color) -> Vec<GameAction> {
    let robber = state.board.robber_coordinate();
    let mut actions = Vec::new();
    for coordinate in state.board.map.land_tiles.keys().copied() {
        if coordinate == robber {
            continue;
        }
        let victims: SmallVec<[Color; 3]> = state
            .board
            .colors_around(coordinate)
            .into_iter()
            .filter(|victim| *victim != color)
            .filter(|victim| {
                state
                    .player(*victim)
                    .is_some_and(|p| p.num_resource_cards() > 0)
            })
            .collect();
        if victims.is_empty() {
            actions.push(GameAction::new(
                color,
                ActionKind::MoveRobber {
                    coordinate,
                    victim: None,
                },
            ));
        } else {
            actions.extend(victims.into_iter().map(|victim| {
                GameAction::new(
                    color,
                    ActionKind::MoveRobber {
                        coordinate,
                        victim: Some(victim),
                    },
                )
            }));
        }
    }
    actions
}
