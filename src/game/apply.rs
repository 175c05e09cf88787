use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{info, trace};

use crate::board::{EdgeId, NodeId};
use crate::coords::CubeCoord;
use crate::types::{ActionPrompt, BuildingKind, Color, DevelopmentCard, Resource};

use super::action::{ActionKind, ActionResult, GameAction, MaritimeOffer, TradeOffer};
use super::resources::{
    CITY_COST, DEVELOPMENT_CARD_COST, FreqDeck, ROAD_COST, ResourceError, SETTLEMENT_COST,
};
use super::state::{GameError, GameState, PendingTrade};

/// Mutates `state` for one already-validated action. Every branch checks what
/// it needs before touching the ledgers, so an error leaves the state as it was.
pub(crate) fn apply_action(
    state: &mut GameState,
    action: &GameAction,
    forced: Option<&ActionResult>,
) -> Result<Option<ActionResult>, GameError> {
    let idx = state.current_player_index;
    let draws_randomness = matches!(
        action.kind,
        ActionKind::Roll
            | ActionKind::Discard
            | ActionKind::MoveRobber { .. }
            | ActionKind::BuyDevelopmentCard
    );
    if forced.is_some() && !draws_randomness {
        return Err(mismatched_result());
    }

    match &action.kind {
        ActionKind::Roll => roll(state, forced).map(Some),
        ActionKind::Discard => discard(state, idx, forced).map(Some),
        ActionKind::MoveRobber { coordinate, victim } => {
            move_robber(state, idx, *coordinate, *victim, forced)
        }
        ActionKind::BuildSettlement(node) => build_settlement(state, idx, *node).map(|_| None),
        ActionKind::BuildRoad(edge) => build_road(state, idx, *edge).map(|_| None),
        ActionKind::BuildCity(node) => build_city(state, idx, *node).map(|_| None),
        ActionKind::BuyDevelopmentCard => buy_development_card(state, idx, forced).map(Some),
        ActionKind::PlayKnightCard => {
            play_card(state, idx, DevelopmentCard::Knight)?;
            state.update_largest_army();
            state.current_prompt = ActionPrompt::MoveRobber;
            Ok(None)
        }
        ActionKind::PlayYearOfPlenty(first, second) => {
            year_of_plenty(state, idx, *first, *second).map(|_| None)
        }
        ActionKind::PlayMonopoly(resource) => monopoly(state, idx, *resource).map(|_| None),
        ActionKind::PlayRoadBuilding => {
            play_card(state, idx, DevelopmentCard::RoadBuilding)?;
            let color = state.colors[idx];
            let free = state.players[idx].roads_available.min(2);
            state.free_roads_available = if state.board.buildable_edges(color).is_empty() {
                0
            } else {
                free
            };
            Ok(None)
        }
        ActionKind::MaritimeTrade(offer) => maritime_trade(state, idx, offer).map(|_| None),
        ActionKind::OfferTrade(offer) => {
            offer_trade(state, idx, *offer);
            Ok(None)
        }
        ActionKind::AcceptTrade(_) => {
            state.acceptees[idx] = true;
            advance_trade(state)?;
            Ok(None)
        }
        ActionKind::RejectTrade(_) => {
            advance_trade(state)?;
            Ok(None)
        }
        ActionKind::ConfirmTrade { offer, partner } => {
            confirm_trade(state, offer, *partner).map(|_| None)
        }
        ActionKind::CancelTrade => {
            let trade = pending_trade(state)?;
            let proposer = &mut state.players[trade.proposer];
            proposer.trades_offered_this_turn = proposer.trades_offered_this_turn.saturating_sub(1);
            close_trade(state);
            Ok(None)
        }
        ActionKind::EndTurn => {
            end_turn(state);
            Ok(None)
        }
    }
}

fn mismatched_result() -> GameError {
    GameError::InvalidPayload("recorded result does not fit the action")
}

fn roll(state: &mut GameState, forced: Option<&ActionResult>) -> Result<ActionResult, GameError> {
    let (first, second) = match forced {
        Some(ActionResult::Dice(a, b)) if (1..=6).contains(a) && (1..=6).contains(b) => (*a, *b),
        Some(_) => return Err(mismatched_result()),
        None => (state.rng.gen_range(1..=6), state.rng.gen_range(1..=6)),
    };
    let owner = state.current_turn_index;
    state.players[owner].has_rolled = true;
    state.last_roll = Some((first, second));

    let total = first + second;
    if total == 7 {
        begin_discard_phase(state);
    } else {
        distribute_resources(state, total)?;
    }
    Ok(ActionResult::Dice(first, second))
}

fn begin_discard_phase(state: &mut GameState) {
    let owner = state.current_turn_index;
    let seats = state.colors.len();
    let limit = state.config.discard_limit;
    state.discard_queue = (0..seats)
        .map(|offset| (owner + offset) % seats)
        .filter(|idx| state.players[*idx].num_resource_cards() > limit)
        .collect();
    advance_discard(state);
}

fn advance_discard(state: &mut GameState) {
    match state.discard_queue.pop_front() {
        Some(next) => {
            state.current_prompt = ActionPrompt::Discard;
            state.current_player_index = next;
        }
        None => {
            state.current_prompt = ActionPrompt::MoveRobber;
            state.current_player_index = state.current_turn_index;
        }
    }
}

/// Pays every building on tiles matching `number`. A resource the bank cannot
/// fully cover is paid to nobody.
pub(crate) fn distribute_resources(state: &mut GameState, number: u8) -> Result<(), GameError> {
    let robber = state.board.robber_coordinate();
    let mut grants: Vec<(usize, Resource, u8)> = Vec::new();
    for (coordinate, tile) in &state.board.map.land_tiles {
        if tile.number != Some(number) || *coordinate == robber {
            continue;
        }
        let Some(resource) = tile.resource else {
            continue;
        };
        for node in tile.nodes.values() {
            let Some(building) = state.board.building_at(*node) else {
                continue;
            };
            let amount = match building.kind {
                BuildingKind::Settlement => 1,
                BuildingKind::City => 2,
            };
            if let Some(idx) = state.color_index(building.color) {
                grants.push((idx, resource, amount));
            }
        }
    }

    let mut demand = FreqDeck::zero();
    for (_, resource, amount) in &grants {
        demand.replenish(*amount, *resource);
    }
    for (idx, resource, amount) in grants {
        if !state.bank.resources().can_draw(demand.count(resource), resource) {
            trace!(%resource, demand = demand.count(resource), "bank short, resource withheld");
            continue;
        }
        let deck = FreqDeck::single(resource, amount);
        state.bank.dispense(&deck)?;
        state.players[idx].add_resources(&deck);
        trace!(color = %state.colors[idx], %resource, amount, "produced");
    }
    Ok(())
}

fn discard(
    state: &mut GameState,
    idx: usize,
    forced: Option<&ActionResult>,
) -> Result<ActionResult, GameError> {
    let hand = state.players[idx].resources;
    let required = (hand.total() / 2) as usize;
    let bundle = match forced {
        Some(ActionResult::Discarded(deck))
            if deck.total() as usize == required && hand.contains(deck) =>
        {
            *deck
        }
        Some(_) => return Err(mismatched_result()),
        None => {
            let mut cards = hand.to_listdeck();
            cards.shuffle(&mut state.rng);
            FreqDeck::from_resources(cards.into_iter().take(required))
        }
    };
    state.players[idx].remove_resources(&bundle)?;
    state.bank.receive(&bundle);
    advance_discard(state);
    Ok(ActionResult::Discarded(bundle))
}

fn move_robber(
    state: &mut GameState,
    thief: usize,
    coordinate: CubeCoord,
    victim: Option<Color>,
    forced: Option<&ActionResult>,
) -> Result<Option<ActionResult>, GameError> {
    if !state.board.map.land_tiles.contains_key(&coordinate)
        || coordinate == state.board.robber_coordinate()
    {
        return Err(GameError::InvalidPayload(
            "robber must move to a different land tile",
        ));
    }

    let theft = match victim {
        None if forced.is_some() => return Err(mismatched_result()),
        None => None,
        Some(victim) => {
            let victim_idx = state
                .color_index(victim)
                .ok_or(GameError::InvalidPayload("victim is not seated"))?;
            let hand = state.players[victim_idx].resources;
            let stolen = match forced {
                Some(ActionResult::Stole(Some(resource))) if hand.can_draw(1, *resource) => {
                    Some(*resource)
                }
                Some(ActionResult::Stole(None)) if hand.is_empty() => None,
                Some(_) => return Err(mismatched_result()),
                None => hand.to_listdeck().choose(&mut state.rng).copied(),
            };
            Some((victim_idx, stolen))
        }
    };

    if let Some((victim_idx, Some(resource))) = theft {
        let card = FreqDeck::single(resource, 1);
        state.players[victim_idx].remove_resources(&card)?;
        state.players[thief].add_resources(&card);
    }
    state.board.move_robber(coordinate);
    state.resume_turn();
    Ok(theft.map(|(_, stolen)| ActionResult::Stole(stolen)))
}

fn pay(state: &mut GameState, idx: usize, cost: &FreqDeck) -> Result<(), GameError> {
    state.players[idx].remove_resources(cost)?;
    state.bank.receive(cost);
    Ok(())
}

fn build_settlement(state: &mut GameState, idx: usize, node: NodeId) -> Result<(), GameError> {
    let color = state.colors[idx];
    let remaining = state.players[idx]
        .settlements_available
        .checked_sub(1)
        .ok_or(GameError::InvalidPayload("no settlements left"))?;

    if state.is_initial_build_phase {
        let starting = if state.setup.is_second_round() {
            starting_resources(state, node)
        } else {
            FreqDeck::zero()
        };
        state.bank.dispense(&starting)?;
        state.players[idx].add_resources(&starting);
        state.board.place_settlement(color, node);
        state.players[idx].settlements_available = remaining;
        state.pending_settlement = Some(node);
        advance_setup(state);
    } else {
        pay(state, idx, &SETTLEMENT_COST)?;
        state.board.place_settlement(color, node);
        state.players[idx].settlements_available = remaining;
    }
    state.update_longest_road();
    Ok(())
}

/// One card per resource tile around the node.
fn starting_resources(state: &GameState, node: NodeId) -> FreqDeck {
    let map = &state.board.map;
    let resources = map
        .adjacent_tiles
        .get(&node)
        .into_iter()
        .flatten()
        .filter_map(|coordinate| map.land_tiles.get(coordinate))
        .filter_map(|tile| tile.resource);
    FreqDeck::from_resources(resources)
}

fn advance_setup(state: &mut GameState) {
    state.setup.advance();
    match (state.setup.current_prompt(), state.setup.current_player()) {
        (Some(prompt), Some(player)) => {
            state.current_prompt = prompt;
            state.current_player_index = player;
            state.current_turn_index = player;
        }
        _ => {
            state.is_initial_build_phase = false;
            state.pending_settlement = None;
            state.current_turn_index = 0;
            state.players[0].start_turn();
            state.resume_turn();
            info!("initial placement finished");
        }
    }
}

fn build_road(state: &mut GameState, idx: usize, edge: EdgeId) -> Result<(), GameError> {
    let color = state.colors[idx];
    let remaining = state.players[idx]
        .roads_available
        .checked_sub(1)
        .ok_or(GameError::InvalidPayload("no roads left"))?;

    if state.is_initial_build_phase {
        state.board.place_road(color, edge);
        state.players[idx].roads_available = remaining;
        advance_setup(state);
    } else if state.free_roads_available > 0 {
        state.board.place_road(color, edge);
        state.players[idx].roads_available = remaining;
        state.free_roads_available -= 1;
        if remaining == 0 || state.board.buildable_edges(color).is_empty() {
            state.free_roads_available = 0;
        }
    } else {
        pay(state, idx, &ROAD_COST)?;
        state.board.place_road(color, edge);
        state.players[idx].roads_available = remaining;
    }
    state.update_longest_road();
    Ok(())
}

fn build_city(state: &mut GameState, idx: usize, node: NodeId) -> Result<(), GameError> {
    let color = state.colors[idx];
    let owns_settlement = state
        .board
        .building_at(node)
        .is_some_and(|b| b.color == color && b.kind == BuildingKind::Settlement);
    if !owns_settlement {
        return Err(GameError::InvalidPayload("cities replace an own settlement"));
    }
    let remaining = state.players[idx]
        .cities_available
        .checked_sub(1)
        .ok_or(GameError::InvalidPayload("no cities left"))?;

    pay(state, idx, &CITY_COST)?;
    state.board.upgrade_to_city(color, node);
    let player = &mut state.players[idx];
    player.cities_available = remaining;
    player.settlements_available += 1;
    Ok(())
}

fn buy_development_card(
    state: &mut GameState,
    idx: usize,
    forced: Option<&ActionResult>,
) -> Result<ActionResult, GameError> {
    let hand = state.players[idx].resources;
    if !hand.contains(&DEVELOPMENT_CARD_COST) {
        return Err(ResourceError::InsufficientBundle {
            available: hand,
            requested: DEVELOPMENT_CARD_COST,
        }
        .into());
    }
    let card = match forced {
        Some(ActionResult::Drew(card)) => state
            .bank
            .take_development_card(*card)
            .ok_or_else(mismatched_result)?,
        Some(_) => return Err(mismatched_result()),
        None => state
            .bank
            .draw_development_card()
            .ok_or(GameError::InvalidPayload("development deck is empty"))?,
    };
    pay(state, idx, &DEVELOPMENT_CARD_COST)?;
    state.players[idx].add_dev_card(card);
    Ok(ActionResult::Drew(card))
}

fn play_card(state: &mut GameState, idx: usize, card: DevelopmentCard) -> Result<(), GameError> {
    let player = &mut state.players[idx];
    if !player.can_play_dev_card(card) || !player.consume_dev_card(card) {
        return Err(GameError::InvalidPayload("card cannot be played this turn"));
    }
    Ok(())
}

fn year_of_plenty(
    state: &mut GameState,
    idx: usize,
    first: Resource,
    second: Option<Resource>,
) -> Result<(), GameError> {
    let deck = FreqDeck::from_resources(std::iter::once(first).chain(second));
    if !state.bank.resources().contains(&deck) {
        return Err(ResourceError::InsufficientBundle {
            available: *state.bank.resources(),
            requested: deck,
        }
        .into());
    }
    play_card(state, idx, DevelopmentCard::YearOfPlenty)?;
    state.bank.dispense(&deck)?;
    state.players[idx].add_resources(&deck);
    Ok(())
}

fn monopoly(state: &mut GameState, idx: usize, resource: Resource) -> Result<(), GameError> {
    play_card(state, idx, DevelopmentCard::Monopoly)?;
    let mut collected = FreqDeck::zero();
    for (other, player) in state.players.iter_mut().enumerate() {
        if other == idx {
            continue;
        }
        let taken = FreqDeck::single(resource, player.resources.count(resource));
        player.remove_resources(&taken)?;
        collected.add(&taken);
    }
    state.players[idx].add_resources(&collected);
    Ok(())
}

fn maritime_trade(
    state: &mut GameState,
    idx: usize,
    offer: &MaritimeOffer,
) -> Result<(), GameError> {
    let give = offer.give_deck();
    let receive = FreqDeck::single(offer.receive, 1);
    let hand = state.players[idx].resources;
    if !hand.contains(&give) {
        return Err(ResourceError::InsufficientBundle {
            available: hand,
            requested: give,
        }
        .into());
    }
    if !state.bank.resources().contains(&receive) {
        return Err(ResourceError::InsufficientResource {
            resource: offer.receive,
            available: 0,
            requested: 1,
        }
        .into());
    }
    state.players[idx].remove_resources(&give)?;
    state.bank.receive(&give);
    state.bank.dispense(&receive)?;
    state.players[idx].add_resources(&receive);
    Ok(())
}

fn offer_trade(state: &mut GameState, idx: usize, offer: TradeOffer) {
    let seats = state.colors.len();
    state.players[idx].trades_offered_this_turn += 1;
    state.current_trade = Some(PendingTrade {
        offer,
        proposer: idx,
    });
    state.acceptees = vec![false; seats];
    state.trade_responders = (1..seats).map(|offset| (idx + offset) % seats).collect();
    // Responders always exist with two or more seats.
    if let Some(next) = state.trade_responders.pop_front() {
        state.current_prompt = ActionPrompt::DecideTrade;
        state.current_player_index = next;
    }
}

fn pending_trade(state: &GameState) -> Result<PendingTrade, GameError> {
    state
        .current_trade
        .ok_or(GameError::InvalidPayload("no trade is pending"))
}

fn advance_trade(state: &mut GameState) -> Result<(), GameError> {
    let trade = pending_trade(state)?;
    match state.trade_responders.pop_front() {
        Some(next) => {
            state.current_player_index = next;
        }
        None => {
            state.current_prompt = ActionPrompt::DecideAcceptees;
            state.current_player_index = trade.proposer;
        }
    }
    Ok(())
}

fn confirm_trade(
    state: &mut GameState,
    offer: &TradeOffer,
    partner: Color,
) -> Result<(), GameError> {
    let trade = pending_trade(state)?;
    let partner_idx = state
        .color_index(partner)
        .filter(|idx| state.acceptees[*idx])
        .ok_or(GameError::InvalidPayload("partner did not accept"))?;
    let proposer = trade.proposer;

    for (idx, deck) in [(proposer, &offer.give), (partner_idx, &offer.ask)] {
        let hand = state.players[idx].resources;
        if !hand.contains(deck) {
            return Err(ResourceError::InsufficientBundle {
                available: hand,
                requested: *deck,
            }
            .into());
        }
    }
    state.players[proposer].remove_resources(&offer.give)?;
    state.players[partner_idx].remove_resources(&offer.ask)?;
    state.players[proposer].add_resources(&offer.ask);
    state.players[partner_idx].add_resources(&offer.give);
    close_trade(state);
    Ok(())
}

fn close_trade(state: &mut GameState) {
    state.current_trade = None;
    state.acceptees.iter_mut().for_each(|accepted| *accepted = false);
    state.trade_responders.clear();
    state.resume_turn();
}

fn end_turn(state: &mut GameState) {
    let seats = state.colors.len();
    state.free_roads_available = 0;
    state.current_turn_index = (state.current_turn_index + 1) % seats;
    state.players[state.current_turn_index].start_turn();
    state.num_turns += 1;
    state.resume_turn();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::GameConfig;
    use crate::types::NodeRef;

    fn fresh() -> GameState {
        GameState::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn production_is_withheld_when_bank_runs_short() {
        let mut state = fresh();
        let (number, resource, north, south) = state
            .board
            .map
            .land_tiles
            .values()
            .find_map(|tile| {
                Some((
                    tile.number?,
                    tile.resource?,
                    tile.nodes[&NodeRef::North],
                    tile.nodes[&NodeRef::South],
                ))
            })
            .unwrap();
        state.board.place_settlement(Color::Red, north);
        state.board.place_settlement(Color::Blue, south);
        state.bank.dispense(&FreqDeck::single(resource, 18)).unwrap();

        distribute_resources(&mut state, number).unwrap();
        assert_eq!(state.players[0].resources.count(resource), 0);
        assert_eq!(state.players[1].resources.count(resource), 0);
        assert_eq!(state.bank.available(resource), 1);
    }

    #[test]
    fn production_pays_cities_double() {
        let mut state = fresh();
        let (number, resource, node) = state
            .board
            .map
            .land_tiles
            .iter()
            .filter(|(coordinate, _)| **coordinate != state.board.robber_coordinate())
            .find_map(|(_, tile)| Some((tile.number?, tile.resource?, tile.nodes[&NodeRef::North])))
            .unwrap();
        state.board.place_settlement(Color::Orange, node);
        state.board.upgrade_to_city(Color::Orange, node);
        distribute_resources(&mut state, number).unwrap();
        assert!(state.players[2].resources.count(resource) >= 2);
    }

    #[test]
    fn five_road_chain_takes_the_trophy() {
        let mut state = fresh();
        let mut path = vec![0];
        while path.len() <= 5 {
            let last = *path.last().unwrap();
            let next = state
                .board
                .map
                .neighbors(last)
                .find(|n| state.board.map.land_nodes.contains(n) && !path.contains(n))
                .unwrap();
            path.push(next);
        }
        for pair in path.windows(2) {
            state.board.place_road(Color::Red, (pair[0], pair[1]));
            state.update_longest_road();
        }
        assert_eq!(state.board.longest_road_length(Color::Red), 5);
        assert!(state.longest_road.is_held_by(Color::Red));
        assert_eq!(state.visible_victory_points(Color::Red), 2);
    }

    #[test]
    fn forced_result_on_deterministic_action_is_rejected() {
        let mut state = fresh();
        let action = state.playable_actions()[0].clone();
        let err = apply_action(&mut state, &action, Some(&ActionResult::Dice(1, 1))).unwrap_err();
        assert!(matches!(err, GameError::InvalidPayload(_)));
        assert!(state.board.buildings().is_empty());
    }
}
