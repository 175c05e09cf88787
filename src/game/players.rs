use serde::{Deserialize, Serialize};

use crate::game::resources::{FreqDeck, ResourceError};
use crate::types::{Color, DevelopmentCard};

pub const MAX_ROADS: u8 = 15;
pub const MAX_SETTLEMENTS: u8 = 5;
pub const MAX_CITIES: u8 = 4;

/// Per-color counts indexed by [`DevelopmentCard::index`].
pub type DevCounts = [u8; DevelopmentCard::ALL.len()];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub color: Color,
    pub resources: FreqDeck,
    pub dev_cards: DevCounts,
    pub played_dev_cards: DevCounts,
    /// Cards held when the current turn started; only these may be played.
    pub owned_at_start: [bool; DevelopmentCard::ALL.len()],
    pub roads_available: u8,
    pub settlements_available: u8,
    pub cities_available: u8,
    pub has_rolled: bool,
    pub has_played_dev_card_this_turn: bool,
    pub trades_offered_this_turn: u8,
}

impl PlayerState {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            resources: FreqDeck::zero(),
            dev_cards: [0; DevelopmentCard::ALL.len()],
            played_dev_cards: [0; DevelopmentCard::ALL.len()],
            owned_at_start: [false; DevelopmentCard::ALL.len()],
            roads_available: MAX_ROADS,
            settlements_available: MAX_SETTLEMENTS,
            cities_available: MAX_CITIES,
            has_rolled: false,
            has_played_dev_card_this_turn: false,
            trades_offered_this_turn: 0,
        }
    }

    /// Resets the per-turn flags when this color's turn starts.
    pub fn start_turn(&mut self) {
        self.has_rolled = false;
        self.has_played_dev_card_this_turn = false;
        self.trades_offered_this_turn = 0;
        for card in DevelopmentCard::ALL {
            self.owned_at_start[card.index()] = self.dev_cards[card.index()] > 0;
        }
    }

    pub fn add_resources(&mut self, deck: &FreqDeck) {
        self.resources.add(deck);
    }

    pub fn remove_resources(&mut self, deck: &FreqDeck) -> Result<(), ResourceError> {
        self.resources.subtract(deck)
    }

    pub fn num_resource_cards(&self) -> u32 {
        self.resources.total()
    }

    pub fn dev_card_count(&self, card: DevelopmentCard) -> u8 {
        self.dev_cards[card.index()]
    }

    pub fn played_count(&self, card: DevelopmentCard) -> u8 {
        self.played_dev_cards[card.index()]
    }

    pub fn knights_played(&self) -> u8 {
        self.played_count(DevelopmentCard::Knight)
    }

    pub fn add_dev_card(&mut self, card: DevelopmentCard) {
        self.dev_cards[card.index()] += 1;
    }

    pub fn can_play_dev_card(&self, card: DevelopmentCard) -> bool {
        card != DevelopmentCard::VictoryPoint
            && !self.has_played_dev_card_this_turn
            && self.owned_at_start[card.index()]
            && self.dev_cards[card.index()] > 0
    }

    /// Moves one card from the hand to the played pile. Returns false if none is held.
    pub fn consume_dev_card(&mut self, card: DevelopmentCard) -> bool {
        let idx = card.index();
        if self.dev_cards[idx] == 0 {
            return false;
        }
        self.dev_cards[idx] -= 1;
        self.played_dev_cards[idx] += 1;
        self.has_played_dev_card_this_turn = true;
        true
    }

    pub fn victory_point_cards(&self) -> u8 {
        self.dev_card_count(DevelopmentCard::VictoryPoint)
    }
}
