use std::collections::{BTreeSet, HashSet};

use rand::seq::SliceRandom;

use crate::game::action::MaritimeOffer;
use crate::game::resources::{FreqDeck, ResourceError};
use crate::types::{DevelopmentCard, Resource};

pub const RESOURCES_PER_TYPE: u8 = 19;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bank {
    resources: FreqDeck,
    development_deck: Vec<DevelopmentCard>,
}

impl Bank {
    pub fn standard(rng: &mut impl rand::Rng) -> Self {
        let mut deck = build_development_deck();
        deck.shuffle(rng);
        Self {
            resources: FreqDeck::from_counts([RESOURCES_PER_TYPE; 5]),
            development_deck: deck,
        }
    }

    pub fn resources(&self) -> &FreqDeck {
        &self.resources
    }

    pub fn receive(&mut self, deck: &FreqDeck) {
        self.resources.add(deck);
    }

    pub fn dispense(&mut self, deck: &FreqDeck) -> Result<(), ResourceError> {
        self.resources.subtract(deck)
    }

    pub fn available(&self, resource: Resource) -> u8 {
        self.resources.count(resource)
    }

    pub fn draw_development_card(&mut self) -> Option<DevelopmentCard> {
        self.development_deck.pop()
    }

    /// Removes a specific card, used when replaying a recorded purchase.
    pub fn take_development_card(&mut self, card: DevelopmentCard) -> Option<DevelopmentCard> {
        let pos = self.development_deck.iter().rposition(|c| *c == card)?;
        Some(self.development_deck.remove(pos))
    }

    pub fn development_deck_len(&self) -> usize {
        self.development_deck.len()
    }
}

/// Every `(give, receive)` pair the hand can afford at its best rate and the bank can fulfil.
pub fn maritime_offers(
    hand: &FreqDeck,
    bank: &FreqDeck,
    port_resources: &HashSet<Option<Resource>>,
) -> BTreeSet<MaritimeOffer> {
    let generic_rate = if port_resources.contains(&None) { 3 } else { 4 };
    let mut offers = BTreeSet::new();
    for give in Resource::ALL {
        let rate = if port_resources.contains(&Some(give)) {
            2
        } else {
            generic_rate
        };
        if !hand.can_draw(rate, give) {
            continue;
        }
        for receive in Resource::ALL {
            if receive != give && bank.can_draw(1, receive) {
                offers.insert(MaritimeOffer {
                    give,
                    rate,
                    receive,
                });
            }
        }
    }
    offers
}

fn build_development_deck() -> Vec<DevelopmentCard> {
    use DevelopmentCard::*;
    const DISTRIBUTION: &[(DevelopmentCard, usize)] = &[
        (Knight, 14),
        (VictoryPoint, 5),
        (RoadBuilding, 2),
        (YearOfPlenty, 2),
        (Monopoly, 2),
    ];

    let mut deck = Vec::with_capacity(25);
    for (card, count) in DISTRIBUTION {
        for _ in 0..*count {
            deck.push(*card);
        }
    }
    deck
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn standard_bank_holds_nineteen_of_each_and_25_cards() {
        let bank = Bank::standard(&mut StdRng::seed_from_u64(0));
        for resource in Resource::ALL {
            assert_eq!(bank.available(resource), 19);
        }
        assert_eq!(bank.development_deck_len(), 25);
    }

    #[test]
    fn dispense_refuses_overdraw() {
        let mut bank = Bank::standard(&mut StdRng::seed_from_u64(0));
        assert!(bank.dispense(&FreqDeck::single(Resource::Ore, 20)).is_err());
        assert_eq!(bank.available(Resource::Ore), 19);
    }

    #[test]
    fn four_to_one_without_ports() {
        let hand = FreqDeck::from_counts([4, 3, 0, 0, 0]);
        let bank = FreqDeck::from_counts([19; 5]);
        let offers = maritime_offers(&hand, &bank, &HashSet::new());
        assert_eq!(offers.len(), 4);
        assert!(offers.iter().all(|o| o.give == Resource::Wood && o.rate == 4));
    }

    #[test]
    fn resource_port_beats_generic_port() {
        let hand = FreqDeck::from_counts([2, 3, 0, 0, 0]);
        let bank = FreqDeck::from_counts([19, 19, 19, 0, 19]);
        let ports = HashSet::from([None, Some(Resource::Wood)]);
        let offers = maritime_offers(&hand, &bank, &ports);
        let wood: Vec<_> = offers.iter().filter(|o| o.give == Resource::Wood).collect();
        let brick: Vec<_> = offers.iter().filter(|o| o.give == Resource::Brick).collect();
        // Wheat is exhausted in the bank.
        assert_eq!(wood.len(), 3);
        assert!(wood.iter().all(|o| o.rate == 2 && o.receive != Resource::Wheat));
        assert_eq!(brick.len(), 3);
        assert!(brick.iter().all(|o| o.rate == 3));
    }
}
