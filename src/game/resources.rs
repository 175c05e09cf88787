use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Resource;

/// Fixed-length resource counter indexed by [`Resource::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FreqDeck {
    counts: [u8; Resource::ALL.len()],
}

impl Default for FreqDeck {
    fn default() -> Self {
        Self::zero()
    }
}

impl FreqDeck {
    pub const fn from_counts(counts: [u8; 5]) -> Self {
        Self { counts }
    }

    pub const fn zero() -> Self {
        Self {
            counts: [0; Resource::ALL.len()],
        }
    }

    pub fn single(resource: Resource, amount: u8) -> Self {
        let mut deck = Self::zero();
        deck.counts[resource.index()] = amount;
        deck
    }

    pub fn from_resources(resources: impl IntoIterator<Item = Resource>) -> Self {
        let mut deck = Self::zero();
        for resource in resources {
            deck.replenish(1, resource);
        }
        deck
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&v| v as u32).sum()
    }

    pub fn count(&self, resource: Resource) -> u8 {
        self.counts[resource.index()]
    }

    /// True when every slot of `other` is covered by this deck.
    pub fn contains(&self, other: &FreqDeck) -> bool {
        self.counts
            .iter()
            .zip(other.counts.iter())
            .all(|(have, need)| have >= need)
    }

    pub fn can_draw(&self, amount: u8, resource: Resource) -> bool {
        self.count(resource) >= amount
    }

    pub fn draw(&mut self, amount: u8, resource: Resource) -> Result<(), ResourceError> {
        let idx = resource.index();
        if self.counts[idx] < amount {
            return Err(ResourceError::InsufficientResource {
                resource,
                available: self.counts[idx],
                requested: amount,
            });
        }
        self.counts[idx] -= amount;
        Ok(())
    }

    pub fn replenish(&mut self, amount: u8, resource: Resource) {
        let idx = resource.index();
        self.counts[idx] = self.counts[idx].saturating_add(amount);
    }

    pub fn add(&mut self, other: &FreqDeck) {
        for (idx, value) in other.counts.iter().enumerate() {
            self.counts[idx] = self.counts[idx].saturating_add(*value);
        }
    }

    /// Removes `other` as a whole or leaves the deck untouched.
    pub fn subtract(&mut self, other: &FreqDeck) -> Result<(), ResourceError> {
        if !self.contains(other) {
            return Err(ResourceError::InsufficientBundle {
                available: *self,
                requested: *other,
            });
        }
        for (idx, value) in other.counts.iter().enumerate() {
            self.counts[idx] -= *value;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&value| value == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, u8)> + '_ {
        Resource::ALL.into_iter().zip(self.counts.iter().copied())
    }

    pub fn counts(&self) -> [u8; Resource::ALL.len()] {
        self.counts
    }

    /// Expands the deck into one entry per card, in resource order.
    pub fn to_listdeck(&self) -> Vec<Resource> {
        self.iter()
            .flat_map(|(resource, amount)| std::iter::repeat(resource).take(amount as usize))
            .collect()
    }
}

impl fmt::Display for FreqDeck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![];
        for (resource, amount) in self.iter() {
            if amount > 0 {
                parts.push(format!("{amount}x{resource}"));
            }
        }
        write!(f, "{}", parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("insufficient {resource}: have {available}, need {requested}")]
    InsufficientResource {
        resource: Resource,
        available: u8,
        requested: u8,
    },
    #[error("insufficient resources: have [{available}], need [{requested}]")]
    InsufficientBundle {
        available: FreqDeck,
        requested: FreqDeck,
    },
}

pub const ROAD_COST: FreqDeck = FreqDeck::from_counts([1, 1, 0, 0, 0]);
pub const SETTLEMENT_COST: FreqDeck = FreqDeck::from_counts([1, 1, 1, 1, 0]);
pub const CITY_COST: FreqDeck = FreqDeck::from_counts([0, 0, 0, 2, 3]);
pub const DEVELOPMENT_CARD_COST: FreqDeck = FreqDeck::from_counts([0, 0, 1, 1, 1]);
