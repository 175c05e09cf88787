use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{EdgeId, NodeId};
use crate::coords::CubeCoord;
use crate::game::resources::FreqDeck;
use crate::types::{ActionType, Color, DevelopmentCard, Resource};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GameAction {
    pub color: Color,
    pub kind: ActionKind,
}

impl GameAction {
    pub fn new(color: Color, kind: ActionKind) -> Self {
        Self { color, kind }
    }

    pub fn action_type(&self) -> ActionType {
        self.kind.action_type()
    }
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.color, self.action_type())?;
        match &self.kind {
            ActionKind::MoveRobber { coordinate, victim } => match victim {
                Some(victim) => write!(f, " {coordinate} stealing from {victim}"),
                None => write!(f, " {coordinate}"),
            },
            ActionKind::BuildRoad((a, b)) => write!(f, " {a}-{b}"),
            ActionKind::BuildSettlement(node) | ActionKind::BuildCity(node) => {
                write!(f, " {node}")
            }
            ActionKind::PlayYearOfPlenty(first, second) => match second {
                Some(second) => write!(f, " {first}+{second}"),
                None => write!(f, " {first}"),
            },
            ActionKind::PlayMonopoly(resource) => write!(f, " {resource}"),
            ActionKind::MaritimeTrade(offer) => {
                write!(f, " {}x{} for {}", offer.rate, offer.give, offer.receive)
            }
            ActionKind::OfferTrade(offer)
            | ActionKind::AcceptTrade(offer)
            | ActionKind::RejectTrade(offer) => write!(f, " {offer}"),
            ActionKind::ConfirmTrade { offer, partner } => write!(f, " {offer} with {partner}"),
            _ => Ok(()),
        }
    }
}

/// One variant per action type, each carrying its own payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Roll,
    MoveRobber {
        coordinate: CubeCoord,
        victim: Option<Color>,
    },
    Discard,
    BuildRoad(EdgeId),
    BuildSettlement(NodeId),
    BuildCity(NodeId),
    BuyDevelopmentCard,
    PlayKnightCard,
    PlayYearOfPlenty(Resource, Option<Resource>),
    PlayMonopoly(Resource),
    PlayRoadBuilding,
    MaritimeTrade(MaritimeOffer),
    OfferTrade(TradeOffer),
    AcceptTrade(TradeOffer),
    RejectTrade(TradeOffer),
    ConfirmTrade {
        offer: TradeOffer,
        partner: Color,
    },
    CancelTrade,
    EndTurn,
}

impl ActionKind {
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionKind::Roll => ActionType::Roll,
            ActionKind::MoveRobber { .. } => ActionType::MoveRobber,
            ActionKind::Discard => ActionType::Discard,
            ActionKind::BuildRoad(_) => ActionType::BuildRoad,
            ActionKind::BuildSettlement(_) => ActionType::BuildSettlement,
            ActionKind::BuildCity(_) => ActionType::BuildCity,
            ActionKind::BuyDevelopmentCard => ActionType::BuyDevelopmentCard,
            ActionKind::PlayKnightCard => ActionType::PlayKnightCard,
            ActionKind::PlayYearOfPlenty(..) => ActionType::PlayYearOfPlenty,
            ActionKind::PlayMonopoly(_) => ActionType::PlayMonopoly,
            ActionKind::PlayRoadBuilding => ActionType::PlayRoadBuilding,
            ActionKind::MaritimeTrade(_) => ActionType::MaritimeTrade,
            ActionKind::OfferTrade(_) => ActionType::OfferTrade,
            ActionKind::AcceptTrade(_) => ActionType::AcceptTrade,
            ActionKind::RejectTrade(_) => ActionType::RejectTrade,
            ActionKind::ConfirmTrade { .. } => ActionType::ConfirmTrade,
            ActionKind::CancelTrade => ActionType::CancelTrade,
            ActionKind::EndTurn => ActionType::EndTurn,
        }
    }
}

/// Domestic trade terms from the proposer's side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TradeOffer {
    pub give: FreqDeck,
    pub ask: FreqDeck,
}

impl TradeOffer {
    pub fn new(give: FreqDeck, ask: FreqDeck) -> Self {
        Self { give, ask }
    }

    /// Give counts followed by ask counts.
    pub fn to_counts(&self) -> [u8; 10] {
        let mut counts = [0; 10];
        counts[..5].copy_from_slice(&self.give.counts());
        counts[5..].copy_from_slice(&self.ask.counts());
        counts
    }

    pub fn from_counts(counts: [u8; 10]) -> Self {
        let mut give = [0; 5];
        let mut ask = [0; 5];
        give.copy_from_slice(&counts[..5]);
        ask.copy_from_slice(&counts[5..]);
        Self::new(FreqDeck::from_counts(give), FreqDeck::from_counts(ask))
    }
}

impl fmt::Display for TradeOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] for [{}]", self.give, self.ask)
    }
}

/// Bank trade of `rate` units of `give` for one unit of `receive`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaritimeOffer {
    pub give: Resource,
    pub rate: u8,
    pub receive: Resource,
}

impl MaritimeOffer {
    /// Four give slots padded with `None`, then the received resource.
    pub fn slots(&self) -> [Option<Resource>; 5] {
        let mut slots = [None; 5];
        for slot in slots.iter_mut().take(self.rate as usize) {
            *slot = Some(self.give);
        }
        slots[4] = Some(self.receive);
        slots
    }

    pub fn give_deck(&self) -> FreqDeck {
        FreqDeck::single(self.give, self.rate)
    }
}

/// Random outcome of an action, kept so a log can be replayed exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActionResult {
    Dice(u8, u8),
    Stole(Option<Resource>),
    Drew(DevelopmentCard),
    Discarded(FreqDeck),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionRecord {
    pub action: GameAction,
    pub result: Option<ActionResult>,
}
