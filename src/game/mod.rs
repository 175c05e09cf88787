pub mod action;
mod apply;
pub mod bank;
pub mod encoding;
pub mod game;
pub mod legal;
pub mod players;
pub mod resources;
pub mod state;
pub mod trackers;

pub use action::{ActionKind, ActionRecord, ActionResult, GameAction, MaritimeOffer, TradeOffer};
pub use bank::Bank;
pub use encoding::{EncodingError, GameSnapshot, action_from_json, action_to_json, decode_action, encode_action};
pub use game::Game;
pub use legal::generate_playable_actions;
pub use players::PlayerState;
pub use resources::{
    CITY_COST, DEVELOPMENT_CARD_COST, FreqDeck, ROAD_COST, ResourceError, SETTLEMENT_COST,
};
pub use state::{GameConfig, GameError, GameState, MAX_TRADE_OFFERS_PER_TURN, PendingTrade};
pub use trackers::Trophy;
