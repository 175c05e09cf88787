//! JSON forms of actions and game snapshots.
//!
//! Actions travel as a `[color, action_type, value]` triple whose value shape
//! depends on the action type. Resources are written by name; decoding also
//! accepts their freqdeck index.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Value, json};

use crate::board::{NodeId, Tile, normalize_edge};
use crate::coords::{CubeCoord, Direction};
use crate::types::{ActionPrompt, ActionType, BuildingKind, Color, Resource};

use super::action::{ActionKind, GameAction, MaritimeOffer, TradeOffer};
use super::state::GameState;

#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("malformed {action_type} value: {reason}")]
    MalformedValue {
        action_type: ActionType,
        reason: &'static str,
    },
    #[error("action must be a [color, action_type, value] triple")]
    MalformedTriple,
    #[error("unknown {kind} `{value}`")]
    UnknownName { kind: &'static str, value: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub fn encode_action(action: &GameAction) -> Value {
    json!([
        action.color.to_string(),
        action.action_type().to_string(),
        encode_value(&action.kind)
    ])
}

pub fn action_to_json(action: &GameAction) -> Result<String, EncodingError> {
    Ok(serde_json::to_string(&encode_action(action))?)
}

pub fn action_from_json(raw: &str) -> Result<GameAction, EncodingError> {
    let value: Value = serde_json::from_str(raw)?;
    decode_action(&value)
}

fn encode_value(kind: &ActionKind) -> Value {
    match kind {
        ActionKind::Roll
        | ActionKind::Discard
        | ActionKind::BuyDevelopmentCard
        | ActionKind::PlayKnightCard
        | ActionKind::PlayRoadBuilding
        | ActionKind::CancelTrade
        | ActionKind::EndTurn => Value::Null,
        ActionKind::BuildSettlement(node) | ActionKind::BuildCity(node) => json!(node),
        ActionKind::BuildRoad((a, b)) => json!([a, b]),
        ActionKind::MoveRobber { coordinate, victim } => json!([
            coordinate.as_array(),
            victim.map(|color| color.to_string()),
            Value::Null
        ]),
        ActionKind::PlayYearOfPlenty(first, second) => {
            let indices: Vec<usize> = std::iter::once(first)
                .chain(second)
                .map(|resource| resource.index())
                .collect();
            json!(indices)
        }
        ActionKind::PlayMonopoly(resource) => json!(resource.index()),
        ActionKind::MaritimeTrade(offer) => {
            json!(offer.slots().map(|slot| slot.map(|resource| resource.to_string())))
        }
        ActionKind::OfferTrade(offer)
        | ActionKind::AcceptTrade(offer)
        | ActionKind::RejectTrade(offer) => json!(offer.to_counts()),
        ActionKind::ConfirmTrade { offer, partner } => {
            let mut items: Vec<Value> = offer.to_counts().iter().map(|count| json!(count)).collect();
            items.push(json!(partner.to_string()));
            Value::Array(items)
        }
    }
}

pub fn decode_action(value: &Value) -> Result<GameAction, EncodingError> {
    let [color, action_type, payload] = value
        .as_array()
        .map(Vec::as_slice)
        .ok_or(EncodingError::MalformedTriple)?
    else {
        return Err(EncodingError::MalformedTriple);
    };
    let color: Color = parse_name(color, "color")?;
    let action_type: ActionType = parse_name(action_type, "action type")?;
    let malformed = |reason| EncodingError::MalformedValue {
        action_type,
        reason,
    };

    let kind = match action_type {
        ActionType::Roll => ActionKind::Roll,
        ActionType::Discard => ActionKind::Discard,
        ActionType::BuyDevelopmentCard => ActionKind::BuyDevelopmentCard,
        ActionType::PlayKnightCard => ActionKind::PlayKnightCard,
        ActionType::PlayRoadBuilding => ActionKind::PlayRoadBuilding,
        ActionType::CancelTrade => ActionKind::CancelTrade,
        ActionType::EndTurn => ActionKind::EndTurn,
        ActionType::BuildSettlement => {
            ActionKind::BuildSettlement(node_id(payload).ok_or_else(|| malformed("expected node id"))?)
        }
        ActionType::BuildCity => {
            ActionKind::BuildCity(node_id(payload).ok_or_else(|| malformed("expected node id"))?)
        }
        ActionType::BuildRoad => {
            let [a, b] = payload
                .as_array()
                .map(Vec::as_slice)
                .ok_or_else(|| malformed("expected node pair"))?
            else {
                return Err(malformed("expected node pair"));
            };
            let a = node_id(a).ok_or_else(|| malformed("expected node id"))?;
            let b = node_id(b).ok_or_else(|| malformed("expected node id"))?;
            ActionKind::BuildRoad(normalize_edge((a, b)))
        }
        ActionType::MoveRobber => {
            let items = payload
                .as_array()
                .filter(|items| (2..=3).contains(&items.len()))
                .ok_or_else(|| malformed("expected [coordinate, victim, extra]"))?;
            let coordinate = coordinate(&items[0]).ok_or_else(|| malformed("bad coordinate"))?;
            let victim = match &items[1] {
                Value::Null => None,
                other => Some(parse_name(other, "color")?),
            };
            ActionKind::MoveRobber { coordinate, victim }
        }
        ActionType::PlayYearOfPlenty => {
            let items = payload
                .as_array()
                .filter(|items| (1..=2).contains(&items.len()))
                .ok_or_else(|| malformed("expected one or two resources"))?;
            let first = resource(&items[0])?;
            let second = items.get(1).map(resource).transpose()?;
            ActionKind::PlayYearOfPlenty(first, second)
        }
        ActionType::PlayMonopoly => ActionKind::PlayMonopoly(resource(payload)?),
        ActionType::MaritimeTrade => {
            ActionKind::MaritimeTrade(maritime_offer(payload).ok_or_else(|| malformed("bad slots"))?)
        }
        ActionType::OfferTrade | ActionType::AcceptTrade | ActionType::RejectTrade => {
            let items = payload.as_array().ok_or_else(|| malformed("expected 10 counts"))?;
            let offer = trade_offer(items).ok_or_else(|| malformed("expected 10 counts"))?;
            match action_type {
                ActionType::OfferTrade => ActionKind::OfferTrade(offer),
                ActionType::AcceptTrade => ActionKind::AcceptTrade(offer),
                _ => ActionKind::RejectTrade(offer),
            }
        }
        ActionType::ConfirmTrade => {
            let items = payload
                .as_array()
                .filter(|items| items.len() == 11)
                .ok_or_else(|| malformed("expected 10 counts and a color"))?;
            let offer = trade_offer(&items[..10]).ok_or_else(|| malformed("bad counts"))?;
            let partner = parse_name(&items[10], "color")?;
            ActionKind::ConfirmTrade { offer, partner }
        }
    };
    Ok(GameAction::new(color, kind))
}

fn parse_name<T: FromStr>(value: &Value, kind: &'static str) -> Result<T, EncodingError> {
    let unknown = || EncodingError::UnknownName {
        kind,
        value: value.to_string(),
    };
    value
        .as_str()
        .ok_or_else(unknown)
        .and_then(|name| T::from_str(name).map_err(|_| unknown()))
}

fn resource(value: &Value) -> Result<Resource, EncodingError> {
    match value.as_u64() {
        Some(index) => Resource::from_index(index as usize).ok_or(EncodingError::UnknownName {
            kind: "resource",
            value: value.to_string(),
        }),
        None => parse_name(value, "resource"),
    }
}

fn node_id(value: &Value) -> Option<NodeId> {
    value.as_u64().and_then(|id| NodeId::try_from(id).ok())
}

fn coordinate(value: &Value) -> Option<CubeCoord> {
    let items = value.as_array().filter(|items| items.len() == 3)?;
    let mut xyz = [0i32; 3];
    for (slot, item) in xyz.iter_mut().zip(items) {
        *slot = i32::try_from(item.as_i64()?).ok()?;
    }
    CubeCoord::try_new(xyz[0], xyz[1], xyz[2])
}

fn trade_offer(items: &[Value]) -> Option<TradeOffer> {
    if items.len() != 10 {
        return None;
    }
    let mut counts = [0u8; 10];
    for (slot, item) in counts.iter_mut().zip(items) {
        *slot = u8::try_from(item.as_u64()?).ok()?;
    }
    Some(TradeOffer::from_counts(counts))
}

/// Four give slots (all the same resource, `null`-padded) then the receive slot.
fn maritime_offer(value: &Value) -> Option<MaritimeOffer> {
    let items = value.as_array().filter(|items| items.len() == 5)?;
    let mut gives = Vec::with_capacity(4);
    for item in &items[..4] {
        if !item.is_null() {
            gives.push(resource(item).ok()?);
        }
    }
    let give = *gives.first()?;
    if gives.iter().any(|resource| *resource != give) || !(2..=4).contains(&gives.len()) {
        return None;
    }
    Some(MaritimeOffer {
        give,
        rate: gives.len() as u8,
        receive: resource(&items[4]).ok()?,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct TileSnapshot {
    pub coordinate: [i32; 3],
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub resource: Option<Resource>,
    pub number: Option<u8>,
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub building: Option<BuildingKind>,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeSnapshot {
    pub id: [NodeId; 2],
    pub color: Option<Color>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct VictoryPoints {
    pub visible: u8,
    pub actual: u8,
}

/// Read-only picture of a game for collaborators that speak JSON.
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub tiles: Vec<TileSnapshot>,
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
    pub robber_coordinate: [i32; 3],
    pub colors: Vec<Color>,
    pub current_color: Color,
    pub current_prompt: ActionPrompt,
    pub is_initial_build_phase: bool,
    pub current_playable_actions: Vec<Value>,
    pub victory_points: BTreeMap<Color, VictoryPoints>,
    pub longest_roads_by_player: BTreeMap<Color, usize>,
    pub longest_road_holder: Option<Color>,
    pub largest_army_holder: Option<Color>,
    pub winning_color: Option<Color>,
}

impl GameSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        let board = &state.board;
        let tiles = board
            .map
            .tiles
            .iter()
            .map(|(coordinate, tile)| {
                let (kind, resource, number, direction) = match tile {
                    Tile::Land(land) if land.resource.is_none() => ("DESERT", None, None, None),
                    Tile::Land(land) => ("RESOURCE_TILE", land.resource, land.number, None),
                    Tile::Port(port) => ("PORT", port.resource, None, Some(port.direction)),
                    Tile::Water(_) => ("WATER", None, None, None),
                };
                TileSnapshot {
                    coordinate: coordinate.as_array(),
                    kind,
                    resource,
                    number,
                    direction,
                }
            })
            .collect();
        let nodes = board
            .map
            .land_nodes
            .iter()
            .map(|id| {
                let building = board.building_at(*id);
                NodeSnapshot {
                    id: *id,
                    building: building.map(|b| b.kind),
                    color: building.map(|b| b.color),
                }
            })
            .collect();
        let edges = board
            .map
            .land_edges
            .iter()
            .map(|edge| EdgeSnapshot {
                id: [edge.0, edge.1],
                color: board.road_color(*edge),
            })
            .collect();

        Self {
            tiles,
            nodes,
            edges,
            robber_coordinate: board.robber_coordinate().as_array(),
            colors: state.colors.clone(),
            current_color: state.current_color(),
            current_prompt: state.current_prompt,
            is_initial_build_phase: state.is_initial_build_phase,
            current_playable_actions: state.playable_actions().iter().map(encode_action).collect(),
            victory_points: state
                .colors
                .iter()
                .map(|color| {
                    let points = VictoryPoints {
                        visible: state.visible_victory_points(*color),
                        actual: state.actual_victory_points(*color),
                    };
                    (*color, points)
                })
                .collect(),
            longest_roads_by_player: state
                .colors
                .iter()
                .map(|color| (*color, board.longest_road_length(*color)))
                .collect(),
            longest_road_holder: state.longest_road.holder(),
            largest_army_holder: state.largest_army.holder(),
            winning_color: state.winner,
        }
    }

    pub fn to_json(&self) -> Result<String, EncodingError> {
        Ok(serde_json::to_string(self)?)
    }
}
