use std::collections::VecDeque;

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    board::{Board, CatanMap, MapType, NodeId},
    types::{ActionPrompt, ActionType, BuildingKind, Color},
};

use super::{
    action::{ActionRecord, ActionResult, GameAction, TradeOffer},
    apply,
    bank::Bank,
    legal::generate_playable_actions,
    players::PlayerState,
    resources::ResourceError,
    trackers::{MIN_LARGEST_ARMY, MIN_LONGEST_ROAD, Trophy},
};

/// Most domestic offers a color may make during one of its turns.
pub const MAX_TRADE_OFFERS_PER_TURN: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub num_players: usize,
    pub map_type: MapType,
    pub vps_to_win: u8,
    pub discard_limit: u32,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            num_players: 4,
            map_type: MapType::Base,
            vps_to_win: 10,
            discard_limit: 7,
            seed: 42,
        }
    }
}

impl GameConfig {
    /// Parses a config, filling omitted fields with defaults.
    pub fn from_json(raw: &str) -> Result<Self, GameError> {
        let config: GameConfig =
            serde_json::from_str(raw).map_err(|err| GameError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if !(2..=Color::ORDERED.len()).contains(&self.num_players) {
            return Err(GameError::InvalidConfig(format!(
                "between 2 and 4 players are supported, got {}",
                self.num_players
            )));
        }
        if self.vps_to_win == 0 {
            return Err(GameError::InvalidConfig("vps_to_win must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("game already completed")]
    GameFinished,
    #[error("action {action} is not playable during {prompt}")]
    IllegalAction {
        action: Box<GameAction>,
        prompt: ActionPrompt,
    },
    #[error("missing or invalid payload: {0}")]
    InvalidPayload(&'static str),
    #[error(transparent)]
    InsufficientResources(#[from] ResourceError),
    #[error("prompt {prompt} cannot be served: {reason}")]
    UnknownPrompt {
        prompt: ActionPrompt,
        reason: &'static str,
    },
    #[error("invalid game config: {0}")]
    InvalidConfig(String),
}

/// Domestic offer awaiting responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTrade {
    pub offer: TradeOffer,
    pub proposer: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub config: GameConfig,
    pub colors: Vec<Color>,
    pub board: Board,
    pub bank: Bank,
    pub players: Vec<PlayerState>,
    pub current_prompt: ActionPrompt,
    /// Seat whose decision is pending. Differs from the turn owner while
    /// discarding or answering a trade.
    pub current_player_index: usize,
    pub current_turn_index: usize,
    pub is_initial_build_phase: bool,
    pub num_turns: u32,
    pub last_roll: Option<(u8, u8)>,
    pub current_trade: Option<PendingTrade>,
    pub acceptees: Vec<bool>,
    pub free_roads_available: u8,
    pub longest_road: Trophy,
    pub largest_army: Trophy,
    pub winner: Option<Color>,
    pub actions: Vec<ActionRecord>,
    pub(crate) setup: SetupState,
    pub(crate) pending_settlement: Option<NodeId>,
    pub(crate) discard_queue: VecDeque<usize>,
    pub(crate) trade_responders: VecDeque<usize>,
    playable_actions: Vec<GameAction>,
    pub(crate) rng: StdRng,
}

impl GameState {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let map = CatanMap::build_with_rng(config.map_type, &mut rng);
        let board = Board::new(map, config.map_type);
        let bank = Bank::standard(&mut rng);
        let colors: Vec<Color> = Color::ORDERED[..config.num_players].to_vec();
        let players = colors.iter().map(|color| PlayerState::new(*color)).collect();

        let setup = SetupState::new(config.num_players);
        let current_prompt = setup
            .current_prompt()
            .unwrap_or(ActionPrompt::BuildInitialSettlement);
        let current_player_index = setup.current_player().unwrap_or(0);

        let mut state = Self {
            acceptees: vec![false; colors.len()],
            config,
            colors,
            board,
            bank,
            players,
            current_prompt,
            current_player_index,
            current_turn_index: current_player_index,
            is_initial_build_phase: true,
            num_turns: 0,
            last_roll: None,
            current_trade: None,
            free_roads_available: 0,
            longest_road: Trophy::default(),
            largest_army: Trophy::default(),
            winner: None,
            actions: Vec::new(),
            setup,
            pending_settlement: None,
            discard_queue: VecDeque::new(),
            trade_responders: VecDeque::new(),
            playable_actions: Vec::new(),
            rng,
        };
        state.refresh_playable_actions()?;
        Ok(state)
    }

    pub fn current_color(&self) -> Color {
        self.colors[self.current_player_index]
    }

    pub fn color_index(&self, color: Color) -> Option<usize> {
        self.colors.iter().position(|c| *c == color)
    }

    pub fn player(&self, color: Color) -> Option<&PlayerState> {
        self.color_index(color).map(|idx| &self.players[idx])
    }

    pub fn playable_actions(&self) -> &[GameAction] {
        &self.playable_actions
    }

    /// Regenerates the cached action list. Needed after editing fields directly.
    pub fn refresh_playable_actions(&mut self) -> Result<(), GameError> {
        self.playable_actions = generate_playable_actions(self)?;
        Ok(())
    }

    /// Settlements, cities and trophies: what opponents can see.
    pub fn visible_victory_points(&self, color: Color) -> u8 {
        let settlements = self.board.buildings_of(color, BuildingKind::Settlement).count() as u8;
        let cities = self.board.buildings_of(color, BuildingKind::City).count() as u8;
        let mut points = settlements + 2 * cities;
        if self.longest_road.is_held_by(color) {
            points += 2;
        }
        if self.largest_army.is_held_by(color) {
            points += 2;
        }
        points
    }

    /// Visible points plus victory-point cards still in hand.
    pub fn actual_victory_points(&self, color: Color) -> u8 {
        let hidden = self.player(color).map_or(0, |p| p.victory_point_cards());
        self.visible_victory_points(color) + hidden
    }

    /// Applies a playable action, drawing randomness from the game's rng.
    pub fn execute(&mut self, action: GameAction) -> Result<ActionRecord, GameError> {
        self.ensure_playable(&action)?;
        self.commit(action, None)
    }

    /// Applies a playable action with a previously recorded random outcome.
    pub fn execute_with_result(
        &mut self,
        action: GameAction,
        result: Option<ActionResult>,
    ) -> Result<ActionRecord, GameError> {
        self.ensure_playable(&action)?;
        self.commit(action, result.as_ref())
    }

    /// Re-applies a full action log onto a fresh game built from the same config.
    pub fn replay(config: GameConfig, records: &[ActionRecord]) -> Result<Self, GameError> {
        let mut state = Self::new(config)?;
        for record in records {
            state.execute_with_result(record.action.clone(), record.result.clone())?;
        }
        Ok(state)
    }

    fn ensure_playable(&self, action: &GameAction) -> Result<(), GameError> {
        if self.winner.is_some() {
            return Err(GameError::GameFinished);
        }
        if !self.playable_actions.contains(action) {
            return Err(GameError::IllegalAction {
                action: Box::new(action.clone()),
                prompt: self.current_prompt,
            });
        }
        Ok(())
    }

    fn commit(
        &mut self,
        action: GameAction,
        forced: Option<&ActionResult>,
    ) -> Result<ActionRecord, GameError> {
        let result = apply::apply_action(self, &action, forced)?;
        debug!(action = %action, result = ?result, prompt = %self.current_prompt, "applied action");
        let record = ActionRecord { action, result };
        self.actions.push(record.clone());
        self.check_victory();
        self.refresh_playable_actions()?;
        Ok(record)
    }

    fn check_victory(&mut self) {
        let acting = self.current_turn_index;
        let seats = self.colors.len();
        for idx in (0..seats).map(|offset| (acting + offset) % seats) {
            let color = self.colors[idx];
            let points = self.actual_victory_points(color);
            if points >= self.config.vps_to_win {
                info!(%color, points, turns = self.num_turns, "game won");
                self.winner = Some(color);
                return;
            }
        }
    }

    pub(crate) fn update_longest_road(&mut self) {
        let scores: Vec<(Color, usize)> = self
            .colors
            .iter()
            .map(|color| (*color, self.board.longest_road_length(*color)))
            .collect();
        if self.longest_road.update(scores, MIN_LONGEST_ROAD) {
            info!(holder = ?self.longest_road.holder(), "longest road changed hands");
        }
    }

    pub(crate) fn update_largest_army(&mut self) {
        let scores: Vec<(Color, u8)> = self
            .players
            .iter()
            .map(|player| (player.color, player.knights_played()))
            .collect();
        if self.largest_army.update(scores, MIN_LARGEST_ARMY) {
            info!(holder = ?self.largest_army.holder(), "largest army changed hands");
        }
    }

    /// Hands the decision back to the turn owner in the main loop.
    pub(crate) fn resume_turn(&mut self) {
        self.current_player_index = self.current_turn_index;
        self.current_prompt = ActionPrompt::PlayTurn;
    }

    pub fn action_type_allowed(&self, action_type: ActionType) -> bool {
        self.playable_actions
            .iter()
            .any(|action| action.action_type() == action_type)
    }
}

/// Snake-order placement schedule: each seat places a settlement then a road,
/// forward once and then in reverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SetupState {
    steps: Vec<SetupStep>,
    cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SetupStep {
    player_index: usize,
    prompt: ActionPrompt,
    second_round: bool,
}

impl SetupState {
    fn new(num_players: usize) -> Self {
        let forward = (0..num_players).map(|player| (player, false));
        let backward = (0..num_players).rev().map(|player| (player, true));
        let steps = forward
            .chain(backward)
            .flat_map(|(player_index, second_round)| {
                [
                    ActionPrompt::BuildInitialSettlement,
                    ActionPrompt::BuildInitialRoad,
                ]
                .map(|prompt| SetupStep {
                    player_index,
                    prompt,
                    second_round,
                })
            })
            .collect();
        Self { steps, cursor: 0 }
    }

    pub(crate) fn current_prompt(&self) -> Option<ActionPrompt> {
        self.steps.get(self.cursor).map(|step| step.prompt)
    }

    pub(crate) fn current_player(&self) -> Option<usize> {
        self.steps.get(self.cursor).map(|step| step.player_index)
    }

    pub(crate) fn is_second_round(&self) -> bool {
        self.steps
            .get(self.cursor)
            .is_some_and(|step| step.second_round)
    }

    pub(crate) fn advance(&mut self) {
        if self.cursor < self.steps.len() {
            self.cursor += 1;
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.cursor >= self.steps.len()
    }
}
