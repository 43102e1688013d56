//! The turn/phase state machine: building rules, harvesting, the robber,
//! bank trading and the longest-road search.
//!
//! Every mutating operation validates all of its preconditions before
//! touching state, so a rejected action never leaves a partial change
//! behind. Randomness (dice, steal draws) comes in through `Rng` parameters
//! so games are reproducible under a seeded generator.

use crate::board::{Board, Resource};
use crate::hex::{Edge, Hex, Vertex};
use crate::player::{costs, Player, PlayerColor};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

/// Victory points needed to win.
pub const VICTORY_POINTS_TO_WIN: u32 = 10;

/// Bank exchange rate without any port.
const BANK_BASE_RATE: u32 = 4;

/// Where we are inside a turn. Game over is an orthogonal flag, not a
/// phase, so turn bookkeeping keeps functioning once it is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Setup,
    RollDice,
    MainPhase,
}

/// What stands on a vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingKind {
    Settlement,
    City,
}

/// A building and its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub owner: PlayerColor,
    pub kind: BuildingKind,
}

/// The uniform rejected-action error. Every rule violation maps to one of
/// these kinds and carries a human-readable reason via `Display`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("game requires 2 to 4 players")]
    InvalidPlayerCount,

    #[error("invalid coordinate encoding")]
    InvalidCoordinate,

    #[error("this location is already occupied")]
    OccupiedLocation,

    #[error("distance rule: cannot build next to another settlement")]
    DistanceRuleViolation,

    #[error("must be connected to your existing network")]
    NotConnected,

    #[error("insufficient resources: {0}")]
    InsufficientResources(String),

    #[error("it is not your turn")]
    NotYourTurn,

    #[error("you must roll the dice first")]
    MustRollFirst,

    #[error("invalid action for the current phase")]
    InvalidPhase,

    #[error("{0}")]
    InvalidLocation(String),

    #[error("robber must be moved to a different board tile")]
    InvalidRobberMove,

    #[error("robber is not placed")]
    RobberNotPlaced,

    #[error("cannot steal from yourself")]
    SelfSteal,

    #[error("victim has no building on the robber hex")]
    NoAdjacentBuilding,

    #[error("{0}")]
    SetupOrderViolation(String),
}

/// One player's share of a harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePayout {
    pub player: usize,
    pub resource: Resource,
    pub amount: u32,
}

/// The root entity of the rules engine.
///
/// Roads and settlements are keyed by canonical edge/vertex identity; the
/// keys are always canonical because every entry point canonicalizes its
/// coordinate arguments before touching the maps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub board: Board,
    pub players: Vec<Player>,
    pub current_turn_index: usize,
    pub turn_phase: TurnPhase,
    pub dice_roll: Option<u8>,
    pub robber_hex: Option<Hex>,
    pub is_game_over: bool,
    pub winner: Option<usize>,
    pub roads: HashMap<Edge, PlayerColor>,
    pub settlements: HashMap<Vertex, Building>,
    /// Snake-draft seat order still owed an initial settlement + road,
    /// consumed front to back: 0..N forward, then N..0 reversed.
    pub setup_queue: VecDeque<usize>,
    /// Set between a setup settlement and the road it owes.
    pub setup_waiting_for_road: bool,
}

impl GameState {
    /// Create a new game with a fresh thread RNG for board generation.
    pub fn create_new_game(player_names: Vec<String>) -> Result<Self, GameError> {
        Self::create_new_game_with_rng(player_names, &mut rand::thread_rng())
    }

    /// Create a new game for 2-4 named players. Seats keep the given order;
    /// the robber starts on the desert and play begins with the setup draft.
    pub fn create_new_game_with_rng<R: Rng>(
        player_names: Vec<String>,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if !(2..=4).contains(&player_names.len()) {
            return Err(GameError::InvalidPlayerCount);
        }

        let players: Vec<Player> = player_names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Player::new(format!("p{i}"), name, PlayerColor::ALL[i]))
            .collect();

        let board = Board::create_standard_with_rng(rng);
        let robber_hex = board.desert_hex();

        let seats = 0..players.len();
        let setup_queue: VecDeque<usize> = seats.clone().chain(seats.rev()).collect();

        Ok(Self {
            board,
            players,
            current_turn_index: 0,
            turn_phase: TurnPhase::Setup,
            dice_roll: None,
            robber_hex,
            is_game_over: false,
            winner: None,
            roads: HashMap::new(),
            settlements: HashMap::new(),
            setup_queue,
            setup_waiting_for_road: false,
        })
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_turn_index]
    }

    /// Seat index for a stable player id, for the transport layer.
    pub fn player_index_by_id(&self, id: &str) -> Option<usize> {
        self.players.iter().position(|p| p.id == id)
    }

    /// Turn-ownership and phase gate applied to every non-free action.
    fn verify_turn(&self, player: usize) -> Result<(), GameError> {
        if player >= self.players.len() || player != self.current_turn_index {
            return Err(GameError::NotYourTurn);
        }
        match self.turn_phase {
            TurnPhase::Setup => Err(GameError::SetupOrderViolation(
                "only settlement and road placement are allowed during setup".to_string(),
            )),
            TurnPhase::RollDice => Err(GameError::MustRollFirst),
            TurnPhase::MainPhase => Ok(()),
        }
    }

    // ==================== Dice & harvesting ====================

    /// Roll two dice, harvest on anything but a 7 and move to the main
    /// phase. On a 7 the engine expects a subsequent robber move; it is not
    /// enforced synchronously.
    pub fn roll_dice<R: Rng>(
        &mut self,
        player: usize,
        rng: &mut R,
    ) -> Result<(u8, Vec<ResourcePayout>), GameError> {
        if player >= self.players.len() || player != self.current_turn_index {
            return Err(GameError::NotYourTurn);
        }
        match self.turn_phase {
            TurnPhase::Setup => {
                return Err(GameError::SetupOrderViolation(
                    "finish the initial placement first".to_string(),
                ))
            }
            TurnPhase::MainPhase => return Err(GameError::InvalidPhase),
            TurnPhase::RollDice => {}
        }

        let total = rng.gen_range(1..=6u8) + rng.gen_range(1..=6u8);
        self.dice_roll = Some(total);
        self.turn_phase = TurnPhase::MainPhase;

        let payouts = if total == 7 {
            Vec::new()
        } else {
            self.distribute_resources(total)
        };
        Ok((total, payouts))
    }

    /// Pay every building on the corners of every tile matching the roll,
    /// except tiles under the robber and the desert. Settlements earn 1,
    /// cities 2.
    pub fn distribute_resources(&mut self, roll: u8) -> Vec<ResourcePayout> {
        let mut payouts = Vec::new();
        for tile in self.board.tiles() {
            if tile.number != Some(roll) || Some(tile.hex) == self.robber_hex {
                continue;
            }
            let resource = match tile.resource() {
                Some(r) => r,
                None => continue,
            };
            for direction in 0..6 {
                let corner = Vertex::new(tile.hex, direction);
                if let Some(building) = self.settlements.get(&corner) {
                    if let Some(player) = self.seat_of(building.owner) {
                        let amount = match building.kind {
                            BuildingKind::Settlement => 1,
                            BuildingKind::City => 2,
                        };
                        payouts.push(ResourcePayout { player, resource, amount });
                    }
                }
            }
        }
        for payout in &payouts {
            self.players[payout.player]
                .resources
                .add(payout.resource, payout.amount);
        }
        payouts
    }

    fn seat_of(&self, color: PlayerColor) -> Option<usize> {
        self.players.iter().position(|p| p.color == color)
    }

    // ==================== Building ====================

    /// Place a settlement. During setup this is the free draft placement;
    /// otherwise `free` skips the turn, connectivity and cost checks while
    /// occupancy and the distance rule always apply. Returns the starting
    /// resources granted when this was a setup second settlement.
    pub fn place_settlement(
        &mut self,
        player: usize,
        vertex: Vertex,
        free: bool,
    ) -> Result<Vec<ResourcePayout>, GameError> {
        if player >= self.players.len() {
            return Err(GameError::NotYourTurn);
        }
        let vertex = vertex.canonical();

        if self.turn_phase == TurnPhase::Setup {
            return self.setup_settlement(player, vertex);
        }

        if !free {
            self.verify_turn(player)?;
        }
        self.check_vertex_placeable(&vertex)?;

        if !free {
            let color = self.players[player].color;
            let connected = vertex
                .touching_edges()
                .iter()
                .any(|e| self.roads.get(e) == Some(&color));
            if !connected {
                return Err(GameError::NotConnected);
            }
            if !self.players[player].resources.has(&costs::settlement()) {
                return Err(GameError::InsufficientResources(
                    "a settlement".to_string(),
                ));
            }
            self.players[player].resources.deduct(&costs::settlement())?;
        }

        self.record_settlement(player, vertex);
        Ok(Vec::new())
    }

    /// Place a road. During setup this is the road owed for the draft
    /// settlement; otherwise `free` skips turn and cost checks. Connectivity
    /// to the owner's network is always required. Returns the owner's
    /// recomputed longest road.
    pub fn place_road(
        &mut self,
        player: usize,
        edge: Edge,
        free: bool,
    ) -> Result<u32, GameError> {
        if player >= self.players.len() {
            return Err(GameError::NotYourTurn);
        }
        let edge = edge.canonical();

        if self.turn_phase == TurnPhase::Setup {
            return self.setup_road(player, edge);
        }

        if !free {
            self.verify_turn(player)?;
        }
        if self.roads.contains_key(&edge) {
            return Err(GameError::OccupiedLocation);
        }
        if !free && !self.players[player].resources.has(&costs::road()) {
            return Err(GameError::InsufficientResources("a road".to_string()));
        }
        let color = self.players[player].color;
        if !self.road_connected(color, &edge) {
            return Err(GameError::NotConnected);
        }
        if !free {
            self.players[player].resources.deduct(&costs::road())?;
        }

        self.roads.insert(edge, color);
        Ok(self.longest_road(color))
    }

    /// Upgrade an owned settlement to a city for 3 ore + 2 wheat.
    pub fn upgrade_to_city(&mut self, player: usize, vertex: Vertex) -> Result<(), GameError> {
        if player >= self.players.len() {
            return Err(GameError::NotYourTurn);
        }
        self.verify_turn(player)?;
        let vertex = vertex.canonical();
        let color = self.players[player].color;

        match self.settlements.get(&vertex) {
            None => {
                return Err(GameError::InvalidLocation(
                    "no settlement at this location".to_string(),
                ))
            }
            Some(b) if b.owner != color => {
                return Err(GameError::InvalidLocation(
                    "you can only upgrade your own settlements".to_string(),
                ))
            }
            Some(b) if b.kind == BuildingKind::City => {
                return Err(GameError::InvalidLocation(
                    "this is already a city".to_string(),
                ))
            }
            Some(_) => {}
        }

        if !self.players[player].resources.has(&costs::city()) {
            return Err(GameError::InsufficientResources("a city".to_string()));
        }
        self.players[player].resources.deduct(&costs::city())?;
        if let Some(building) = self.settlements.get_mut(&vertex) {
            building.kind = BuildingKind::City;
        }
        self.players[player].victory_points += 1;
        self.check_victory(player);
        Ok(())
    }

    /// Occupancy and the distance rule; enforced for every settlement,
    /// free or paid.
    fn check_vertex_placeable(&self, vertex: &Vertex) -> Result<(), GameError> {
        if self.settlements.contains_key(vertex) {
            return Err(GameError::OccupiedLocation);
        }
        for neighbor in vertex.adjacent_vertices() {
            if self.settlements.contains_key(&neighbor) {
                return Err(GameError::DistanceRuleViolation);
            }
        }
        Ok(())
    }

    /// An edge joins a network when a connected edge holds a same-owner road
    /// or an endpoint holds a same-owner building.
    fn road_connected(&self, color: PlayerColor, edge: &Edge) -> bool {
        if edge
            .connected_edges()
            .iter()
            .any(|e| self.roads.get(e) == Some(&color))
        {
            return true;
        }
        edge.vertices()
            .iter()
            .any(|v| self.settlements.get(v).is_some_and(|b| b.owner == color))
    }

    fn record_settlement(&mut self, player: usize, vertex: Vertex) {
        self.settlements.insert(
            vertex,
            Building {
                owner: self.players[player].color,
                kind: BuildingKind::Settlement,
            },
        );
        self.players[player].victory_points += 1;
        self.check_victory(player);
    }

    // ==================== Setup draft ====================

    fn setup_settlement(
        &mut self,
        player: usize,
        vertex: Vertex,
    ) -> Result<Vec<ResourcePayout>, GameError> {
        let seat = match self.setup_queue.front() {
            Some(&seat) => seat,
            None => {
                return Err(GameError::SetupOrderViolation(
                    "initial placement is already complete".to_string(),
                ))
            }
        };
        if player != seat {
            return Err(GameError::NotYourTurn);
        }
        if self.setup_waiting_for_road {
            return Err(GameError::SetupOrderViolation(
                "place a road first".to_string(),
            ));
        }
        self.check_vertex_placeable(&vertex)?;

        self.record_settlement(player, vertex);
        self.setup_waiting_for_road = true;

        // The second settlement harvests its starting resources: one unit
        // per producing tile touching the corner.
        let color = self.players[player].color;
        let owned = self
            .settlements
            .values()
            .filter(|b| b.owner == color)
            .count();
        if owned == 2 {
            Ok(self.grant_starting_resources(player, &vertex))
        } else {
            Ok(Vec::new())
        }
    }

    fn setup_road(&mut self, player: usize, edge: Edge) -> Result<u32, GameError> {
        let seat = match self.setup_queue.front() {
            Some(&seat) => seat,
            None => {
                return Err(GameError::SetupOrderViolation(
                    "initial placement is already complete".to_string(),
                ))
            }
        };
        if player != seat {
            return Err(GameError::NotYourTurn);
        }
        if !self.setup_waiting_for_road {
            return Err(GameError::SetupOrderViolation(
                "place a settlement first".to_string(),
            ));
        }
        if self.roads.contains_key(&edge) {
            return Err(GameError::OccupiedLocation);
        }
        let color = self.players[player].color;
        if !self.road_connected(color, &edge) {
            return Err(GameError::NotConnected);
        }

        self.roads.insert(edge, color);
        self.setup_waiting_for_road = false;
        let length = self.longest_road(color);
        self.advance_setup_queue();
        Ok(length)
    }

    fn advance_setup_queue(&mut self) {
        self.setup_queue.pop_front();
        match self.setup_queue.front() {
            Some(&next) => self.current_turn_index = next,
            None => {
                self.turn_phase = TurnPhase::RollDice;
                self.current_turn_index = 0;
            }
        }
    }

    fn grant_starting_resources(
        &mut self,
        player: usize,
        vertex: &Vertex,
    ) -> Vec<ResourcePayout> {
        let resources: Vec<Resource> = self
            .board
            .tiles_at_vertex(vertex)
            .iter()
            .filter_map(|t| t.resource())
            .collect();
        let payouts: Vec<ResourcePayout> = resources
            .into_iter()
            .map(|resource| ResourcePayout { player, resource, amount: 1 })
            .collect();
        for payout in &payouts {
            self.players[payout.player]
                .resources
                .add(payout.resource, payout.amount);
        }
        payouts
    }

    // ==================== Robber & stealing ====================

    /// Move the robber to a different board tile.
    pub fn move_robber(&mut self, player: usize, target: Hex) -> Result<(), GameError> {
        self.verify_turn(player)?;
        if Some(target) == self.robber_hex || !self.board.contains(&target) {
            return Err(GameError::InvalidRobberMove);
        }
        self.robber_hex = Some(target);
        Ok(())
    }

    /// Steal one uniformly drawn resource unit from a victim with a building
    /// adjacent to the robber.
    pub fn steal_resource<R: Rng>(
        &mut self,
        thief: usize,
        victim: usize,
        rng: &mut R,
    ) -> Result<Resource, GameError> {
        self.verify_turn(thief)?;
        let robber = self.robber_hex.ok_or(GameError::RobberNotPlaced)?;
        if thief == victim {
            return Err(GameError::SelfSteal);
        }
        let victim_color = self
            .players
            .get(victim)
            .ok_or(GameError::NoAdjacentBuilding)?
            .color;

        let adjacent = (0..6).any(|d| {
            self.settlements
                .get(&Vertex::new(robber, d))
                .is_some_and(|b| b.owner == victim_color)
        });
        if !adjacent {
            return Err(GameError::NoAdjacentBuilding);
        }

        // Flat pool: one entry per resource unit the victim holds.
        let mut pool = Vec::new();
        for resource in Resource::ALL {
            let count = self.players[victim].resources.get(resource);
            pool.extend(std::iter::repeat(resource).take(count as usize));
        }
        let stolen = *pool.choose(rng).ok_or_else(|| {
            GameError::InsufficientResources("the victim has nothing to steal".to_string())
        })?;

        self.players[victim].resources.remove(stolen, 1)?;
        self.players[thief].resources.add(stolen, 1);
        Ok(stolen)
    }

    // ==================== Bank trading ====================

    /// Exchange rate for giving up a resource: 4:1 by default, 3:1 with a
    /// building on a generic port, 2:1 with a building on that resource's
    /// specific port.
    pub fn bank_trade_rate(&self, player: usize, give: Resource) -> u32 {
        let color = self.players[player].color;
        let mut rate = BANK_BASE_RATE;
        for port in self.board.ports() {
            let qualifies = port
                .vertices
                .iter()
                .any(|v| self.settlements.get(v).is_some_and(|b| b.owner == color));
            if !qualifies {
                continue;
            }
            rate = rate.min(match port.kind {
                crate::board::PortKind::Generic => 3,
                crate::board::PortKind::Specific(r) if r == give => 2,
                crate::board::PortKind::Specific(_) => BANK_BASE_RATE,
            });
        }
        rate
    }

    /// Trade `rate` units of `give` for 1 unit of `get` with the bank.
    /// Returns the rate that applied.
    pub fn trade_with_bank(
        &mut self,
        player: usize,
        give: Resource,
        get: Resource,
    ) -> Result<u32, GameError> {
        self.verify_turn(player)?;
        let rate = self.bank_trade_rate(player, give);
        if self.players[player].resources.get(give) < rate {
            return Err(GameError::InsufficientResources(format!(
                "need {rate} {give:?} to trade"
            )));
        }
        self.players[player].resources.remove(give, rate)?;
        self.players[player].resources.add(get, 1);
        Ok(rate)
    }

    // ==================== Turn & victory ====================

    /// End the turn: evaluate victory first, and only advance the rotation
    /// when the game is still running.
    pub fn end_turn(&mut self, player: usize) -> Result<(), GameError> {
        self.verify_turn(player)?;
        self.check_victory(player);
        if self.is_game_over {
            return Ok(());
        }
        self.current_turn_index = (self.current_turn_index + 1) % self.players.len();
        self.dice_roll = None;
        self.turn_phase = TurnPhase::RollDice;
        Ok(())
    }

    /// First player at the threshold wins; once set, game over is permanent.
    fn check_victory(&mut self, player: usize) {
        if !self.is_game_over && self.players[player].victory_points >= VICTORY_POINTS_TO_WIN {
            self.is_game_over = true;
            self.winner = Some(player);
        }
    }

    // ==================== Longest road ====================

    /// Length of the player's longest simple road path. Two road segments
    /// connect through a shared vertex unless an opposing building stands on
    /// it. Recomputed after every road placement.
    pub fn longest_road(&self, color: PlayerColor) -> u32 {
        let owned: Vec<Edge> = self
            .roads
            .iter()
            .filter(|&(_, &c)| c == color)
            .map(|(&e, _)| e)
            .collect();

        let mut best = 0;
        for &start in &owned {
            let mut visited = HashSet::new();
            best = best.max(self.longest_path_from(color, start, &mut visited));
        }
        best
    }

    /// Depth-first walk from one segment. The visited set backtracks on the
    /// way out, so each branch explores independently instead of sharing one
    /// global set; path length counts the starting edge plus the best
    /// continuation.
    fn longest_path_from(
        &self,
        color: PlayerColor,
        current: Edge,
        visited: &mut HashSet<Edge>,
    ) -> u32 {
        visited.insert(current);
        let mut best_continuation = 0;

        for endpoint in current.vertices() {
            // An opposing building severs the path at this vertex.
            if self
                .settlements
                .get(&endpoint)
                .is_some_and(|b| b.owner != color)
            {
                continue;
            }
            for next in endpoint.touching_edges() {
                if next != current
                    && !visited.contains(&next)
                    && self.roads.get(&next) == Some(&color)
                {
                    best_continuation =
                        best_continuation.max(self.longest_path_from(color, next, visited));
                }
            }
        }

        visited.remove(&current);
        1 + best_continuation
    }
}
