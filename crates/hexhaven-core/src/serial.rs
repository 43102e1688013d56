//! Conversion between `GameState` and a tree of plain primitives.
//!
//! The surrounding service persists a game wholesale after every successful
//! action, so the whole state must map totally and bidirectionally onto
//! numbers, strings, booleans, lists and string-keyed maps. Map keys like
//! `Vertex` and `Edge` cannot survive as JSON keys, so roads and settlements
//! flatten into lists of `{hex, direction, ...}` entries; decoding re-derives
//! canonical identity from those pairs instead of trusting the stored form.
//!
//! Encoded lists are deterministically ordered, which makes
//! `decode` followed by `encode` the identity on the primitive tree.

use crate::board::{Board, Port, PortKind, Resource, Tile, TileKind};
use crate::game::{Building, BuildingKind, GameError, GameState, TurnPhase};
use crate::hex::{Edge, Hex, Vertex};
use crate::player::{Player, PlayerColor, ResourceHand};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// A cube coordinate spelled out in full; the redundant `s` is validated
/// against `q + r + s = 0` on the way back in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexDoc {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

impl HexDoc {
    fn encode(hex: &Hex) -> Self {
        Self { q: hex.q, r: hex.r, s: hex.s() }
    }

    fn decode(&self) -> Result<Hex, GameError> {
        Hex::from_cube(self.q, self.r, self.s)
    }
}

fn decode_direction(direction: u8) -> Result<u8, GameError> {
    if direction > 5 {
        return Err(GameError::InvalidCoordinate);
    }
    Ok(direction)
}

/// Tile surface on the wire: a resource name or `"desert"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileResourceDoc {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
    Desert,
}

impl TileResourceDoc {
    fn encode(kind: TileKind) -> Self {
        match kind {
            TileKind::Resource(Resource::Wood) => Self::Wood,
            TileKind::Resource(Resource::Brick) => Self::Brick,
            TileKind::Resource(Resource::Sheep) => Self::Sheep,
            TileKind::Resource(Resource::Wheat) => Self::Wheat,
            TileKind::Resource(Resource::Ore) => Self::Ore,
            TileKind::Desert => Self::Desert,
        }
    }

    fn decode(self) -> TileKind {
        match self {
            Self::Wood => TileKind::Resource(Resource::Wood),
            Self::Brick => TileKind::Resource(Resource::Brick),
            Self::Sheep => TileKind::Resource(Resource::Sheep),
            Self::Wheat => TileKind::Resource(Resource::Wheat),
            Self::Ore => TileKind::Resource(Resource::Ore),
            Self::Desert => TileKind::Desert,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDoc {
    pub hex: HexDoc,
    pub resource: TileResourceDoc,
    pub number: Option<u8>,
}

/// Port flavor wire names, e.g. `"3:1"` and `"wood_2:1"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortKindDoc {
    #[serde(rename = "3:1")]
    Generic,
    #[serde(rename = "wood_2:1")]
    Wood,
    #[serde(rename = "brick_2:1")]
    Brick,
    #[serde(rename = "sheep_2:1")]
    Sheep,
    #[serde(rename = "wheat_2:1")]
    Wheat,
    #[serde(rename = "ore_2:1")]
    Ore,
}

impl PortKindDoc {
    fn encode(kind: PortKind) -> Self {
        match kind {
            PortKind::Generic => Self::Generic,
            PortKind::Specific(Resource::Wood) => Self::Wood,
            PortKind::Specific(Resource::Brick) => Self::Brick,
            PortKind::Specific(Resource::Sheep) => Self::Sheep,
            PortKind::Specific(Resource::Wheat) => Self::Wheat,
            PortKind::Specific(Resource::Ore) => Self::Ore,
        }
    }

    fn decode(self) -> PortKind {
        match self {
            Self::Generic => PortKind::Generic,
            Self::Wood => PortKind::Specific(Resource::Wood),
            Self::Brick => PortKind::Specific(Resource::Brick),
            Self::Sheep => PortKind::Specific(Resource::Sheep),
            Self::Wheat => PortKind::Specific(Resource::Wheat),
            Self::Ore => PortKind::Specific(Resource::Ore),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexDoc {
    pub hex: HexDoc,
    pub direction: u8,
}

impl VertexDoc {
    fn encode(vertex: &Vertex) -> Self {
        Self { hex: HexDoc::encode(&vertex.hex), direction: vertex.direction }
    }

    fn decode(&self) -> Result<Vertex, GameError> {
        Ok(Vertex::new(self.hex.decode()?, decode_direction(self.direction)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDoc {
    #[serde(rename = "type")]
    pub kind: PortKindDoc,
    pub vertices: Vec<VertexDoc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadDoc {
    pub hex: HexDoc,
    pub direction: u8,
    pub color: PlayerColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementDoc {
    pub hex: HexDoc,
    pub direction: u8,
    pub owner: PlayerColor,
    #[serde(rename = "type")]
    pub kind: BuildingKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDoc {
    pub id: String,
    pub name: String,
    pub color: PlayerColor,
    pub resources: BTreeMap<Resource, u32>,
    pub victory_points: u32,
}

/// The whole game as primitives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateDoc {
    pub players: Vec<PlayerDoc>,
    pub current_turn_index: usize,
    pub turn_phase: TurnPhase,
    pub dice_roll: Option<u8>,
    pub robber_hex: Option<HexDoc>,
    pub is_game_over: bool,
    pub winner_name: Option<String>,
    pub board_tiles: Vec<TileDoc>,
    pub board_ports: Vec<PortDoc>,
    pub roads: Vec<RoadDoc>,
    pub settlements: Vec<SettlementDoc>,
    pub setup_queue: Vec<usize>,
    pub setup_waiting_for_road: bool,
}

impl GameStateDoc {
    /// Flatten a game into primitives, in a deterministic order.
    pub fn encode(game: &GameState) -> Self {
        let mut board_tiles: Vec<&Tile> = game.board.tiles().collect();
        board_tiles.sort_by_key(|t| (t.hex.q, t.hex.r));

        let mut roads: Vec<(&Edge, &PlayerColor)> = game.roads.iter().collect();
        roads.sort_by_key(|(e, _)| (e.hex.q, e.hex.r, e.direction));

        let mut settlements: Vec<(&Vertex, &Building)> = game.settlements.iter().collect();
        settlements.sort_by_key(|(v, _)| (v.hex.q, v.hex.r, v.direction));

        Self {
            players: game
                .players
                .iter()
                .map(|p| PlayerDoc {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    color: p.color,
                    resources: p.resources.to_counts(),
                    victory_points: p.victory_points,
                })
                .collect(),
            current_turn_index: game.current_turn_index,
            turn_phase: game.turn_phase,
            dice_roll: game.dice_roll,
            robber_hex: game.robber_hex.as_ref().map(HexDoc::encode),
            is_game_over: game.is_game_over,
            winner_name: game
                .winner
                .and_then(|i| game.players.get(i))
                .map(|p| p.name.clone()),
            board_tiles: board_tiles
                .into_iter()
                .map(|t| TileDoc {
                    hex: HexDoc::encode(&t.hex),
                    resource: TileResourceDoc::encode(t.kind),
                    number: t.number,
                })
                .collect(),
            board_ports: game
                .board
                .ports()
                .iter()
                .map(|p| PortDoc {
                    kind: PortKindDoc::encode(p.kind),
                    vertices: p.vertices.iter().map(VertexDoc::encode).collect(),
                })
                .collect(),
            roads: roads
                .into_iter()
                .map(|(e, color)| RoadDoc {
                    hex: HexDoc::encode(&e.hex),
                    direction: e.direction,
                    color: *color,
                })
                .collect(),
            settlements: settlements
                .into_iter()
                .map(|(v, b)| SettlementDoc {
                    hex: HexDoc::encode(&v.hex),
                    direction: v.direction,
                    owner: b.owner,
                    kind: b.kind,
                })
                .collect(),
            setup_queue: game.setup_queue.iter().copied().collect(),
            setup_waiting_for_road: game.setup_waiting_for_road,
        }
    }

    /// Rebuild a game, re-deriving canonical vertex/edge identity from the
    /// stored (hex, direction) pairs.
    pub fn decode(&self) -> Result<GameState, GameError> {
        let tiles = self
            .board_tiles
            .iter()
            .map(|t| {
                Ok(Tile {
                    hex: t.hex.decode()?,
                    kind: t.resource.decode(),
                    number: t.number,
                })
            })
            .collect::<Result<Vec<Tile>, GameError>>()?;

        let ports = self
            .board_ports
            .iter()
            .map(|p| {
                let vertices = p
                    .vertices
                    .iter()
                    .map(VertexDoc::decode)
                    .collect::<Result<Vec<Vertex>, GameError>>()?;
                let vertices: [Vertex; 2] =
                    vertices.try_into().map_err(|_| GameError::InvalidCoordinate)?;
                Ok(Port { kind: p.kind.decode(), vertices })
            })
            .collect::<Result<Vec<Port>, GameError>>()?;

        let players: Vec<Player> = self
            .players
            .iter()
            .map(|p| Player {
                id: p.id.clone(),
                name: p.name.clone(),
                color: p.color,
                resources: ResourceHand::from_counts(&p.resources),
                victory_points: p.victory_points,
            })
            .collect();

        let mut roads = std::collections::HashMap::new();
        for road in &self.roads {
            let edge = Edge::new(road.hex.decode()?, decode_direction(road.direction)?);
            roads.insert(edge, road.color);
        }

        let mut settlements = std::collections::HashMap::new();
        for s in &self.settlements {
            let vertex = Vertex::new(s.hex.decode()?, decode_direction(s.direction)?);
            settlements.insert(vertex, Building { owner: s.owner, kind: s.kind });
        }

        let winner = self
            .winner_name
            .as_ref()
            .and_then(|name| players.iter().position(|p| &p.name == name));

        Ok(GameState {
            board: Board::from_parts(tiles, ports),
            players,
            current_turn_index: self.current_turn_index,
            turn_phase: self.turn_phase,
            dice_roll: self.dice_roll,
            robber_hex: self.robber_hex.as_ref().map(|h| h.decode()).transpose()?,
            is_game_over: self.is_game_over,
            winner,
            roads,
            settlements,
            setup_queue: self.setup_queue.iter().copied().collect::<VecDeque<usize>>(),
            setup_waiting_for_road: self.setup_waiting_for_road,
        })
    }
}

impl GameState {
    /// Shorthand for [`GameStateDoc::encode`].
    pub fn to_doc(&self) -> GameStateDoc {
        GameStateDoc::encode(self)
    }

    /// Shorthand for [`GameStateDoc::decode`].
    pub fn from_doc(doc: &GameStateDoc) -> Result<Self, GameError> {
        doc.decode()
    }
}
