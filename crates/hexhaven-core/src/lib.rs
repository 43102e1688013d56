//! Hexhaven - the authoritative rules engine for a hex-grid settlement game.
//!
//! This crate owns the rules: it maintains game state, enforces every
//! placement, resource and trading rule, and computes derived facts such as
//! each player's longest contiguous road. It performs no I/O; transport,
//! persistence and process wiring live in the surrounding service, which
//! serializes the whole state through [`serial`] after every action.
//!
//! # Modules
//!
//! - [`hex`]: cube coordinates and canonical vertex/edge geometry
//! - [`board`]: tile grid generation and ports
//! - [`player`]: resource inventories and the victory-point ledger
//! - [`game`]: the turn/phase state machine
//! - [`actions`]: the action surface a transport layer drives
//! - [`serial`]: the primitive-tree mapping used for storage

pub mod actions;
pub mod board;
pub mod game;
pub mod hex;
pub mod player;
pub mod serial;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use board::{Board, Port, PortKind, Resource, Tile, TileKind};
pub use game::{
    Building, BuildingKind, GameError, GameState, ResourcePayout, TurnPhase,
    VICTORY_POINTS_TO_WIN,
};
pub use hex::{Edge, Hex, Vertex};
pub use player::{costs, Player, PlayerColor, ResourceHand};
pub use serial::GameStateDoc;
