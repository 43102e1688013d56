//! Game board: the tile grid and the fixed port list.
//!
//! The board is generated once at game start and immutable afterwards; the
//! moving parts of a game (roads, settlements, the robber) live on the game
//! state. Tiles are stored in a map keyed by hex coordinate for O(1) lookup.

use crate::hex::{Hex, Vertex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The five producing resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Wood,
    Brick,
    Sheep,
    Wheat,
    Ore,
}

impl Resource {
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Brick,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Ore,
    ];
}

/// What a tile is made of: a producing resource or the barren desert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    Resource(Resource),
    Desert,
}

/// A single board tile. The number token is absent exactly for the desert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub hex: Hex,
    pub kind: TileKind,
    pub number: Option<u8>,
}

impl Tile {
    /// A producing tile with its dice number token.
    pub fn producing(hex: Hex, resource: Resource, number: u8) -> Self {
        Self { hex, kind: TileKind::Resource(resource), number: Some(number) }
    }

    /// The desert tile; never produces and carries no number token.
    pub fn desert(hex: Hex) -> Self {
        Self { hex, kind: TileKind::Desert, number: None }
    }

    /// The resource this tile pays out, if any.
    pub fn resource(&self) -> Option<Resource> {
        match self.kind {
            TileKind::Resource(r) => Some(r),
            TileKind::Desert => None,
        }
    }

    pub fn is_desert(&self) -> bool {
        matches!(self.kind, TileKind::Desert)
    }
}

/// Port flavor: 3:1 on anything, or 2:1 on one specific resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortKind {
    Generic,
    Specific(Resource),
}

impl PortKind {
    /// Units of the given resource per unit received from the bank.
    pub fn rate(&self) -> u32 {
        match self {
            PortKind::Generic => 3,
            PortKind::Specific(_) => 2,
        }
    }
}

/// A port and the two corners whose building owners it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub kind: PortKind,
    pub vertices: [Vertex; 2],
}

impl Port {
    fn at(kind: PortKind, hex: Hex) -> Self {
        Self { kind, vertices: [Vertex::new(hex, 0), Vertex::new(hex, 1)] }
    }
}

/// The generated board: tiles keyed by coordinate plus the fixed ports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    tiles: HashMap<Hex, Tile>,
    ports: Vec<Port>,
}

impl Board {
    /// Rebuild a board from stored parts; tiles with duplicate coordinates
    /// collapse to the last one, matching map semantics.
    pub fn from_parts(tiles: Vec<Tile>, ports: Vec<Port>) -> Self {
        Self {
            tiles: tiles.into_iter().map(|t| (t.hex, t)).collect(),
            ports,
        }
    }

    /// Generate the standard radius-2 board with a fresh thread RNG.
    pub fn create_standard() -> Self {
        Self::create_standard_with_rng(&mut rand::thread_rng())
    }

    /// Generate the standard radius-2 board: 19 tiles, the fixed resource and
    /// number-token multisets assigned by two independent shuffles, and the
    /// fixed port list. No constraint keeps 6s and 8s apart.
    pub fn create_standard_with_rng<R: Rng>(rng: &mut R) -> Self {
        // 4 wood, 4 sheep, 4 wheat, 3 brick, 3 ore and the single desert.
        let mut resources: Vec<Option<Resource>> = Vec::with_capacity(19);
        for (resource, count) in [
            (Resource::Wood, 4),
            (Resource::Sheep, 4),
            (Resource::Wheat, 4),
            (Resource::Brick, 3),
            (Resource::Ore, 3),
        ] {
            resources.extend(std::iter::repeat(Some(resource)).take(count));
        }
        resources.push(None);

        // Number tokens for the 18 producing tiles; no 7.
        let mut numbers: Vec<u8> = vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

        resources.shuffle(rng);
        numbers.shuffle(rng);

        let mut tiles = HashMap::with_capacity(19);
        let mut next_number = numbers.into_iter();
        for hex in Self::grid_coords(2) {
            let tile = match resources.pop().expect("one resource per grid hex") {
                Some(resource) => {
                    let number = next_number.next().expect("one token per producing tile");
                    Tile::producing(hex, resource, number)
                }
                None => Tile::desert(hex),
            };
            tiles.insert(hex, tile);
        }

        Self { tiles, ports: Self::standard_ports() }
    }

    /// All cube coordinates with |q|, |r|, |q+r| <= radius; 19 for radius 2.
    fn grid_coords(radius: i32) -> Vec<Hex> {
        let mut coords = Vec::new();
        for q in -radius..=radius {
            let r_lo = (-radius).max(-q - radius);
            let r_hi = radius.min(-q + radius);
            for r in r_lo..=r_hi {
                coords.push(Hex::new(q, r));
            }
        }
        coords
    }

    /// The fixed port list: four generic 3:1 ports and one 2:1 port per
    /// resource, spread around the rim. Each serves the two canonical corners
    /// of its rim hex.
    fn standard_ports() -> Vec<Port> {
        vec![
            Port::at(PortKind::Generic, Hex::new(0, -2)),
            Port::at(PortKind::Specific(Resource::Wood), Hex::new(1, -2)),
            Port::at(PortKind::Generic, Hex::new(2, -1)),
            Port::at(PortKind::Specific(Resource::Brick), Hex::new(2, 0)),
            Port::at(PortKind::Specific(Resource::Sheep), Hex::new(0, 2)),
            Port::at(PortKind::Generic, Hex::new(-1, 2)),
            Port::at(PortKind::Specific(Resource::Wheat), Hex::new(-2, 2)),
            Port::at(PortKind::Generic, Hex::new(-2, 0)),
            Port::at(PortKind::Specific(Resource::Ore), Hex::new(-1, -1)),
        ]
    }

    /// O(1) tile lookup by coordinate.
    pub fn get_tile(&self, hex: &Hex) -> Option<&Tile> {
        self.tiles.get(hex)
    }

    pub fn contains(&self, hex: &Hex) -> bool {
        self.tiles.contains_key(hex)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// The board tiles sharing the given corner (at most 3).
    pub fn tiles_at_vertex(&self, vertex: &Vertex) -> Vec<&Tile> {
        vertex
            .touching_hexes()
            .iter()
            .filter_map(|h| self.tiles.get(h))
            .collect()
    }

    /// The desert tile's coordinate, where the robber starts.
    pub fn desert_hex(&self) -> Option<Hex> {
        self.tiles.values().find(|t| t.is_desert()).map(|t| t.hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn standard_board_has_19_tiles() {
        let board = Board::create_standard();
        assert_eq!(board.tiles().count(), 19);
    }

    #[test]
    fn standard_resource_distribution() {
        let board = Board::create_standard();
        let mut counts: HashMap<Option<Resource>, u32> = HashMap::new();
        for tile in board.tiles() {
            *counts.entry(tile.resource()).or_insert(0) += 1;
        }
        assert_eq!(counts.get(&Some(Resource::Wood)), Some(&4));
        assert_eq!(counts.get(&Some(Resource::Sheep)), Some(&4));
        assert_eq!(counts.get(&Some(Resource::Wheat)), Some(&4));
        assert_eq!(counts.get(&Some(Resource::Brick)), Some(&3));
        assert_eq!(counts.get(&Some(Resource::Ore)), Some(&3));
        assert_eq!(counts.get(&None), Some(&1));
    }

    #[test]
    fn standard_number_distribution() {
        let board = Board::create_standard();
        let numbers: Vec<u8> = board.tiles().filter_map(|t| t.number).collect();
        assert_eq!(numbers.len(), 18);
        assert!(!numbers.contains(&7));

        let mut counts: HashMap<u8, u32> = HashMap::new();
        for n in numbers {
            *counts.entry(n).or_insert(0) += 1;
        }
        assert_eq!(counts.get(&2), Some(&1));
        assert_eq!(counts.get(&12), Some(&1));
        for n in [3, 4, 5, 6, 8, 9, 10, 11] {
            assert_eq!(counts.get(&n), Some(&2), "expected two {n} tokens");
        }
    }

    #[test]
    fn desert_has_no_number() {
        let board = Board::create_standard();
        let deserts: Vec<&Tile> = board.tiles().filter(|t| t.is_desert()).collect();
        assert_eq!(deserts.len(), 1);
        assert_eq!(deserts[0].number, None);
        assert_eq!(board.desert_hex(), Some(deserts[0].hex));
    }

    #[test]
    fn coordinate_lookup() {
        let board = Board::create_standard();
        let center = Hex::new(0, 0);
        let tile = board.get_tile(&center).expect("center tile exists");
        assert_eq!(tile.hex, center);
        assert!(board.get_tile(&Hex::new(10, -10)).is_none());
    }

    #[test]
    fn standard_port_list() {
        let board = Board::create_standard();
        let ports = board.ports();
        assert_eq!(ports.len(), 9);

        let generic = ports.iter().filter(|p| p.kind == PortKind::Generic).count();
        assert_eq!(generic, 4);
        for resource in Resource::ALL {
            assert_eq!(
                ports
                    .iter()
                    .filter(|p| p.kind == PortKind::Specific(resource))
                    .count(),
                1,
                "expected one 2:1 port for {resource:?}"
            );
        }

        // Port vertices are stored canonical.
        for port in ports {
            for v in &port.vertices {
                assert_eq!(*v, v.canonical());
            }
        }
    }

    #[test]
    fn seeded_generation_is_deterministic() {
        let a = Board::create_standard_with_rng(&mut StdRng::seed_from_u64(7));
        let b = Board::create_standard_with_rng(&mut StdRng::seed_from_u64(7));
        for tile in a.tiles() {
            assert_eq!(b.get_tile(&tile.hex), Some(tile));
        }
    }

    #[test]
    fn generation_varies_across_seeds() {
        let a = Board::create_standard_with_rng(&mut StdRng::seed_from_u64(1));
        let mut found_different = false;
        for seed in 2..12 {
            let b = Board::create_standard_with_rng(&mut StdRng::seed_from_u64(seed));
            if a.tiles().any(|t| b.get_tile(&t.hex) != Some(t)) {
                found_different = true;
                break;
            }
        }
        assert!(found_different, "shuffled boards should differ across seeds");
    }
}
