//! Hex grid geometry: cube coordinates and canonical vertex/edge identity.
//!
//! The board uses cube coordinates (q, r, s) with the invariant q + r + s = 0;
//! only `q` and `r` are stored, `s` is derived. Directions 0-5 run
//! counter-clockwise starting east and all direction arithmetic is mod 6.
//!
//! Corners and sides are the subtle part: the same physical corner can be
//! written from up to 3 hexes and the same side from 2. `Vertex` and `Edge`
//! therefore canonicalize in their constructors, so equality, hashing and map
//! keys always refer to the single canonical encoding.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::{Add, Sub};

/// The six unit direction vectors as (q, r) deltas, counter-clockwise from
/// east: (1,0,-1), (1,-1,0), (0,-1,1), (-1,0,1), (-1,1,0), (0,1,-1).
const DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// A hex tile position in cube coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The derived third coordinate; q + r + s = 0 always holds.
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Build a hex from a full cube triple, rejecting triples that violate
    /// the q + r + s = 0 invariant (used at the serialization boundary).
    pub fn from_cube(q: i32, r: i32, s: i32) -> Result<Self, crate::game::GameError> {
        if q + r + s != 0 {
            return Err(crate::game::GameError::InvalidCoordinate);
        }
        Ok(Self { q, r })
    }

    /// The neighbor one step away in the given direction (0-5, mod 6).
    pub fn neighbor(&self, direction: u8) -> Hex {
        let (dq, dr) = DIRECTIONS[(direction % 6) as usize];
        Hex::new(self.q + dq, self.r + dr)
    }

    /// All six neighbors, in direction order.
    pub fn neighbors(&self) -> [Hex; 6] {
        [0, 1, 2, 3, 4, 5].map(|d| self.neighbor(d))
    }

    /// Distance from the origin in hex steps.
    pub fn length(&self) -> u32 {
        ((self.q.abs() + self.r.abs() + self.s().abs()) / 2) as u32
    }

    /// Distance to another hex in hex steps.
    pub fn distance(&self, other: &Hex) -> u32 {
        (*self - *other).length()
    }

    /// Lexicographic (q, r, s) key used to pick canonical representatives.
    fn cube_key(&self) -> (i32, i32, i32) {
        (self.q, self.r, self.s())
    }
}

impl Add for Hex {
    type Output = Hex;

    fn add(self, other: Hex) -> Hex {
        Hex::new(self.q + other.q, self.r + other.r)
    }
}

impl Sub for Hex {
    type Output = Hex;

    fn sub(self, other: Hex) -> Hex {
        Hex::new(self.q - other.q, self.r - other.r)
    }
}

/// A corner of the hex grid, where settlements and cities are built.
///
/// Corner `d` of a hex is the one shared with its neighbors in directions
/// `d-1` and `d`, so every corner has three equivalent (hex, direction)
/// encodings. The constructor canonicalizes, which makes the derived
/// equality and hashing canonical-form identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vertex {
    pub hex: Hex,
    pub direction: u8,
}

impl Vertex {
    /// Create a vertex, immediately resolved to its canonical encoding.
    pub fn new(hex: Hex, direction: u8) -> Self {
        Self { hex, direction: direction % 6 }.canonical()
    }

    const fn raw(hex: Hex, direction: u8) -> Self {
        Self { hex, direction }
    }

    /// The three equivalent encodings of this corner:
    /// (h, d), (h.neighbor(d+5), d+2) and (h.neighbor(d), d+4).
    fn equivalents(&self) -> [Vertex; 3] {
        let d = self.direction % 6;
        [
            Vertex::raw(self.hex, d),
            Vertex::raw(self.hex.neighbor((d + 5) % 6), (d + 2) % 6),
            Vertex::raw(self.hex.neighbor(d), (d + 4) % 6),
        ]
    }

    /// The canonical encoding: the equivalent with the lexicographically
    /// smallest (q, r, s, direction). Identical for all equivalent inputs.
    pub fn canonical(self) -> Self {
        let [first, second, third] = self.equivalents();
        let mut best = first;
        for candidate in [second, third] {
            if (candidate.hex.cube_key(), candidate.direction) < (best.hex.cube_key(), best.direction)
            {
                best = candidate;
            }
        }
        best
    }

    /// The 3 hexes sharing this corner.
    pub fn touching_hexes(&self) -> [Hex; 3] {
        self.equivalents().map(|v| v.hex)
    }

    /// The 3 edges meeting at this corner: the forward edge at `direction`,
    /// the backward edge at `direction - 1`, and the spine edge running away
    /// between the two neighboring hexes. All canonical.
    pub fn touching_edges(&self) -> [Edge; 3] {
        let d = self.direction % 6;
        [
            Edge::new(self.hex, d),
            Edge::new(self.hex, (d + 5) % 6),
            Edge::new(self.hex.neighbor((d + 5) % 6), (d + 1) % 6),
        ]
    }

    /// The vertices exactly one edge away, used by the distance rule.
    pub fn adjacent_vertices(&self) -> [Vertex; 3] {
        let me = self.canonical();
        self.touching_edges().map(|edge| {
            let [a, b] = edge.vertices();
            if a == me {
                b
            } else {
                a
            }
        })
    }
}

/// A side of the hex grid, where roads are built.
///
/// Side `d` of a hex is shared with exactly one neighbor, whose own encoding
/// of the same side is direction `(d + 3) % 6`. The constructor picks the
/// lexicographically smaller of the two encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub hex: Hex,
    pub direction: u8,
}

impl Edge {
    /// Create an edge, immediately resolved to its canonical encoding.
    pub fn new(hex: Hex, direction: u8) -> Self {
        Self { hex, direction: direction % 6 }.canonical()
    }

    const fn raw(hex: Hex, direction: u8) -> Self {
        Self { hex, direction }
    }

    /// The canonical encoding: the lexicographically smaller of the two
    /// (hex, direction) pairs describing this side.
    pub fn canonical(self) -> Self {
        let d = self.direction % 6;
        let mine = Edge::raw(self.hex, d);
        let other = Edge::raw(self.hex.neighbor(d), (d + 3) % 6);
        if (mine.hex.cube_key(), mine.direction) <= (other.hex.cube_key(), other.direction) {
            mine
        } else {
            other
        }
    }

    /// The 2 hexes sharing this side.
    pub fn touching_hexes(&self) -> [Hex; 2] {
        [self.hex, self.hex.neighbor(self.direction)]
    }

    /// The 2 corners at the ends of this side, canonical.
    pub fn vertices(&self) -> [Vertex; 2] {
        let d = self.direction % 6;
        [Vertex::new(self.hex, d), Vertex::new(self.hex, (d + 1) % 6)]
    }

    /// The edges sharing either endpoint with this one (at most 4), used for
    /// road connectivity and the longest-road search.
    pub fn connected_edges(&self) -> Vec<Edge> {
        let me = self.canonical();
        let mut connected = HashSet::new();
        for vertex in me.vertices() {
            for edge in vertex.touching_edges() {
                if edge != me {
                    connected.insert(edge);
                }
            }
        }
        connected.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_invariant_holds() {
        let h = Hex::new(3, -5);
        assert_eq!(h.q + h.r + h.s(), 0);
        assert!(Hex::from_cube(1, 1, 1).is_err());
        assert_eq!(Hex::from_cube(0, -1, 1).unwrap(), Hex::new(0, -1));
    }

    #[test]
    fn addition_and_subtraction() {
        let a = Hex::new(1, -2);
        let b = Hex::new(2, -1);
        assert_eq!(a + b, Hex::new(3, -3));
        assert_eq!(a - b, Hex::new(-1, -1));
    }

    #[test]
    fn distance_between_hexes() {
        assert_eq!(Hex::new(0, 0).distance(&Hex::new(2, -2)), 2);
        assert_eq!(Hex::new(-3, 1).distance(&Hex::new(-3, 1)), 0);
        assert_eq!(Hex::new(0, 0).distance(&Hex::new(2, -1)), 2);
    }

    #[test]
    fn neighbor_round_trip() {
        // Stepping in direction d then d+3 must return to the start.
        let h = Hex::new(2, -1);
        for d in 0..6 {
            assert_eq!(h.neighbor(d).neighbor((d + 3) % 6), h);
        }
    }

    #[test]
    fn six_distinct_neighbors_at_distance_one() {
        let center = Hex::new(0, 0);
        let neighbors = center.neighbors();
        let unique: HashSet<_> = neighbors.iter().collect();
        assert_eq!(unique.len(), 6);
        for n in &neighbors {
            assert_eq!(center.distance(n), 1);
        }
        assert_eq!(center.neighbor(0), Hex::new(1, 0));
    }

    #[test]
    fn vertex_equivalent_encodings_canonicalize_identically() {
        let h = Hex::new(0, 0);
        // Corner 0 of the center is also corner 2 of the neighbor at 5 and
        // corner 4 of the neighbor at 0.
        let v1 = Vertex::new(h, 0);
        let v2 = Vertex::new(h.neighbor(5), 2);
        let v3 = Vertex::new(h.neighbor(0), 4);
        assert_eq!(v1, v2);
        assert_eq!(v1, v3);
    }

    #[test]
    fn vertex_canonical_is_idempotent_everywhere() {
        for q in -2..=2 {
            for r in -2..=2 {
                for d in 0..6 {
                    let v = Vertex::new(Hex::new(q, r), d);
                    assert_eq!(v, v.canonical());
                }
            }
        }
    }

    #[test]
    fn vertex_touches_three_distinct_hexes() {
        let v = Vertex::new(Hex::new(0, 0), 0);
        let unique: HashSet<_> = v.touching_hexes().into_iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn vertex_touching_edges_share_the_vertex() {
        for d in 0..6 {
            let v = Vertex::new(Hex::new(1, -1), d);
            let edges = v.touching_edges();
            let unique: HashSet<_> = edges.iter().collect();
            assert_eq!(unique.len(), 3);
            for edge in edges {
                assert!(edge.vertices().contains(&v));
            }
        }
    }

    #[test]
    fn adjacent_vertices_are_distinct_neighbors() {
        let v = Vertex::new(Hex::new(0, 0), 0);
        let adjacent = v.adjacent_vertices();
        let unique: HashSet<_> = adjacent.iter().collect();
        assert_eq!(unique.len(), 3);
        for a in adjacent {
            assert_ne!(a, v);
            // Each adjacent vertex shares exactly one edge with v.
            let shared: Vec<_> = a
                .touching_edges()
                .into_iter()
                .filter(|e| v.touching_edges().contains(e))
                .collect();
            assert_eq!(shared.len(), 1);
        }
    }

    #[test]
    fn edge_equivalent_encodings_canonicalize_identically() {
        let h = Hex::new(0, 0);
        for d in 0..6 {
            let e1 = Edge::new(h, d);
            let e2 = Edge::new(h.neighbor(d), (d + 3) % 6);
            assert_eq!(e1, e2);
        }
    }

    #[test]
    fn edge_endpoints_are_distinct_and_one_step_apart() {
        let e = Edge::new(Hex::new(0, 0), 1);
        let [a, b] = e.vertices();
        assert_ne!(a, b);
        assert!(a.adjacent_vertices().contains(&b));
    }

    #[test]
    fn edge_endpoints_agree_for_both_encodings() {
        let h = Hex::new(0, -1);
        for d in 0..6 {
            let mine: HashSet<_> = Edge::raw(h, d).vertices().into_iter().collect();
            let other: HashSet<_> = Edge::raw(h.neighbor(d), (d + 3) % 6)
                .vertices()
                .into_iter()
                .collect();
            assert_eq!(mine, other);
        }
    }

    #[test]
    fn edge_connects_to_four_edges() {
        let e = Edge::new(Hex::new(0, 0), 0);
        let connected = e.connected_edges();
        assert_eq!(connected.len(), 4);
        assert!(!connected.contains(&e));
        // Connectivity is symmetric.
        for c in connected {
            assert!(c.connected_edges().contains(&e));
        }
    }

    #[test]
    fn hex_has_six_distinct_corners_and_sides() {
        let h = Hex::new(0, 0);
        let corners: HashSet<_> = (0..6).map(|d| Vertex::new(h, d)).collect();
        let sides: HashSet<_> = (0..6).map(|d| Edge::new(h, d)).collect();
        assert_eq!(corners.len(), 6);
        assert_eq!(sides.len(), 6);
    }
}
