//! Player state: identity, resource inventory and the victory-point ledger.

use crate::board::Resource;
use crate::game::GameError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Seat colors, assigned in order at game creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    Red,
    Blue,
    White,
    Orange,
}

impl PlayerColor {
    pub const ALL: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::White,
        PlayerColor::Orange,
    ];
}

/// Per-resource counts. Doubles as a cost: building prices are hands too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub wood: u32,
    pub brick: u32,
    pub sheep: u32,
    pub wheat: u32,
    pub ore: u32,
}

impl ResourceHand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_amounts(wood: u32, brick: u32, sheep: u32, wheat: u32, ore: u32) -> Self {
        Self { wood, brick, sheep, wheat, ore }
    }

    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Brick => self.brick,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Ore => self.ore,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Wood => &mut self.wood,
            Resource::Brick => &mut self.brick,
            Resource::Sheep => &mut self.sheep,
            Resource::Wheat => &mut self.wheat,
            Resource::Ore => &mut self.ore,
        }
    }

    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot(resource) += amount;
    }

    /// Remove `amount` units, failing without change when short.
    pub fn remove(&mut self, resource: Resource, amount: u32) -> Result<(), GameError> {
        let slot = self.slot(resource);
        if *slot < amount {
            return Err(GameError::InsufficientResources(format!(
                "have {} {:?}, need {}",
                *slot, resource, amount
            )));
        }
        *slot -= amount;
        Ok(())
    }

    /// Pure affordability check against a cost.
    pub fn has(&self, cost: &ResourceHand) -> bool {
        Resource::ALL.iter().all(|&r| self.get(r) >= cost.get(r))
    }

    /// Pay a cost in full, or fail with no deduction at all.
    pub fn deduct(&mut self, cost: &ResourceHand) -> Result<(), GameError> {
        if !self.has(cost) {
            return Err(GameError::InsufficientResources(
                "cannot pay the full cost".to_string(),
            ));
        }
        for resource in Resource::ALL {
            *self.slot(resource) -= cost.get(resource);
        }
        Ok(())
    }

    pub fn total(&self) -> u32 {
        self.wood + self.brick + self.sheep + self.wheat + self.ore
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Non-zero counts in stable resource order, for the wire format.
    pub fn to_counts(&self) -> BTreeMap<Resource, u32> {
        Resource::ALL
            .into_iter()
            .filter(|&r| self.get(r) > 0)
            .map(|r| (r, self.get(r)))
            .collect()
    }

    pub fn from_counts(counts: &BTreeMap<Resource, u32>) -> Self {
        let mut hand = Self::new();
        for (&resource, &amount) in counts {
            hand.add(resource, amount);
        }
        hand
    }
}

/// Building prices.
pub mod costs {
    use super::ResourceHand;

    /// Road: 1 wood + 1 brick.
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 0, 0, 0)
    }

    /// Settlement: 1 each of wood, brick, sheep and wheat.
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    }

    /// City upgrade: 3 ore + 2 wheat.
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 0, 2, 3)
    }
}

/// One seated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identifier the transport layer addresses this player by.
    pub id: String,
    pub name: String,
    pub color: PlayerColor,
    pub resources: ResourceHand,
    pub victory_points: u32,
}

impl Player {
    pub fn new(id: String, name: String, color: PlayerColor) -> Self {
        Self {
            id,
            name,
            color,
            resources: ResourceHand::new(),
            victory_points: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove() {
        let mut hand = ResourceHand::new();
        hand.add(Resource::Wood, 1);
        assert_eq!(hand.get(Resource::Wood), 1);
        hand.remove(Resource::Wood, 1).unwrap();
        assert_eq!(hand.get(Resource::Wood), 0);
    }

    #[test]
    fn remove_insufficient_fails_without_change() {
        let mut hand = ResourceHand::with_amounts(0, 1, 0, 0, 0);
        let err = hand.remove(Resource::Brick, 2).unwrap_err();
        assert!(matches!(err, GameError::InsufficientResources(_)));
        assert_eq!(hand.get(Resource::Brick), 1);
    }

    #[test]
    fn affordability_check() {
        let mut hand = ResourceHand::new();
        hand.add(Resource::Wood, 1);
        hand.add(Resource::Brick, 1);
        assert!(hand.has(&costs::road()));
        assert!(!hand.has(&costs::city()));
    }

    #[test]
    fn deduct_is_all_or_nothing() {
        let mut hand = ResourceHand::with_amounts(2, 1, 0, 0, 0);
        hand.deduct(&costs::road()).unwrap();
        assert_eq!(hand, ResourceHand::with_amounts(1, 0, 0, 0, 0));

        // A failed deduction must not touch any counter.
        let before = hand;
        assert!(hand.deduct(&costs::settlement()).is_err());
        assert_eq!(hand, before);
    }

    #[test]
    fn building_costs() {
        assert_eq!(costs::road().total(), 2);
        assert_eq!(costs::settlement().total(), 4);
        assert_eq!(costs::city().total(), 5);
        assert_eq!(costs::city().get(Resource::Ore), 3);
        assert_eq!(costs::city().get(Resource::Wheat), 2);
    }

    #[test]
    fn counts_round_trip_skips_zeroes() {
        let hand = ResourceHand::with_amounts(3, 0, 1, 0, 2);
        let counts = hand.to_counts();
        assert_eq!(counts.len(), 3);
        assert_eq!(ResourceHand::from_counts(&counts), hand);
    }
}
