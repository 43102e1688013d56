//! The action surface a transport layer drives the engine through, and the
//! events it broadcasts back to game participants.
//!
//! `apply_action` is a thin dispatcher over the `GameState` methods: each
//! action either mutates the state and yields events, or fails with a
//! `GameError` the transport relays to the acting participant only.

use crate::board::Resource;
use crate::game::{GameError, GameState, ResourcePayout};
use crate::hex::{Edge, Hex, Vertex};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Everything a player can ask the engine to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameAction {
    RollDice,
    EndTurn,
    MoveRobber {
        hex: Hex,
    },
    StealResource {
        victim: usize,
    },
    PlaceRoad {
        edge: Edge,
        #[serde(default)]
        free: bool,
    },
    PlaceSettlement {
        vertex: Vertex,
        #[serde(default)]
        free: bool,
    },
    UpgradeToCity {
        vertex: Vertex,
    },
    TradeWithBank {
        give: Resource,
        get: Resource,
    },
}

/// What happened as a result of a successful action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    DiceRolled {
        player: usize,
        total: u8,
    },
    ResourcesDistributed {
        payouts: Vec<ResourcePayout>,
    },
    SettlementPlaced {
        player: usize,
        vertex: Vertex,
    },
    RoadPlaced {
        player: usize,
        edge: Edge,
        longest_road: u32,
    },
    CityUpgraded {
        player: usize,
        vertex: Vertex,
    },
    RobberMoved {
        player: usize,
        to: Hex,
    },
    ResourceStolen {
        thief: usize,
        victim: usize,
        resource: Resource,
    },
    BankTradeCompleted {
        player: usize,
        gave: Resource,
        gave_count: u32,
        received: Resource,
    },
    TurnEnded {
        player: usize,
        next_player: usize,
    },
    GameWon {
        player: usize,
        victory_points: u32,
    },
}

impl GameState {
    /// Apply one action on behalf of a seat. The caller persists the state
    /// after a success and broadcasts the events; on failure nothing
    /// changed and only the actor sees the reason.
    pub fn apply_action<R: Rng>(
        &mut self,
        player: usize,
        action: GameAction,
        rng: &mut R,
    ) -> Result<Vec<GameEvent>, GameError> {
        let was_over = self.is_game_over;
        let mut events = Vec::new();

        match action {
            GameAction::RollDice => {
                let (total, payouts) = self.roll_dice(player, rng)?;
                events.push(GameEvent::DiceRolled { player, total });
                if !payouts.is_empty() {
                    events.push(GameEvent::ResourcesDistributed { payouts });
                }
            }

            GameAction::EndTurn => {
                self.end_turn(player)?;
                if !self.is_game_over {
                    events.push(GameEvent::TurnEnded {
                        player,
                        next_player: self.current_turn_index,
                    });
                }
            }

            GameAction::MoveRobber { hex } => {
                self.move_robber(player, hex)?;
                events.push(GameEvent::RobberMoved { player, to: hex });
            }

            GameAction::StealResource { victim } => {
                let resource = self.steal_resource(player, victim, rng)?;
                events.push(GameEvent::ResourceStolen {
                    thief: player,
                    victim,
                    resource,
                });
            }

            GameAction::PlaceRoad { edge, free } => {
                let longest_road = self.place_road(player, edge, free)?;
                events.push(GameEvent::RoadPlaced {
                    player,
                    edge: edge.canonical(),
                    longest_road,
                });
            }

            GameAction::PlaceSettlement { vertex, free } => {
                let payouts = self.place_settlement(player, vertex, free)?;
                events.push(GameEvent::SettlementPlaced {
                    player,
                    vertex: vertex.canonical(),
                });
                if !payouts.is_empty() {
                    events.push(GameEvent::ResourcesDistributed { payouts });
                }
            }

            GameAction::UpgradeToCity { vertex } => {
                self.upgrade_to_city(player, vertex)?;
                events.push(GameEvent::CityUpgraded {
                    player,
                    vertex: vertex.canonical(),
                });
            }

            GameAction::TradeWithBank { give, get } => {
                let rate = self.trade_with_bank(player, give, get)?;
                events.push(GameEvent::BankTradeCompleted {
                    player,
                    gave: give,
                    gave_count: rate,
                    received: get,
                });
            }
        }

        if !was_over && self.is_game_over {
            if let Some(winner) = self.winner {
                events.push(GameEvent::GameWon {
                    player: winner,
                    victory_points: self.players[winner].victory_points,
                });
            }
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::TurnPhase;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn game() -> GameState {
        GameState::create_new_game_with_rng(
            vec!["Alice".to_string(), "Bob".to_string()],
            &mut StdRng::seed_from_u64(5),
        )
        .unwrap()
    }

    #[test]
    fn actions_round_trip_as_tagged_json() {
        let action = GameAction::PlaceSettlement {
            vertex: Vertex::new(Hex::new(0, 0), 0),
            free: false,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "place_settlement");
        let back: GameAction = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);

        // `free` defaults to false when a client omits it.
        let sparse: GameAction = serde_json::from_str(
            r#"{"type":"place_road","edge":{"hex":{"q":0,"r":0},"direction":1}}"#,
        )
        .unwrap();
        assert_eq!(
            sparse,
            GameAction::PlaceRoad { edge: Edge::new(Hex::new(0, 0), 1), free: false }
        );
    }

    #[test]
    fn dispatch_rejects_without_mutating() {
        let mut g = game();
        let mut rng = StdRng::seed_from_u64(1);
        let before_roads = g.roads.len();
        let err = g
            .apply_action(
                0,
                GameAction::TradeWithBank { give: Resource::Wood, get: Resource::Ore },
                &mut rng,
            )
            .unwrap_err();
        assert!(matches!(err, GameError::SetupOrderViolation(_)));
        assert_eq!(g.roads.len(), before_roads);
    }

    #[test]
    fn dispatch_emits_settlement_and_road_events() {
        let mut g = game();
        let mut rng = StdRng::seed_from_u64(2);
        let v = Vertex::new(Hex::new(0, 0), 0);

        let events = g
            .apply_action(0, GameAction::PlaceSettlement { vertex: v, free: true }, &mut rng)
            .unwrap();
        assert_eq!(events, vec![GameEvent::SettlementPlaced { player: 0, vertex: v }]);

        let edge = v.touching_edges()[0];
        let events = g
            .apply_action(0, GameAction::PlaceRoad { edge, free: true }, &mut rng)
            .unwrap();
        assert_eq!(
            events,
            vec![GameEvent::RoadPlaced { player: 0, edge, longest_road: 1 }]
        );
    }

    #[test]
    fn dispatch_reports_victory() {
        let mut g = game();
        let mut rng = StdRng::seed_from_u64(3);
        g.setup_queue.clear();
        g.turn_phase = TurnPhase::MainPhase;
        g.players[0].victory_points = 10;
        let events = g.apply_action(0, GameAction::EndTurn, &mut rng).unwrap();
        assert_eq!(
            events,
            vec![GameEvent::GameWon { player: 0, victory_points: 10 }]
        );
        assert!(g.is_game_over);
    }
}
