//! Decision makers that drive a game.
//!
//! The engine calls back into an [`Agent`] whenever the current player has a
//! choice to make. Two scripted agents are provided:
//! - `RandomAgent`: uniform choice among legal options, seeded
//! - `HeuristicAgent`: greedy builder scoring spots by dice pips

use crate::actions::Action;
use crate::board::{IntersectionKey, PlayerId, Resource};
use crate::game::GameState;
use crate::hex::CubeCoord;
use crate::player::costs;
use rand::prelude::*;

/// Callback contract between the engine and whoever makes decisions.
///
/// Every call is made on behalf of `state.current_player`. Returned values
/// are applied as-is; an illegal answer surfaces as a `GameError` from the
/// engine call that asked.
pub trait Agent {
    /// Pick one of `legal_actions` (never empty)
    fn choose_action(&mut self, state: &GameState, legal_actions: &[Action]) -> Action;

    /// Pick the tile the robber moves to; must differ from its current tile
    fn choose_robber_tile(&mut self, state: &GameState) -> CubeCoord;

    /// Pick whom to rob among `candidates` (never empty)
    fn choose_steal_target(&mut self, state: &GameState, candidates: &[PlayerId]) -> PlayerId;

    /// The resource the player wants most (Year of Plenty and Monopoly)
    fn choose_needed_resource(&mut self, state: &GameState) -> Resource;
}

/// Tiles the robber may move to
fn robber_targets(state: &GameState) -> Vec<CubeCoord> {
    let current = state.board.robber_location();
    state
        .board
        .tiles
        .keys()
        .copied()
        .filter(|c| Some(*c) != current)
        .collect()
}

// ==================== Random ====================

/// Picks uniformly among whatever is legal
pub struct RandomAgent {
    rng: StdRng,
}

impl RandomAgent {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl Agent for RandomAgent {
    fn choose_action(&mut self, _state: &GameState, legal_actions: &[Action]) -> Action {
        legal_actions
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or(Action::EndTurn)
    }

    fn choose_robber_tile(&mut self, state: &GameState) -> CubeCoord {
        robber_targets(state)
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(CubeCoord::ORIGIN)
    }

    fn choose_steal_target(&mut self, state: &GameState, candidates: &[PlayerId]) -> PlayerId {
        candidates
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(state.current_player)
    }

    fn choose_needed_resource(&mut self, _state: &GameState) -> Resource {
        Resource::ALL.choose(&mut self.rng).copied().unwrap_or(Resource::Wood)
    }
}

// ==================== Heuristic ====================

/// Greedy agent: build the best-scoring thing it can, otherwise end the turn.
///
/// Priority: settlement, city, road, play a card, buy a card, trade for a
/// needed resource, end turn.
#[derive(Debug, Default, Clone)]
pub struct HeuristicAgent;

impl HeuristicAgent {
    pub fn new() -> Self {
        Self
    }

    /// Dice pips of bordering tiles + distinct resources + open roads
    pub fn settlement_score(state: &GameState, key: &IntersectionKey) -> u32 {
        let Some(intersection) = state.board.intersection(key) else {
            return 0;
        };
        let tiles: Vec<_> = intersection
            .tiles
            .iter()
            .filter_map(|c| state.board.tile(c))
            .collect();
        let pips: u32 = tiles.iter().map(|t| t.pips()).sum();
        let mut kinds: Vec<Resource> = tiles.iter().filter_map(|t| t.resource).collect();
        kinds.sort();
        kinds.dedup();
        let open_roads = intersection
            .edges
            .iter()
            .filter(|e| state.board.edge(e).is_some_and(|edge| edge.owner.is_none()))
            .count();
        pips + kinds.len() as u32 + open_roads as u32
    }

    /// Value of the best settlement spot a road would reach
    fn road_score(state: &GameState, action: &Action) -> u32 {
        let Action::BuildRoad { edge, .. } = action else {
            return 0;
        };
        let me = state.current_player;
        edge.endpoints()
            .iter()
            .filter(|k| state.board.is_valid_settlement_location(k, me, false))
            .map(|k| Self::settlement_score(state, k))
            .max()
            .unwrap_or(0)
    }

    fn city_score(state: &GameState, action: &Action) -> u32 {
        let Action::BuildCity { intersection, .. } = action else {
            return 0;
        };
        state
            .board
            .intersection(intersection)
            .map(|i| {
                i.tiles
                    .iter()
                    .filter_map(|c| state.board.tile(c))
                    .map(|t| t.pips())
                    .sum::<u32>()
            })
            .unwrap_or(0)
    }

    fn best_by<F>(actions: &[Action], matches: fn(&Action) -> bool, score: F) -> Option<Action>
    where
        F: Fn(&Action) -> u32,
    {
        actions
            .iter()
            .filter(|a| matches(*a))
            .max_by_key(|a| score(*a))
            .cloned()
    }

    /// First resource missing for a settlement, city or road; else the scarcest held
    pub fn needed_resource(state: &GameState) -> Resource {
        let hand = &state.current().resources;
        for cost in [costs::settlement(), costs::city(), costs::road()] {
            if let Some(missing) = Resource::ALL.into_iter().find(|r| hand.get(*r) < cost.get(*r)) {
                return missing;
            }
        }
        Resource::ALL
            .into_iter()
            .min_by_key(|r| hand.get(*r))
            .unwrap_or(Resource::Wood)
    }
}

impl Agent for HeuristicAgent {
    fn choose_action(&mut self, state: &GameState, legal_actions: &[Action]) -> Action {
        let settlement = Self::best_by(
            legal_actions,
            |a| matches!(a, Action::BuildSettlement { .. }),
            |a| match a {
                Action::BuildSettlement { intersection, .. } => Self::settlement_score(state, intersection),
                _ => 0,
            },
        );
        let city = || {
            Self::best_by(
                legal_actions,
                |a| matches!(a, Action::BuildCity { .. }),
                |a| Self::city_score(state, a),
            )
        };
        let road = || {
            Self::best_by(
                legal_actions,
                |a| matches!(a, Action::BuildRoad { .. }),
                |a| Self::road_score(state, a),
            )
        };
        let card = || {
            legal_actions
                .iter()
                .find(|a| matches!(a, Action::UseDevelopmentCard(_)))
                .cloned()
        };
        let buy = || {
            legal_actions
                .iter()
                .find(|a| matches!(a, Action::BuyDevelopmentCard))
                .cloned()
        };
        let trade = || {
            let needed = Self::needed_resource(state);
            legal_actions
                .iter()
                .find(|a| match a {
                    Action::Trade { giving, receiving } => {
                        receiving.get(needed) > 0 && giving.get(needed) == 0
                    }
                    _ => false,
                })
                .cloned()
        };

        settlement
            .or_else(city)
            .or_else(road)
            .or_else(card)
            .or_else(buy)
            .or_else(trade)
            .unwrap_or(Action::EndTurn)
    }

    /// Tile with the most opponent buildings, never the robber's current tile
    fn choose_robber_tile(&mut self, state: &GameState) -> CubeCoord {
        let me = state.current_player;
        let opponent_buildings = |coord: &CubeCoord| -> usize {
            state
                .board
                .tile(coord)
                .map(|t| {
                    t.intersections
                        .iter()
                        .filter_map(|k| state.board.intersection(k))
                        .filter(|i| i.has_settlement && i.owner.is_some_and(|o| o != me))
                        .count()
                })
                .unwrap_or(0)
        };
        let targets = robber_targets(state);
        let mut best: Option<(usize, CubeCoord)> = None;
        for coord in targets {
            let score = opponent_buildings(&coord);
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, coord));
            }
        }
        best.map(|(_, coord)| coord).unwrap_or(CubeCoord::ORIGIN)
    }

    /// Richest candidate
    fn choose_steal_target(&mut self, state: &GameState, candidates: &[PlayerId]) -> PlayerId {
        candidates
            .iter()
            .copied()
            .max_by_key(|id| {
                let held = state.player(*id).map(|p| p.resources.total()).unwrap_or(0);
                (held, std::cmp::Reverse(*id))
            })
            .unwrap_or(state.current_player)
    }

    fn choose_needed_resource(&mut self, state: &GameState) -> Resource {
        Self::needed_resource(state)
    }
}
