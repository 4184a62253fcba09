//! Game actions that players can take.
//!
//! This module defines the closed set of actions, the events that result
//! from them, and the per-phase legal action enumeration that agents plan
//! against.

use crate::board::{Board, EdgeKey, IntersectionKey, PlayerId, Resource};
use crate::hex::CubeCoord;
use crate::player::{costs, DevelopmentCard, Player, ResourceHand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// End your turn
    EndTurn,

    // ==================== Building ====================
    /// Build a settlement; `paid` is false for setup placements
    BuildSettlement {
        intersection: IntersectionKey,
        paid: bool,
    },
    /// Upgrade an own settlement to a city
    BuildCity {
        intersection: IntersectionKey,
        paid: bool,
    },
    /// Build a road; unpaid outside setup only with a free road available
    BuildRoad { edge: EdgeKey, paid: bool },

    // ==================== Development Cards ====================
    BuyDevelopmentCard,
    UseDevelopmentCard(DevelopmentCard),

    // ==================== Trading ====================
    /// Trade with the bank at 4:1, or a harbor at 3:1 or 2:1
    Trade {
        giving: ResourceHand,
        receiving: ResourceHand,
    },
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    DiceRolled {
        player: PlayerId,
        roll: (u8, u8),
        total: u8,
    },

    /// Resources were distributed after a dice roll
    ResourcesDistributed {
        distributions: Vec<(PlayerId, ResourceHand)>,
    },

    SettlementBuilt {
        player: PlayerId,
        location: IntersectionKey,
    },

    CityBuilt {
        player: PlayerId,
        location: IntersectionKey,
    },

    RoadBuilt {
        player: PlayerId,
        location: EdgeKey,
        free: bool,
    },

    DevelopmentCardPurchased { player: PlayerId },

    DevelopmentCardPlayed {
        player: PlayerId,
        card: DevelopmentCard,
    },

    /// Road building granted this many zero-cost roads
    FreeRoadsGranted { player: PlayerId, count: u32 },

    /// A resource was taken from the bank (year of plenty)
    ResourceGranted {
        player: PlayerId,
        resource: Resource,
    },

    MonopolyPlayed {
        player: PlayerId,
        resource: Resource,
        total_taken: u32,
    },

    RobberMoved {
        player: PlayerId,
        from: Option<CubeCoord>,
        to: CubeCoord,
    },

    /// A resource was stolen; `None` when the victim held nothing
    ResourceStolen {
        thief: PlayerId,
        victim: PlayerId,
        resource: Option<Resource>,
    },

    /// Player had to discard half their hand after a 7
    CardsDiscarded {
        player: PlayerId,
        discarded: ResourceHand,
    },

    /// Maritime trade completed
    Traded {
        player: PlayerId,
        gave: ResourceHand,
        received: ResourceHand,
    },

    /// Setup resources from the final placement round
    StartingResources {
        player: PlayerId,
        resources: ResourceHand,
    },

    LongestRoadChanged {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
        length: u32,
    },

    LargestArmyChanged {
        previous: Option<PlayerId>,
        current: Option<PlayerId>,
        knights: u32,
    },

    /// All setup placements are done
    SetupCompleted,

    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    GameWon {
        player: PlayerId,
        victory_points: u32,
    },
}

impl Action {
    /// Whether this action ends the player's turn
    pub fn ends_turn(&self) -> bool {
        matches!(self, Action::EndTurn)
    }
}

/// The single next placement during setup.
///
/// With no pending settlement this is every legal settlement spot (no road
/// needed); once a settlement is pending, the roads touching it.
pub fn setup_actions(
    board: &Board,
    player: &Player,
    pending_settlement: Option<IntersectionKey>,
) -> Vec<Action> {
    match pending_settlement {
        Some(anchor) => board
            .edges
            .keys()
            .filter(|e| board.is_valid_road_location(e, player.id, Some(anchor)))
            .map(|e| Action::BuildRoad {
                edge: *e,
                paid: false,
            })
            .collect(),
        None => board
            .intersections
            .keys()
            .filter(|k| board.is_valid_settlement_location(k, player.id, false))
            .map(|k| Action::BuildSettlement {
                intersection: *k,
                paid: false,
            })
            .collect(),
    }
}

/// Every legal main-phase action, filtered by affordability. `EndTurn` comes first.
pub fn main_actions(board: &Board, player: &Player, allow_cooldown: bool) -> Vec<Action> {
    let mut actions = vec![Action::EndTurn];

    if player.settlements_remaining > 0 && player.can_afford(&costs::settlement()) {
        actions.extend(
            board
                .intersections
                .keys()
                .filter(|k| board.is_valid_settlement_location(k, player.id, true))
                .map(|k| Action::BuildSettlement {
                    intersection: *k,
                    paid: true,
                }),
        );
    }

    if player.cities_remaining > 0 && player.can_afford(&costs::city()) {
        actions.extend(
            player
                .settlements
                .iter()
                .filter(|k| board.is_valid_city_location(k, player.id))
                .map(|k| Action::BuildCity {
                    intersection: *k,
                    paid: true,
                }),
        );
    }

    let free_road = player.free_roads_remaining > 0;
    if player.roads_remaining > 0 && (free_road || player.can_afford(&costs::road())) {
        actions.extend(
            board
                .edges
                .keys()
                .filter(|e| board.is_valid_road_location(e, player.id, None))
                .map(|e| Action::BuildRoad {
                    edge: *e,
                    paid: !free_road,
                }),
        );
    }

    if !board.development_cards.is_empty() && player.can_afford(&costs::development_card()) {
        actions.push(Action::BuyDevelopmentCard);
    }

    let playable: BTreeSet<DevelopmentCard> = player
        .dev_cards
        .iter()
        .chain(&player.dev_cards_bought_this_turn)
        .copied()
        .filter(|card| player.can_play(*card, allow_cooldown))
        .collect();
    actions.extend(playable.into_iter().map(Action::UseDevelopmentCard));

    actions.extend(trade_actions(board, player));
    actions
}

/// Maritime trades at the best rate available for each held resource
pub fn trade_actions(board: &Board, player: &Player) -> Vec<Action> {
    let mut actions = Vec::new();
    for giving in Resource::ALL {
        let rate = player.best_trade_rate(board, giving);
        if player.resources.get(giving) < rate {
            continue;
        }
        for receiving in Resource::ALL.into_iter().filter(|r| *r != giving) {
            actions.push(Action::Trade {
                giving: ResourceHand::single(giving, rate),
                receiving: ResourceHand::single(receiving, 1),
            });
        }
    }
    actions
}
