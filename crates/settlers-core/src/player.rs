//! Player state and resource management.
//!
//! This module contains:
//! - Player struct with resources, pieces, development cards and awards
//! - ResourceHand for managing resource counts
//! - Development card types and the standard deck
//! - Building costs
//! - Longest road search over a player's own roads

use crate::board::{Board, EdgeKey, Harbor, IntersectionKey, PlayerId, Resource};
use crate::game::GameError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Player color for rendering collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
    Orange,
    White,
}

impl PlayerColor {
    /// Get color for a player index
    pub fn for_player(id: PlayerId) -> Self {
        match id % 4 {
            0 => PlayerColor::Red,
            1 => PlayerColor::Blue,
            2 => PlayerColor::Orange,
            _ => PlayerColor::White,
        }
    }
}

/// Buildable piece kinds, each with a finite per-player inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Piece {
    Settlement,
    City,
    Road,
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Piece::Settlement => "settlement",
            Piece::City => "city",
            Piece::Road => "road",
        };
        f.write_str(name)
    }
}

/// Development card types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DevelopmentCard {
    /// Move robber and steal, counts toward Largest Army
    Knight,
    /// Worth 1 VP, never played
    VictoryPoint,
    /// Place up to 2 roads for free
    RoadBuilding,
    /// Take 2 resources from the bank
    YearOfPlenty,
    /// Every other player hands over all of one resource
    Monopoly,
}

impl DevelopmentCard {
    /// Create the standard development card deck (25 cards)
    pub fn standard_deck() -> Vec<DevelopmentCard> {
        let mut deck = Vec::with_capacity(25);
        deck.extend(std::iter::repeat(DevelopmentCard::Knight).take(14));
        deck.extend(std::iter::repeat(DevelopmentCard::VictoryPoint).take(5));
        deck.extend(std::iter::repeat(DevelopmentCard::RoadBuilding).take(2));
        deck.extend(std::iter::repeat(DevelopmentCard::YearOfPlenty).take(2));
        deck.extend(std::iter::repeat(DevelopmentCard::Monopoly).take(2));
        deck
    }

    /// Whether this card can be played (VP cards are never "played")
    pub fn is_playable(&self) -> bool {
        !matches!(self, DevelopmentCard::VictoryPoint)
    }
}

/// A hand of resources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub wood: u32,
    pub grain: u32,
    pub sheep: u32,
    pub ore: u32,
    pub brick: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, grain: u32, sheep: u32, ore: u32, brick: u32) -> Self {
        Self {
            wood,
            grain,
            sheep,
            ore,
            brick,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        Resource::ALL.iter().map(|r| self.get(*r)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Grain => self.grain,
            Resource::Sheep => self.sheep,
            Resource::Ore => self.ore,
            Resource::Brick => self.brick,
        }
    }

    fn slot_mut(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Wood => &mut self.wood,
            Resource::Grain => &mut self.grain,
            Resource::Sheep => &mut self.sheep,
            Resource::Ore => &mut self.ore,
            Resource::Brick => &mut self.brick,
        }
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot_mut(resource) += amount;
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for (resource, amount) in other.iter() {
            self.add(resource, amount);
        }
    }

    /// Remove up to `amount`, returning how many were removed
    pub fn remove(&mut self, resource: Resource, amount: u32) -> u32 {
        let slot = self.slot_mut(resource);
        let removed = amount.min(*slot);
        *slot -= removed;
        removed
    }

    /// Remove every card of one resource, returning the count
    pub fn take_all(&mut self, resource: Resource) -> u32 {
        std::mem::take(self.slot_mut(resource))
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL.iter().all(|r| self.get(*r) >= cost.get(*r))
    }

    /// Try to subtract, returning false (and leaving the hand untouched) if insufficient
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for (resource, amount) in cost.iter() {
            self.remove(resource, amount);
        }
        true
    }

    /// Non-zero entries in resource order
    pub fn iter(&self) -> impl Iterator<Item = (Resource, u32)> + '_ {
        Resource::ALL
            .iter()
            .map(|r| (*r, self.get(*r)))
            .filter(|(_, amount)| *amount > 0)
    }

    /// One entry per card, in resource order
    pub fn cards(&self) -> Vec<Resource> {
        self.iter()
            .flat_map(|(resource, amount)| std::iter::repeat(resource).take(amount as usize))
            .collect()
    }

    /// Remove `n` cards chosen uniformly at random.
    ///
    /// Fails without touching the hand if fewer than `n` cards are held.
    pub fn take_random<R: Rng + ?Sized>(
        &mut self,
        n: u32,
        rng: &mut R,
    ) -> Result<ResourceHand, GameError> {
        let held = self.total();
        if n > held {
            return Err(GameError::InsufficientResources { requested: n, held });
        }
        let mut taken = ResourceHand::new();
        for resource in self.cards().choose_multiple(rng, n as usize) {
            taken.add(*resource, 1);
        }
        for (resource, amount) in taken.iter() {
            self.remove(resource, amount);
        }
        Ok(taken)
    }
}

impl fmt::Display for ResourceHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(r, n)| format!("{n} {r}")).collect();
        if parts.is_empty() {
            f.write_str("nothing")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 wood, 1 brick
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 0, 0, 0, 1)
    }

    /// Cost to build a settlement: 1 wood, 1 grain, 1 sheep, 1 brick
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 0, 1)
    }

    /// Cost to upgrade to city: 2 grain, 3 ore
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 2, 0, 3, 0)
    }

    /// Cost to buy a development card: 1 grain, 1 sheep, 1 ore
    pub fn development_card() -> ResourceHand {
        ResourceHand::with_amounts(0, 1, 1, 1, 0)
    }
}

pub const MAX_SETTLEMENTS: u32 = 5;
pub const MAX_CITIES: u32 = 4;
pub const MAX_ROADS: u32 = 15;

/// A single player's ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub color: PlayerColor,
    pub resources: ResourceHand,
    /// Unplayed development cards that may be played this turn
    pub dev_cards: Vec<DevelopmentCard>,
    /// Development cards bought this turn (on cooldown until the turn ends)
    pub dev_cards_bought_this_turn: Vec<DevelopmentCard>,
    pub played_cards: Vec<DevelopmentCard>,
    pub settlements_remaining: u32,
    pub cities_remaining: u32,
    pub roads_remaining: u32,
    /// Every settled intersection, including those since upgraded to cities
    pub settlements: BTreeSet<IntersectionKey>,
    pub cities: BTreeSet<IntersectionKey>,
    pub roads: BTreeSet<EdgeKey>,
    /// Cached result of the last longest-road search
    pub longest_road_size: u32,
    pub has_longest_road: bool,
    pub has_largest_army: bool,
    /// Knights played
    pub army_size: u32,
    /// Zero-cost roads left from a Road Building card
    pub free_roads_remaining: u32,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            color: PlayerColor::for_player(id),
            resources: ResourceHand::new(),
            dev_cards: Vec::new(),
            dev_cards_bought_this_turn: Vec::new(),
            played_cards: Vec::new(),
            settlements_remaining: MAX_SETTLEMENTS,
            cities_remaining: MAX_CITIES,
            roads_remaining: MAX_ROADS,
            settlements: BTreeSet::new(),
            cities: BTreeSet::new(),
            roads: BTreeSet::new(),
            longest_road_size: 0,
            has_longest_road: false,
            has_largest_army: false,
            army_size: 0,
            free_roads_remaining: 0,
        }
    }

    /// Remaining inventory for a piece kind
    pub fn remaining(&self, piece: Piece) -> u32 {
        match piece {
            Piece::Settlement => self.settlements_remaining,
            Piece::City => self.cities_remaining,
            Piece::Road => self.roads_remaining,
        }
    }

    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        self.resources.can_afford(cost)
    }

    /// Deduct a cost from the ledger
    pub fn pay_for(&mut self, cost: &ResourceHand) -> Result<(), GameError> {
        if self.resources.try_subtract(cost) {
            Ok(())
        } else {
            Err(GameError::CannotAfford)
        }
    }

    /// Receive resources (from the bank or another player)
    pub fn give(&mut self, hand: &ResourceHand) {
        self.resources.add_hand(hand);
    }

    /// Record a settlement placed on the board
    pub fn record_settlement(&mut self, key: IntersectionKey) {
        self.settlements_remaining -= 1;
        self.settlements.insert(key);
    }

    /// Record a city upgrade (returns the settlement piece)
    pub fn record_city(&mut self, key: IntersectionKey) {
        self.cities_remaining -= 1;
        self.settlements_remaining += 1;
        self.cities.insert(key);
    }

    pub fn record_road(&mut self, key: EdgeKey) {
        self.roads_remaining -= 1;
        self.roads.insert(key);
    }

    /// Add a freshly bought card (on cooldown)
    pub fn receive_development_card(&mut self, card: DevelopmentCard) {
        self.dev_cards_bought_this_turn.push(card);
    }

    /// Whether a card may be played right now
    pub fn can_play(&self, card: DevelopmentCard, allow_cooldown: bool) -> bool {
        card.is_playable()
            && (self.dev_cards.contains(&card)
                || (allow_cooldown && self.dev_cards_bought_this_turn.contains(&card)))
    }

    /// Move a card from hand to the played pile
    pub fn play_development_card(
        &mut self,
        card: DevelopmentCard,
        allow_cooldown: bool,
    ) -> Result<(), GameError> {
        if !card.is_playable() {
            return Err(GameError::CardNotPlayable(card));
        }
        if let Some(pos) = self.dev_cards.iter().position(|c| *c == card) {
            self.dev_cards.remove(pos);
        } else if let Some(pos) = self.dev_cards_bought_this_turn.iter().position(|c| *c == card) {
            if !allow_cooldown {
                return Err(GameError::CardOnCooldown(card));
            }
            self.dev_cards_bought_this_turn.remove(pos);
        } else {
            return Err(GameError::NoSuchCard(card));
        }

        if card == DevelopmentCard::Knight {
            self.army_size += 1;
        }
        self.played_cards.push(card);
        Ok(())
    }

    /// Called at end of turn: bought cards become playable, free roads expire
    pub fn end_turn(&mut self) {
        self.dev_cards.append(&mut self.dev_cards_bought_this_turn);
        self.free_roads_remaining = 0;
    }

    /// Victory point cards held, whether bought this turn or not
    pub fn victory_point_cards(&self) -> u32 {
        self.dev_cards
            .iter()
            .chain(&self.dev_cards_bought_this_turn)
            .chain(&self.played_cards)
            .filter(|c| **c == DevelopmentCard::VictoryPoint)
            .count() as u32
    }

    /// Derived victory points. A city counts once as a settlement and once as a city.
    pub fn victory_points(&self) -> u32 {
        let mut vp = self.settlements.len() as u32 + self.cities.len() as u32;
        vp += self.victory_point_cards();
        if self.has_longest_road {
            vp += 2;
        }
        if self.has_largest_army {
            vp += 2;
        }
        vp
    }

    /// Best bank rate available for trading away `resource`
    pub fn best_trade_rate(&self, board: &Board, resource: Resource) -> u32 {
        if board.has_harbor(self.id, Harbor::Specific(resource)) {
            2
        } else if board.has_harbor(self.id, Harbor::Generic) {
            3
        } else {
            4
        }
    }

    /// Whether giving `amount` of `resource` for one card is a permitted rate
    pub fn is_permitted_rate(&self, board: &Board, resource: Resource, amount: u32) -> bool {
        match amount {
            4 => true,
            3 => board.has_harbor(self.id, Harbor::Generic),
            2 => board.has_harbor(self.id, Harbor::Specific(resource)),
            _ => false,
        }
    }

    /// Length of the longest simple path through this player's roads.
    ///
    /// Every endpoint of an own road starts a backtracking search; a path may
    /// end at, but not pass through, an intersection held by another player.
    pub fn find_longest_road_size(&self, board: &Board) -> u32 {
        let starts: BTreeSet<IntersectionKey> = board
            .edges
            .values()
            .filter(|e| e.owner == Some(self.id))
            .flat_map(|e| e.key.endpoints())
            .collect();

        let mut used = BTreeSet::new();
        starts
            .into_iter()
            .map(|start| self.extend_road(board, start, &mut used, true))
            .max()
            .unwrap_or(0)
    }

    fn extend_road(
        &self,
        board: &Board,
        at: IntersectionKey,
        used: &mut BTreeSet<EdgeKey>,
        is_start: bool,
    ) -> u32 {
        let Some(intersection) = board.intersection(&at) else {
            return 0;
        };
        if !is_start && intersection.owner.is_some_and(|owner| owner != self.id) {
            return 0;
        }

        let mut best = 0;
        for edge in &intersection.edges {
            let owned = board.edge(edge).is_some_and(|e| e.owner == Some(self.id));
            if !owned || used.contains(edge) {
                continue;
            }
            let Some(next) = edge.other_endpoint(at) else {
                continue;
            };
            used.insert(*edge);
            best = best.max(1 + self.extend_road(board, next, used, false));
            used.remove(edge);
        }
        best
    }
}
