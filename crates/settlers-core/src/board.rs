//! Board topology, harbors, and the resource/number layout.
//!
//! This module contains:
//! - Resource and harbor types
//! - Tiles, intersections and edges stored in an arena keyed by coordinate
//! - The board builder (tile expansion, intersection and edge creation)
//! - Harbor assignment and the randomized layout with its 6/8 repair pass
//! - Placement legality predicates and production queries
//!
//! Cross references between tiles, intersections and edges are keys into the
//! board's ordered maps, never pointers. Ordered maps keep iteration (and so
//! every seeded random draw) reproducible.

use crate::game::GameError;
use crate::hex::{CubeCoord, Direction};
use crate::player::{DevelopmentCard, ResourceHand};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{debug, warn};

/// Player identifier (index into the game's seat order)
pub type PlayerId = u8;

/// The five resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Wood,
    Grain,
    Sheep,
    Ore,
    Brick,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Grain,
        Resource::Sheep,
        Resource::Ore,
        Resource::Brick,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Wood => "wood",
            Resource::Grain => "grain",
            Resource::Sheep => "sheep",
            Resource::Ore => "ore",
            Resource::Brick => "brick",
        };
        f.write_str(name)
    }
}

/// Harbor types for maritime trading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Harbor {
    /// 3:1 trade any resource
    Generic,
    /// 2:1 trade for a specific resource
    Specific(Resource),
}

impl Harbor {
    /// The exchange rate for this harbor
    pub fn rate(&self) -> u32 {
        match self {
            Harbor::Generic => 3,
            Harbor::Specific(_) => 2,
        }
    }

    /// Four generic harbors plus one 2:1 harbor per resource
    pub fn standard_pool() -> Vec<Harbor> {
        let mut pool = vec![Harbor::Generic; 4];
        pool.extend(Resource::ALL.iter().map(|r| Harbor::Specific(*r)));
        pool
    }
}

/// Dice numbers handed out to producing tiles
pub const NUMBER_POOL: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Resource supply, cycled across producing tiles (4/4/4/3/3 on the standard board)
pub const RESOURCE_CYCLE: [Resource; 5] = [
    Resource::Wood,
    Resource::Grain,
    Resource::Sheep,
    Resource::Ore,
    Resource::Brick,
];

/// Coastal harbor anchors: a tile and the two corner indices that carry the harbor
pub const HARBOR_ANCHORS: [(CubeCoord, usize, usize); 9] = [
    (CubeCoord::new(1, -2, 1), 0, 1),
    (CubeCoord::new(2, -1, -1), 0, 1),
    (CubeCoord::new(2, 0, -2), 1, 2),
    (CubeCoord::new(1, 1, -2), 2, 3),
    (CubeCoord::new(-1, 2, -1), 2, 3),
    (CubeCoord::new(-2, 2, 0), 3, 4),
    (CubeCoord::new(-2, 1, 1), 4, 5),
    (CubeCoord::new(-1, -1, 2), 4, 5),
    (CubeCoord::new(0, -2, 2), 5, 0),
];

/// Numbers whose tiles may not touch each other
fn is_hot(number: Option<u8>) -> bool {
    matches!(number, Some(6 | 8))
}

/// Number of dice combinations that roll `number`
pub fn pips(number: u8) -> u32 {
    match number {
        2..=12 if number != 7 => 6 - (7 - number as i32).unsigned_abs(),
        _ => 0,
    }
}

/// Key of an intersection: the first tile that created it plus its corner index there.
///
/// Every tile bordering the intersection stores this same key in its slot, so
/// equality is structural rather than by reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntersectionKey {
    pub tile: CubeCoord,
    pub corner: u8,
}

impl IntersectionKey {
    pub fn new(tile: CubeCoord, corner: usize) -> Self {
        Self {
            tile,
            corner: (corner % 6) as u8,
        }
    }

    /// Lattice position of this corner (identical for every bordering tile)
    pub fn position(&self) -> CubeCoord {
        self.tile.corner(self.corner as usize)
    }
}

impl fmt::Display for IntersectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.tile, self.corner)
    }
}

/// Key of an edge: its two endpoints, stored in sorted order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    a: IntersectionKey,
    b: IntersectionKey,
}

impl EdgeKey {
    pub fn new(x: IntersectionKey, y: IntersectionKey) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    pub fn endpoints(&self) -> [IntersectionKey; 2] {
        [self.a, self.b]
    }

    pub fn touches(&self, key: IntersectionKey) -> bool {
        self.a == key || self.b == key
    }

    /// The endpoint opposite `key`, if `key` is an endpoint
    pub fn other_endpoint(&self, key: IntersectionKey) -> Option<IntersectionKey> {
        if self.a == key {
            Some(self.b)
        } else if self.b == key {
            Some(self.a)
        } else {
            None
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

/// A single hex tile on the board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub coord: CubeCoord,
    /// `None` for the desert
    pub resource: Option<Resource>,
    /// Dice number that triggers production (None for the desert)
    pub number: Option<u8>,
    pub has_robber: bool,
    /// Neighboring tiles by direction; `None` only off the coast
    pub neighbors: [Option<CubeCoord>; 6],
    /// Intersections by corner index
    pub intersections: [IntersectionKey; 6],
    /// Edges by side index; side `i` joins corners `i` and `i + 1`
    pub edges: [EdgeKey; 6],
}

impl Tile {
    pub fn is_desert(&self) -> bool {
        self.resource.is_none()
    }

    /// Production weight of this tile's number
    pub fn pips(&self) -> u32 {
        self.number.map(pips).unwrap_or(0)
    }
}

/// A corner where settlements and cities stand
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intersection {
    pub key: IntersectionKey,
    pub owner: Option<PlayerId>,
    pub has_settlement: bool,
    /// Only ever set on top of an existing settlement
    pub has_city: bool,
    pub harbor: Option<Harbor>,
    /// Bordering tiles (1 to 3)
    pub tiles: Vec<CubeCoord>,
    /// Incident edges (2 or 3)
    pub edges: Vec<EdgeKey>,
    /// Intersections one edge away
    pub neighbors: Vec<IntersectionKey>,
}

impl Intersection {
    fn new(key: IntersectionKey) -> Self {
        Self {
            key,
            owner: None,
            has_settlement: false,
            has_city: false,
            harbor: None,
            tiles: Vec::with_capacity(3),
            edges: Vec::with_capacity(3),
            neighbors: Vec::with_capacity(3),
        }
    }

    /// Resource multiplier of the building here
    pub fn production_multiplier(&self) -> u32 {
        if self.has_city {
            2
        } else if self.has_settlement {
            1
        } else {
            0
        }
    }
}

/// A road slot between two intersections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub key: EdgeKey,
    pub owner: Option<PlayerId>,
    /// Bordering tiles (1 or 2)
    pub tiles: Vec<CubeCoord>,
}

/// Builder scratch slots for one tile
#[derive(Debug, Default)]
struct TileSlots {
    neighbors: [Option<CubeCoord>; 6],
    intersections: [Option<IntersectionKey>; 6],
    edges: [Option<EdgeKey>; 6],
}

/// Serializable board view with list-shaped collections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub size: u32,
    pub robber: Option<CubeCoord>,
    pub tiles: Vec<Tile>,
    pub intersections: Vec<Intersection>,
    pub edges: Vec<Edge>,
    pub development_cards_remaining: usize,
}

/// The complete game board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    /// Number of tile rings including the center tile
    pub size: u32,
    pub tiles: BTreeMap<CubeCoord, Tile>,
    pub intersections: BTreeMap<IntersectionKey, Intersection>,
    pub edges: BTreeMap<EdgeKey, Edge>,
    /// Draw pile; the top card is the last element
    pub development_cards: Vec<DevelopmentCard>,
}

impl Board {
    /// Build a fully randomized board: topology, harbors, layout and deck
    pub fn build<R: Rng>(size: u32, rng: &mut R, max_swaps: usize) -> Self {
        let mut board = Self::blank(size);
        board.assign_harbors(rng);
        board.assign_layout(rng, max_swaps);
        let mut deck = DevelopmentCard::standard_deck();
        deck.shuffle(rng);
        board.development_cards = deck;
        board
    }

    /// Build the topology only: every tile is a desert without number or robber.
    ///
    /// # Panics
    ///
    /// Panics if a tile ends up with an empty intersection or edge slot, which
    /// would be a defect in the builder itself.
    pub fn blank(size: u32) -> Self {
        let size = size.max(1);
        let mut slots: BTreeMap<CubeCoord, TileSlots> = BTreeMap::new();
        slots.insert(CubeCoord::ORIGIN, TileSlots::default());

        for _ in 1..size {
            let known: Vec<CubeCoord> = slots.keys().copied().collect();
            for coord in known {
                extend_in_all_directions(&mut slots, coord);
            }
        }
        connect_existing_neighbors(&mut slots);

        let mut intersections = create_intersections(&mut slots);
        let edges = create_edges(&mut slots, &mut intersections);

        let tiles = slots
            .into_iter()
            .map(|(coord, slot)| {
                let tile = Tile {
                    coord,
                    resource: None,
                    number: None,
                    has_robber: false,
                    neighbors: slot.neighbors,
                    intersections: slot.intersections.map(|key| {
                        key.unwrap_or_else(|| panic!("tile {coord} has an empty intersection slot"))
                    }),
                    edges: slot
                        .edges
                        .map(|key| key.unwrap_or_else(|| panic!("tile {coord} has an empty edge slot"))),
                };
                (coord, tile)
            })
            .collect();

        Self {
            size,
            tiles,
            intersections,
            edges,
            development_cards: Vec::new(),
        }
    }

    // ==================== Harbors ====================

    /// Tag the nine coastal anchor pairs with a shuffled harbor pool.
    ///
    /// Returns the number of anchors that received a harbor; anchors missing
    /// from a non-standard board are skipped.
    pub fn assign_harbors<R: Rng>(&mut self, rng: &mut R) -> usize {
        let mut pool = Harbor::standard_pool();
        pool.shuffle(rng);

        let mut placed = 0;
        for (&(coord, a, b), harbor) in HARBOR_ANCHORS.iter().zip(pool) {
            let Some(tile) = self.tiles.get(&coord) else {
                warn!(%coord, "harbor anchor not on board, skipping");
                continue;
            };
            let keys = [tile.intersections[a], tile.intersections[b]];
            for key in keys {
                if let Some(intersection) = self.intersections.get_mut(&key) {
                    intersection.harbor = Some(harbor);
                }
            }
            placed += 1;
        }
        placed
    }

    // ==================== Layout ====================

    /// Pick a desert, deal resources and numbers, then repair 6/8 adjacency
    pub fn assign_layout<R: Rng>(&mut self, rng: &mut R, max_swaps: usize) {
        let coords: Vec<CubeCoord> = self.tiles.keys().copied().collect();
        let Some(&desert) = coords.choose(rng) else {
            return;
        };
        let producing = coords.len() - 1;

        let mut resources: Vec<Resource> =
            RESOURCE_CYCLE.iter().cycle().take(producing).copied().collect();
        let mut numbers: Vec<u8> = NUMBER_POOL.iter().cycle().take(producing).copied().collect();
        resources.shuffle(rng);
        numbers.shuffle(rng);

        for (coord, tile) in self.tiles.iter_mut() {
            if *coord == desert {
                tile.resource = None;
                tile.number = None;
                tile.has_robber = true;
            } else {
                tile.resource = resources.pop();
                tile.number = numbers.pop();
                tile.has_robber = false;
            }
        }

        self.repair_number_layout(rng, max_swaps);
    }

    /// First pair of adjacent tiles that both carry a 6 or an 8
    pub fn find_hot_conflict(&self) -> Option<(CubeCoord, CubeCoord)> {
        self.tiles
            .values()
            .filter(|tile| is_hot(tile.number))
            .find_map(|tile| {
                tile.neighbors
                    .iter()
                    .flatten()
                    .find(|n| is_hot(self.tiles[*n].number))
                    .map(|n| (tile.coord, *n))
            })
    }

    /// Whether the tile at `coord` would be free of hot neighbors while
    /// carrying `number`, treating `partner` as carrying `partner_number`.
    fn complies_after_swap(
        &self,
        coord: CubeCoord,
        number: Option<u8>,
        partner: CubeCoord,
        partner_number: Option<u8>,
    ) -> bool {
        if !is_hot(number) {
            return true;
        }
        self.tiles[&coord].neighbors.iter().flatten().all(|n| {
            let neighbor_number = if *n == partner {
                partner_number
            } else {
                self.tiles[n].number
            };
            !is_hot(neighbor_number)
        })
    }

    /// Swap conflicting tiles with random compliant candidates until no 6/8
    /// tiles touch, no candidate exists, or `max_swaps` is reached.
    ///
    /// Returns the number of swaps performed.
    pub fn repair_number_layout<R: Rng>(&mut self, rng: &mut R, max_swaps: usize) -> usize {
        let mut swaps = 0;
        while let Some((tile, _)) = self.find_hot_conflict() {
            if swaps >= max_swaps {
                warn!(swaps, "number layout repair hit its swap limit");
                break;
            }
            let tile_number = self.tiles[&tile].number;
            let candidates: Vec<CubeCoord> = self
                .tiles
                .values()
                .filter(|c| c.coord != tile)
                .filter(|c| {
                    self.complies_after_swap(tile, c.number, c.coord, tile_number)
                        && self.complies_after_swap(c.coord, tile_number, tile, c.number)
                })
                .map(|c| c.coord)
                .collect();

            let Some(&candidate) = candidates.choose(rng) else {
                warn!(%tile, "no swap resolves 6/8 adjacency");
                break;
            };
            debug!(%tile, %candidate, "swapping tiles to separate 6/8");
            self.swap_tiles(tile, candidate);
            swaps += 1;
        }
        swaps
    }

    /// Exchange resource, number and robber state of two tiles
    pub fn swap_tiles(&mut self, a: CubeCoord, b: CubeCoord) {
        if a == b {
            return;
        }
        let (Some(first), Some(second)) = (self.tiles.get(&a), self.tiles.get(&b)) else {
            return;
        };
        let first = (first.resource, first.number, first.has_robber);
        let second = (second.resource, second.number, second.has_robber);
        if let Some(tile) = self.tiles.get_mut(&a) {
            (tile.resource, tile.number, tile.has_robber) = second;
        }
        if let Some(tile) = self.tiles.get_mut(&b) {
            (tile.resource, tile.number, tile.has_robber) = first;
        }
    }

    // ==================== Query Methods ====================

    pub fn tile(&self, coord: &CubeCoord) -> Option<&Tile> {
        self.tiles.get(coord)
    }

    pub fn intersection(&self, key: &IntersectionKey) -> Option<&Intersection> {
        self.intersections.get(key)
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&Edge> {
        self.edges.get(key)
    }

    /// Intersection at a tile corner
    pub fn intersection_at(&self, coord: CubeCoord, corner: usize) -> Option<IntersectionKey> {
        self.tiles.get(&coord).map(|t| t.intersections[corner % 6])
    }

    /// Edge on a tile side
    pub fn edge_at(&self, coord: CubeCoord, side: usize) -> Option<EdgeKey> {
        self.tiles.get(&coord).map(|t| t.edges[side % 6])
    }

    /// Tile currently holding the robber
    pub fn robber_location(&self) -> Option<CubeCoord> {
        self.tiles.values().find(|t| t.has_robber).map(|t| t.coord)
    }

    /// Harbors reachable from the player's buildings
    pub fn harbors_of(&self, player: PlayerId) -> BTreeSet<Harbor> {
        self.intersections
            .values()
            .filter(|i| i.owner == Some(player))
            .filter_map(|i| i.harbor)
            .collect()
    }

    pub fn has_harbor(&self, player: PlayerId, harbor: Harbor) -> bool {
        self.intersections
            .values()
            .any(|i| i.owner == Some(player) && i.harbor == Some(harbor))
    }

    /// Owners of buildings on a tile
    pub fn players_on_tile(&self, coord: &CubeCoord) -> BTreeSet<PlayerId> {
        let Some(tile) = self.tiles.get(coord) else {
            return BTreeSet::new();
        };
        tile.intersections
            .iter()
            .filter_map(|key| self.intersections.get(key))
            .filter(|i| i.has_settlement)
            .filter_map(|i| i.owner)
            .collect()
    }

    /// Resources each player receives for a dice roll; robber tiles produce nothing
    pub fn production_for_roll(&self, roll: u8) -> BTreeMap<PlayerId, ResourceHand> {
        let mut production: BTreeMap<PlayerId, ResourceHand> = BTreeMap::new();
        for tile in self.tiles.values() {
            if tile.number != Some(roll) || tile.has_robber {
                continue;
            }
            let Some(resource) = tile.resource else {
                continue;
            };
            for key in &tile.intersections {
                let intersection = &self.intersections[key];
                if let Some(owner) = intersection.owner {
                    let amount = intersection.production_multiplier();
                    if amount > 0 {
                        production.entry(owner).or_default().add(resource, amount);
                    }
                }
            }
        }
        production
    }

    // ==================== Validation Methods ====================

    /// Unowned, no settled neighbor, and (unless bypassed) touching an own road
    pub fn is_valid_settlement_location(
        &self,
        key: &IntersectionKey,
        player: PlayerId,
        needs_road: bool,
    ) -> bool {
        let Some(intersection) = self.intersections.get(key) else {
            return false;
        };
        intersection.owner.is_none()
            && self.satisfies_distance_rule(intersection)
            && (!needs_road || self.touches_own_road(intersection, player))
    }

    /// No neighboring intersection carries a building
    fn satisfies_distance_rule(&self, intersection: &Intersection) -> bool {
        intersection
            .neighbors
            .iter()
            .all(|n| !self.intersections[n].has_settlement)
    }

    fn touches_own_road(&self, intersection: &Intersection, player: PlayerId) -> bool {
        intersection
            .edges
            .iter()
            .any(|e| self.edges[e].owner == Some(player))
    }

    /// Own settlement that is not yet a city
    pub fn is_valid_city_location(&self, key: &IntersectionKey, player: PlayerId) -> bool {
        self.intersections.get(key).is_some_and(|i| {
            i.owner == Some(player) && i.has_settlement && !i.has_city
        })
    }

    /// Unowned edge connected to the player's network.
    ///
    /// With `setup_anchor` set, the edge must instead touch that settlement.
    pub fn is_valid_road_location(
        &self,
        key: &EdgeKey,
        player: PlayerId,
        setup_anchor: Option<IntersectionKey>,
    ) -> bool {
        let Some(edge) = self.edges.get(key) else {
            return false;
        };
        if edge.owner.is_some() {
            return false;
        }
        if let Some(anchor) = setup_anchor {
            return key.touches(anchor);
        }
        key.endpoints().iter().any(|endpoint| {
            let intersection = &self.intersections[endpoint];
            match intersection.owner {
                Some(owner) => owner == player,
                None => self.touches_own_road(intersection, player),
            }
        })
    }

    // ==================== Mutation Methods ====================

    pub fn place_settlement(&mut self, key: &IntersectionKey, player: PlayerId) {
        if let Some(intersection) = self.intersections.get_mut(key) {
            intersection.owner = Some(player);
            intersection.has_settlement = true;
        }
    }

    pub fn upgrade_to_city(&mut self, key: &IntersectionKey) {
        if let Some(intersection) = self.intersections.get_mut(key) {
            intersection.has_city = true;
        }
    }

    pub fn place_road(&mut self, key: &EdgeKey, player: PlayerId) {
        if let Some(edge) = self.edges.get_mut(key) {
            edge.owner = Some(player);
        }
    }

    /// Move the robber, returning the tile it left
    pub fn move_robber(&mut self, to: CubeCoord) -> Result<Option<CubeCoord>, GameError> {
        if !self.tiles.contains_key(&to) {
            return Err(GameError::UnknownTile(to));
        }
        let from = self.robber_location();
        if from == Some(to) {
            return Err(GameError::RobberMustMove);
        }
        for tile in self.tiles.values_mut() {
            tile.has_robber = tile.coord == to;
        }
        Ok(from)
    }

    pub fn draw_development_card(&mut self) -> Option<DevelopmentCard> {
        self.development_cards.pop()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            size: self.size,
            robber: self.robber_location(),
            tiles: self.tiles.values().cloned().collect(),
            intersections: self.intersections.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
            development_cards_remaining: self.development_cards.len(),
        }
    }
}

// ==================== Builder ====================

fn link(slots: &mut BTreeMap<CubeCoord, TileSlots>, from: CubeCoord, dir: Direction) {
    let to = from.neighbor(dir);
    if let Some(slot) = slots.get_mut(&from) {
        slot.neighbors[dir.index()] = Some(to);
    }
    if let Some(slot) = slots.get_mut(&to) {
        slot.neighbors[dir.opposite().index()] = Some(from);
    }
}

/// Create every unseen neighbor of `coord` and link both sides
fn extend_in_all_directions(slots: &mut BTreeMap<CubeCoord, TileSlots>, coord: CubeCoord) {
    for dir in Direction::ALL {
        let target = coord.neighbor(dir);
        if !slots.contains_key(&target) {
            slots.insert(target, TileSlots::default());
            link(slots, coord, dir);
        }
    }
}

/// Link adjacent tiles that expansion did not connect (closes each ring)
fn connect_existing_neighbors(slots: &mut BTreeMap<CubeCoord, TileSlots>) {
    let coords: Vec<CubeCoord> = slots.keys().copied().collect();
    for coord in coords {
        for dir in Direction::ALL {
            let unlinked = slots[&coord].neighbors[dir.index()].is_none();
            if unlinked && slots.contains_key(&coord.neighbor(dir)) {
                link(slots, coord, dir);
            }
        }
    }
}

/// Fill every corner slot, reusing intersections shared with earlier tiles
fn create_intersections(
    slots: &mut BTreeMap<CubeCoord, TileSlots>,
) -> BTreeMap<IntersectionKey, Intersection> {
    let mut intersections = BTreeMap::new();
    let coords: Vec<CubeCoord> = slots.keys().copied().collect();

    for coord in coords {
        for corner in 0..6 {
            if slots[&coord].intersections[corner].is_some() {
                continue;
            }
            let key = IntersectionKey::new(coord, corner);
            let mut intersection = Intersection::new(key);

            // Corner i is corner i+2 of the neighbor before it and corner i+4 of the one after
            let neighbors = slots[&coord].neighbors;
            let sharing = [
                (Some(coord), corner),
                (neighbors[(corner + 5) % 6], (corner + 2) % 6),
                (neighbors[corner], (corner + 4) % 6),
            ];
            for (tile, index) in sharing {
                let Some(tile) = tile else { continue };
                if let Some(slot) = slots.get_mut(&tile) {
                    slot.intersections[index] = Some(key);
                    intersection.tiles.push(tile);
                }
            }
            intersections.insert(key, intersection);
        }
    }
    intersections
}

/// Join consecutive corners of every tile, reusing edges the mirroring tile created
fn create_edges(
    slots: &mut BTreeMap<CubeCoord, TileSlots>,
    intersections: &mut BTreeMap<IntersectionKey, Intersection>,
) -> BTreeMap<EdgeKey, Edge> {
    let mut edges = BTreeMap::new();
    let coords: Vec<CubeCoord> = slots.keys().copied().collect();

    for coord in coords {
        for side in 0..6 {
            if slots[&coord].edges[side].is_some() {
                continue;
            }
            let corners = slots[&coord].intersections;
            let (Some(a), Some(b)) = (corners[side], corners[(side + 1) % 6]) else {
                continue;
            };
            let key = EdgeKey::new(a, b);
            let mut edge = Edge {
                key,
                owner: None,
                tiles: vec![coord],
            };

            if let Some(slot) = slots.get_mut(&coord) {
                slot.edges[side] = Some(key);
            }
            let neighbor = slots[&coord].neighbors[side];
            if let Some(neighbor) = neighbor {
                if let Some(slot) = slots.get_mut(&neighbor) {
                    slot.edges[(side + 3) % 6] = Some(key);
                    edge.tiles.push(neighbor);
                }
            }

            for (from, to) in [(a, b), (b, a)] {
                if let Some(intersection) = intersections.get_mut(&from) {
                    intersection.edges.push(key);
                    intersection.neighbors.push(to);
                }
            }
            edges.insert(key, edge);
        }
    }
    edges
}
