//! Core game state and rules.
//!
//! `GameState` owns the board, the player ledgers and the single seeded
//! random generator. Every mutating operation validates its own input and
//! returns a named `GameError` instead of mutating on bad input; the legal
//! action enumeration is the non-failing planning surface. Agent-driven
//! sequencing lives in [`crate::engine`].

use crate::actions::{self, Action, GameEvent};
use crate::board::{Board, BoardSnapshot, EdgeKey, IntersectionKey, PlayerId, Resource};
use crate::hex::CubeCoord;
use crate::player::{costs, DevelopmentCard, Piece, Player, ResourceHand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Minimum road length for Longest Road
pub const MIN_LONGEST_ROAD: u32 = 5;

/// Minimum knights for Largest Army
pub const MIN_LARGEST_ARMY: u32 = 3;

/// Victory points needed to win
pub const VICTORY_POINTS_TO_WIN: u32 = 10;

/// Hands above this size lose half on a 7
const DISCARD_LIMIT: u32 = 7;

/// Tunable rules injected at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for the game's random generator; entropy when absent
    pub seed: Option<u64>,
    /// Tile rings including the center (3 is the standard 19-tile board)
    pub board_size: u32,
    /// Settlement + road placements per player during setup
    pub setup_rounds: u32,
    pub victory_points_to_win: u32,
    pub longest_road_threshold: u32,
    pub largest_army_threshold: u32,
    /// Players holding more than 7 cards lose half on a 7
    pub discard_on_seven: bool,
    /// The last setup settlement yields one card per bordering tile
    pub setup_grants_resources: bool,
    /// Cards bought this turn may be played immediately
    pub allow_same_turn_development_cards: bool,
    /// Agent decisions allowed per turn before the turn is forced to end
    pub max_actions_per_turn: usize,
    /// Upper bound on swaps during the 6/8 layout repair
    pub max_layout_swaps: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            board_size: 3,
            setup_rounds: 2,
            victory_points_to_win: VICTORY_POINTS_TO_WIN,
            longest_road_threshold: MIN_LONGEST_ROAD,
            largest_army_threshold: MIN_LARGEST_ARMY,
            discard_on_seven: true,
            setup_grants_resources: true,
            allow_same_turn_development_cards: false,
            max_actions_per_turn: 500,
            max_layout_swaps: 1000,
        }
    }
}

impl GameConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Game phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Initial snake-order placements
    Setup,
    /// Normal dice turns
    Main,
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("a game needs 2 to 4 players, got {0}")]
    InvalidPlayerCount(usize),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid action for current phase")]
    InvalidPhase,

    #[error("game is over")]
    GameOver,

    #[error("no tile at {0}")]
    UnknownTile(CubeCoord),

    #[error("no intersection {0}")]
    UnknownIntersection(IntersectionKey),

    #[error("no edge {0}")]
    UnknownEdge(EdgeKey),

    #[error("location is already occupied")]
    LocationOccupied,

    #[error("too close to another settlement")]
    TooCloseToSettlement,

    #[error("not connected to your roads")]
    NotConnected,

    #[error("no settlement to upgrade")]
    NoSettlement,

    #[error("already a city")]
    AlreadyCity,

    #[error("you do not own this location")]
    NotOwner,

    #[error("no {0} pieces remaining")]
    NoPiecesRemaining(Piece),

    #[error("cannot afford this")]
    CannotAfford,

    #[error("no free placement available")]
    FreePlacementUnavailable,

    #[error("no development cards left in deck")]
    EmptyDeck,

    #[error("you do not hold a {0:?} card")]
    NoSuchCard(DevelopmentCard),

    #[error("{0:?} was bought this turn")]
    CardOnCooldown(DevelopmentCard),

    #[error("{0:?} cannot be played")]
    CardNotPlayable(DevelopmentCard),

    #[error("invalid trade")]
    InvalidTrade,

    #[error("the robber must move to a different tile")]
    RobberMustMove,

    #[error("cannot steal from player {0}")]
    InvalidStealTarget(PlayerId),

    #[error("requested {requested} cards but only {held} are held")]
    InsufficientResources { requested: u32, held: u32 },
}

/// Read-only view of one player with derived points
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    #[serde(flatten)]
    pub ledger: Player,
    pub victory_points: u32,
}

/// Read-only view of the whole game for rendering and serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    pub current_player: PlayerId,
    pub turn_number: u32,
    pub last_roll: Option<u8>,
    pub winner: Option<PlayerId>,
    pub board: BoardSnapshot,
    pub players: Vec<PlayerSnapshot>,
}

impl GameSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// The complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub board: Board,
    pub players: Vec<Player>,
    pub current_player: PlayerId,
    pub phase: GamePhase,
    /// Completed setup visits (settlement + road each)
    pub setup_turns_taken: u32,
    /// Settlement placed this setup visit, awaiting its road
    pub pending_settlement: Option<IntersectionKey>,
    /// Completed main-phase turns
    pub turn_number: u32,
    pub last_roll: Option<u8>,
    pub winner: Option<PlayerId>,
    rng: StdRng,
}

impl GameState {
    /// Build the board and seat `player_count` players
    pub fn new(config: GameConfig, player_count: usize) -> Result<Self, GameError> {
        if !(2..=4).contains(&player_count) {
            return Err(GameError::InvalidPlayerCount(player_count));
        }
        if config.board_size == 0 {
            return Err(GameError::InvalidConfig("board_size must be at least 1".into()));
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let board = Board::build(config.board_size, &mut rng, config.max_layout_swaps);
        let players = (0..player_count as PlayerId).map(Player::new).collect();
        let phase = if config.setup_rounds == 0 {
            GamePhase::Main
        } else {
            GamePhase::Setup
        };

        Ok(Self {
            config,
            board,
            players,
            current_player: 0,
            phase,
            setup_turns_taken: 0,
            pending_settlement: None,
            turn_number: 0,
            last_roll: None,
            winner: None,
            rng,
        })
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    pub fn current(&self) -> &Player {
        &self.players[self.current_player as usize]
    }

    fn current_mut(&mut self) -> &mut Player {
        &mut self.players[self.current_player as usize]
    }

    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// Derived victory points of a player
    pub fn victory_points(&self, id: PlayerId) -> u32 {
        self.player(id).map(Player::victory_points).unwrap_or(0)
    }

    fn ensure_running(&self) -> Result<(), GameError> {
        if self.winner.is_some() {
            Err(GameError::GameOver)
        } else {
            Ok(())
        }
    }

    fn ensure_main(&self) -> Result<(), GameError> {
        self.ensure_running()?;
        if self.phase == GamePhase::Main {
            Ok(())
        } else {
            Err(GameError::InvalidPhase)
        }
    }

    // ==================== Legal Actions ====================

    /// Every action the current player may take right now
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.winner.is_some() {
            return Vec::new();
        }
        match self.phase {
            GamePhase::Setup => {
                actions::setup_actions(&self.board, self.current(), self.pending_settlement)
            }
            GamePhase::Main => actions::main_actions(
                &self.board,
                self.current(),
                self.config.allow_same_turn_development_cards,
            ),
        }
    }

    // ==================== Building ====================

    /// Place a settlement. Setup placements are never charged; main-phase
    /// placements must be paid.
    pub fn build_settlement(
        &mut self,
        key: IntersectionKey,
        paid: bool,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_running()?;
        let id = self.current_player;
        let setup = self.phase == GamePhase::Setup;
        if setup && self.pending_settlement.is_some() {
            return Err(GameError::InvalidPhase);
        }
        if !setup && !paid {
            return Err(GameError::FreePlacementUnavailable);
        }

        let intersection = self
            .board
            .intersection(&key)
            .ok_or(GameError::UnknownIntersection(key))?;
        if intersection.owner.is_some() {
            return Err(GameError::LocationOccupied);
        }
        if !self.board.is_valid_settlement_location(&key, id, false) {
            return Err(GameError::TooCloseToSettlement);
        }
        if !setup && !self.board.is_valid_settlement_location(&key, id, true) {
            return Err(GameError::NotConnected);
        }
        if self.current().settlements_remaining == 0 {
            return Err(GameError::NoPiecesRemaining(Piece::Settlement));
        }
        if !setup {
            self.current_mut().pay_for(&costs::settlement())?;
        }

        self.board.place_settlement(&key, id);
        self.current_mut().record_settlement(key);
        if setup {
            self.pending_settlement = Some(key);
        }
        debug!(player = id, %key, "settlement built");
        Ok(vec![GameEvent::SettlementBuilt {
            player: id,
            location: key,
        }])
    }

    /// Upgrade an own settlement to a city
    pub fn build_city(&mut self, key: IntersectionKey, paid: bool) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_main()?;
        let id = self.current_player;
        if !paid {
            return Err(GameError::FreePlacementUnavailable);
        }

        let intersection = self
            .board
            .intersection(&key)
            .ok_or(GameError::UnknownIntersection(key))?;
        match intersection.owner {
            None => return Err(GameError::NoSettlement),
            Some(owner) if owner != id => return Err(GameError::NotOwner),
            Some(_) => {}
        }
        if !intersection.has_settlement {
            return Err(GameError::NoSettlement);
        }
        if intersection.has_city {
            return Err(GameError::AlreadyCity);
        }
        if self.current().cities_remaining == 0 {
            return Err(GameError::NoPiecesRemaining(Piece::City));
        }
        self.current_mut().pay_for(&costs::city())?;

        self.board.upgrade_to_city(&key);
        self.current_mut().record_city(key);
        debug!(player = id, %key, "city built");
        Ok(vec![GameEvent::CityBuilt {
            player: id,
            location: key,
        }])
    }

    /// Place a road. In setup it must touch the pending settlement and ends
    /// the setup visit; in the main phase an unpaid road uses a free road.
    pub fn build_road(&mut self, key: EdgeKey, paid: bool) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_running()?;
        let id = self.current_player;
        let setup = self.phase == GamePhase::Setup;
        let anchor = if setup {
            Some(self.pending_settlement.ok_or(GameError::InvalidPhase)?)
        } else {
            None
        };

        let edge = self.board.edge(&key).ok_or(GameError::UnknownEdge(key))?;
        if edge.owner.is_some() {
            return Err(GameError::LocationOccupied);
        }
        if !self.board.is_valid_road_location(&key, id, anchor) {
            return Err(GameError::NotConnected);
        }
        if self.current().roads_remaining == 0 {
            return Err(GameError::NoPiecesRemaining(Piece::Road));
        }

        let free = setup || !paid;
        if !setup {
            if paid {
                self.current_mut().pay_for(&costs::road())?;
            } else if self.current().free_roads_remaining > 0 {
                self.current_mut().free_roads_remaining -= 1;
            } else {
                return Err(GameError::FreePlacementUnavailable);
            }
        }

        self.board.place_road(&key, id);
        self.current_mut().record_road(key);
        debug!(player = id, %key, free, "road built");

        let mut events = vec![GameEvent::RoadBuilt {
            player: id,
            location: key,
            free,
        }];
        if setup {
            events.extend(self.advance_setup());
        }
        Ok(events)
    }

    // ==================== Setup ====================

    /// Seat that takes setup visit `turn` (snake order)
    pub fn setup_player(&self, turn: u32) -> PlayerId {
        let n = self.player_count() as u32;
        let round = turn / n;
        let position = turn % n;
        let seat = if round % 2 == 0 {
            position
        } else {
            n - 1 - position
        };
        seat as PlayerId
    }

    fn total_setup_turns(&self) -> u32 {
        self.player_count() as u32 * self.config.setup_rounds
    }

    fn in_final_setup_round(&self) -> bool {
        self.setup_turns_taken / self.player_count() as u32 + 1 == self.config.setup_rounds
    }

    /// Close the current setup visit and hand the turn on
    pub fn advance_setup(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let anchor = self.pending_settlement.take();

        if let Some(anchor) = anchor {
            if self.in_final_setup_round() && self.config.setup_grants_resources {
                let resources = self.resources_around(&anchor);
                if !resources.is_empty() {
                    self.current_mut().give(&resources);
                    events.push(GameEvent::StartingResources {
                        player: self.current_player,
                        resources,
                    });
                }
            }
        }

        self.setup_turns_taken += 1;
        if self.setup_turns_taken >= self.total_setup_turns() {
            self.phase = GamePhase::Main;
            self.current_player = 0;
            info!(players = self.player_count(), "setup complete");
            events.push(GameEvent::SetupCompleted);
        } else {
            self.current_player = self.setup_player(self.setup_turns_taken);
        }
        events
    }

    /// One card per producing tile bordering an intersection
    fn resources_around(&self, key: &IntersectionKey) -> ResourceHand {
        let mut hand = ResourceHand::new();
        if let Some(intersection) = self.board.intersection(key) {
            for resource in intersection
                .tiles
                .iter()
                .filter_map(|c| self.board.tile(c))
                .filter_map(|t| t.resource)
            {
                hand.add(resource, 1);
            }
        }
        hand
    }

    // ==================== Development Cards ====================

    pub fn buy_development_card(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_main()?;
        if self.board.development_cards.is_empty() {
            return Err(GameError::EmptyDeck);
        }
        self.current_mut().pay_for(&costs::development_card())?;
        let card = self.board.draw_development_card().ok_or(GameError::EmptyDeck)?;
        self.current_mut().receive_development_card(card);
        debug!(player = self.current_player, ?card, "development card bought");
        Ok(vec![GameEvent::DevelopmentCardPurchased {
            player: self.current_player,
        }])
    }

    /// Move a card to the played pile. Its effect is resolved by the caller.
    pub fn play_development_card(&mut self, card: DevelopmentCard) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_main()?;
        let allow_cooldown = self.config.allow_same_turn_development_cards;
        self.current_mut().play_development_card(card, allow_cooldown)?;
        debug!(player = self.current_player, ?card, "development card played");
        Ok(vec![GameEvent::DevelopmentCardPlayed {
            player: self.current_player,
            card,
        }])
    }

    /// Road Building: up to two free roads, capped by remaining road pieces
    pub fn grant_free_roads(&mut self) -> Vec<GameEvent> {
        let player = self.current_mut();
        let available = player.roads_remaining.saturating_sub(player.free_roads_remaining);
        let count = available.min(2);
        player.free_roads_remaining += count;
        vec![GameEvent::FreeRoadsGranted {
            player: self.current_player,
            count,
        }]
    }

    /// Year of Plenty: one card from the bank
    pub fn grant_from_bank(&mut self, resource: Resource) -> Vec<GameEvent> {
        self.current_mut().resources.add(resource, 1);
        vec![GameEvent::ResourceGranted {
            player: self.current_player,
            resource,
        }]
    }

    /// Monopoly: every other player's holdings of `resource`
    pub fn monopolize(&mut self, resource: Resource) -> Vec<GameEvent> {
        let id = self.current_player;
        let total_taken: u32 = self
            .players
            .iter_mut()
            .filter(|p| p.id != id)
            .map(|p| p.resources.take_all(resource))
            .sum();
        self.current_mut().resources.add(resource, total_taken);
        vec![GameEvent::MonopolyPlayed {
            player: id,
            resource,
            total_taken,
        }]
    }

    // ==================== Trading ====================

    /// Maritime trade of one resource kind for a single card of another
    pub fn trade(
        &mut self,
        giving: &ResourceHand,
        receiving: &ResourceHand,
    ) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_main()?;
        let given: Vec<(Resource, u32)> = giving.iter().collect();
        let received: Vec<(Resource, u32)> = receiving.iter().collect();
        let (&[(give, amount)], &[(take, 1)]) = (given.as_slice(), received.as_slice()) else {
            return Err(GameError::InvalidTrade);
        };
        if give == take || !self.current().is_permitted_rate(&self.board, give, amount) {
            return Err(GameError::InvalidTrade);
        }
        self.current_mut().pay_for(giving)?;
        self.current_mut().give(receiving);
        debug!(player = self.current_player, %giving, %receiving, "traded with bank");
        Ok(vec![GameEvent::Traded {
            player: self.current_player,
            gave: giving.clone(),
            received: receiving.clone(),
        }])
    }

    // ==================== Dice and Robber ====================

    /// Roll two six-sided dice
    pub fn roll_dice(&mut self) -> Result<(Vec<GameEvent>, u8), GameError> {
        self.ensure_main()?;
        let roll = (self.rng.gen_range(1..=6), self.rng.gen_range(1..=6));
        let total = roll.0 + roll.1;
        self.last_roll = Some(total);
        debug!(player = self.current_player, total, "dice rolled");
        Ok((
            vec![GameEvent::DiceRolled {
                player: self.current_player,
                roll,
                total,
            }],
            total,
        ))
    }

    /// Pay every building on tiles matching the roll
    pub fn distribute_resources(&mut self, roll: u8) -> Vec<GameEvent> {
        let production = self.board.production_for_roll(roll);
        if production.is_empty() {
            return Vec::new();
        }
        for (id, hand) in &production {
            self.players[*id as usize].give(hand);
        }
        vec![GameEvent::ResourcesDistributed {
            distributions: production.into_iter().collect(),
        }]
    }

    /// Every player above the hand limit loses half (rounded down) at random
    pub fn discard_half(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let mut events = Vec::new();
        if !self.config.discard_on_seven {
            return Ok(events);
        }
        for player in &mut self.players {
            let held = player.resources.total();
            if held <= DISCARD_LIMIT {
                continue;
            }
            let discarded = player.resources.take_random(held / 2, &mut self.rng)?;
            debug!(player = player.id, count = held / 2, "cards discarded");
            events.push(GameEvent::CardsDiscarded {
                player: player.id,
                discarded,
            });
        }
        Ok(events)
    }

    /// Move the robber; returns the opponents eligible to be robbed there
    pub fn move_robber(&mut self, to: CubeCoord) -> Result<(Vec<GameEvent>, Vec<PlayerId>), GameError> {
        self.ensure_main()?;
        let from = self.board.move_robber(to)?;
        let candidates: Vec<PlayerId> = self
            .board
            .players_on_tile(&to)
            .into_iter()
            .filter(|p| *p != self.current_player)
            .collect();
        debug!(player = self.current_player, %to, ?candidates, "robber moved");
        Ok((
            vec![GameEvent::RobberMoved {
                player: self.current_player,
                from,
                to,
            }],
            candidates,
        ))
    }

    /// Move one random card from `victim` to the current player
    pub fn steal(&mut self, victim: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        self.ensure_main()?;
        let thief = self.current_player;
        let on_robber_tile = self
            .board
            .robber_location()
            .is_some_and(|tile| self.board.players_on_tile(&tile).contains(&victim));
        if victim == thief || !on_robber_tile {
            return Err(GameError::InvalidStealTarget(victim));
        }

        let loot = &mut self.players[victim as usize].resources;
        let resource = if loot.is_empty() {
            None
        } else {
            loot.take_random(1, &mut self.rng)?.iter().next().map(|(r, _)| r)
        };
        if let Some(resource) = resource {
            self.current_mut().resources.add(resource, 1);
        }
        Ok(vec![GameEvent::ResourceStolen {
            thief,
            victim,
            resource,
        }])
    }

    // ==================== End of Turn ====================

    /// Recompute longest road and largest army
    pub fn update_awards(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();

        for i in 0..self.players.len() {
            let length = self.players[i].find_longest_road_size(&self.board);
            self.players[i].longest_road_size = length;
        }

        let lengths: Vec<u32> = self.players.iter().map(|p| p.longest_road_size).collect();
        let previous = self.players.iter().find(|p| p.has_longest_road).map(|p| p.id);
        let holder = award_holder(&lengths, self.config.longest_road_threshold, previous);
        if holder != previous {
            for player in &mut self.players {
                player.has_longest_road = Some(player.id) == holder;
            }
            events.push(GameEvent::LongestRoadChanged {
                previous,
                current: holder,
                length: lengths.iter().copied().max().unwrap_or(0),
            });
        }

        let armies: Vec<u32> = self.players.iter().map(|p| p.army_size).collect();
        let previous = self.players.iter().find(|p| p.has_largest_army).map(|p| p.id);
        let holder = award_holder(&armies, self.config.largest_army_threshold, previous);
        if holder != previous {
            for player in &mut self.players {
                player.has_largest_army = Some(player.id) == holder;
            }
            events.push(GameEvent::LargestArmyChanged {
                previous,
                current: holder,
                knights: armies.iter().copied().max().unwrap_or(0),
            });
        }

        events
    }

    /// First player, starting with the current one, at or above the target
    pub fn check_winner(&mut self) -> Option<GameEvent> {
        if let Some(winner) = self.winner {
            return Some(GameEvent::GameWon {
                player: winner,
                victory_points: self.victory_points(winner),
            });
        }
        let n = self.player_count();
        let winner = (0..n)
            .map(|offset| ((self.current_player as usize + offset) % n) as PlayerId)
            .find(|id| self.victory_points(*id) >= self.config.victory_points_to_win)?;

        self.winner = Some(winner);
        let victory_points = self.victory_points(winner);
        info!(player = winner, victory_points, turn = self.turn_number, "game won");
        Some(GameEvent::GameWon {
            player: winner,
            victory_points,
        })
    }

    /// Awards, win check, then hand the turn to the next seat
    pub fn finish_turn(&mut self) -> Vec<GameEvent> {
        let mut events = self.update_awards();
        let player = self.current_player;
        self.current_mut().end_turn();
        self.turn_number += 1;

        if let Some(won) = self.check_winner() {
            events.push(won);
            return events;
        }

        self.current_player = ((player as usize + 1) % self.player_count()) as PlayerId;
        events.push(GameEvent::TurnEnded {
            player,
            next_player: self.current_player,
        });
        events
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            current_player: self.current_player,
            turn_number: self.turn_number,
            last_roll: self.last_roll,
            winner: self.winner,
            board: self.board.snapshot(),
            players: self
                .players
                .iter()
                .map(|p| PlayerSnapshot {
                    ledger: p.clone(),
                    victory_points: p.victory_points(),
                })
                .collect(),
        }
    }
}

/// Holder of a threshold award: the unique leader, or on a tie the
/// previous holder if they are among the leaders, otherwise nobody.
pub fn award_holder(scores: &[u32], threshold: u32, previous: Option<PlayerId>) -> Option<PlayerId> {
    let best = scores.iter().copied().max().unwrap_or(0);
    if best < threshold {
        return None;
    }
    let leaders: Vec<PlayerId> = scores
        .iter()
        .enumerate()
        .filter(|(_, score)| **score == best)
        .map(|(id, _)| id as PlayerId)
        .collect();
    match leaders.as_slice() {
        [only] => Some(*only),
        _ => previous.filter(|p| leaders.contains(p)),
    }
}
