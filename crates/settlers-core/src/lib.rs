//! Settlers - a hex-grid settlement and trading game engine
//!
//! This crate provides the core game logic, including:
//! - Cube coordinate geometry for the hex grid
//! - The board builder: tiles, intersections, edges, harbors and layout
//! - Player ledgers, development cards and longest-road search
//! - A rules-enforcing state machine with named errors for illegal actions
//! - A turn driver that consults pluggable agents for every decision
//!
//! # Architecture
//!
//! The engine is single-threaded and synchronous. All randomness comes from
//! one generator seeded through [`GameConfig`], so a seed and a set of
//! deterministic agents reproduce a game exactly. Callers advance the game
//! one setup visit or turn at a time with [`Game::step`].
//!
//! # Modules
//!
//! - [`hex`]: Cube coordinates and directions
//! - [`board`]: Board topology, harbors, layout and placement predicates
//! - [`actions`]: Action and event types, legal action enumeration
//! - [`player`]: Player state and resources
//! - [`game`]: Game state, configuration and rules
//! - [`engine`]: Turn sequencing around agents
//! - [`agent`]: Agent contract plus random and heuristic agents

pub mod actions;
pub mod agent;
pub mod board;
pub mod engine;
pub mod game;
pub mod hex;
pub mod player;

// Re-export commonly used types
pub use actions::{Action, GameEvent};
pub use agent::{Agent, HeuristicAgent, RandomAgent};
pub use board::{
    Board, BoardSnapshot, Edge, EdgeKey, Harbor, Intersection, IntersectionKey, PlayerId, Resource,
    Tile,
};
pub use engine::Game;
pub use game::{GameConfig, GameError, GamePhase, GameSnapshot, GameState, PlayerSnapshot};
pub use hex::{CubeCoord, Direction};
pub use player::{costs, DevelopmentCard, Piece, Player, PlayerColor, ResourceHand};
