//! Board representation and match-state types.
//!
//! Contains the arena tile graph, units, player actions, and the overall
//! match state.

pub mod adjacency;
pub mod order;
pub mod state;
pub mod tile;
pub mod unit;

pub use adjacency::{
    flatten_reach, BoardGraph, GraphError, ARENA_EDGES, ARENA_EDGE_COUNT, ARENA_ROLES,
};
pub use order::Action;
pub use state::{CombatReport, GameOver, MatchState, Phase, PlayerId, PlayerState, Verdict};
pub use tile::{Seat, Tile, TileRole, ALL_SEATS, BOARD_SIZE};
pub use unit::{default_bench, Archetype, Unit, ALL_ARCHETYPES};
