//! Arena tactics engine library.
//!
//! Exposes the board representation, action resolver, match lifecycle,
//! move generation, and host protocol modules for use by integration tests
//! and the binary entry points.

pub mod board;
pub mod engine;
pub mod game;
pub mod movegen;
pub mod protocol;
pub mod resolve;
pub mod selfplay;

pub use board::{Action, BoardGraph, MatchState, Seat, Tile};
pub use game::{Game, MatchConfig, SetupError};
pub use resolve::{DiceSource, InvalidAction, RandomDice, Resolution, ScriptedDice};
