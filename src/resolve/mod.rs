//! Action resolution.
//!
//! Validates player actions against the match state, applies accepted ones,
//! resolves combat, and drives the turn/attack phase machine.

pub mod actions;
pub mod combat;
pub mod phase;

pub use actions::{apply_action, check_turn, InvalidAction, Resolution};
pub use combat::{roll_combat, roll_dice, CombatRoll, DiceSource, RandomDice, ScriptedDice};
pub use phase::{check_timeout, declare_winner, is_timed_out, pass_turn, turn_elapsed, Landing};
