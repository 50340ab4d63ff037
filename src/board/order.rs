//! Action types for the four player intents.
//!
//! Actions are a closed set dispatched by `match`. The serde representation
//! is the JSON payload clients send: an object tagged by `kind` with
//! camelCase fields, e.g. `{"kind":"playUnit","benchIndex":0,"toTile":1}`.

use serde::{Deserialize, Serialize};

use super::tile::Tile;

/// A player action submitted to the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Action {
    /// Move a unit already on the board.
    MoveUnit { from_tile: Tile, to_tile: Tile },

    /// Deploy a unit from the actor's bench.
    PlayUnit { bench_index: usize, to_tile: Tile },

    /// Attack an adjacent enemy unit.
    Attack { from_tile: Tile, to_tile: Tile },

    /// Voluntarily pass the turn.
    EndTurn,
}

impl Action {
    /// Returns the wire name of this action kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Action::MoveUnit { .. } => "moveUnit",
            Action::PlayUnit { .. } => "playUnit",
            Action::Attack { .. } => "attack",
            Action::EndTurn => "endTurn",
        }
    }

    /// Returns the tile the action lands on or targets, if any.
    pub fn target(&self) -> Option<Tile> {
        match self {
            Action::MoveUnit { to_tile, .. }
            | Action::PlayUnit { to_tile, .. }
            | Action::Attack { to_tile, .. } => Some(*to_tile),
            Action::EndTurn => None,
        }
    }
}
