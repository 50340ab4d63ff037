//! Tile and seat definitions for the arena board.
//!
//! Tiles are plain indices into the board arrays. Each tile carries a static
//! role (neutral, goal, or spawn) that never changes during a match. Seats
//! identify the two sides of a match independently of the player ids the
//! host assigns.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A board position, indexed from zero.
pub type Tile = usize;

/// The number of tiles on the standard arena.
pub const BOARD_SIZE: usize = 28;

/// One of the two sides of a match.
///
/// Serialized as its index (`0` or `1`) to match the unit `owner` field
/// clients already expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Seat {
    First,
    Second,
}

/// Both seats in turn order.
pub const ALL_SEATS: [Seat; 2] = [Seat::First, Seat::Second];

impl Seat {
    /// Returns the array index for this seat.
    pub const fn index(self) -> usize {
        match self {
            Seat::First => 0,
            Seat::Second => 1,
        }
    }

    /// Returns the other seat.
    pub const fn opponent(self) -> Seat {
        match self {
            Seat::First => Seat::Second,
            Seat::Second => Seat::First,
        }
    }

    /// Looks up a seat from its array index.
    pub const fn from_index(index: usize) -> Option<Seat> {
        match index {
            0 => Some(Seat::First),
            1 => Some(Seat::Second),
            _ => None,
        }
    }
}

impl From<Seat> for u8 {
    fn from(seat: Seat) -> u8 {
        seat.index() as u8
    }
}

/// Error returned when a serialized seat index is not 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("seat index must be 0 or 1, got {0}")]
pub struct InvalidSeat(pub u8);

impl TryFrom<u8> for Seat {
    type Error = InvalidSeat;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Seat::from_index(value as usize).ok_or(InvalidSeat(value))
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Static role of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileRole {
    Neutral,
    /// Reaching this tile with an opposing unit ends the match.
    Goal(Seat),
    /// The owning seat deploys bench units here.
    Spawn(Seat),
}

impl TileRole {
    /// Returns the numeric role code used by clients
    /// (0 neutral, 1/2 goals, 3/4 spawns).
    pub const fn code(self) -> u8 {
        match self {
            TileRole::Neutral => 0,
            TileRole::Goal(Seat::First) => 1,
            TileRole::Goal(Seat::Second) => 2,
            TileRole::Spawn(Seat::First) => 3,
            TileRole::Spawn(Seat::Second) => 4,
        }
    }

    /// Parses a numeric role code.
    pub const fn from_code(code: u8) -> Option<TileRole> {
        match code {
            0 => Some(TileRole::Neutral),
            1 => Some(TileRole::Goal(Seat::First)),
            2 => Some(TileRole::Goal(Seat::Second)),
            3 => Some(TileRole::Spawn(Seat::First)),
            4 => Some(TileRole::Spawn(Seat::Second)),
            _ => None,
        }
    }

    pub const fn is_goal_of(self, seat: Seat) -> bool {
        matches!(self, TileRole::Goal(s) if s.index() == seat.index())
    }

    pub const fn is_spawn_of(self, seat: Seat) -> bool {
        matches!(self, TileRole::Spawn(s) if s.index() == seat.index())
    }
}
