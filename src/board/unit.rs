//! Unit types and ownership.
//!
//! A unit is a plain value: an owning seat plus its movement and attack
//! stats. Units have no identity beyond the board tile or bench slot that
//! currently holds them.

use serde::{Deserialize, Serialize};

use super::tile::Seat;

/// A unit on the board or waiting on a bench.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub owner: Seat,
    pub movement: u32,
    pub attack_dice: u32,
}

impl Unit {
    pub const fn new(owner: Seat, movement: u32, attack_dice: u32) -> Self {
        Unit {
            owner,
            movement,
            attack_dice,
        }
    }

    /// Builds a unit of the given archetype for `owner`.
    pub const fn of(owner: Seat, archetype: Archetype) -> Self {
        let (movement, attack_dice) = archetype.stats();
        Unit::new(owner, movement, attack_dice)
    }

    /// Returns the archetype matching this unit's stats, if any.
    pub fn archetype(&self) -> Option<Archetype> {
        ALL_ARCHETYPES
            .into_iter()
            .find(|a| a.stats() == (self.movement, self.attack_dice))
    }
}

/// The three unit archetypes, trading movement for attack power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Archetype {
    /// Slow and strong: deploys only onto a spawn tile.
    Heavy,
    Medium,
    /// Fast and weak.
    Light,
}

/// All archetypes in default bench order.
pub const ALL_ARCHETYPES: [Archetype; 3] = [Archetype::Heavy, Archetype::Medium, Archetype::Light];

impl Archetype {
    /// Returns `(movement, attack_dice)`.
    pub const fn stats(self) -> (u32, u32) {
        match self {
            Archetype::Heavy => (1, 3),
            Archetype::Medium => (2, 2),
            Archetype::Light => (3, 1),
        }
    }
}

/// Builds the starting bench for a seat: one unit of each archetype.
pub fn default_bench(owner: Seat) -> Vec<Unit> {
    ALL_ARCHETYPES.iter().map(|&a| Unit::of(owner, a)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archetypes_trade_movement_for_dice() {
        for a in ALL_ARCHETYPES {
            let (movement, dice) = a.stats();
            assert_eq!(movement + dice, 4);
        }
    }

    #[test]
    fn default_bench_order() {
        let bench = default_bench(Seat::Second);
        assert_eq!(
            bench,
            vec![
                Unit::new(Seat::Second, 1, 3),
                Unit::new(Seat::Second, 2, 2),
                Unit::new(Seat::Second, 3, 1),
            ]
        );
    }

    #[test]
    fn archetype_lookup() {
        assert_eq!(Unit::new(Seat::First, 2, 2).archetype(), Some(Archetype::Medium));
        assert_eq!(Unit::new(Seat::First, 0, 2).archetype(), None);
    }

    #[test]
    fn unit_wire_shape() {
        let json = serde_json::to_string(&Unit::of(Seat::First, Archetype::Light)).unwrap();
        assert_eq!(json, r#"{"owner":0,"movement":3,"attackDice":1}"#);
    }
}
