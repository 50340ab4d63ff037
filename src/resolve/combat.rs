//! Dice rolling and combat outcome.
//!
//! Each side rolls one six-sided die per point of `attack_dice` and sums the
//! results. The comparison is double-sided: the attacker removes the defender
//! when its sum is at least the defender's, and is itself removed when its sum
//! is at most the defender's, so an exact tie removes both units.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::Unit;

/// Source of d6 rolls for combat.
///
/// The resolver draws every roll through this trait so hosts can inject a
/// seeded or scripted source for reproducible matches.
pub trait DiceSource {
    /// Returns a value in `1..=6`.
    fn roll_die(&mut self) -> u8;
}

impl<D: DiceSource + ?Sized> DiceSource for &mut D {
    fn roll_die(&mut self) -> u8 {
        (**self).roll_die()
    }
}

/// Uniform dice backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomDice<R = SmallRng> {
    rng: R,
}

impl RandomDice<SmallRng> {
    /// Seeds from operating-system entropy.
    pub fn from_entropy() -> Self {
        RandomDice {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Seeds deterministically; equal seeds give equal roll sequences.
    pub fn seeded(seed: u64) -> Self {
        RandomDice {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomDice<R> {
    pub fn new(rng: R) -> Self {
        RandomDice { rng }
    }
}

impl<R: Rng> DiceSource for RandomDice<R> {
    fn roll_die(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }
}

/// Replays a fixed roll sequence, for replays and tests.
///
/// Values are clamped into `1..=6`. Once the script runs out it starts over
/// from the beginning; an empty script always rolls 1.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    script: Vec<u8>,
    pending: VecDeque<u8>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        let script: Vec<u8> = rolls.into_iter().map(|r| r.clamp(1, 6)).collect();
        ScriptedDice {
            pending: script.iter().copied().collect(),
            script,
        }
    }

    /// Queues more rolls after the ones still pending.
    pub fn push(&mut self, rolls: impl IntoIterator<Item = u8>) {
        for r in rolls {
            let r = r.clamp(1, 6);
            self.script.push(r);
            self.pending.push_back(r);
        }
    }

    /// Number of scripted rolls not yet consumed in the current pass.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl DiceSource for ScriptedDice {
    fn roll_die(&mut self) -> u8 {
        if self.pending.is_empty() {
            self.pending.extend(self.script.iter().copied());
        }
        self.pending.pop_front().unwrap_or(1)
    }
}

/// Rolls `count` dice.
pub fn roll_dice<D: DiceSource + ?Sized>(dice: &mut D, count: u32) -> Vec<u8> {
    (0..count).map(|_| dice.roll_die()).collect()
}

/// Both dice sequences of one attack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatRoll {
    pub attacker_dice: Vec<u8>,
    pub defender_dice: Vec<u8>,
}

impl CombatRoll {
    pub fn attacker_total(&self) -> i32 {
        self.attacker_dice.iter().map(|&d| i32::from(d)).sum()
    }

    pub fn defender_total(&self) -> i32 {
        self.defender_dice.iter().map(|&d| i32::from(d)).sum()
    }

    /// Attacker sum minus defender sum.
    pub fn result(&self) -> i32 {
        self.attacker_total() - self.defender_total()
    }

    pub fn defender_falls(&self) -> bool {
        self.attacker_total() >= self.defender_total()
    }

    pub fn attacker_falls(&self) -> bool {
        self.attacker_total() <= self.defender_total()
    }
}

/// Rolls attacker dice first, then defender dice.
pub fn roll_combat<D: DiceSource + ?Sized>(dice: &mut D, attacker: &Unit, defender: &Unit) -> CombatRoll {
    let attacker_dice = roll_dice(dice, attacker.attack_dice);
    let defender_dice = roll_dice(dice, defender.attack_dice);
    CombatRoll {
        attacker_dice,
        defender_dice,
    }
}
