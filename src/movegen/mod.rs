//! Legal action generation.
//!
//! Enumerates the actions the resolver would accept for a player in the
//! current match state: moves along each unit's reach, deploys from the
//! bench, attacks on adjacent enemies, and passing the turn. While an attack
//! is pending only attacks from the locked tile are generated.

pub mod deploy;
pub mod movement;

use rand::Rng;

use crate::board::{Action, BoardGraph, MatchState};
use crate::resolve::check_turn;

pub use deploy::{deploy_targets, legal_deploys};
pub use movement::{attack_targets, legal_attacks, legal_moves, unit_reach};

/// Generates every action `actor` may legally submit right now.
///
/// Returns an empty vec if the match is over or `actor` does not hold the
/// turn.
pub fn legal_actions(state: &MatchState, graph: &BoardGraph, actor: &str) -> Vec<Action> {
    let seat = match check_turn(state, actor) {
        Ok(seat) => seat,
        Err(_) => return Vec::new(),
    };

    if let Some(locked) = state.attacking_tile {
        return legal_attacks(state, graph, locked);
    }

    let mut actions = Vec::new();
    for tile in 0..state.board.len() {
        match state.unit_at(tile) {
            Some(unit) if unit.owner == seat => {
                actions.extend(legal_moves(state, graph, tile));
                actions.extend(legal_attacks(state, graph, tile));
            }
            _ => {}
        }
    }
    actions.extend(legal_deploys(state, graph, seat));
    actions.push(Action::EndTurn);
    actions
}

/// Picks a uniformly random legal action for `actor`, or `None` when it
/// cannot act.
pub fn random_action(state: &MatchState, graph: &BoardGraph, actor: &str, rng: &mut impl Rng) -> Option<Action> {
    let legal = legal_actions(state, graph, actor);
    if legal.is_empty() {
        return None;
    }
    let idx = rng.gen_range(0..legal.len());
    Some(legal[idx])
}
