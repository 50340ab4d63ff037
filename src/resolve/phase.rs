//! Turn and attack-phase sequencing.
//!
//! A turn is either idle or waiting on a forced attack. Phase flow:
//! - Idle -> AttackPending: a move or deploy lands next to an enemy unit
//! - Idle -> Idle (other seat): end turn, a landing with no enemy nearby, or timeout
//! - AttackPending -> Idle (other seat): the attack resolves, or timeout
//! - any -> Finished: a unit reaches the opposing goal, or the roster drops below two

use tracing::info;

use crate::board::{BoardGraph, GameOver, MatchState, Seat, Tile};

/// What a successful landing did to the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    /// The unit reached the opposing goal.
    Won,
    /// Enemies are adjacent; the turn stays with the mover.
    AttackLocked,
    /// Nothing to attack; the turn passed.
    Passed,
}

/// Hands the turn to the other seat.
///
/// Clears the attack lock, restarts the turn timer at `now`, and wipes the
/// incoming player's combat report from their previous turn.
pub fn pass_turn(state: &mut MatchState, now: u64) {
    let next = match state.turn_seat() {
        Some(seat) => seat.opponent(),
        None => Seat::First,
    };
    let next_id = state.player_id(next).clone();
    state.attacking_tile = None;
    state.turn_started_at = now;
    if let Some(player) = state.player_mut(&next_id) {
        player.last_combat = None;
    }
    info!(from = %state.turn_holder, to = %next_id, "turn passed");
    state.turn_holder = next_id;
}

/// Ends the match with `winner` marked WON and the other seat LOST.
pub fn declare_winner(state: &mut MatchState, winner: Seat) {
    let winner_id = state.player_id(winner).clone();
    state.attacking_tile = None;
    state.game_over = Some(GameOver::declare(&winner_id, &state.seats));
    info!(winner = %winner_id, "match over");
}

/// Applies the turn consequences of a unit owned by `seat` arriving on
/// `tile`: a win on the opposing goal, an attack lock when enemies are
/// adjacent, otherwise a turn pass.
pub fn settle_landing(
    state: &mut MatchState,
    graph: &BoardGraph,
    seat: Seat,
    tile: Tile,
    now: u64,
) -> Landing {
    if graph.goal_tile_for(seat.opponent()) == Some(tile) {
        declare_winner(state, seat);
        return Landing::Won;
    }
    if !state.enemy_neighbors(graph, tile, seat).is_empty() {
        state.attacking_tile = Some(tile);
        return Landing::AttackLocked;
    }
    pass_turn(state, now);
    Landing::Passed
}

/// Milliseconds the current turn has been running. Zero while the opening
/// grace period lasts.
pub fn turn_elapsed(state: &MatchState, now: u64) -> u64 {
    now.saturating_sub(state.turn_started_at)
}

/// Returns true if the current turn has exceeded its budget.
pub fn is_timed_out(state: &MatchState, now: u64, turn_time_ms: u64) -> bool {
    !state.is_over() && turn_elapsed(state, now) > turn_time_ms
}

/// Forces a turn pass when the current turn has run out of time.
/// Returns true if the turn passed.
pub fn check_timeout(state: &mut MatchState, now: u64, turn_time_ms: u64) -> bool {
    if !is_timed_out(state, now, turn_time_ms) {
        return false;
    }
    info!(
        player = %state.turn_holder,
        elapsed_ms = turn_elapsed(state, now),
        "turn timed out"
    );
    pass_turn(state, now);
    true
}
