//! Validation and resolution of player actions.
//!
//! Every handler checks all of its preconditions before touching the state,
//! so a rejected action leaves the match exactly as it was. Rejections are
//! reported as [`InvalidAction`] values; they are final for that attempt but
//! never end the match.

use tracing::{debug, info};

use crate::board::{Action, BoardGraph, CombatReport, MatchState, PlayerId, Seat, Tile};

use super::combat::{roll_combat, DiceSource};
use super::phase::{pass_turn, settle_landing, Landing};

/// Reason an action was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAction {
    #[error("the match is over")]
    MatchOver,

    #[error("player '{0}' is not active in this match")]
    UnknownPlayer(PlayerId),

    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),

    #[error("the attack from tile {0} must be resolved first")]
    AttackPending(Tile),

    #[error("the attack must come from tile {locked}, not {from}")]
    WrongAttacker { locked: Tile, from: Tile },

    #[error("tile {0} is off the board")]
    TileOutOfBounds(Tile),

    #[error("bench slot {0} is empty")]
    BenchIndexOutOfBounds(usize),

    #[error("no unit on tile {0}")]
    NoUnit(Tile),

    #[error("the unit on tile {0} belongs to the opponent")]
    NotOwner(Tile),

    #[error("the unit cannot move")]
    Immobile,

    #[error("tile {0} is occupied")]
    Occupied(Tile),

    #[error("tile {to} is out of reach from tile {from}")]
    Unreachable { from: Tile, to: Tile },

    #[error("tile {0} is not one of your spawn tiles")]
    NotSpawn(Tile),

    #[error("tile {0} cannot be reached from a free spawn tile")]
    NoSpawnPath(Tile),

    #[error("tiles {from} and {to} are not adjacent")]
    NotAdjacent { from: Tile, to: Tile },

    #[error("no enemy unit on tile {0}")]
    NoTarget(Tile),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl InvalidAction {
    /// Short machine-readable reason code.
    pub const fn code(&self) -> &'static str {
        match self {
            InvalidAction::MatchOver => "match_over",
            InvalidAction::UnknownPlayer(_) => "unknown_player",
            InvalidAction::NotYourTurn(_) => "not_your_turn",
            InvalidAction::AttackPending(_) => "attack_pending",
            InvalidAction::WrongAttacker { .. } => "wrong_attacker",
            InvalidAction::TileOutOfBounds(_) => "tile_out_of_bounds",
            InvalidAction::BenchIndexOutOfBounds(_) => "bench_out_of_bounds",
            InvalidAction::NoUnit(_) => "no_unit",
            InvalidAction::NotOwner(_) => "not_owner",
            InvalidAction::Immobile => "immobile",
            InvalidAction::Occupied(_) => "occupied",
            InvalidAction::Unreachable { .. } => "unreachable",
            InvalidAction::NotSpawn(_) => "not_spawn",
            InvalidAction::NoSpawnPath(_) => "no_spawn_path",
            InvalidAction::NotAdjacent { .. } => "not_adjacent",
            InvalidAction::NoTarget(_) => "no_target",
            InvalidAction::MalformedPayload(_) => "malformed_payload",
        }
    }
}

/// Effect of an accepted action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The turn passed to the opponent.
    Passed,
    /// The acting unit landed next to an enemy and must attack from `tile`.
    AttackLocked { tile: Tile },
    /// An attack resolved; the turn passed.
    Combat(CombatReport),
    /// The acting unit reached the opposing goal and the match is over.
    Won { winner: Seat },
}

/// Validates and applies one action for `actor`.
///
/// Checks that the match is running, that `actor` is an active participant
/// holding the turn, and that a pending attack lock only admits attacks.
/// Then dispatches to the handler for the action kind.
pub fn apply_action<D: DiceSource + ?Sized>(
    state: &mut MatchState,
    graph: &BoardGraph,
    dice: &mut D,
    actor: &str,
    action: &Action,
    now: u64,
) -> Result<Resolution, InvalidAction> {
    let seat = check_turn(state, actor)?;
    if let Some(locked) = state.attacking_tile {
        if !matches!(action, Action::Attack { .. }) {
            return Err(InvalidAction::AttackPending(locked));
        }
    }

    let result = match *action {
        Action::MoveUnit { from_tile, to_tile } => {
            move_unit(state, graph, seat, from_tile, to_tile, now)
        }
        Action::PlayUnit { bench_index, to_tile } => {
            play_unit(state, graph, seat, bench_index, to_tile, now)
        }
        Action::Attack { from_tile, to_tile } => {
            attack(state, graph, dice, seat, from_tile, to_tile, now)
        }
        Action::EndTurn => Ok(end_turn(state, now)),
    };

    if let Err(e) = &result {
        debug!(player = actor, kind = action.kind(), reason = e.code(), "action rejected");
    }
    result
}

/// Returns the seat of `actor` if it may act now.
pub fn check_turn(state: &MatchState, actor: &str) -> Result<Seat, InvalidAction> {
    if state.is_over() {
        return Err(InvalidAction::MatchOver);
    }
    let seat = state
        .seat_of(actor)
        .filter(|_| state.is_active(actor))
        .ok_or_else(|| InvalidAction::UnknownPlayer(actor.to_string()))?;
    if state.turn_holder != actor {
        return Err(InvalidAction::NotYourTurn(actor.to_string()));
    }
    Ok(seat)
}

fn check_tile(graph: &BoardGraph, tile: Tile) -> Result<(), InvalidAction> {
    if graph.contains(tile) {
        Ok(())
    } else {
        Err(InvalidAction::TileOutOfBounds(tile))
    }
}

fn landing_resolution(landing: Landing, seat: Seat, tile: Tile) -> Resolution {
    match landing {
        Landing::Won => Resolution::Won { winner: seat },
        Landing::AttackLocked => Resolution::AttackLocked { tile },
        Landing::Passed => Resolution::Passed,
    }
}

/// Moves one of `seat`'s units along the board.
pub fn move_unit(
    state: &mut MatchState,
    graph: &BoardGraph,
    seat: Seat,
    from: Tile,
    to: Tile,
    now: u64,
) -> Result<Resolution, InvalidAction> {
    check_tile(graph, from)?;
    check_tile(graph, to)?;
    if state.unit_at(to).is_some() {
        return Err(InvalidAction::Occupied(to));
    }
    let unit = state.unit_at(from).ok_or(InvalidAction::NoUnit(from))?;
    if unit.owner != seat {
        return Err(InvalidAction::NotOwner(from));
    }
    if unit.movement < 1 {
        return Err(InvalidAction::Immobile);
    }
    if !graph.is_reachable(to, from, unit.movement, &state.occupancy()) {
        return Err(InvalidAction::Unreachable { from, to });
    }

    state.board[from] = None;
    state.board[to] = Some(unit);
    debug!(%seat, from, to, "unit moved");

    let landing = settle_landing(state, graph, seat, to, now);
    Ok(landing_resolution(landing, seat, to))
}

/// Deploys a unit from `seat`'s bench.
///
/// Single-step units must land directly on a free spawn tile of their owner.
/// Faster units spend one step leaving the spawn, so they may land anywhere
/// reachable within `movement - 1` steps of a free owned spawn tile.
pub fn play_unit(
    state: &mut MatchState,
    graph: &BoardGraph,
    seat: Seat,
    bench_index: usize,
    to: Tile,
    now: u64,
) -> Result<Resolution, InvalidAction> {
    let unit = *state
        .bench(seat)
        .get(bench_index)
        .ok_or(InvalidAction::BenchIndexOutOfBounds(bench_index))?;
    check_tile(graph, to)?;
    if state.unit_at(to).is_some() {
        return Err(InvalidAction::Occupied(to));
    }

    let spawns = graph.spawn_tiles_for(seat);
    match unit.movement {
        0 => return Err(InvalidAction::Immobile),
        1 => {
            if !spawns.contains(&to) {
                return Err(InvalidAction::NotSpawn(to));
            }
        }
        movement => {
            let occupancy = state.occupancy();
            let reachable = spawns
                .iter()
                .filter(|&&spawn| !occupancy[spawn])
                .any(|&spawn| graph.is_reachable(to, spawn, movement - 1, &occupancy));
            if !reachable {
                return Err(InvalidAction::NoSpawnPath(to));
            }
        }
    }

    state.benches[seat.index()].remove(bench_index);
    state.board[to] = Some(unit);
    debug!(%seat, bench_index, to, "unit deployed");

    let landing = settle_landing(state, graph, seat, to, now);
    Ok(landing_resolution(landing, seat, to))
}

/// Resolves an attack from `from` onto the adjacent enemy on `to`.
///
/// Losing units return to their owner's bench. The acting player's combat
/// report is replaced and the turn always passes.
pub fn attack<D: DiceSource + ?Sized>(
    state: &mut MatchState,
    graph: &BoardGraph,
    dice: &mut D,
    seat: Seat,
    from: Tile,
    to: Tile,
    now: u64,
) -> Result<Resolution, InvalidAction> {
    check_tile(graph, from)?;
    check_tile(graph, to)?;
    if let Some(locked) = state.attacking_tile {
        if locked != from {
            return Err(InvalidAction::WrongAttacker { locked, from });
        }
    }
    if !graph.is_adjacent(from, to) {
        return Err(InvalidAction::NotAdjacent { from, to });
    }
    let attacker = state.unit_at(from).ok_or(InvalidAction::NoUnit(from))?;
    if attacker.owner != seat {
        return Err(InvalidAction::NotOwner(from));
    }
    let defender = state
        .unit_at(to)
        .filter(|u| u.owner != seat)
        .ok_or(InvalidAction::NoTarget(to))?;

    let roll = roll_combat(dice, &attacker, &defender);
    if roll.defender_falls() {
        state.board[to] = None;
        state.benches[defender.owner.index()].push(defender);
    }
    if roll.attacker_falls() {
        state.board[from] = None;
        state.benches[seat.index()].push(attacker);
    }

    let attacker_id = state.player_id(seat).clone();
    let report = CombatReport {
        result: roll.result(),
        attacker_dice: roll.attacker_dice,
        defender_dice: roll.defender_dice,
        from_tile: from,
        to_tile: to,
        attacker: attacker_id.clone(),
    };
    info!(
        attacker = %attacker_id,
        from,
        to,
        result = report.result,
        "combat resolved"
    );
    if let Some(player) = state.player_mut(&attacker_id) {
        player.last_combat = Some(report.clone());
    }

    pass_turn(state, now);
    Ok(Resolution::Combat(report))
}

/// Voluntarily passes the turn.
pub fn end_turn(state: &mut MatchState, now: u64) -> Resolution {
    pass_turn(state, now);
    Resolution::Passed
}
