//! Move and attack generation for units already on the board.

use crate::board::{flatten_reach, Action, BoardGraph, MatchState, Tile};

/// Returns the layered reach of the unit on `tile`, as a client would
/// highlight it. Empty if the tile holds no unit.
pub fn unit_reach(state: &MatchState, graph: &BoardGraph, tile: Tile) -> Vec<Vec<Tile>> {
    match state.unit_at(tile) {
        Some(unit) => graph.reachable_tiles(tile, unit.movement, &state.occupancy()),
        None => Vec::new(),
    }
}

/// Generates every legal `MoveUnit` for the unit on `tile`.
///
/// The caller is responsible for checking turn ownership and the attack
/// lock.
pub fn legal_moves(state: &MatchState, graph: &BoardGraph, tile: Tile) -> Vec<Action> {
    let reach = unit_reach(state, graph, tile);
    flatten_reach(&reach)
        .into_iter()
        .filter(|&to| to != tile)
        .map(|to| Action::MoveUnit {
            from_tile: tile,
            to_tile: to,
        })
        .collect()
}

/// Returns the enemy-held tiles the unit on `tile` may attack.
pub fn attack_targets(state: &MatchState, graph: &BoardGraph, tile: Tile) -> Vec<Tile> {
    match state.unit_at(tile) {
        Some(unit) => state.enemy_neighbors(graph, tile, unit.owner),
        None => Vec::new(),
    }
}

/// Generates every `Attack` available to the unit on `tile`.
pub fn legal_attacks(state: &MatchState, graph: &BoardGraph, tile: Tile) -> Vec<Action> {
    attack_targets(state, graph, tile)
        .into_iter()
        .map(|to| Action::Attack {
            from_tile: tile,
            to_tile: to,
        })
        .collect()
}
