//! Deploy generation.
//!
//! Single-step units may only be placed on a free spawn tile of their
//! owner. Faster units spend their first step leaving a free spawn, so
//! their targets are the tiles within `movement - 1` steps of one.

use crate::board::{flatten_reach, Action, BoardGraph, MatchState, Seat, Tile};

/// Returns the tiles where bench entry `bench_index` of `seat` may be
/// deployed, in ascending order.
pub fn deploy_targets(state: &MatchState, graph: &BoardGraph, seat: Seat, bench_index: usize) -> Vec<Tile> {
    let unit = match state.bench(seat).get(bench_index) {
        Some(unit) => *unit,
        None => return Vec::new(),
    };
    let occupancy = state.occupancy();
    let free_spawns = graph
        .spawn_tiles_for(seat)
        .into_iter()
        .filter(|&spawn| !occupancy[spawn]);

    let mut targets: Vec<Tile> = match unit.movement {
        0 => Vec::new(),
        1 => free_spawns.collect(),
        movement => free_spawns
            .flat_map(|spawn| flatten_reach(&graph.reachable_tiles(spawn, movement - 1, &occupancy)))
            .collect(),
    };
    targets.sort_unstable();
    targets.dedup();
    targets
}

/// Generates every legal `PlayUnit` for `seat`.
pub fn legal_deploys(state: &MatchState, graph: &BoardGraph, seat: Seat) -> Vec<Action> {
    let mut actions = Vec::new();
    for bench_index in 0..state.bench(seat).len() {
        for to_tile in deploy_targets(state, graph, seat, bench_index) {
            actions.push(Action::PlayUnit { bench_index, to_tile });
        }
    }
    actions
}
