use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use arena::board::{MatchState, Seat, Unit, BOARD_SIZE};
use arena::movegen::{legal_actions, random_action};
use arena::resolve::{apply_action, RandomDice};
use arena::selfplay::{play_game, SelfPlayConfig};
use arena::BoardGraph;

/// A mid-game position with units from both seats spread over the board.
fn midgame() -> MatchState {
    let mut state = MatchState::new(["a".to_string(), "b".to_string()], BOARD_SIZE, 0);
    state.benches = [vec![], vec![]];
    state.board[1] = Some(Unit::new(Seat::First, 1, 3));
    state.board[10] = Some(Unit::new(Seat::First, 2, 2));
    state.board[8] = Some(Unit::new(Seat::First, 3, 1));
    state.board[26] = Some(Unit::new(Seat::Second, 1, 3));
    state.board[16] = Some(Unit::new(Seat::Second, 2, 2));
    state.board[19] = Some(Unit::new(Seat::Second, 3, 1));
    state
}

fn bench_reachable_tiles(c: &mut Criterion) {
    let graph = BoardGraph::arena();
    let occupancy = midgame().occupancy();
    c.bench_function("reachable_tiles_light_unit", |b| {
        b.iter(|| graph.reachable_tiles(black_box(8), black_box(3), black_box(&occupancy)))
    });
}

fn bench_is_reachable(c: &mut Criterion) {
    let graph = BoardGraph::arena();
    let occupancy = midgame().occupancy();
    c.bench_function("is_reachable_miss", |b| {
        b.iter(|| graph.is_reachable(black_box(27), black_box(8), black_box(3), black_box(&occupancy)))
    });
}

fn bench_legal_actions(c: &mut Criterion) {
    let graph = BoardGraph::arena();
    let opening = MatchState::new(["a".to_string(), "b".to_string()], BOARD_SIZE, 0);
    let midgame = midgame();
    c.bench_function("legal_actions_opening", |b| {
        b.iter(|| legal_actions(black_box(&opening), &graph, "a"))
    });
    c.bench_function("legal_actions_midgame", |b| {
        b.iter(|| legal_actions(black_box(&midgame), &graph, "a"))
    });
}

fn bench_random_turns(c: &mut Criterion) {
    let graph = BoardGraph::arena();
    c.bench_function("random_100_actions", |b| {
        b.iter(|| {
            let mut state = MatchState::new(["a".to_string(), "b".to_string()], BOARD_SIZE, 0);
            let mut rng = SmallRng::seed_from_u64(5);
            let mut dice = RandomDice::seeded(5);
            for step in 0..100u64 {
                if state.is_over() {
                    break;
                }
                let actor = state.turn_holder.clone();
                let Some(action) = random_action(&state, &graph, &actor, &mut rng) else {
                    break;
                };
                let _ = apply_action(&mut state, &graph, &mut dice, &actor, &action, step);
            }
            state
        })
    });
}

fn bench_full_match(c: &mut Criterion) {
    let config = SelfPlayConfig {
        quiet: true,
        ..Default::default()
    };
    let mut group = c.benchmark_group("selfplay");
    group.sample_size(20);
    group.bench_function("full_random_match", |b| {
        b.iter(|| play_game(black_box(&config), 0, black_box(17)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_reachable_tiles,
    bench_is_reachable,
    bench_legal_actions,
    bench_random_turns,
    bench_full_match
);
criterion_main!(benches);
