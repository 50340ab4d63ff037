//! Self-play match simulation.
//!
//! Plays full matches between two random-policy bots on a simulated clock.
//! Each bot picks uniformly among the legal actions, and with a configurable
//! probability sits idle until its turn times out, so the timeout path gets
//! exercised alongside normal play. Matches run in parallel on a rayon pool
//! and every match is reproducible from its seed.

use std::io::Write;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, warn};

use crate::board::{Action, GameOver, PlayerId, Seat};
use crate::game::{Game, MatchConfig, SetupError, DEFAULT_INITIAL_GRACE_MS, DEFAULT_TURN_TIME_MS};
use crate::movegen::random_action;
use crate::resolve::{RandomDice, Resolution};

/// Configuration for self-play.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of matches to play.
    pub num_games: usize,
    /// Matches still running after this many turns (accepted actions plus
    /// timeouts) are abandoned.
    pub max_actions: usize,
    /// Simulated milliseconds a bot spends choosing each action.
    pub think_ms: u64,
    /// Chance that a bot lets its turn time out instead of acting.
    pub idle_probability: f64,
    /// Simulated interval between host ticks while a bot idles.
    pub tick_interval_ms: u64,
    pub turn_time_ms: u64,
    pub initial_grace_ms: u64,
    /// Number of parallel threads.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Keep the full action log in each record.
    pub record_actions: bool,
    /// Suppress per-match progress output.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 100,
            max_actions: 500,
            think_ms: 800,
            idle_probability: 0.02,
            tick_interval_ms: 1_000,
            turn_time_ms: DEFAULT_TURN_TIME_MS,
            initial_grace_ms: DEFAULT_INITIAL_GRACE_MS,
            threads: 4,
            seed: 0,
            record_actions: false,
            quiet: false,
        }
    }
}

impl SelfPlayConfig {
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            turn_time_ms: self.turn_time_ms,
            initial_grace_ms: self.initial_grace_ms,
        }
    }
}

/// Errors that abort a self-play run.
#[derive(Debug, thiserror::Error)]
pub enum SelfPlayError {
    #[error("failed to build thread pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to set up match: {0}")]
    Setup(#[from] SetupError),
}

/// A completed self-play match.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub game_id: usize,
    /// Seed that reproduces this match.
    pub seed: u64,
    pub winner: Option<Seat>,
    pub result: Option<GameOver>,
    /// Accepted actions, including attacks and voluntary passes.
    pub action_count: usize,
    pub combats: usize,
    pub timeouts: usize,
    /// Simulated clock reading when the match stopped.
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

/// Participant ids used for the two bots.
fn bot_ids() -> Vec<PlayerId> {
    vec!["bot-0".to_string(), "bot-1".to_string()]
}

/// Plays a single match from `seed` and returns its record.
pub fn play_game(config: &SelfPlayConfig, game_id: usize, seed: u64) -> Result<MatchRecord, SetupError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let dice = RandomDice::seeded(rng.gen());
    let mut game = Game::with_dice(&bot_ids(), 0, config.match_config(), dice)?;
    let graph = game.graph().clone();
    let idle_probability = config.idle_probability.clamp(0.0, 1.0);
    let tick_interval = config.tick_interval_ms.max(1);

    let mut now = 0u64;
    let mut record = MatchRecord {
        game_id,
        seed,
        winner: None,
        result: None,
        action_count: 0,
        combats: 0,
        timeouts: 0,
        duration_ms: 0,
        actions: Vec::new(),
    };

    while !game.is_over() && record.action_count + record.timeouts < config.max_actions {
        if rng.gen_bool(idle_probability) {
            // Sit out the turn; the host ticks until the timer fires.
            loop {
                now += tick_interval;
                if game.tick(now) {
                    record.timeouts += 1;
                    break;
                }
            }
            continue;
        }

        now += config.think_ms;
        if game.tick(now) {
            record.timeouts += 1;
            continue;
        }

        let actor = game.state().turn_holder.clone();
        let Some(action) = random_action(game.state(), &graph, &actor, &mut rng) else {
            warn!(game_id, player = %actor, "no legal action");
            break;
        };
        match game.apply(&actor, &action, now) {
            Ok(resolution) => {
                if matches!(resolution, Resolution::Combat(_)) {
                    record.combats += 1;
                }
                record.action_count += 1;
                if config.record_actions {
                    record.actions.push(action);
                }
            }
            Err(e) => {
                warn!(game_id, ?action, error = %e, "generated action rejected");
                break;
            }
        }
    }

    record.duration_ms = now;
    record.result = game.result().cloned();
    record.winner = game
        .result()
        .and_then(|r| r.winner())
        .and_then(|id| game.state().seat_of(id));
    debug!(game_id, winner = ?record.winner, actions = record.action_count, "match finished");
    Ok(record)
}

fn game_seed(config: &SelfPlayConfig, game_id: usize) -> u64 {
    if config.seed != 0 {
        config.seed.wrapping_add(game_id as u64)
    } else {
        SmallRng::from_entropy().gen()
    }
}

/// Runs self-play, returning the records in game order.
///
/// Matches are played concurrently on a pool of `config.threads` workers.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<Vec<MatchRecord>, SelfPlayError> {
    use rayon::prelude::*;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads.max(1))
        .build()?;

    let records = pool.install(|| {
        (0..config.num_games)
            .into_par_iter()
            .map(|i| -> Result<MatchRecord, SetupError> {
                let game_start = Instant::now();
                let record = play_game(config, i, game_seed(config, i))?;
                if !config.quiet {
                    let outcome = match record.winner {
                        Some(seat) => format!("seat {} wins", seat),
                        None => "unfinished".to_string(),
                    };
                    eprintln!(
                        "Game {}/{}: {} after {} actions ({:.1}ms)",
                        i + 1,
                        config.num_games,
                        outcome,
                        record.action_count,
                        game_start.elapsed().as_secs_f64() * 1000.0,
                    );
                }
                Ok(record)
            })
            .collect::<Result<Vec<_>, SetupError>>()
    })?;
    Ok(records)
}

/// Writes match records as JSONL (one JSON object per line).
pub fn write_jsonl<W: Write>(records: &[MatchRecord], out: &mut W) -> std::io::Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Aggregate counts over a batch of matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub games: usize,
    pub wins: [usize; 2],
    pub unfinished: usize,
    pub combats: usize,
    pub timeouts: usize,
    pub actions: usize,
}

impl Summary {
    pub fn from_records(records: &[MatchRecord]) -> Self {
        let mut summary = Summary {
            games: records.len(),
            ..Default::default()
        };
        for record in records {
            match record.winner {
                Some(seat) => summary.wins[seat.index()] += 1,
                None => summary.unfinished += 1,
            }
            summary.combats += record.combats;
            summary.timeouts += record.timeouts;
            summary.actions += record.action_count;
        }
        summary
    }
}

/// Prints a summary of self-play results to stderr.
pub fn print_summary(records: &[MatchRecord]) {
    let s = Summary::from_records(records);
    let per_game = |n: usize| n as f64 / s.games.max(1) as f64;

    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {}", s.games);
    eprintln!("Avg actions/game: {:.1}", per_game(s.actions));
    eprintln!("Avg combats/game: {:.1}", per_game(s.combats));
    eprintln!("Timeouts: {}", s.timeouts);
    eprintln!("Unfinished: {}", s.unfinished);
    eprintln!("Win distribution:");
    for (seat, wins) in s.wins.iter().enumerate() {
        eprintln!("  seat {}: {} ({:.1}%)", seat, wins, 100.0 * per_game(*wins));
    }
}
