//! Self-play match simulation CLI.
//!
//! Plays random-policy matches and outputs one JSON record per match.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N        Number of matches to play (default: 100)
//!   --max-actions N  Turn cap per match (default: 500)
//!   --idle P         Probability a bot lets its turn time out (default: 0.02)
//!   --think MS       Simulated time per action in ms (default: 800)
//!   --turn-time MS   Turn budget in ms (default: 30000)
//!   --threads N      Number of parallel threads (default: 4)
//!   --seed N         Random seed, 0 for entropy (default: 0)
//!   --record         Include the action log in each record
//!   --output FILE    Output file path (default: stdout)
//!   --quiet          Suppress progress and summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use arena::selfplay::{self, SelfPlayConfig};

/// Parses the value following a flag.
fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    args.get(i)
        .ok_or_else(|| format!("missing value for {}", flag))?
        .parse()
        .map_err(|_| format!("invalid {} value: {}", flag, args[i]))
}

fn parse_args(args: &[String]) -> Result<Option<(SelfPlayConfig, Option<String>)>, String> {
    let mut config = SelfPlayConfig::default();
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                config.num_games = value(args, i, "--games")?;
            }
            "--max-actions" => {
                i += 1;
                config.max_actions = value(args, i, "--max-actions")?;
            }
            "--idle" => {
                i += 1;
                config.idle_probability = value(args, i, "--idle")?;
            }
            "--think" => {
                i += 1;
                config.think_ms = value(args, i, "--think")?;
            }
            "--turn-time" => {
                i += 1;
                config.turn_time_ms = value(args, i, "--turn-time")?;
            }
            "--threads" => {
                i += 1;
                config.threads = value(args, i, "--threads")?;
            }
            "--seed" => {
                i += 1;
                config.seed = value(args, i, "--seed")?;
            }
            "--output" => {
                i += 1;
                output_path = Some(value(args, i, "--output")?);
            }
            "--record" => config.record_actions = true,
            "--quiet" => config.quiet = true,
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("unknown argument: {}", other)),
        }
        i += 1;
    }
    Ok(Some((config, output_path)))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let (config, output_path) = match parse_args(&args) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    if !config.quiet {
        eprintln!(
            "Self-play: {} games, idle {:.2}, {}ms/action, {}ms turns, {} threads",
            config.num_games, config.idle_probability, config.think_ms, config.turn_time_ms, config.threads
        );
    }

    let start = Instant::now();
    let records = match selfplay::run_self_play(&config) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("self-play failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if !config.quiet {
        eprintln!(
            "Completed {} games in {:.1}s",
            records.len(),
            start.elapsed().as_secs_f64()
        );
        selfplay::print_summary(&records);
    }

    let written = match &output_path {
        Some(path) => File::create(path)
            .and_then(|file| selfplay::write_jsonl(&records, &mut BufWriter::new(file))),
        None => selfplay::write_jsonl(&records, &mut BufWriter::new(io::stdout().lock())),
    };
    if let Err(e) = written {
        eprintln!("failed to write output: {}", e);
        return ExitCode::FAILURE;
    }
    if let (Some(path), false) = (&output_path, config.quiet) {
        eprintln!("Wrote {} games to {}", records.len(), path);
    }
    ExitCode::SUCCESS
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of matches to play (default: 100)");
    eprintln!("  --max-actions N  Turn cap per match (default: 500)");
    eprintln!("  --idle P         Probability a bot lets its turn time out (default: 0.02)");
    eprintln!("  --think MS       Simulated time per action in ms (default: 800)");
    eprintln!("  --turn-time MS   Turn budget in ms (default: 30000)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --record         Include the action log in each record");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress progress and summary output");
    eprintln!("  --help           Show this help");
}
