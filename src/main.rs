//! Arena host -- runs tactics matches over a line protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Logs go to stderr; set `RUST_LOG` to control verbosity.

use std::io::{self, BufRead};

use tracing_subscriber::EnvFilter;

use arena::engine::Engine;
use arena::protocol::parser::{parse_command, Command};

/// Runs the host loop, reading commands from stdin and writing responses
/// to stdout.
fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        match cmd {
            Command::IsReady => engine.handle_isready(&mut out)?,
            Command::SetOption { name, value } => engine.set_option(name, value),
            Command::NewMatch { players } => engine.handle_newmatch(&players, &mut out)?,
            Command::Act { player, action } => engine.handle_action(&player, &action, &mut out)?,
            Command::ActJson { player, payload } => {
                engine.handle_action_json(&player, &payload, &mut out)?
            }
            Command::Tick => engine.handle_tick(&mut out)?,
            Command::Advance { ms } => engine.handle_advance(ms, &mut out)?,
            Command::Join { player } => engine.handle_join(&player, &mut out)?,
            Command::Leave { player } => engine.handle_leave(&player, &mut out)?,
            Command::State => engine.handle_state(&mut out)?,
            Command::Quit => break,
        }
    }
    Ok(())
}
