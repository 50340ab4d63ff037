//! Host command parser.
//!
//! Parses incoming protocol lines from raw text into structured `Command`
//! variants that the host main loop can dispatch on.

use tracing::warn;

use crate::board::{Action, PlayerId, Tile};

/// A parsed host command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synchronization ping; the host must reply `readyok`.
    IsReady,

    /// Set a host option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Start a new match between the listed participants.
    NewMatch { players: Vec<PlayerId> },

    /// Submit a typed action on behalf of a player.
    Act { player: PlayerId, action: Action },

    /// Submit a raw JSON action payload on behalf of a player.
    ActJson { player: PlayerId, payload: String },

    /// Run the periodic timeout check.
    Tick,

    /// Advance the manual clock by `ms` and run the timeout check.
    Advance { ms: u64 },

    /// A participant connected.
    Join { player: PlayerId },

    /// A participant disconnected.
    Leave { player: PlayerId },

    /// Print the current state.
    State,

    /// Terminate the host process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let head = *tokens.first()?;

    match head {
        "isready" => Some(Command::IsReady),
        "tick" => Some(Command::Tick),
        "state" => Some(Command::State),
        "quit" => Some(Command::Quit),

        "setoption" => parse_setoption(&tokens),
        "newmatch" => parse_newmatch(&tokens),
        "move" => parse_tile_pair(&tokens, |from_tile, to_tile| Action::MoveUnit { from_tile, to_tile }),
        "attack" => parse_tile_pair(&tokens, |from_tile, to_tile| Action::Attack { from_tile, to_tile }),
        "play" => parse_tile_pair(&tokens, |bench_index, to_tile| Action::PlayUnit { bench_index, to_tile }),
        "endturn" => parse_player(&tokens).map(|player| Command::Act {
            player,
            action: Action::EndTurn,
        }),
        "action" => parse_action_json(&tokens, trimmed),
        "advance" => parse_advance(&tokens),
        "join" => parse_player(&tokens).map(|player| Command::Join { player }),
        "leave" => parse_player(&tokens).map(|player| Command::Leave { player }),

        other => {
            warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let value_idx = tokens.iter().position(|&t| t == "value");
    let (name_parts, value_parts) = match value_idx {
        Some(vi) => (&tokens[2..vi], &tokens[vi + 1..]),
        None => (&tokens[2..], &tokens[tokens.len()..]),
    };
    if name_parts.is_empty() {
        warn!("malformed setoption: empty name");
        return None;
    }
    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };

    Some(Command::SetOption {
        name: name_parts.join(" "),
        value,
    })
}

/// Parses `newmatch <id>...`. The participant count is checked at setup.
fn parse_newmatch(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 2 {
        warn!("malformed newmatch: expected 'newmatch <id> <id>'");
        return None;
    }
    let players = tokens[1..].iter().map(|t| t.to_string()).collect();
    Some(Command::NewMatch { players })
}

/// Parses `<verb> <player>`.
fn parse_player(tokens: &[&str]) -> Option<PlayerId> {
    match tokens {
        [_, player] => Some(player.to_string()),
        _ => {
            warn!(command = tokens[0], "malformed command: expected '<command> <player>'");
            None
        }
    }
}

/// Parses `<verb> <player> <a> <b>` into a typed action.
fn parse_tile_pair(tokens: &[&str], build: impl Fn(Tile, Tile) -> Action) -> Option<Command> {
    let (player, a, b) = match tokens {
        [_, player, a, b] => (player, a, b),
        _ => {
            warn!(command = tokens[0], "malformed command: expected '<command> <player> <n> <n>'");
            return None;
        }
    };
    match (a.parse::<usize>(), b.parse::<usize>()) {
        (Ok(a), Ok(b)) => Some(Command::Act {
            player: player.to_string(),
            action: build(a, b),
        }),
        _ => {
            warn!(command = tokens[0], "malformed command: arguments must be non-negative integers");
            None
        }
    }
}

/// Parses `action <player> <json>`. The payload may contain spaces, so it is
/// taken verbatim from the rest of the line.
fn parse_action_json(tokens: &[&str], line: &str) -> Option<Command> {
    if tokens.len() < 3 {
        warn!("malformed action: expected 'action <player> <json>'");
        return None;
    }
    let player = tokens[1];
    let rest = line["action".len()..].trim_start();
    let payload = rest[player.len()..].trim();
    Some(Command::ActJson {
        player: player.to_string(),
        payload: payload.to_string(),
    })
}

/// Parses `advance <ms>`.
fn parse_advance(tokens: &[&str]) -> Option<Command> {
    match tokens {
        [_, ms] => match ms.parse::<u64>() {
            Ok(ms) => Some(Command::Advance { ms }),
            Err(_) => {
                warn!(value = *ms, "malformed advance: invalid milliseconds");
                None
            }
        },
        _ => {
            warn!("malformed advance: expected 'advance <ms>'");
            None
        }
    }
}
