//! Host-to-client response lines.
//!
//! Every response is a single line: a keyword, optionally followed by a
//! payload. State and game-over payloads are compact JSON.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::board::{GameOver, MatchState, Phase, PlayerId};
use crate::resolve::InvalidAction;

/// A response written by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    ReadyOk,
    /// The requester's action was accepted.
    Ok,
    /// The requester's command was rejected: a reason code and a message.
    Invalid { code: String, message: String },
    /// Full state snapshot, JSON-encoded.
    State(String),
    /// Terminal outcome, JSON-encoded.
    GameOver(String),
}

impl Response {
    pub fn invalid(code: &str, message: impl fmt::Display) -> Self {
        Response::Invalid {
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    pub fn rejected(err: &InvalidAction) -> Self {
        Response::invalid(err.code(), err)
    }

    pub fn state(snapshot: &Snapshot<'_>) -> serde_json::Result<Self> {
        Ok(Response::State(serde_json::to_string(snapshot)?))
    }

    pub fn game_over(result: &GameOver) -> serde_json::Result<Self> {
        Ok(Response::GameOver(serde_json::to_string(result)?))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::ReadyOk => write!(f, "readyok"),
            Response::Ok => write!(f, "ok"),
            Response::Invalid { code, message } => write!(f, "invalid {} {}", code, message),
            Response::State(json) => write!(f, "state {}", json),
            Response::GameOver(json) => write!(f, "gameover {}", json),
        }
    }
}

/// State broadcast payload: the match state plus host-side extras.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot<'a> {
    #[serde(flatten)]
    pub state: &'a MatchState,
    pub phase: &'static str,
    /// Current game-clock reading in milliseconds.
    pub now: u64,
    pub sessions: &'a BTreeMap<PlayerId, u32>,
}

impl<'a> Snapshot<'a> {
    pub fn new(state: &'a MatchState, now: u64, sessions: &'a BTreeMap<PlayerId, u32>) -> Self {
        Snapshot {
            state,
            phase: phase_name(state.phase()),
            now,
            sessions,
        }
    }
}

/// Wire name of a phase.
pub const fn phase_name(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "idle",
        Phase::AttackPending { .. } => "attackPending",
        Phase::Finished => "finished",
    }
}
