//! A single running match.
//!
//! [`Game`] bundles the authoritative [`MatchState`] with the board graph,
//! the dice source and the timing configuration, and exposes the lifecycle
//! calls a host makes: setup, one call per action, the periodic tick, and
//! participant join/leave notifications. Every call takes the current
//! game-clock reading in milliseconds; the match never reads a clock itself.

use std::sync::Arc;

use tracing::info;

use crate::board::{Action, BoardGraph, GameOver, MatchState, PlayerId, PlayerState};
use crate::resolve::{
    apply_action, check_timeout, declare_winner, pass_turn, DiceSource, InvalidAction,
    RandomDice, Resolution,
};

/// Default turn budget in milliseconds.
pub const DEFAULT_TURN_TIME_MS: u64 = 30_000;

/// Default delay before the first turn's timer starts.
pub const DEFAULT_INITIAL_GRACE_MS: u64 = 5_000;

/// Timing parameters of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    /// Milliseconds a player may hold the turn before it is passed for them.
    pub turn_time_ms: u64,
    /// Extra time granted to the very first turn.
    pub initial_grace_ms: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            turn_time_ms: DEFAULT_TURN_TIME_MS,
            initial_grace_ms: DEFAULT_INITIAL_GRACE_MS,
        }
    }
}

/// Errors raised when a match cannot be created.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("a match needs exactly 2 participants, got {0}")]
    WrongPlayerCount(usize),

    #[error("participant '{0}' is listed twice")]
    DuplicatePlayer(PlayerId),

    #[error("participant ids must not be empty")]
    EmptyPlayerId,

    #[error("state has {state} tiles but the board graph has {graph}")]
    BoardMismatch { state: usize, graph: usize },
}

/// A match in progress, generic over its dice source.
#[derive(Debug, Clone)]
pub struct Game<D = RandomDice> {
    state: MatchState,
    graph: Arc<BoardGraph>,
    dice: D,
    config: MatchConfig,
}

impl Game<RandomDice> {
    /// Starts a match on the standard arena with entropy-seeded dice.
    pub fn setup(participants: &[PlayerId], now: u64, config: MatchConfig) -> Result<Self, SetupError> {
        Game::with_dice(participants, now, config, RandomDice::from_entropy())
    }
}

impl<D: DiceSource> Game<D> {
    /// Starts a match on the standard arena with the given dice source.
    pub fn with_dice(
        participants: &[PlayerId],
        now: u64,
        config: MatchConfig,
        dice: D,
    ) -> Result<Self, SetupError> {
        Game::with_graph(BoardGraph::arena(), participants, now, config, dice)
    }

    /// Starts a match on an arbitrary board graph.
    ///
    /// Requires exactly two distinct, non-empty participant ids. The first
    /// id takes seat 0 and moves first; its turn timer starts once the
    /// initial grace period has elapsed.
    pub fn with_graph(
        graph: Arc<BoardGraph>,
        participants: &[PlayerId],
        now: u64,
        config: MatchConfig,
        dice: D,
    ) -> Result<Self, SetupError> {
        let seats: [PlayerId; 2] = match participants {
            [a, b] => [a.clone(), b.clone()],
            _ => return Err(SetupError::WrongPlayerCount(participants.len())),
        };
        if seats.iter().any(String::is_empty) {
            return Err(SetupError::EmptyPlayerId);
        }
        if seats[0] == seats[1] {
            return Err(SetupError::DuplicatePlayer(seats[0].clone()));
        }

        let started_at = now.saturating_add(config.initial_grace_ms);
        let state = MatchState::new(seats, graph.size(), started_at);
        info!(first = %state.seats[0], second = %state.seats[1], "match set up");
        Ok(Game {
            state,
            graph,
            dice,
            config,
        })
    }

    /// Resumes a match from a saved state.
    pub fn from_state(
        state: MatchState,
        graph: Arc<BoardGraph>,
        config: MatchConfig,
        dice: D,
    ) -> Result<Self, SetupError> {
        if state.board.len() != graph.size() {
            return Err(SetupError::BoardMismatch {
                state: state.board.len(),
                graph: graph.size(),
            });
        }
        Ok(Game {
            state,
            graph,
            dice,
            config,
        })
    }

    /// Validates and applies one action. A rejection leaves the match
    /// untouched.
    pub fn apply(&mut self, actor: &str, action: &Action, now: u64) -> Result<Resolution, InvalidAction> {
        apply_action(&mut self.state, &self.graph, &mut self.dice, actor, action, now)
    }

    /// Decodes a JSON action payload and applies it. Payloads that do not
    /// describe an action are rejected like any other invalid action.
    pub fn apply_json(&mut self, actor: &str, payload: &str, now: u64) -> Result<Resolution, InvalidAction> {
        let action: Action = serde_json::from_str(payload)
            .map_err(|e| InvalidAction::MalformedPayload(e.to_string()))?;
        self.apply(actor, &action, now)
    }

    /// Periodic timeout check. Returns true if the turn was passed.
    pub fn tick(&mut self, now: u64) -> bool {
        check_timeout(&mut self.state, now, self.config.turn_time_ms)
    }

    /// Restores a seated participant to the active roster after a
    /// reconnect. Returns true if the roster changed; unknown ids and
    /// finished matches are ignored.
    pub fn player_joined(&mut self, id: &str) -> bool {
        if self.state.is_over() || self.state.seat_of(id).is_none() || self.state.is_active(id) {
            return false;
        }
        self.state.players.push(PlayerState::new(id.to_string()));
        info!(player = id, "player rejoined");
        true
    }

    /// Removes a participant from the active roster.
    ///
    /// When fewer than two participants remain the match ends with the
    /// remaining one as winner. If the match continues and the leaver held
    /// the turn, the turn passes. Returns the match result if this call
    /// ended the match.
    pub fn player_left(&mut self, id: &str, now: u64) -> Option<&GameOver> {
        let before = self.state.players.len();
        self.state.players.retain(|p| p.id != id);
        if self.state.players.len() == before {
            return None;
        }
        info!(player = id, remaining = self.state.players.len(), "player left");
        if self.state.is_over() {
            return None;
        }

        if self.state.players.len() < 2 {
            let remaining = self
                .state
                .players
                .first()
                .and_then(|p| self.state.seat_of(&p.id));
            if let Some(seat) = remaining {
                declare_winner(&mut self.state, seat);
                return self.state.game_over.as_ref();
            }
        } else if self.state.turn_holder == id {
            pass_turn(&mut self.state, now);
        }
        None
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn graph(&self) -> &Arc<BoardGraph> {
        &self.graph
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn dice_mut(&mut self) -> &mut D {
        &mut self.dice
    }

    /// Terminal outcome, once the match has ended.
    pub fn result(&self) -> Option<&GameOver> {
        self.state.game_over.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Seat, Verdict};
    use crate::resolve::ScriptedDice;

    fn ids() -> Vec<PlayerId> {
        vec!["p1".to_string(), "p2".to_string()]
    }

    fn game() -> Game<ScriptedDice> {
        Game::with_dice(&ids(), 0, MatchConfig::default(), ScriptedDice::default()).unwrap()
    }

    #[test]
    fn setup_requires_two_distinct_ids() {
        let config = MatchConfig::default();
        let one = vec!["p1".to_string()];
        assert_eq!(
            Game::setup(&one, 0, config).unwrap_err(),
            SetupError::WrongPlayerCount(1)
        );
        let dup = vec!["p1".to_string(), "p1".to_string()];
        assert_eq!(
            Game::setup(&dup, 0, config).unwrap_err(),
            SetupError::DuplicatePlayer("p1".to_string())
        );
        let empty = vec!["p1".to_string(), String::new()];
        assert_eq!(Game::setup(&empty, 0, config).unwrap_err(), SetupError::EmptyPlayerId);
    }

    #[test]
    fn setup_applies_grace_period() {
        let g = Game::with_dice(&ids(), 1_000, MatchConfig::default(), ScriptedDice::default()).unwrap();
        assert_eq!(g.state().turn_started_at, 6_000);
        assert_eq!(g.state().turn_holder, "p1");
        assert!(g.result().is_none());
    }

    #[test]
    fn from_state_checks_board_size() {
        let state = MatchState::new(["a".to_string(), "b".to_string()], 5, 0);
        let err = Game::from_state(state, BoardGraph::arena(), MatchConfig::default(), ScriptedDice::default())
            .unwrap_err();
        assert_eq!(err, SetupError::BoardMismatch { state: 5, graph: 28 });
    }

    #[test]
    fn malformed_json_is_invalid_action() {
        let mut g = game();
        let err = g.apply_json("p1", r#"{"kind":"fly"}"#, 0).unwrap_err();
        assert_eq!(err.code(), "malformed_payload");
        assert_eq!(g.state().turn_holder, "p1");
        assert!(g.apply_json("p1", r#"{"kind":"endTurn"}"#, 0).is_ok());
        assert_eq!(g.state().turn_holder, "p2");
    }

    #[test]
    fn tick_respects_configured_budget() {
        let config = MatchConfig {
            turn_time_ms: 1_000,
            initial_grace_ms: 0,
        };
        let mut g = Game::with_dice(&ids(), 0, config, ScriptedDice::default()).unwrap();
        assert!(!g.tick(1_000));
        assert!(g.tick(1_001));
        assert_eq!(g.state().turn_holder, "p2");
    }

    #[test]
    fn leaving_ends_match() {
        let mut g = game();
        let over = g.player_left("p1", 10).cloned().unwrap();
        assert_eq!(over.players["p2"], Verdict::Won);
        assert_eq!(over.players["p1"], Verdict::Lost);
        assert!(g.is_over());
        assert!(!g.tick(u64::MAX));
        assert_eq!(
            g.apply("p2", &Action::EndTurn, 20),
            Err(InvalidAction::MatchOver)
        );
        assert!(g.player_left("p2", 30).is_none());
        assert!(!g.player_joined("p1"));
    }

    #[test]
    fn leave_and_join_of_strangers_are_ignored() {
        let mut g = game();
        assert!(g.player_left("ghost", 0).is_none());
        assert!(!g.player_joined("ghost"));
        assert!(!g.player_joined("p1"));
        assert_eq!(g.state().players.len(), 2);
    }

    #[test]
    fn seated_player_can_rejoin() {
        let mut g = game();
        g.state.players.retain(|p| p.id != "p2");
        assert!(g.player_joined("p2"));
        assert!(g.state().is_active("p2"));
        assert_eq!(g.state().seat_of("p2"), Some(Seat::Second));
    }
}
