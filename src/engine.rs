//! Host state management.
//!
//! Holds the running match, host options, per-player session counters and
//! the game clock, and turns protocol commands into match calls. Accepted
//! actions are acknowledged to the requester with `ok`; every mutation is
//! followed by a `state` line, and by a `gameover` line when it ended the
//! match. Rejections produce a single `invalid` line and nothing else.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Write};
use std::time::Instant;

use tracing::{info, warn};

use crate::board::{Action, PlayerId};
use crate::game::{Game, MatchConfig, DEFAULT_INITIAL_GRACE_MS, DEFAULT_TURN_TIME_MS};
use crate::protocol::{Response, Snapshot};
use crate::resolve::RandomDice;

/// Source of game-clock readings in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// Wall time elapsed since the host started.
    System(Instant),
    /// Time that only moves when told to, for scripted sessions.
    Manual(u64),
}

impl Clock {
    pub fn system() -> Self {
        Clock::System(Instant::now())
    }

    pub fn now(&self) -> u64 {
        match *self {
            Clock::System(start) => u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            Clock::Manual(ms) => ms,
        }
    }

    /// Moves a manual clock forward. Returns false for the system clock.
    pub fn advance(&mut self, ms: u64) -> bool {
        match self {
            Clock::System(_) => false,
            Clock::Manual(now) => {
                *now = now.saturating_add(ms);
                true
            }
        }
    }
}

/// Holds the mutable state of the host between commands.
pub struct Engine {
    pub game: Option<Game>,
    pub options: HashMap<String, String>,
    /// Connection count per player id, kept across matches.
    pub sessions: BTreeMap<PlayerId, u32>,
    clock: Clock,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    /// Creates a host with no match, running on the system clock.
    pub fn new() -> Self {
        Engine {
            game: None,
            options: HashMap::new(),
            sessions: BTreeMap::new(),
            clock: Clock::system(),
        }
    }

    /// Current game-clock reading.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Sets a host option. The `Clock` option takes effect immediately and
    /// a manual clock starts at zero; the others are read when the next
    /// match starts.
    pub fn set_option(&mut self, name: String, value: Option<String>) {
        if name == "Clock" {
            match value.as_deref() {
                Some("manual") => self.clock = Clock::Manual(0),
                Some("system") => self.clock = Clock::system(),
                other => warn!(value = ?other, "Clock must be 'system' or 'manual'"),
            }
        }
        self.options.insert(name, value.unwrap_or_default());
    }

    fn option_u64(&self, name: &str) -> Option<u64> {
        let raw = self.options.get(name)?;
        match raw.parse::<u64>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(option = name, value = %raw, "ignoring non-numeric option");
                None
            }
        }
    }

    /// Returns the match timing built from options, or the defaults.
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            turn_time_ms: self.option_u64("TurnTime").unwrap_or(DEFAULT_TURN_TIME_MS),
            initial_grace_ms: self.option_u64("InitialGrace").unwrap_or(DEFAULT_INITIAL_GRACE_MS),
        }
    }

    fn dice(&self) -> RandomDice {
        match self.option_u64("Seed") {
            Some(seed) => RandomDice::seeded(seed),
            None => RandomDice::from_entropy(),
        }
    }

    fn bump_session(&mut self, player: &str) -> u32 {
        let count = self.sessions.entry(player.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        send(out, &Response::ReadyOk)
    }

    /// Handles `newmatch`: replaces any running match.
    pub fn handle_newmatch<W: Write>(&mut self, players: &[PlayerId], out: &mut W) -> io::Result<()> {
        let now = self.now();
        let game = match Game::with_dice(players, now, self.match_config(), self.dice()) {
            Ok(game) => game,
            Err(e) => return send(out, &Response::invalid("setup", e)),
        };
        for player in players {
            self.bump_session(player);
        }
        self.game = Some(game);
        send(out, &Response::Ok)?;
        self.broadcast(out, false)
    }

    /// Handles a typed action from `player`.
    pub fn handle_action<W: Write>(&mut self, player: &str, action: &Action, out: &mut W) -> io::Result<()> {
        let now = self.now();
        let Some(game) = self.game.as_mut() else {
            return send(out, &no_match());
        };
        let was_over = game.is_over();
        match game.apply(player, action, now) {
            Ok(_) => {
                send(out, &Response::Ok)?;
                self.broadcast(out, was_over)
            }
            Err(e) => send(out, &Response::rejected(&e)),
        }
    }

    /// Handles a raw JSON action payload from `player`.
    pub fn handle_action_json<W: Write>(&mut self, player: &str, payload: &str, out: &mut W) -> io::Result<()> {
        let now = self.now();
        let Some(game) = self.game.as_mut() else {
            return send(out, &no_match());
        };
        let was_over = game.is_over();
        match game.apply_json(player, payload, now) {
            Ok(_) => {
                send(out, &Response::Ok)?;
                self.broadcast(out, was_over)
            }
            Err(e) => send(out, &Response::rejected(&e)),
        }
    }

    /// Handles `tick`: broadcasts only when a timeout passed the turn.
    pub fn handle_tick<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let now = self.now();
        let passed = match self.game.as_mut() {
            Some(game) => game.tick(now),
            None => false,
        };
        if passed {
            self.broadcast(out, false)
        } else {
            Ok(())
        }
    }

    /// Handles `advance`: moves the manual clock, then ticks.
    pub fn handle_advance<W: Write>(&mut self, ms: u64, out: &mut W) -> io::Result<()> {
        if !self.clock.advance(ms) {
            return send(out, &Response::invalid("clock", "advance needs the manual clock"));
        }
        self.handle_tick(out)
    }

    /// Handles a participant connecting.
    pub fn handle_join<W: Write>(&mut self, player: &str, out: &mut W) -> io::Result<()> {
        let count = self.bump_session(player);
        info!(player, sessions = count, "player joined");
        let Some(game) = self.game.as_mut() else {
            return Ok(());
        };
        game.player_joined(player);
        self.broadcast(out, false)
    }

    /// Handles a participant disconnecting.
    pub fn handle_leave<W: Write>(&mut self, player: &str, out: &mut W) -> io::Result<()> {
        let now = self.now();
        let Some(game) = self.game.as_mut() else {
            return Ok(());
        };
        let was_over = game.is_over();
        let before = game.state().players.len();
        game.player_left(player, now);
        if game.state().players.len() == before {
            return Ok(());
        }
        self.broadcast(out, was_over)
    }

    /// Handles `state`.
    pub fn handle_state<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match &self.game {
            Some(game) => {
                let snapshot = Snapshot::new(game.state(), self.now(), &self.sessions);
                send(out, &Response::state(&snapshot)?)
            }
            None => send(out, &no_match()),
        }
    }

    /// Writes the state line, plus the result if the match ended since
    /// `was_over` was sampled.
    fn broadcast<W: Write>(&self, out: &mut W, was_over: bool) -> io::Result<()> {
        let Some(game) = &self.game else {
            return Ok(());
        };
        let snapshot = Snapshot::new(game.state(), self.now(), &self.sessions);
        send(out, &Response::state(&snapshot)?)?;
        if let (false, Some(result)) = (was_over, game.result()) {
            send(out, &Response::game_over(result)?)?;
        }
        Ok(())
    }
}

fn no_match() -> Response {
    Response::invalid("no_match", "no match in progress")
}

fn send<W: Write>(out: &mut W, response: &Response) -> io::Result<()> {
    writeln!(out, "{}", response)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_engine() -> Engine {
        let mut engine = Engine::new();
        engine.set_option("Clock".to_string(), Some("manual".to_string()));
        engine.set_option("Seed".to_string(), Some("7".to_string()));
        engine
    }

    fn run(engine: &mut Engine, f: impl FnOnce(&mut Engine, &mut Vec<u8>) -> io::Result<()>) -> Vec<String> {
        let mut output = Vec::new();
        f(engine, &mut output).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn start(engine: &mut Engine) {
        let players = vec!["alice".to_string(), "bob".to_string()];
        run(engine, |e, out| e.handle_newmatch(&players, out));
    }

    #[test]
    fn new_engine_has_no_match() {
        let engine = Engine::new();
        assert!(engine.game.is_none());
        assert!(engine.options.is_empty());
        assert!(engine.sessions.is_empty());
    }

    #[test]
    fn isready_outputs_readyok() {
        let mut engine = Engine::new();
        assert_eq!(run(&mut engine, |e, out| e.handle_isready(out)), vec!["readyok"]);
    }

    #[test]
    fn options_shape_match_config() {
        let mut engine = Engine::new();
        assert_eq!(engine.match_config(), MatchConfig::default());
        engine.set_option("TurnTime".to_string(), Some("1000".to_string()));
        engine.set_option("InitialGrace".to_string(), Some("0".to_string()));
        assert_eq!(
            engine.match_config(),
            MatchConfig {
                turn_time_ms: 1_000,
                initial_grace_ms: 0,
            }
        );
        engine.set_option("TurnTime".to_string(), Some("soon".to_string()));
        assert_eq!(engine.match_config().turn_time_ms, DEFAULT_TURN_TIME_MS);
    }

    #[test]
    fn manual_clock_advances() {
        let mut engine = manual_engine();
        assert_eq!(engine.now(), 0);
        run(&mut engine, |e, out| e.handle_advance(250, out));
        assert_eq!(engine.now(), 250);
    }

    #[test]
    fn advance_rejected_on_system_clock() {
        let mut engine = Engine::new();
        let lines = run(&mut engine, |e, out| e.handle_advance(10, out));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("invalid clock"));
    }

    #[test]
    fn newmatch_counts_sessions_and_broadcasts() {
        let mut engine = manual_engine();
        let players = vec!["alice".to_string(), "bob".to_string()];
        let lines = run(&mut engine, |e, out| e.handle_newmatch(&players, out));
        assert_eq!(lines[0], "ok");
        assert!(lines[1].starts_with("state "));
        assert_eq!(engine.sessions["alice"], 1);
        run(&mut engine, |e, out| e.handle_join("alice", out));
        assert_eq!(engine.sessions["alice"], 2);
    }

    #[test]
    fn bad_newmatch_is_rejected() {
        let mut engine = manual_engine();
        let players = vec!["solo".to_string()];
        let lines = run(&mut engine, |e, out| e.handle_newmatch(&players, out));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("invalid setup"));
        assert!(engine.game.is_none());
        assert!(engine.sessions.is_empty());
    }

    #[test]
    fn actions_without_match() {
        let mut engine = manual_engine();
        let lines = run(&mut engine, |e, out| e.handle_action("alice", &Action::EndTurn, out));
        assert_eq!(lines, vec!["invalid no_match no match in progress"]);
    }

    #[test]
    fn rejected_action_writes_only_invalid() {
        let mut engine = manual_engine();
        start(&mut engine);
        let lines = run(&mut engine, |e, out| e.handle_action("bob", &Action::EndTurn, out));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("invalid not_your_turn"));
    }

    #[test]
    fn accepted_action_writes_ok_and_state() {
        let mut engine = manual_engine();
        start(&mut engine);
        let lines = run(&mut engine, |e, out| {
            e.handle_action_json("alice", r#"{"kind":"playUnit","benchIndex":0,"toTile":1}"#, out)
        });
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "ok");
        assert!(lines[1].contains(r#""turnHolder":"bob""#));
    }

    #[test]
    fn timeout_via_advance() {
        let mut engine = manual_engine();
        start(&mut engine);
        assert!(run(&mut engine, |e, out| e.handle_advance(35_000, out)).is_empty());
        let lines = run(&mut engine, |e, out| e.handle_advance(1, out));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains(r#""turnHolder":"bob""#));
    }

    #[test]
    fn leave_reports_game_over_once() {
        let mut engine = manual_engine();
        start(&mut engine);
        let lines = run(&mut engine, |e, out| e.handle_leave("alice", out));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], r#"gameover {"players":{"alice":"LOST","bob":"WON"}}"#);
        let lines = run(&mut engine, |e, out| e.handle_leave("bob", out));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("state "));
    }
}
