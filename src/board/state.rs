//! Match state representation.
//!
//! Holds the complete authoritative snapshot of a match: board occupancy,
//! both benches, the turn holder, the active roster with each player's last
//! combat report, the turn timer, and the pending-attack marker.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::adjacency::BoardGraph;
use super::tile::{Seat, Tile, ALL_SEATS};
use super::unit::{default_bench, Unit};

/// Opaque participant identifier assigned by the host.
pub type PlayerId = String;

/// Outcome of a single attack, kept for display until the attacker's next
/// turn begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatReport {
    pub attacker_dice: Vec<u8>,
    pub defender_dice: Vec<u8>,
    pub from_tile: Tile,
    pub to_tile: Tile,
    pub attacker: PlayerId,
    /// Attacker sum minus defender sum; positive favours the attacker.
    pub result: i32,
}

/// Per-participant state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: PlayerId,
    pub last_combat: Option<CombatReport>,
}

impl PlayerState {
    pub fn new(id: PlayerId) -> Self {
        PlayerState { id, last_combat: None }
    }
}

/// Terminal result for one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Won,
    Lost,
}

/// Terminal match outcome reported to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOver {
    pub players: BTreeMap<PlayerId, Verdict>,
}

impl GameOver {
    /// Marks `winner` as the sole winner among `participants`.
    pub fn declare(winner: &str, participants: &[PlayerId]) -> Self {
        let players = participants
            .iter()
            .map(|id| {
                let verdict = if id == winner { Verdict::Won } else { Verdict::Lost };
                (id.clone(), verdict)
            })
            .collect();
        GameOver { players }
    }

    /// Returns the winning participant, if any.
    pub fn winner(&self) -> Option<&PlayerId> {
        self.players
            .iter()
            .find(|(_, v)| **v == Verdict::Won)
            .map(|(id, _)| id)
    }
}

/// Turn sub-phase derived from the pending-attack marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The turn holder may move, deploy, attack, or pass.
    Idle,
    /// The turn holder must attack from `tile` before the turn can pass.
    AttackPending { tile: Tile },
    /// The match has ended; no further actions are processed.
    Finished,
}

/// Complete match state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    /// Unit on each tile, indexed by tile.
    pub board: Vec<Option<Unit>>,
    /// Undeployed units, indexed by seat.
    pub benches: [Vec<Unit>; 2],
    /// Participant id for each seat, fixed at setup.
    pub seats: [PlayerId; 2],
    pub turn_holder: PlayerId,
    /// Active roster; shrinks when a participant leaves.
    pub players: Vec<PlayerState>,
    /// Game-clock reading (ms) at which the current turn started. May lie in
    /// the future while the opening grace period runs.
    pub turn_started_at: u64,
    /// Tile whose unit must attack before the turn can pass.
    pub attacking_tile: Option<Tile>,
    pub game_over: Option<GameOver>,
}

impl MatchState {
    /// Creates the opening state: empty board, default benches, seat 0 to
    /// move.
    pub fn new(seats: [PlayerId; 2], board_size: usize, turn_started_at: u64) -> Self {
        let players = seats.iter().cloned().map(PlayerState::new).collect();
        MatchState {
            board: vec![None; board_size],
            benches: [default_bench(Seat::First), default_bench(Seat::Second)],
            turn_holder: seats[0].clone(),
            seats,
            players,
            turn_started_at,
            attacking_tile: None,
            game_over: None,
        }
    }

    /// Returns one flag per tile, true where a unit stands.
    pub fn occupancy(&self) -> Vec<bool> {
        self.board.iter().map(Option::is_some).collect()
    }

    /// Returns the unit on `tile`, or `None` if empty or off the board.
    pub fn unit_at(&self, tile: Tile) -> Option<Unit> {
        self.board.get(tile).copied().flatten()
    }

    pub fn bench(&self, seat: Seat) -> &[Unit] {
        &self.benches[seat.index()]
    }

    /// Returns the seat assigned to `id` at setup.
    pub fn seat_of(&self, id: &str) -> Option<Seat> {
        ALL_SEATS.into_iter().find(|s| self.seats[s.index()] == id)
    }

    pub fn player_id(&self, seat: Seat) -> &PlayerId {
        &self.seats[seat.index()]
    }

    /// Returns the seat of the current turn holder.
    pub fn turn_seat(&self) -> Option<Seat> {
        self.seat_of(&self.turn_holder)
    }

    pub fn player(&self, id: &str) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: &str) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Returns true if `id` is still on the active roster.
    pub fn is_active(&self, id: &str) -> bool {
        self.player(id).is_some()
    }

    pub fn is_over(&self) -> bool {
        self.game_over.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.is_over() {
            return Phase::Finished;
        }
        match self.attacking_tile {
            Some(tile) => Phase::AttackPending { tile },
            None => Phase::Idle,
        }
    }

    /// Tiles adjacent to `tile` that hold a unit not owned by `seat`.
    pub fn enemy_neighbors(&self, graph: &BoardGraph, tile: Tile, seat: Seat) -> Vec<Tile> {
        graph
            .adjacent_tiles(tile)
            .iter()
            .copied()
            .filter(|&t| matches!(self.unit_at(t), Some(u) if u.owner != seat))
            .collect()
    }

    /// Counts the units a seat owns across the board and its bench.
    pub fn units_owned(&self, seat: Seat) -> usize {
        let on_board = self
            .board
            .iter()
            .filter(|slot| matches!(slot, Some(u) if u.owner == seat))
            .count();
        on_board + self.bench(seat).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tile::BOARD_SIZE;

    fn seats() -> [PlayerId; 2] {
        ["alice".to_string(), "bob".to_string()]
    }

    #[test]
    fn new_state_is_empty_board_with_full_benches() {
        let state = MatchState::new(seats(), BOARD_SIZE, 5_000);
        assert_eq!(state.board.len(), BOARD_SIZE);
        assert!(state.board.iter().all(Option::is_none));
        assert_eq!(state.bench(Seat::First).len(), 3);
        assert_eq!(state.bench(Seat::Second).len(), 3);
        assert!(state.bench(Seat::Second).iter().all(|u| u.owner == Seat::Second));
        assert_eq!(state.turn_holder, "alice");
        assert_eq!(state.turn_started_at, 5_000);
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.players.len(), 2);
    }

    #[test]
    fn seat_lookup() {
        let state = MatchState::new(seats(), BOARD_SIZE, 0);
        assert_eq!(state.seat_of("bob"), Some(Seat::Second));
        assert_eq!(state.seat_of("carol"), None);
        assert_eq!(state.player_id(Seat::First), "alice");
        assert_eq!(state.turn_seat(), Some(Seat::First));
    }

    #[test]
    fn phase_follows_markers() {
        let mut state = MatchState::new(seats(), BOARD_SIZE, 0);
        state.attacking_tile = Some(12);
        assert_eq!(state.phase(), Phase::AttackPending { tile: 12 });
        state.game_over = Some(GameOver::declare("alice", &state.seats));
        assert_eq!(state.phase(), Phase::Finished);
    }

    #[test]
    fn enemy_neighbors_ignores_friends() {
        let graph = BoardGraph::arena();
        let mut state = MatchState::new(seats(), BOARD_SIZE, 0);
        state.board[12] = Some(Unit::new(Seat::First, 2, 2));
        state.board[13] = Some(Unit::new(Seat::Second, 3, 1));
        state.board[1] = Some(Unit::new(Seat::First, 1, 3));
        assert_eq!(state.enemy_neighbors(&graph, 12, Seat::First), vec![13]);
        assert_eq!(state.enemy_neighbors(&graph, 13, Seat::Second), vec![12]);
        assert!(state.enemy_neighbors(&graph, 1, Seat::Second).contains(&12));
    }

    #[test]
    fn units_owned_counts_board_and_bench() {
        let mut state = MatchState::new(seats(), BOARD_SIZE, 0);
        let unit = state.benches[0].remove(1);
        state.board[7] = Some(unit);
        assert_eq!(state.units_owned(Seat::First), 3);
        assert_eq!(state.units_owned(Seat::Second), 3);
    }

    #[test]
    fn game_over_verdicts() {
        let over = GameOver::declare("bob", &seats());
        assert_eq!(over.players["bob"], Verdict::Won);
        assert_eq!(over.players["alice"], Verdict::Lost);
        assert_eq!(over.winner().map(String::as_str), Some("bob"));
        let json = serde_json::to_string(&over).unwrap();
        assert_eq!(json, r#"{"players":{"alice":"LOST","bob":"WON"}}"#);
    }

    #[test]
    fn state_serializes_camel_case() {
        let state = MatchState::new(seats(), 3, 0);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["turnHolder"], "alice");
        assert_eq!(json["turnStartedAt"], 0);
        assert!(json["attackingTile"].is_null());
        assert_eq!(json["board"].as_array().unwrap().len(), 3);
        assert_eq!(json["players"][0]["lastCombat"], serde_json::Value::Null);
    }
}
