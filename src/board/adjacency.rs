//! Adjacency graph for the arena board.
//!
//! The arena is stored as a directed edge list (each tile lists some of its
//! neighbours) but every query treats edges as undirected. The standard
//! topology is built once on first access and shared read-only behind an
//! `Arc`; tests may construct other graphs through [`BoardGraph::new`].
//!
//! Reachability is a breadth-limited search over the edge list. Once an edge
//! has been expanded from a search front it is consumed for the rest of that
//! search, so a unit can never walk back along an edge it already used and
//! every query does at most one pass over the edges per step.

use std::sync::{Arc, LazyLock};

use super::tile::{Seat, Tile, TileRole, BOARD_SIZE};

/// Errors raised when constructing a board graph from raw tables.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("role table has {roles} tiles but edge table has {edges}")]
    LengthMismatch { roles: usize, edges: usize },

    #[error("edge {from} -> {to} points outside the board")]
    EdgeOutOfBounds { from: Tile, to: Tile },

    #[error("tile {0} lists itself as a neighbour")]
    SelfLoop(Tile),
}

/// Alias role names for readability.
use TileRole::{Goal, Neutral, Spawn};

const P1: Seat = Seat::First;
const P2: Seat = Seat::Second;

/// Role of every arena tile. The layout is mirrored diagonally between the
/// two sides: seat 0 holds the top rows, seat 1 the bottom rows.
pub static ARENA_ROLES: [TileRole; BOARD_SIZE] = [
    // Seat 0 zone
    Goal(P1),  // 0
    Spawn(P1), // 1
    Spawn(P1), // 2
    Neutral,   // 3
    Neutral,   // 4
    Neutral,   // 5
    Neutral,   // 6
    // West path, top to bottom
    Neutral, // 7
    Neutral, // 8
    Neutral, // 9
    // Central island
    Neutral, // 10
    Neutral, // 11
    Neutral, // 12
    Neutral, // 13
    Neutral, // 14
    Neutral, // 15
    Neutral, // 16
    Neutral, // 17
    // East path, bottom to top
    Neutral, // 18
    Neutral, // 19
    Neutral, // 20
    // Seat 1 zone
    Neutral,   // 21
    Neutral,   // 22
    Neutral,   // 23
    Neutral,   // 24
    Spawn(P2), // 25
    Spawn(P2), // 26
    Goal(P2),  // 27
];

/// Forward edge lists of the arena, indexed by source tile.
///
/// Clients render this exact table, so it must not be reordered.
pub static ARENA_EDGES: [&[Tile]; BOARD_SIZE] = [
    &[3, 5],   // 0
    &[7, 12],  // 1
    &[10],     // 2
    &[4, 11],  // 3
    &[1],      // 4
    &[6],      // 5
    &[2],      // 6
    &[8],      // 7
    &[9],      // 8
    &[25],     // 9
    &[11],     // 10
    &[12],     // 11
    &[13],     // 12
    &[17],     // 13
    &[10],     // 14
    &[14],     // 15
    &[15],     // 16
    &[16],     // 17
    &[2],      // 18
    &[18],     // 19
    &[19],     // 20
    &[25],     // 21
    &[21],     // 22
    &[26],     // 23
    &[23, 16], // 24
    &[17],     // 25
    &[20, 15], // 26
    &[24, 22], // 27
];

/// Number of directed entries in [`ARENA_EDGES`].
pub const ARENA_EDGE_COUNT: usize = 34;

static ARENA: LazyLock<Arc<BoardGraph>> = LazyLock::new(|| {
    let forward = ARENA_EDGES.iter().map(|list| list.to_vec()).collect();
    Arc::new(BoardGraph::build(ARENA_ROLES.to_vec(), forward))
});

/// Immutable tile graph with role annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardGraph {
    roles: Vec<TileRole>,
    /// Forward lists exactly as supplied.
    forward: Vec<Vec<Tile>>,
    /// Forward lists followed by reverse lookups, per tile.
    neighbors: Vec<Vec<Tile>>,
    /// Flattened `(source, target)` pairs in forward-list order.
    edges: Vec<(Tile, Tile)>,
}

impl BoardGraph {
    /// Returns the shared standard arena graph.
    pub fn arena() -> Arc<BoardGraph> {
        Arc::clone(&ARENA)
    }

    /// Builds a graph from a role table and forward edge lists, validating
    /// that both tables describe the same tiles and every edge stays on the
    /// board.
    pub fn new(roles: Vec<TileRole>, forward: Vec<Vec<Tile>>) -> Result<Self, GraphError> {
        if roles.len() != forward.len() {
            return Err(GraphError::LengthMismatch {
                roles: roles.len(),
                edges: forward.len(),
            });
        }
        for (from, list) in forward.iter().enumerate() {
            for &to in list {
                if to >= roles.len() {
                    return Err(GraphError::EdgeOutOfBounds { from, to });
                }
                if to == from {
                    return Err(GraphError::SelfLoop(from));
                }
            }
        }
        Ok(Self::build(roles, forward))
    }

    fn build(roles: Vec<TileRole>, forward: Vec<Vec<Tile>>) -> Self {
        let size = roles.len();
        let mut edges = Vec::new();
        for (from, list) in forward.iter().enumerate() {
            for &to in list {
                edges.push((from, to));
            }
        }

        let mut neighbors: Vec<Vec<Tile>> = forward.clone();
        for (tile, adjacent) in neighbors.iter_mut().enumerate() {
            for (other, list) in forward.iter().enumerate() {
                if other != tile && list.contains(&tile) && !adjacent.contains(&other) {
                    adjacent.push(other);
                }
            }
        }
        debug_assert_eq!(neighbors.len(), size);

        BoardGraph {
            roles,
            forward,
            neighbors,
            edges,
        }
    }

    /// Number of tiles on the board.
    pub fn size(&self) -> usize {
        self.roles.len()
    }

    pub fn contains(&self, tile: Tile) -> bool {
        tile < self.roles.len()
    }

    /// Returns the role of a tile, or `None` if it is off the board.
    pub fn role(&self, tile: Tile) -> Option<TileRole> {
        self.roles.get(tile).copied()
    }

    /// Returns the forward edge list of a tile as stored.
    pub fn forward_edges(&self, tile: Tile) -> &[Tile] {
        self.forward.get(tile).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of stored (directed) edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns every tile directly connected to `tile` in either direction.
    ///
    /// The forward list comes first, followed by tiles that list `tile` as a
    /// neighbour in ascending order. Off-board tiles have no neighbours.
    pub fn adjacent_tiles(&self, tile: Tile) -> &[Tile] {
        self.neighbors.get(tile).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_adjacent(&self, a: Tile, b: Tile) -> bool {
        self.adjacent_tiles(a).contains(&b)
    }

    /// Returns spawn tiles owned by `seat`, in ascending order.
    pub fn spawn_tiles_for(&self, seat: Seat) -> Vec<Tile> {
        self.tiles_matching(|role| role.is_spawn_of(seat))
    }

    /// Returns the goal tile defended by `seat`.
    pub fn goal_tile_for(&self, seat: Seat) -> Option<Tile> {
        self.roles.iter().position(|role| role.is_goal_of(seat))
    }

    fn tiles_matching(&self, pred: impl Fn(TileRole) -> bool) -> Vec<Tile> {
        self.roles
            .iter()
            .enumerate()
            .filter(|(_, role)| pred(**role))
            .map(|(tile, _)| tile)
            .collect()
    }

    /// Computes the reach of a unit standing on `from`.
    ///
    /// Entry `k` of the result lists the tiles first reached after `k` steps,
    /// for `k` in `0..=movement`; entry 0 is always `[from]`. A tile can only
    /// be entered when `occupancy` marks it empty, so occupied tiles block
    /// both landing and passing through. Returns an empty list when `from`
    /// is off the board.
    pub fn reachable_tiles(&self, from: Tile, movement: u32, occupancy: &[bool]) -> Vec<Vec<Tile>> {
        if !self.contains(from) {
            return Vec::new();
        }
        let mut consumed = vec![false; self.edges.len()];
        let mut reach = vec![vec![from]];
        for step in 1..=movement as usize {
            let next = self.expand(&reach[step - 1], occupancy, &mut consumed, None);
            reach.push(next.tiles);
        }
        reach
    }

    /// Returns true if `target` can be reached from `from` within `movement`
    /// steps, stopping as soon as it is found.
    pub fn is_reachable(&self, target: Tile, from: Tile, movement: u32, occupancy: &[bool]) -> bool {
        if !self.contains(from) || !self.contains(target) {
            return false;
        }
        if from == target {
            return true;
        }
        let mut consumed = vec![false; self.edges.len()];
        let mut front = vec![from];
        for _ in 0..movement {
            let next = self.expand(&front, occupancy, &mut consumed, Some(target));
            if next.found {
                return true;
            }
            if next.tiles.is_empty() {
                break;
            }
            front = next.tiles;
        }
        false
    }

    /// Advances a search front by one step, consuming every edge that
    /// touches the front.
    fn expand(
        &self,
        front: &[Tile],
        occupancy: &[bool],
        consumed: &mut [bool],
        target: Option<Tile>,
    ) -> Expansion {
        let mut in_front = vec![false; self.size()];
        for &tile in front {
            in_front[tile] = true;
        }

        let mut seen = vec![false; self.size()];
        let mut tiles = Vec::new();
        let mut enter = |tile: Tile, tiles: &mut Vec<Tile>| -> bool {
            if is_occupied(occupancy, tile) || seen[tile] {
                return false;
            }
            seen[tile] = true;
            tiles.push(tile);
            target == Some(tile)
        };

        for (i, &(source, dest)) in self.edges.iter().enumerate() {
            if consumed[i] {
                continue;
            }
            let mut touched = false;
            if in_front[source] {
                touched = true;
                if enter(dest, &mut tiles) {
                    return Expansion { tiles, found: true };
                }
            }
            if in_front[dest] {
                touched = true;
                if enter(source, &mut tiles) {
                    return Expansion { tiles, found: true };
                }
            }
            if touched {
                consumed[i] = true;
            }
        }
        Expansion { tiles, found: false }
    }
}

struct Expansion {
    tiles: Vec<Tile>,
    found: bool,
}

#[inline]
fn is_occupied(occupancy: &[bool], tile: Tile) -> bool {
    occupancy.get(tile).copied().unwrap_or(false)
}

/// Flattens a layered reach into a list of distinct tiles in step order.
pub fn flatten_reach(reach: &[Vec<Tile>]) -> Vec<Tile> {
    let mut flat = Vec::new();
    for layer in reach {
        for &tile in layer {
            if !flat.contains(&tile) {
                flat.push(tile);
            }
        }
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> Vec<bool> {
        vec![false; BOARD_SIZE]
    }

    fn sorted(mut tiles: Vec<Tile>) -> Vec<Tile> {
        tiles.sort_unstable();
        tiles
    }

    #[test]
    fn arena_table_sizes() {
        let graph = BoardGraph::arena();
        assert_eq!(graph.size(), BOARD_SIZE);
        assert_eq!(graph.edge_count(), ARENA_EDGE_COUNT);
    }

    #[test]
    fn arena_tables_validate() {
        let forward = ARENA_EDGES.iter().map(|l| l.to_vec()).collect();
        let graph = BoardGraph::new(ARENA_ROLES.to_vec(), forward).unwrap();
        assert_eq!(&graph, BoardGraph::arena().as_ref());
    }

    #[test]
    fn arena_role_counts() {
        let graph = BoardGraph::arena();
        let neutral = (0..BOARD_SIZE)
            .filter(|&t| graph.role(t) == Some(TileRole::Neutral))
            .count();
        assert_eq!(neutral, BOARD_SIZE - 6);
        assert_eq!(graph.goal_tile_for(Seat::First), Some(0));
        assert_eq!(graph.goal_tile_for(Seat::Second), Some(27));
        assert_eq!(graph.spawn_tiles_for(Seat::First), vec![1, 2]);
        assert_eq!(graph.spawn_tiles_for(Seat::Second), vec![25, 26]);
    }

    #[test]
    fn adjacency_combines_forward_and_reverse() {
        let graph = BoardGraph::arena();
        assert_eq!(graph.adjacent_tiles(1), &[7, 12, 4]);
        assert_eq!(graph.adjacent_tiles(0), &[3, 5]);
        assert_eq!(graph.adjacent_tiles(27), &[24, 22]);
        assert_eq!(sorted(graph.adjacent_tiles(25).to_vec()), vec![9, 17, 21]);
    }

    #[test]
    fn adjacency_is_symmetric() {
        let graph = BoardGraph::arena();
        for a in 0..BOARD_SIZE {
            for &b in graph.adjacent_tiles(a) {
                assert!(
                    graph.is_adjacent(b, a),
                    "tile {} lists {} but not the reverse",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn reverse_lookup_includes_tile_zero() {
        // No forward list names tile 0, so 3 only sees it through the
        // reverse lookup.
        let graph = BoardGraph::arena();
        assert!(graph.is_adjacent(3, 0));
        assert!(graph.is_adjacent(4, 3));
    }

    #[test]
    fn off_board_tile_has_no_neighbours() {
        let graph = BoardGraph::arena();
        assert!(graph.adjacent_tiles(BOARD_SIZE).is_empty());
        assert_eq!(graph.role(BOARD_SIZE), None);
    }

    #[test]
    fn reach_layers_on_empty_board() {
        let graph = BoardGraph::arena();
        let reach = graph.reachable_tiles(1, 2, &empty());
        assert_eq!(reach.len(), 3);
        assert_eq!(reach[0], vec![1]);
        assert_eq!(sorted(reach[1].clone()), vec![4, 7, 12]);
        assert_eq!(sorted(reach[2].clone()), vec![3, 8, 11, 13]);
    }

    #[test]
    fn reach_zero_movement_is_origin_only() {
        let graph = BoardGraph::arena();
        assert_eq!(graph.reachable_tiles(5, 0, &empty()), vec![vec![5]]);
        assert!(graph.is_reachable(5, 5, 0, &empty()));
        assert!(!graph.is_reachable(6, 5, 0, &empty()));
    }

    #[test]
    fn reach_never_walks_back_along_used_edge() {
        let graph = BoardGraph::arena();
        // 4 has only two edges; after stepping to 1 the edge back is consumed.
        let reach = graph.reachable_tiles(4, 2, &empty());
        let flat = flatten_reach(&reach);
        assert_eq!(flat.iter().filter(|&&t| t == 4).count(), 1);
    }

    #[test]
    fn occupied_tiles_block_movement() {
        let graph = BoardGraph::arena();
        let mut occ = empty();
        occ[4] = true;
        occ[12] = true;
        let reach = graph.reachable_tiles(1, 3, &occ);
        let flat = flatten_reach(&reach);
        assert!(!flat.contains(&4));
        assert!(!flat.contains(&12));
        assert!(!flat.contains(&3));
        assert!(flat.contains(&9));
        assert!(!graph.is_reachable(0, 1, 3, &occ));
    }

    #[test]
    fn goal_reachable_with_three_steps() {
        let graph = BoardGraph::arena();
        assert!(graph.is_reachable(0, 1, 3, &empty()));
        assert!(!graph.is_reachable(0, 1, 2, &empty()));
    }

    #[test]
    fn is_reachable_agrees_with_layers() {
        let graph = BoardGraph::arena();
        let mut occ = empty();
        occ[11] = true;
        occ[20] = true;
        occ[9] = true;
        for from in 0..BOARD_SIZE {
            for movement in 0..4 {
                let flat = flatten_reach(&graph.reachable_tiles(from, movement, &occ));
                for target in 0..BOARD_SIZE {
                    assert_eq!(
                        graph.is_reachable(target, from, movement, &occ),
                        flat.contains(&target),
                        "from {} to {} with movement {}",
                        from,
                        target,
                        movement
                    );
                }
            }
        }
    }

    #[test]
    fn reachability_is_monotonic_in_movement() {
        let graph = BoardGraph::arena();
        let occ = empty();
        for from in 0..BOARD_SIZE {
            for target in 0..BOARD_SIZE {
                let mut seen = false;
                for movement in 0..6 {
                    let now = graph.is_reachable(target, from, movement, &occ);
                    assert!(!seen || now, "lost reach {} -> {} at {}", from, target, movement);
                    seen = now;
                }
            }
        }
    }

    #[test]
    fn new_rejects_bad_tables() {
        assert_eq!(
            BoardGraph::new(vec![TileRole::Neutral; 2], vec![vec![1]]),
            Err(GraphError::LengthMismatch { roles: 2, edges: 1 })
        );
        assert_eq!(
            BoardGraph::new(vec![TileRole::Neutral; 2], vec![vec![2], vec![]]),
            Err(GraphError::EdgeOutOfBounds { from: 0, to: 2 })
        );
        assert_eq!(
            BoardGraph::new(vec![TileRole::Neutral; 2], vec![vec![], vec![1]]),
            Err(GraphError::SelfLoop(1))
        );
    }

    #[test]
    fn triangle_reach_consumes_edges() {
        // 0 - 1 - 2 - 0: both neighbours of 0 are found in one step. The
        // closing edge 1-2 is untouched until step two, where each end is
        // entered again from the other.
        let graph = BoardGraph::new(
            vec![TileRole::Neutral; 3],
            vec![vec![1], vec![2], vec![0]],
        )
        .unwrap();
        let reach = graph.reachable_tiles(0, 2, &[true, false, false]);
        assert_eq!(sorted(reach[1].clone()), vec![1, 2]);
        assert_eq!(sorted(reach[2].clone()), vec![1, 2]);
    }
}
