//! Graph search over puzzle states.
//!
//! Three strategies share one expansion and termination contract:
//! - `AStarSearch`: priority queue ordered by `f = g + h`, ties broken by insertion order.
//! - `BfsSearch`: FIFO queue.
//! - `DfsSearch`: LIFO stack with a per-difficulty depth ceiling.
//!
//! Every run owns its frontier, visited set and path arena; nothing survives the call.
//! A run always ends in one of the `Termination` states, and when it ends without a
//! solution it hands back the best partial path it tracked (if any).
use crate::config::{Algorithm, Difficulty, SearchBudget, SearchLimits};
use crate::engine::{CanonicalKey, Direction, PuzzleState};
use crate::heuristics::estimate_remaining_cost;
use log::{debug, info, warn};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet, VecDeque};
use std::time::{Duration, Instant};

/// BFS and DFS only track partial paths strictly shorter than this.
pub const BEST_PATH_LENGTH_CAP: usize = 100;

/// Why a search run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Termination {
    /// An expanded state was solved; the report carries its path.
    Solved,
    /// The wall-clock budget ran out.
    TimeExceeded,
    /// The node-expansion ceiling was reached.
    NodeLimitExceeded,
    /// Every reachable state (within the depth ceiling) was expanded.
    FrontierExhausted,
    /// The cancellation flag was raised.
    Cancelled,
}

/// The outcome of one search run.
#[derive(Clone, Debug)]
pub struct SearchReport {
    pub algorithm: Algorithm,
    pub termination: Termination,
    /// The solving path when `termination` is `Solved`, otherwise the best partial path.
    /// `None` if the run found neither.
    pub path: Option<Vec<Direction>>,
    pub nodes_expanded: usize,
    pub elapsed: Duration,
}

impl SearchReport {
    pub fn is_solved(&self) -> bool {
        self.termination == Termination::Solved
    }

    pub fn into_path(self) -> Option<Vec<Direction>> {
        self.path
    }
}

/// A graph-search algorithm over `PuzzleState`s.
pub trait SearchStrategy {
    fn algorithm(&self) -> Algorithm;

    /// Explores from `initial` under `limits` and reports how the run ended.
    fn run(&self, initial: &PuzzleState, limits: &SearchLimits) -> SearchReport;

    /// Searches with the default budget for `difficulty`, capped at `time_limit`.
    ///
    /// # Returns
    /// A solving path, a best-effort partial path, or `None` if the run produced neither.
    fn search(
        &self,
        initial: &PuzzleState,
        time_limit: Duration,
        difficulty: Difficulty,
    ) -> Option<Vec<Direction>> {
        let limits = SearchBudget::new(self.algorithm(), difficulty)
            .with_time_limit(time_limit)
            .limits();
        self.run(initial, &limits).into_path()
    }
}

/// Builds the strategy implementing `algorithm`.
pub fn strategy_for(algorithm: Algorithm) -> Box<dyn SearchStrategy> {
    match algorithm {
        Algorithm::AStar => Box::new(AStarSearch),
        Algorithm::Bfs => Box::new(BfsSearch),
        Algorithm::Dfs => Box::new(DfsSearch),
    }
}

/// Best-first search ordered by path length plus `estimate_remaining_cost`.
///
/// The best partial path is the one reaching the expanded non-root state with the lowest
/// heuristic value.
#[derive(Clone, Copy, Debug, Default)]
pub struct AStarSearch;

impl SearchStrategy for AStarSearch {
    fn algorithm(&self) -> Algorithm {
        Algorithm::AStar
    }

    fn run(&self, initial: &PuzzleState, limits: &SearchLimits) -> SearchReport {
        explore(
            Algorithm::AStar,
            initial,
            limits,
            Frontier::priority(),
            PartialCriterion::LowestHeuristic,
        )
    }
}

/// Breadth-first search. Finds a shortest path when it runs to completion.
///
/// The best partial path is the longest one expanded, below `BEST_PATH_LENGTH_CAP`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BfsSearch;

impl SearchStrategy for BfsSearch {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Bfs
    }

    fn run(&self, initial: &PuzzleState, limits: &SearchLimits) -> SearchReport {
        explore(
            Algorithm::Bfs,
            initial,
            limits,
            Frontier::Fifo(VecDeque::new()),
            PartialCriterion::LongestUnderCap(BEST_PATH_LENGTH_CAP),
        )
    }
}

/// Depth-first search. States at `limits.max_depth` are not expanded.
///
/// The best partial path is the longest one expanded, below `BEST_PATH_LENGTH_CAP`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DfsSearch;

impl SearchStrategy for DfsSearch {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Dfs
    }

    fn run(&self, initial: &PuzzleState, limits: &SearchLimits) -> SearchReport {
        explore(
            Algorithm::Dfs,
            initial,
            limits,
            Frontier::Lifo(Vec::new()),
            PartialCriterion::LongestUnderCap(BEST_PATH_LENGTH_CAP),
        )
    }
}

/// Parent links for every generated node; paths are rebuilt on demand.
#[derive(Default)]
struct PathArena {
    steps: Vec<(Option<usize>, Direction)>,
}

impl PathArena {
    fn push(&mut self, parent: Option<usize>, direction: Direction) -> usize {
        self.steps.push((parent, direction));
        self.steps.len() - 1
    }

    fn path_to(&self, tip: Option<usize>) -> Vec<Direction> {
        let mut path = Vec::new();
        let mut cursor = tip;
        while let Some(idx) = cursor {
            let (parent, direction) = self.steps[idx];
            path.push(direction);
            cursor = parent;
        }
        path.reverse();
        path
    }
}

struct SearchNode {
    state: PuzzleState,
    /// Arena index of the last step; `None` for the root.
    tip: Option<usize>,
    depth: usize,
    heuristic: u32,
}

/// A* queue entry. Ordered so `BinaryHeap` pops the lowest `f`, then the earliest insertion.
struct Prioritized {
    f: usize,
    seq: u64,
    node: SearchNode,
}

impl PartialEq for Prioritized {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.seq == other.seq
    }
}

impl Eq for Prioritized {}

impl Ord for Prioritized {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Prioritized {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

enum Frontier {
    Priority {
        heap: BinaryHeap<Prioritized>,
        next_seq: u64,
    },
    Fifo(VecDeque<SearchNode>),
    Lifo(Vec<SearchNode>),
}

impl Frontier {
    fn priority() -> Self {
        Frontier::Priority {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    fn needs_heuristic(&self) -> bool {
        matches!(self, Frontier::Priority { .. })
    }

    fn push(&mut self, node: SearchNode) {
        match self {
            Frontier::Priority { heap, next_seq } => {
                let f = node.depth + node.heuristic as usize;
                heap.push(Prioritized {
                    f,
                    seq: *next_seq,
                    node,
                });
                *next_seq += 1;
            }
            Frontier::Fifo(queue) => queue.push_back(node),
            Frontier::Lifo(stack) => stack.push(node),
        }
    }

    fn pop(&mut self) -> Option<SearchNode> {
        match self {
            Frontier::Priority { heap, .. } => heap.pop().map(|entry| entry.node),
            Frontier::Fifo(queue) => queue.pop_front(),
            Frontier::Lifo(stack) => stack.pop(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum PartialCriterion {
    /// Lowest heuristic among expanded non-root states.
    LowestHeuristic,
    /// Longest expanded path strictly shorter than the cap.
    LongestUnderCap(usize),
}

struct BestPartial {
    criterion: PartialCriterion,
    tip: Option<usize>,
    length: usize,
    heuristic: u32,
}

impl BestPartial {
    fn new(criterion: PartialCriterion) -> Self {
        BestPartial {
            criterion,
            tip: None,
            length: 0,
            heuristic: u32::MAX,
        }
    }

    fn offer(&mut self, tip: Option<usize>, length: usize, heuristic: u32) {
        if length == 0 {
            return;
        }
        let better = match self.criterion {
            PartialCriterion::LowestHeuristic => heuristic < self.heuristic,
            PartialCriterion::LongestUnderCap(cap) => length > self.length && length < cap,
        };
        if better {
            self.tip = tip;
            self.length = length;
            self.heuristic = heuristic;
        }
    }

    fn path(&self, arena: &PathArena) -> Option<Vec<Direction>> {
        if self.length == 0 {
            return None;
        }
        Some(arena.path_to(self.tip))
    }
}

/// The shared search loop.
///
/// Each iteration checks the time budget and the cancellation flag, pops one node,
/// offers it as a partial candidate, returns at once if it is solved, generates its
/// unvisited successors (unless it sits at the depth ceiling), and finally checks the
/// node ceiling. Keys enter the visited set when generated, so no key is expanded twice.
fn explore(
    algorithm: Algorithm,
    initial: &PuzzleState,
    limits: &SearchLimits,
    mut frontier: Frontier,
    criterion: PartialCriterion,
) -> SearchReport {
    let started = Instant::now();
    let needs_heuristic = frontier.needs_heuristic();
    let mut visited: HashSet<CanonicalKey> = HashSet::new();
    let mut arena = PathArena::default();
    let mut best = BestPartial::new(criterion);
    let mut nodes_expanded = 0usize;

    visited.insert(initial.canonical_key());
    frontier.push(SearchNode {
        state: initial.clone(),
        tip: None,
        depth: 0,
        heuristic: estimate_remaining_cost(initial),
    });

    let termination = loop {
        if started.elapsed() >= limits.time_limit {
            break Termination::TimeExceeded;
        }
        if limits.is_cancelled() {
            break Termination::Cancelled;
        }
        let Some(node) = frontier.pop() else {
            break Termination::FrontierExhausted;
        };
        nodes_expanded += 1;

        best.offer(node.tip, node.depth, node.heuristic);

        if node.state.is_solved() {
            let path = arena.path_to(node.tip);
            info!(
                "{} solved: {} moves, {} nodes",
                algorithm,
                path.len(),
                nodes_expanded
            );
            return SearchReport {
                algorithm,
                termination: Termination::Solved,
                path: Some(path),
                nodes_expanded,
                elapsed: started.elapsed(),
            };
        }

        let expandable = limits.max_depth.map_or(true, |max| node.depth < max);
        if expandable {
            for direction in Direction::ALL {
                let Some(child) = node.state.apply_move(direction) else {
                    continue;
                };
                if !visited.insert(child.canonical_key()) {
                    continue;
                }
                let heuristic = if needs_heuristic {
                    estimate_remaining_cost(&child)
                } else {
                    0
                };
                let tip = arena.push(node.tip, direction);
                frontier.push(SearchNode {
                    state: child,
                    tip: Some(tip),
                    depth: node.depth + 1,
                    heuristic,
                });
            }
        }

        if nodes_expanded >= limits.max_nodes {
            break Termination::NodeLimitExceeded;
        }
    };

    let path = best.path(&arena);
    let moves = path.as_ref().map_or(0, Vec::len);
    match (termination, path.is_some()) {
        (Termination::TimeExceeded, true) => {
            warn!("{} timeout - using best path found ({} moves)", algorithm, moves)
        }
        (Termination::TimeExceeded, false) => {
            warn!("{} timeout after {} nodes", algorithm, nodes_expanded)
        }
        (Termination::NodeLimitExceeded, true) => {
            warn!("{} node limit - using best path ({} moves)", algorithm, moves)
        }
        (Termination::NodeLimitExceeded, false) => {
            warn!("{} node limit: {} nodes", algorithm, nodes_expanded)
        }
        (Termination::Cancelled, _) => {
            warn!("{} cancelled after {} nodes", algorithm, nodes_expanded)
        }
        (_, true) => info!("{} returning best path found: {} moves", algorithm, moves),
        (_, false) => info!("{} found no path after {} nodes", algorithm, nodes_expanded),
    }
    debug!(
        "{} visited {} keys, generated {} steps in {:?}",
        algorithm,
        visited.len(),
        arena.steps.len(),
        started.elapsed()
    );

    SearchReport {
        algorithm,
        termination,
        path,
        nodes_expanded,
        elapsed: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{replay_path, state_from_str_array};
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;

    fn solves(initial: &PuzzleState, path: &[Direction]) -> bool {
        replay_path(initial, path).is_some_and(|end| end.is_solved())
    }

    fn cornered() -> PuzzleState {
        state_from_str_array(&[
            "######",
            "#$  .#",
            "#   @#",
            "######",
        ])
        .unwrap()
    }

    fn open_room() -> PuzzleState {
        state_from_str_array(&[
            "#####",
            "#@  #",
            "# $ #",
            "#  .#",
            "#####",
        ])
        .unwrap()
    }

    #[test]
    fn test_astar_single_push() {
        let state = state_from_str_array(&[
            "#####",
            "# . #",
            "# $ #",
            "# @ #",
            "#####",
        ])
        .unwrap();
        let report = AStarSearch.run(&state, &SearchLimits::unbounded());
        assert_eq!(report.termination, Termination::Solved);
        assert_eq!(report.path, Some(vec![Direction::Up]));
        assert!(report.nodes_expanded <= 2, "root plus the solved child");
    }

    #[test]
    fn test_astar_walks_around_to_push() {
        // Crate at (2,2), target at (2,1), player at (1,1).
        let state = state_from_str_array(&[
            "#####",
            "#@. #",
            "# $ #",
            "#   #",
            "#####",
        ])
        .unwrap();
        let path = AStarSearch
            .search(&state, Duration::from_secs(5), Difficulty::Easy)
            .unwrap();
        assert!(solves(&state, &path));
        assert_eq!(path.last(), Some(&Direction::Up));
    }

    #[test]
    fn test_bfs_returns_shortest_path() {
        let state = state_from_str_array(&[
            "#####",
            "#@. #",
            "# $ #",
            "#   #",
            "#####",
        ])
        .unwrap();
        let report = BfsSearch.run(&state, &SearchLimits::unbounded());
        assert!(report.is_solved());
        let path = report.into_path().unwrap();
        assert_eq!(path.len(), 4);
        assert!(solves(&state, &path));
    }

    #[test]
    fn test_bfs_and_dfs_both_solve() {
        let state = open_room();
        let bfs_limits = SearchBudget::new(Algorithm::Bfs, Difficulty::Hard).limits();
        let dfs_limits = SearchBudget::new(Algorithm::Dfs, Difficulty::Hard).limits();
        let bfs = BfsSearch.run(&state, &bfs_limits);
        let dfs = DfsSearch.run(&state, &dfs_limits);
        assert!(bfs.is_solved());
        assert!(dfs.is_solved());
        let bfs_path = bfs.into_path().unwrap();
        let dfs_path = dfs.into_path().unwrap();
        assert!(solves(&state, &bfs_path));
        assert!(solves(&state, &dfs_path));
        assert!(bfs_path.len() <= dfs_path.len());
    }

    #[test]
    fn test_astar_expands_lowest_f_first() {
        // Pushing down solves at once; Up is generated first but scores worse.
        let state = state_from_str_array(&[
            "#####",
            "#   #",
            "# @ #",
            "# $ #",
            "# . #",
            "#####",
        ])
        .unwrap();
        let report = AStarSearch.run(&state, &SearchLimits::unbounded());
        assert!(report.is_solved());
        assert_eq!(report.path, Some(vec![Direction::Down]));
        assert_eq!(report.nodes_expanded, 2);

        let report = BfsSearch.run(&state, &SearchLimits::unbounded());
        assert_eq!(report.nodes_expanded, 3, "FIFO pops the Up child first");
    }

    #[test]
    fn test_dfs_dives_into_last_generated_branch() {
        // Left solves immediately, but Right is generated last and explored to the end first.
        let state = state_from_str_array(&["#########", "#.$@    #", "#########"]).unwrap();
        let report = DfsSearch.run(&state, &SearchLimits::unbounded());
        assert!(report.is_solved());
        assert_eq!(report.path, Some(vec![Direction::Left]));
        assert_eq!(report.nodes_expanded, 6);

        let report = BfsSearch.run(&state, &SearchLimits::unbounded());
        assert_eq!(report.path, Some(vec![Direction::Left]));
        assert_eq!(report.nodes_expanded, 2);
    }

    #[test]
    fn test_astar_partial_is_lowest_heuristic_not_longest() {
        let state = state_from_str_array(&[
            "#####",
            "#@. #",
            "# $ #",
            "#   #",
            "#####",
        ])
        .unwrap();
        let limits = SearchLimits {
            max_nodes: 4,
            ..SearchLimits::unbounded()
        };

        // A* expands a depth-2 node, but no later state beats the first heuristic of 1.
        let report = AStarSearch.run(&state, &limits);
        assert_eq!(report.termination, Termination::NodeLimitExceeded);
        assert_eq!(report.path, Some(vec![Direction::Down]));

        let report = BfsSearch.run(&state, &limits);
        assert_eq!(report.termination, Termination::NodeLimitExceeded);
        assert_eq!(report.path, Some(vec![Direction::Down, Direction::Down]));
    }

    #[test]
    fn test_deadlocked_puzzle_terminates_by_exhaustion() {
        let state = cornered();
        for algorithm in Algorithm::ALL {
            let report = strategy_for(algorithm).run(&state, &SearchLimits::unbounded());
            assert_eq!(report.termination, Termination::FrontierExhausted, "{}", algorithm);
            // Seven player cells, crate frozen: every key expanded exactly once.
            assert_eq!(report.nodes_expanded, 7, "{}", algorithm);
            let partial = report.path.unwrap();
            assert!(!partial.is_empty());
            assert!(replay_path(&state, &partial).is_some());
        }
    }

    #[test]
    fn test_deadlocked_puzzle_hits_node_limit() {
        let state = cornered();
        let limits = SearchBudget::new(Algorithm::AStar, Difficulty::Easy)
            .with_max_nodes(3)
            .limits();
        let report = AStarSearch.run(&state, &limits);
        assert_eq!(report.termination, Termination::NodeLimitExceeded);
        assert_eq!(report.nodes_expanded, 3);
        assert!(report.path.is_some());
    }

    #[test]
    fn test_zero_time_limit_expands_nothing() {
        let state = open_room();
        for algorithm in Algorithm::ALL {
            let limits = SearchBudget::new(algorithm, Difficulty::Medium)
                .with_time_limit(Duration::ZERO)
                .limits();
            let report = strategy_for(algorithm).run(&state, &limits);
            assert_eq!(report.termination, Termination::TimeExceeded);
            assert_eq!(report.nodes_expanded, 0);
            assert!(report.path.is_none());
        }
    }

    #[test]
    fn test_cancel_flag_stops_search() {
        let flag = Arc::new(AtomicBool::new(true));
        let limits = SearchLimits::unbounded().with_cancel_flag(flag);
        let report = BfsSearch.run(&open_room(), &limits);
        assert_eq!(report.termination, Termination::Cancelled);
        assert_eq!(report.nodes_expanded, 0);
        assert!(report.path.is_none());
    }

    #[test]
    fn test_node_limit_without_partial_fails() {
        let limits = SearchLimits {
            max_nodes: 1,
            ..SearchLimits::unbounded()
        };
        let report = BfsSearch.run(&open_room(), &limits);
        assert_eq!(report.termination, Termination::NodeLimitExceeded);
        assert_eq!(report.nodes_expanded, 1);
        assert!(report.path.is_none(), "only the root was expanded");
    }

    #[test]
    fn test_dfs_depth_ceiling() {
        let state = state_from_str_array(&["#######", "#@  $.#", "#######"]).unwrap();

        let shallow = SearchLimits {
            max_depth: Some(2),
            ..SearchLimits::unbounded()
        };
        let report = DfsSearch.run(&state, &shallow);
        assert_eq!(report.termination, Termination::FrontierExhausted);
        assert_eq!(report.path.map(|p| p.len()), Some(2));

        let deep_enough = SearchLimits {
            max_depth: Some(3),
            ..SearchLimits::unbounded()
        };
        let report = DfsSearch.run(&state, &deep_enough);
        assert!(report.is_solved());
        assert_eq!(report.path, Some(vec![Direction::Right; 3]));
    }

    #[test]
    fn test_solved_root_returns_empty_path() {
        let state = state_from_str_array(&["#####", "#@* #", "#####"]).unwrap();
        let report = AStarSearch.run(&state, &SearchLimits::unbounded());
        assert!(report.is_solved());
        assert_eq!(report.path, Some(vec![]));
        assert_eq!(report.nodes_expanded, 1);
    }

    #[test]
    fn test_astar_ties_break_by_insertion_order() {
        let mut heap = BinaryHeap::new();
        let state = open_room();
        for (f, seq) in [(3, 2), (1, 5), (1, 1), (2, 0)] {
            heap.push(Prioritized {
                f,
                seq,
                node: SearchNode {
                    state: state.clone(),
                    tip: None,
                    depth: 0,
                    heuristic: 0,
                },
            });
        }
        let order: Vec<(usize, u64)> =
            std::iter::from_fn(|| heap.pop().map(|e| (e.f, e.seq))).collect();
        assert_eq!(order, vec![(1, 1), (1, 5), (2, 0), (3, 2)]);
    }

    #[test]
    fn test_best_partial_criteria() {
        let mut lowest = BestPartial::new(PartialCriterion::LowestHeuristic);
        lowest.offer(None, 0, 1);
        assert_eq!(lowest.length, 0, "root is never a partial path");
        lowest.offer(Some(0), 1, 9);
        lowest.offer(Some(1), 2, 4);
        lowest.offer(Some(2), 3, 4);
        assert_eq!(lowest.tip, Some(1));

        let mut longest = BestPartial::new(PartialCriterion::LongestUnderCap(5));
        longest.offer(Some(0), 3, 0);
        longest.offer(Some(1), 5, 0);
        longest.offer(Some(2), 2, 0);
        assert_eq!(longest.tip, Some(0));
        assert_eq!(longest.length, 3);
    }

    #[test]
    fn test_search_uses_difficulty_budget() {
        let state = open_room();
        let path = DfsSearch.search(&state, Duration::from_secs(5), Difficulty::Medium);
        assert!(path.is_some_and(|p| solves(&state, &p)));
    }
}
