//! Search configuration: algorithm choice, difficulty tiers and the budgets keyed by them.
//!
//! Budget magnitudes are tuning choices. They are exposed as public constants so callers
//! can inspect them, and `SearchLimits` fields are public so any of them can be overridden.
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Wall-clock budget per difficulty, in seconds: easy, medium, hard.
pub const TIME_LIMIT_SECS: [f64; 3] = [5.0, 8.0, 12.0];

/// A* node-expansion ceilings: easy, medium, hard.
pub const ASTAR_NODE_LIMITS: [usize; 3] = [30_000, 50_000, 100_000];

/// BFS node-expansion ceilings: easy, medium, hard.
pub const BFS_NODE_LIMITS: [usize; 3] = [20_000, 40_000, 80_000];

/// DFS node-expansion ceilings: easy, medium, hard.
pub const DFS_NODE_LIMITS: [usize; 3] = [20_000, 40_000, 80_000];

/// DFS depth ceilings: easy, medium, hard.
pub const DFS_DEPTH_LIMITS: [usize; 3] = [50, 80, 120];

/// Converts a user-supplied number of seconds into a time limit.
///
/// # Returns
/// * `Ok(Duration)` for any finite, non-negative value a `Duration` can hold.
/// * `Err(String)` for negative, NaN, infinite or overflowing values.
pub fn time_limit_from_secs(secs: f64) -> Result<Duration, String> {
    Duration::try_from_secs_f64(secs)
        .map_err(|e| format!("Invalid time limit {} s: {}", secs, e))
}

/// Declared difficulty of a puzzle. Selects the budget tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Index into the per-difficulty budget tables.
    pub fn tier(&self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    /// Default wall-clock budget for this tier.
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs_f64(TIME_LIMIT_SECS[self.tier()])
    }

    /// Parses a difficulty name, falling back to `Medium` for anything unrecognized.
    pub fn from_name_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::warn!("Invalid difficulty '{}', using 'medium'", name);
            Difficulty::Medium
        })
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        write!(f, "{}", name)
    }
}

/// The graph-search strategy a solver runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum Algorithm {
    #[default]
    #[value(name = "astar")]
    AStar,
    Bfs,
    Dfs,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::AStar, Algorithm::Bfs, Algorithm::Dfs];

    /// Parses an algorithm name, falling back to A* for anything unrecognized.
    pub fn from_name_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::warn!("Unknown algorithm '{}', using 'astar'", name);
            Algorithm::AStar
        })
    }

    /// Node-expansion ceiling for this algorithm at `difficulty`.
    pub fn node_limit(&self, difficulty: Difficulty) -> usize {
        let table = match self {
            Algorithm::AStar => &ASTAR_NODE_LIMITS,
            Algorithm::Bfs => &BFS_NODE_LIMITS,
            Algorithm::Dfs => &DFS_NODE_LIMITS,
        };
        table[difficulty.tier()]
    }

    /// Depth ceiling for this algorithm at `difficulty`. Only DFS is depth limited.
    pub fn depth_limit(&self, difficulty: Difficulty) -> Option<usize> {
        match self {
            Algorithm::Dfs => Some(DFS_DEPTH_LIMITS[difficulty.tier()]),
            Algorithm::AStar | Algorithm::Bfs => None,
        }
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "astar" | "a*" => Ok(Algorithm::AStar),
            "bfs" => Ok(Algorithm::Bfs),
            "dfs" => Ok(Algorithm::Dfs),
            other => Err(format!("unknown algorithm '{}'", other)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Algorithm::AStar => "A*",
            Algorithm::Bfs => "BFS",
            Algorithm::Dfs => "DFS",
        };
        write!(f, "{}", name)
    }
}

/// What a solver is asked to do: which algorithm, at which difficulty, for how long.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchBudget {
    pub algorithm: Algorithm,
    pub difficulty: Difficulty,
    pub time_limit: Duration,
    /// Overrides the algorithm's node ceiling for the difficulty.
    pub max_nodes: Option<usize>,
}

impl SearchBudget {
    /// A budget using the difficulty's default time limit and node ceiling.
    pub fn new(algorithm: Algorithm, difficulty: Difficulty) -> Self {
        SearchBudget {
            algorithm,
            difficulty,
            time_limit: difficulty.time_limit(),
            max_nodes: None,
        }
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    /// Resolves the budget into the concrete ceilings a search run enforces.
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            time_limit: self.time_limit,
            max_nodes: self
                .max_nodes
                .unwrap_or_else(|| self.algorithm.node_limit(self.difficulty)),
            max_depth: self.algorithm.depth_limit(self.difficulty),
            cancel: None,
        }
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        SearchBudget::new(Algorithm::default(), Difficulty::default())
    }
}

/// The concrete ceilings enforced by one search invocation.
#[derive(Clone, Debug)]
pub struct SearchLimits {
    pub time_limit: Duration,
    pub max_nodes: usize,
    /// Nodes at this depth are not expanded further. `None` means unlimited.
    pub max_depth: Option<usize>,
    /// Polled alongside the time budget; raising it ends the search early.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl SearchLimits {
    /// Limits so generous that only frontier exhaustion or a solution ends the search.
    pub fn unbounded() -> Self {
        SearchLimits {
            time_limit: Duration::MAX,
            max_nodes: usize::MAX,
            max_depth: None,
            cancel: None,
        }
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_case_insensitive() {
        assert_eq!("ASTAR".parse::<Algorithm>(), Ok(Algorithm::AStar));
        assert_eq!("Bfs".parse::<Algorithm>(), Ok(Algorithm::Bfs));
        assert_eq!(" dfs ".parse::<Algorithm>(), Ok(Algorithm::Dfs));
        assert_eq!("Hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("greedy".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_lenient_fallbacks() {
        assert_eq!(Algorithm::from_name_lenient("dijkstra"), Algorithm::AStar);
        assert_eq!(Difficulty::from_name_lenient("insane"), Difficulty::Medium);
        assert_eq!(Difficulty::from_name_lenient("easy"), Difficulty::Easy);
    }

    #[test]
    fn test_budget_limits_follow_tables() {
        let limits = SearchBudget::new(Algorithm::AStar, Difficulty::Hard).limits();
        assert_eq!(limits.max_nodes, 100_000);
        assert_eq!(limits.max_depth, None);
        assert_eq!(limits.time_limit, Duration::from_secs(12));

        let limits = SearchBudget::new(Algorithm::Dfs, Difficulty::Easy).limits();
        assert_eq!(limits.max_nodes, 20_000);
        assert_eq!(limits.max_depth, Some(50));
        assert_eq!(limits.time_limit, Duration::from_secs(5));
    }

    #[test]
    fn test_budget_overrides() {
        let limits = SearchBudget::new(Algorithm::Bfs, Difficulty::Medium)
            .with_time_limit(Duration::from_millis(250))
            .with_max_nodes(42)
            .limits();
        assert_eq!(limits.max_nodes, 42);
        assert_eq!(limits.time_limit, Duration::from_millis(250));
    }

    #[test]
    fn test_time_limit_from_secs() {
        assert_eq!(time_limit_from_secs(0.25), Ok(Duration::from_millis(250)));
        assert_eq!(time_limit_from_secs(0.0), Ok(Duration::ZERO));
        assert!(time_limit_from_secs(f64::INFINITY).is_err());
        assert!(time_limit_from_secs(f64::NAN).is_err());
        assert!(time_limit_from_secs(-1.0).is_err());
        assert!(time_limit_from_secs(1e30).is_err());
    }

    #[test]
    fn test_cancel_flag() {
        let flag = Arc::new(AtomicBool::new(false));
        let limits = SearchLimits::unbounded().with_cancel_flag(Arc::clone(&flag));
        assert!(!limits.is_cancelled());
        flag.store(true, Ordering::Relaxed);
        assert!(limits.is_cancelled());
    }
}
