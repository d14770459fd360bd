//! Stateful "next move" interface over one search strategy plus the greedy fallback.
use crate::config::{Algorithm, Difficulty, SearchBudget};
use crate::engine::{Direction, PuzzleState};
use crate::heuristics::choose_greedy_move;
use crate::solver::{strategy_for, SearchReport, SearchStrategy};
use log::{info, warn};

/// Where the controller is in its lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControllerPhase {
    /// No plan computed yet (or reset).
    Idle,
    /// A search is running.
    Searching,
    /// A search produced a path; `cursor` indexes the next move to hand out.
    HasPlan { path: Vec<Direction>, cursor: usize },
    /// Search produced nothing; every move comes from the greedy fallback.
    UsingFallback,
}

/// Drives one AI player: computes a plan once, then streams it move by move.
///
/// If the configured search yields no path, the controller switches permanently to the
/// greedy fallback for the puzzle instance, so the caller always has something to play
/// unless the player is completely boxed in.
///
/// # Examples
/// ```
/// use sokoban_solver::config::{Algorithm, Difficulty};
/// use sokoban_solver::controller::SolverController;
/// use sokoban_solver::engine::Game;
/// use sokoban_solver::utils::state_from_str_array;
///
/// let mut game = Game::new(state_from_str_array(&["######", "#@ $.#", "######"]).unwrap());
/// let mut ai = SolverController::new(Algorithm::AStar, Difficulty::Easy);
/// ai.compute_solution(game.state());
/// while let Some(direction) = ai.get_next_move(game.state()) {
///     game.process_move(direction);
/// }
/// assert!(game.is_solved());
/// ```
pub struct SolverController {
    strategy: Box<dyn SearchStrategy>,
    budget: SearchBudget,
    phase: ControllerPhase,
    last_report: Option<SearchReport>,
}

impl SolverController {
    /// Creates a controller with the default budget for `difficulty`.
    pub fn new(algorithm: Algorithm, difficulty: Difficulty) -> Self {
        Self::with_budget(SearchBudget::new(algorithm, difficulty))
    }

    /// Creates a controller from algorithm and difficulty names. Unknown names fall back
    /// to A* and medium.
    pub fn from_names(algorithm: &str, difficulty: &str) -> Self {
        Self::new(
            Algorithm::from_name_lenient(algorithm),
            Difficulty::from_name_lenient(difficulty),
        )
    }

    /// Creates a controller that searches under an explicit `budget`.
    pub fn with_budget(budget: SearchBudget) -> Self {
        info!(
            "AI ready: {}, {}",
            budget.algorithm,
            budget.difficulty.to_string().to_uppercase()
        );
        SolverController {
            strategy: strategy_for(budget.algorithm),
            budget,
            phase: ControllerPhase::Idle,
            last_report: None,
        }
    }

    /// The algorithm this controller searches with.
    pub fn algorithm(&self) -> Algorithm {
        self.budget.algorithm
    }

    /// The difficulty tier the budget was drawn from.
    pub fn difficulty(&self) -> Difficulty {
        self.budget.difficulty
    }

    /// The budget every search of this controller runs under.
    pub fn budget(&self) -> &SearchBudget {
        &self.budget
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> &ControllerPhase {
        &self.phase
    }

    /// `true` while a search is running.
    pub fn is_thinking(&self) -> bool {
        self.phase == ControllerPhase::Searching
    }

    /// `true` once search has failed and the greedy fallback has taken over.
    pub fn is_using_fallback(&self) -> bool {
        self.phase == ControllerPhase::UsingFallback
    }

    /// The report of the most recent search, if one has run since the last reset.
    pub fn last_report(&self) -> Option<&SearchReport> {
        self.last_report.as_ref()
    }

    /// Runs the configured search once from `state`.
    ///
    /// A non-empty path moves the controller to `HasPlan`; anything else moves it to
    /// `UsingFallback`. Calling this while a search is already running does nothing.
    /// Search exhaustion is never reported as an error.
    pub fn compute_solution(&mut self, state: &PuzzleState) {
        if self.is_thinking() {
            return;
        }

        self.phase = ControllerPhase::Searching;
        info!("AI computing solution ({})...", self.budget.algorithm);

        let report = self.strategy.run(state, &self.budget.limits());
        self.phase = match report.path.as_ref() {
            Some(path) if !path.is_empty() => {
                info!("AI found path with {} moves", path.len());
                ControllerPhase::HasPlan {
                    path: path.clone(),
                    cursor: 0,
                }
            }
            _ => {
                warn!("Search incomplete - using greedy fallback");
                ControllerPhase::UsingFallback
            }
        };
        self.last_report = Some(report);
    }

    /// Returns the next move to play against the live `state`.
    ///
    /// With a plan, this hands out the next planned move (ignoring `state`) and `None`
    /// once the plan is used up. In fallback mode it asks the greedy fallback about the
    /// current `state`.
    pub fn get_next_move(&mut self, state: &PuzzleState) -> Option<Direction> {
        match &mut self.phase {
            ControllerPhase::UsingFallback => choose_greedy_move(state),
            ControllerPhase::HasPlan { path, cursor } => {
                let next = path.get(*cursor).copied();
                if next.is_some() {
                    *cursor += 1;
                }
                next
            }
            ControllerPhase::Idle | ControllerPhase::Searching => None,
        }
    }

    /// `true` in fallback mode, or while a plan still has moves left.
    pub fn has_pending_move(&self) -> bool {
        match &self.phase {
            ControllerPhase::UsingFallback => true,
            ControllerPhase::HasPlan { path, cursor } => *cursor < path.len(),
            ControllerPhase::Idle | ControllerPhase::Searching => false,
        }
    }

    /// Discards any plan and returns to `Idle`.
    pub fn reset(&mut self) {
        self.phase = ControllerPhase::Idle;
        self.last_report = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Game;
    use crate::solver::Termination;
    use crate::utils::state_from_str_array;
    use std::time::Duration;

    fn cornered() -> PuzzleState {
        state_from_str_array(&[
            "######",
            "#$  .#",
            "#   @#",
            "######",
        ])
        .unwrap()
    }

    #[test]
    fn test_plan_is_streamed_then_exhausted() {
        let state = state_from_str_array(&["#######", "#@ $ .#", "#######"]).unwrap();
        let mut ai = SolverController::new(Algorithm::Bfs, Difficulty::Easy);
        assert_eq!(ai.phase(), &ControllerPhase::Idle);
        assert!(!ai.has_pending_move());
        assert_eq!(ai.get_next_move(&state), None);

        ai.compute_solution(&state);
        assert!(ai.has_pending_move());
        assert!(ai.last_report().is_some_and(|r| r.termination == Termination::Solved));

        let mut moves = Vec::new();
        while let Some(direction) = ai.get_next_move(&state) {
            moves.push(direction);
        }
        assert_eq!(moves, vec![Direction::Right; 3]);
        assert!(!ai.has_pending_move());
        assert_eq!(ai.get_next_move(&state), None);
    }

    #[test]
    fn test_fallback_when_search_yields_nothing() {
        let budget = SearchBudget::new(Algorithm::AStar, Difficulty::Easy)
            .with_time_limit(Duration::ZERO);
        let mut ai = SolverController::with_budget(budget);
        let mut game = Game::new(cornered());

        ai.compute_solution(game.state());
        assert!(ai.is_using_fallback());
        assert!(ai.has_pending_move());

        // The puzzle can never be solved, yet the fallback keeps producing legal moves.
        for _ in 0..1_000 {
            let direction = ai.get_next_move(game.state()).unwrap();
            assert!(game.process_move(direction));
            assert!(ai.has_pending_move());
        }
        assert!(!game.is_solved());
    }

    #[test]
    fn test_deadlocked_plan_runs_out() {
        let mut ai = SolverController::new(Algorithm::AStar, Difficulty::Easy);
        let mut game = Game::new(cornered());
        ai.compute_solution(game.state());

        // Exhaustion still leaves a best-effort partial plan.
        assert!(matches!(ai.phase(), ControllerPhase::HasPlan { .. }));
        let mut steps = 0;
        while let Some(direction) = ai.get_next_move(game.state()) {
            assert!(game.process_move(direction));
            steps += 1;
            assert!(steps < 1_000);
        }
        assert!(!ai.has_pending_move());
    }

    #[test]
    fn test_fallback_stuck_returns_none() {
        let budget = SearchBudget::new(Algorithm::Dfs, Difficulty::Easy)
            .with_time_limit(Duration::ZERO);
        let mut ai = SolverController::with_budget(budget);
        let state = state_from_str_array(&[
            "#####",
            "##@##",
            "#####",
            "#$ .#",
            "#####",
        ])
        .unwrap();
        ai.compute_solution(&state);
        assert!(ai.is_using_fallback());
        assert_eq!(ai.get_next_move(&state), None);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let state = state_from_str_array(&["######", "#@ $.#", "######"]).unwrap();
        let mut ai = SolverController::from_names("ASTAR", "bogus");
        assert_eq!(ai.algorithm(), Algorithm::AStar);
        assert_eq!(ai.difficulty(), Difficulty::Medium);

        ai.compute_solution(&state);
        assert!(ai.has_pending_move());
        ai.reset();
        assert_eq!(ai.phase(), &ControllerPhase::Idle);
        assert!(ai.last_report().is_none());
        assert!(!ai.has_pending_move());
        assert_eq!(ai.get_next_move(&state), None);
    }

    #[test]
    fn test_recompute_replaces_plan() {
        let mut game = Game::new(state_from_str_array(&["#######", "#@ $ .#", "#######"]).unwrap());
        let mut ai = SolverController::new(Algorithm::AStar, Difficulty::Medium);
        ai.compute_solution(game.state());
        let first = ai.get_next_move(game.state()).unwrap();
        assert!(game.process_move(first));

        ai.compute_solution(game.state());
        let mut remaining = 0;
        while let Some(direction) = ai.get_next_move(game.state()) {
            assert!(game.process_move(direction));
            remaining += 1;
        }
        assert_eq!(remaining, 2);
        assert!(game.is_solved());
    }
}
