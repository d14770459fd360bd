//! Core puzzle model for Sokoban-style box pushing.
//!
//! This module defines the game's fundamental components:
//! - `Cell`: The static terrain of one grid square (wall, floor or target).
//! - `Grid`: The immutable terrain of a level, shared by every state derived from it.
//! - `PuzzleState`: One configuration of the puzzle (player, crates, counters) and the
//!   pure move rules that derive new configurations from it.
//! - `CanonicalKey`: The order-independent projection of a state used for deduplication.
//! - `Game`: A live play session with a play clock, scoring and undo history.
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

/// The static terrain of a grid square.
///
/// Target-ness is terrain: a target stays a target whether or not a crate sits on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Impassable for both the player and crates.
    Wall,
    /// Plain walkable floor.
    Floor,
    /// Walkable floor that a crate must end up on.
    Target,
}

impl Cell {
    /// Returns `true` for cells the player and crates may occupy.
    pub fn is_walkable(&self) -> bool {
        !matches!(self, Cell::Wall)
    }
}

/// One of the four compass directions the player can move in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions in the fixed order used for expansion and as the fallback residual order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns the `(dx, dy)` offset of one step in this direction. `y` grows downwards.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Converts the direction to its upper-case LURD letter.
    ///
    /// # Examples
    ///
    /// ```
    /// use sokoban_solver::engine::Direction;
    /// assert_eq!(Direction::Up.to_char(), 'U');
    /// assert_eq!(Direction::Right.to_char(), 'R');
    /// ```
    pub fn to_char(&self) -> char {
        match self {
            Direction::Up => 'U',
            Direction::Down => 'D',
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        write!(f, "{}", name)
    }
}

/// A grid coordinate. `x` is the column and `y` the row, both 0-based from the top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a position from a column and a row.
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Returns the neighbouring position one step in `direction`. The result may lie off the grid.
    pub fn step(&self, direction: Direction) -> Position {
        let (dx, dy) = direction.offset();
        Position::new(self.x + dx, self.y + dy)
    }

    /// Returns the number of orthogonal steps between `self` and `other`.
    pub fn manhattan_distance(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Reasons a level definition cannot be turned into a `PuzzleState`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LevelError {
    #[error("level has no rows")]
    EmptyLevel,
    #[error("level has no targets")]
    NoTargets,
    #[error("level has no crates")]
    NoCrates,
    #[error("crate/target mismatch: {crates} crates, {targets} targets")]
    CountMismatch { crates: usize, targets: usize },
    #[error("level has no player")]
    MissingPlayer,
    #[error("level has more than one player")]
    MultiplePlayers,
    #[error("position ({x}, {y}) is blocked or already occupied")]
    InvalidPlacement { x: i32, y: i32 },
}

/// The immutable terrain of a level.
///
/// A `Grid` is built once when a level is loaded and then shared (behind an `Arc`)
/// by every `PuzzleState` derived from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    targets: Vec<Position>,
}

impl Grid {
    /// Builds a grid from row-major cells.
    ///
    /// # Arguments
    /// * `width`, `height`: The dimensions of the grid.
    /// * `cells`: Exactly `width * height` cells in row-major order.
    ///
    /// # Panics
    /// Panics if `cells.len() != width * height`.
    pub fn new(width: usize, height: usize, cells: Vec<Cell>) -> Self {
        assert_eq!(cells.len(), width * height, "cell count must match grid dimensions");
        let mut targets = cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Cell::Target)
            .map(|(idx, _)| Position::new((idx % width) as i32, (idx / width) as i32))
            .collect::<Vec<_>>();
        // Row-major enumeration is (y, x) order; crates are kept in (x, y) order.
        targets.sort_unstable();
        Grid {
            width,
            height,
            cells,
            targets,
        }
    }

    /// Returns the number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `true` if `pos` lies on the grid.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Returns the cell at `pos`, or `None` when `pos` lies off the grid.
    pub fn cell(&self, pos: Position) -> Option<Cell> {
        if !self.contains(pos) {
            return None;
        }
        Some(self.cells[pos.y as usize * self.width + pos.x as usize])
    }

    /// Returns `true` if `pos` is a wall or lies outside the grid.
    pub fn is_blocked(&self, pos: Position) -> bool {
        !matches!(self.cell(pos), Some(cell) if cell.is_walkable())
    }

    /// Returns `true` if `pos` is a target cell.
    pub fn is_target(&self, pos: Position) -> bool {
        self.cell(pos) == Some(Cell::Target)
    }

    /// Target cells in ascending `(x, y)` order.
    pub fn targets(&self) -> &[Position] {
        &self.targets
    }
}

/// The hashable projection of a `PuzzleState`: player position plus the crate set.
///
/// Crates are stored sorted so two states holding the same crates in a different order
/// produce equal keys. Move and push counters are not part of the key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalKey {
    player: Position,
    crates: Vec<Position>,
}

/// One configuration of a puzzle.
///
/// States are values: every transition produces a new state and leaves the source untouched.
/// The terrain is shared between states and never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PuzzleState {
    grid: Arc<Grid>,
    player: Position,
    // Sorted ascending; set semantics.
    crates: Vec<Position>,
    moves: u32,
    pushes: u32,
}

impl PuzzleState {
    /// Creates a validated puzzle state.
    ///
    /// # Arguments
    /// * `grid`: The level terrain.
    /// * `player`: The player's starting position.
    /// * `crates`: Starting crate positions, in any order. Duplicates collapse into one crate.
    ///
    /// # Returns
    /// * `Ok(PuzzleState)` with zeroed counters.
    /// * `Err(LevelError)` if there are no targets, no crates, a crate/target count mismatch,
    ///   the player or a crate sits on a wall or off the grid, or the player shares a cell
    ///   with a crate.
    pub fn new(grid: Grid, player: Position, crates: Vec<Position>) -> Result<Self, LevelError> {
        let mut crates = crates;
        crates.sort_unstable();
        crates.dedup();

        if grid.targets().is_empty() {
            return Err(LevelError::NoTargets);
        }
        if crates.is_empty() {
            return Err(LevelError::NoCrates);
        }
        if crates.len() != grid.targets().len() {
            return Err(LevelError::CountMismatch {
                crates: crates.len(),
                targets: grid.targets().len(),
            });
        }
        if let Some(bad) = std::iter::once(&player)
            .chain(crates.iter())
            .find(|&&pos| grid.is_blocked(pos))
        {
            return Err(LevelError::InvalidPlacement { x: bad.x, y: bad.y });
        }
        if crates.binary_search(&player).is_ok() {
            return Err(LevelError::InvalidPlacement {
                x: player.x,
                y: player.y,
            });
        }

        Ok(PuzzleState {
            grid: Arc::new(grid),
            player,
            crates,
            moves: 0,
            pushes: 0,
        })
    }

    /// Returns the level terrain shared by this state.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the player's position.
    pub fn player(&self) -> Position {
        self.player
    }

    /// Crate positions in ascending `(x, y)` order.
    pub fn crates(&self) -> &[Position] {
        &self.crates
    }

    /// Target positions in ascending `(x, y)` order.
    pub fn targets(&self) -> &[Position] {
        self.grid.targets()
    }

    /// Number of successful moves along the path that produced this state.
    pub fn move_count(&self) -> u32 {
        self.moves
    }

    /// Number of crate-moving steps along the path that produced this state.
    pub fn push_count(&self) -> u32 {
        self.pushes
    }

    /// Returns `true` if a crate occupies `pos`.
    pub fn has_crate_at(&self, pos: Position) -> bool {
        self.crates.binary_search(&pos).is_ok()
    }

    /// Crates not currently resting on a target, in ascending `(x, y)` order.
    pub fn unsolved_crates(&self) -> impl Iterator<Item = Position> + '_ {
        self.crates
            .iter()
            .copied()
            .filter(move |&pos| !self.grid.is_target(pos))
    }

    /// A state is solved iff its crate set equals the target set.
    pub fn is_solved(&self) -> bool {
        // Both sides are kept sorted, so slice equality is set equality.
        self.crates.as_slice() == self.grid.targets()
    }

    /// Returns the key used to detect repeated states during search.
    pub fn canonical_key(&self) -> CanonicalKey {
        CanonicalKey {
            player: self.player,
            crates: self.crates.clone(),
        }
    }

    /// Attempts to move the player one step in `direction`.
    ///
    /// The move fails if the destination is off the grid or a wall, or if it holds a crate
    /// whose far side is off the grid, a wall, or another crate. Otherwise the player steps
    /// (pushing the crate along if there is one).
    ///
    /// # Returns
    /// * `Some(PuzzleState)`: the new state, with `move_count` (and `push_count` for a push)
    ///   incremented.
    /// * `None` if the move is blocked. `self` is never modified.
    ///
    /// # Examples
    /// ```
    /// use sokoban_solver::engine::Direction;
    /// use sokoban_solver::utils::state_from_str_array;
    ///
    /// let state = state_from_str_array(&["#####", "#@$.#", "#####"]).unwrap();
    /// let pushed = state.apply_move(Direction::Right).unwrap();
    /// assert!(pushed.is_solved());
    /// assert_eq!(pushed.push_count(), 1);
    /// assert!(state.apply_move(Direction::Up).is_none());
    /// ```
    pub fn apply_move(&self, direction: Direction) -> Option<PuzzleState> {
        let next = self.player.step(direction);
        if self.grid.is_blocked(next) {
            return None;
        }

        let mut crates = self.crates.clone();
        let mut pushes = self.pushes;
        if let Ok(idx) = crates.binary_search(&next) {
            let beyond = next.step(direction);
            if self.grid.is_blocked(beyond) || self.has_crate_at(beyond) {
                return None;
            }
            crates.remove(idx);
            let insert_at = crates.binary_search(&beyond).unwrap_or_else(|at| at);
            crates.insert(insert_at, beyond);
            pushes += 1;
        }

        Some(PuzzleState {
            grid: Arc::clone(&self.grid),
            player: next,
            crates,
            moves: self.moves + 1,
            pushes,
        })
    }

    fn symbol_at(&self, pos: Position) -> char {
        let is_target = self.grid.is_target(pos);
        if pos == self.player {
            return if is_target { '+' } else { '@' };
        }
        if self.has_crate_at(pos) {
            return if is_target { '*' } else { '$' };
        }
        match self.grid.cell(pos) {
            Some(Cell::Wall) => '#',
            Some(Cell::Target) => '.',
            _ => ' ',
        }
    }
}

impl fmt::Display for PuzzleState {
    /// Renders the state with the level symbols, one row per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.grid.height() {
            let row: String = (0..self.grid.width())
                .map(|x| self.symbol_at(Position::new(x as i32, y as i32)))
                .collect();
            writeln!(f, "{}", row.trim_end())?;
        }
        Ok(())
    }
}

/// Wall-clock bookkeeping for a play session. Not used by the search.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlayClock {
    started: Option<Instant>,
    finished: Option<Instant>,
}

impl PlayClock {
    /// Starts the clock if it is not already running.
    pub fn start(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    /// Stops the clock the first time the puzzle is solved.
    pub fn finish(&mut self) {
        if self.started.is_some() && self.finished.is_none() {
            self.finished = Some(Instant::now());
        }
    }

    /// Returns `true` between the first move and the solve.
    pub fn is_running(&self) -> bool {
        self.started.is_some() && self.finished.is_none()
    }

    /// Time between the first move and the solve, or until now if unsolved.
    pub fn elapsed(&self) -> Duration {
        match (self.started, self.finished) {
            (Some(start), Some(end)) => end - start,
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }
}

/// Manages a live play session for one player (human or AI).
///
/// The session holds the current `PuzzleState`, a `PlayClock` started on the first
/// successful move, and a history of earlier states for undo.
///
/// # Examples
/// ```
/// use sokoban_solver::engine::{Direction, Game};
/// use sokoban_solver::utils::state_from_str_array;
///
/// let state = state_from_str_array(&["######", "#@ $.#", "######"]).unwrap();
/// let mut game = Game::new(state);
/// assert!(game.process_move(Direction::Right));
/// assert!(!game.process_move(Direction::Up));
/// assert!(game.process_move(Direction::Right));
/// assert!(game.is_solved());
/// assert_eq!(game.score(), 2 + 2 * 1);
/// assert!(game.undo_last_move());
/// assert!(!game.is_solved());
/// ```
#[derive(Clone, Debug)]
pub struct Game {
    state: PuzzleState,
    initial: PuzzleState,
    clock: PlayClock,
    history: Vec<PuzzleState>,
}

impl Game {
    /// Starts a session at `initial` with an idle clock and no history.
    pub fn new(initial: PuzzleState) -> Self {
        Game {
            state: initial.clone(),
            initial,
            clock: PlayClock::default(),
            history: Vec::new(),
        }
    }

    /// The current live state.
    pub fn state(&self) -> &PuzzleState {
        &self.state
    }

    /// The session clock.
    pub fn clock(&self) -> &PlayClock {
        &self.clock
    }

    /// Applies a move to the live state.
    ///
    /// # Returns
    /// `true` if the move was legal and applied, `false` if it was blocked.
    pub fn process_move(&mut self, direction: Direction) -> bool {
        let Some(next) = self.state.apply_move(direction) else {
            return false;
        };
        self.clock.start();
        let previous = std::mem::replace(&mut self.state, next);
        self.history.push(previous);
        if self.state.is_solved() {
            self.clock.finish();
        }
        true
    }

    /// Reverts the most recent move.
    ///
    /// # Returns
    /// `false` if no move has been made yet.
    pub fn undo_last_move(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                self.state = previous;
                true
            }
            None => false,
        }
    }

    /// Returns to the initial state and clears history and clock.
    pub fn restart(&mut self) {
        self.state = self.initial.clone();
        self.history.clear();
        self.clock = PlayClock::default();
    }

    /// Returns `true` if the live state is solved.
    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }

    /// Moves made since the start, net of undos.
    pub fn moves(&self) -> u32 {
        self.state.move_count()
    }

    /// Pushes made since the start, net of undos.
    pub fn pushes(&self) -> u32 {
        self.state.push_count()
    }

    /// Lower is better: each move costs one point and each push two more.
    pub fn score(&self) -> u32 {
        self.moves() + self.pushes() * 2
    }

    /// Play time so far, see `PlayClock::elapsed`.
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }
}
