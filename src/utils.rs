use crate::engine::{Cell, Direction, Grid, LevelError, Position, PuzzleState};
use log::warn;

/// Parses an array of string slices into a `PuzzleState`.
///
/// Each string slice represents a row, starting from row 0 at the top. Rows may have
/// different lengths; shorter rows are padded with floor up to the longest row.
///
/// Recognized characters:
/// - '#': wall
/// - ' ': floor
/// - '.': target
/// - '$': crate
/// - '*': crate on a target
/// - '@': player
/// - '+': player on a target
///
/// Any other character is read as floor and logged as a warning.
///
/// # Arguments
/// * `rows`: The rows of the level, top to bottom.
///
/// # Returns
/// * `Ok(PuzzleState)` with zeroed move and push counters.
/// * `Err(LevelError)` if the level is empty, has no player or several players, has no
///   targets or no crates, or the crate and target counts differ.
///
/// # Examples
/// ```
/// use sokoban_solver::engine::{LevelError, Position};
/// use sokoban_solver::utils::state_from_str_array;
///
/// let state = state_from_str_array(&[
///     "#####",
///     "#@$.#",
///     "#####",
/// ]).unwrap();
/// assert_eq!(state.player(), Position::new(1, 1));
/// assert_eq!(state.crates(), &[Position::new(2, 1)]);
/// assert_eq!(state.targets(), &[Position::new(3, 1)]);
///
/// let mismatch = state_from_str_array(&["#@$$.#"]);
/// assert_eq!(mismatch.unwrap_err(), LevelError::CountMismatch { crates: 2, targets: 1 });
/// ```
pub fn state_from_str_array<S: AsRef<str>>(rows: &[S]) -> Result<PuzzleState, LevelError> {
    let height = rows.len();
    let width = rows
        .iter()
        .map(|row| row.as_ref().chars().count())
        .max()
        .unwrap_or(0);
    if height == 0 || width == 0 {
        return Err(LevelError::EmptyLevel);
    }

    let mut cells = vec![Cell::Floor; width * height];
    let mut players = Vec::new();
    let mut crates = Vec::new();

    for (y, row) in rows.iter().enumerate() {
        for (x, symbol) in row.as_ref().chars().enumerate() {
            let pos = Position::new(x as i32, y as i32);
            let cell = match symbol {
                '#' => Cell::Wall,
                ' ' => Cell::Floor,
                '.' => Cell::Target,
                '$' => {
                    crates.push(pos);
                    Cell::Floor
                }
                '*' => {
                    crates.push(pos);
                    Cell::Target
                }
                '@' => {
                    players.push(pos);
                    Cell::Floor
                }
                '+' => {
                    players.push(pos);
                    Cell::Target
                }
                other => {
                    warn!(
                        "Unrecognized character '{}' at row {} col {}, reading it as floor",
                        other, y, x
                    );
                    Cell::Floor
                }
            };
            cells[y * width + x] = cell;
        }
    }

    let player = match players.as_slice() {
        [player] => *player,
        [] => return Err(LevelError::MissingPlayer),
        _ => return Err(LevelError::MultiplePlayers),
    };

    PuzzleState::new(Grid::new(width, height, cells), player, crates)
}

/// Parses a multi-line level definition.
///
/// Carriage returns are stripped, and blank lines before the first and after the last
/// non-blank row are ignored so indented raw strings and files with trailing newlines load.
pub fn state_from_text(text: &str) -> Result<PuzzleState, LevelError> {
    let lines: Vec<&str> = text
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect();
    let first = lines.iter().position(|line| !line.trim().is_empty());
    let last = lines.iter().rposition(|line| !line.trim().is_empty());
    match (first, last) {
        (Some(first), Some(last)) => state_from_str_array(&lines[first..=last]),
        _ => Err(LevelError::EmptyLevel),
    }
}

/// Formats a path as upper-case LURD letters, e.g. `"UURD"`.
pub fn format_path(path: &[Direction]) -> String {
    path.iter().map(Direction::to_char).collect()
}

/// Formats a path replayed from `initial` in LURD notation: upper case for pushes,
/// lower case for plain walks.
///
/// # Returns
/// `None` if some move of `path` is illegal from the state it is applied to.
pub fn format_path_lurd(initial: &PuzzleState, path: &[Direction]) -> Option<String> {
    let mut state = initial.clone();
    let mut out = String::with_capacity(path.len());
    for &direction in path {
        let next = state.apply_move(direction)?;
        let letter = direction.to_char();
        if next.push_count() > state.push_count() {
            out.push(letter);
        } else {
            out.push(letter.to_ascii_lowercase());
        }
        state = next;
    }
    Some(out)
}

/// Parses LURD notation (either case). Whitespace is skipped.
///
/// # Returns
/// * `Ok(Vec<Direction>)` with one entry per letter.
/// * `Err(String)` naming the first unrecognized character.
pub fn parse_path(s: &str) -> Result<Vec<Direction>, String> {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .enumerate()
        .map(|(idx, c)| match c.to_ascii_uppercase() {
            'U' => Ok(Direction::Up),
            'D' => Ok(Direction::Down),
            'L' => Ok(Direction::Left),
            'R' => Ok(Direction::Right),
            _ => Err(format!("Unrecognized move '{}' at position {}", c, idx)),
        })
        .collect()
}

/// Applies `path` to `initial` move by move.
///
/// # Returns
/// The final state, or `None` as soon as a move is rejected.
pub fn replay_path(initial: &PuzzleState, path: &[Direction]) -> Option<PuzzleState> {
    path.iter()
        .try_fold(initial.clone(), |state, &direction| state.apply_move(direction))
}
