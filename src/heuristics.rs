use crate::engine::{Direction, Position, PuzzleState};

/// Penalty added for every unsolved crate pinned in a corner.
pub const CORNER_DEADLOCK_PENALTY: u32 = 500;

/// Estimates how many moves remain before `state` is solved.
///
/// The estimate sums, over every crate not resting on a target, the Manhattan distance
/// to the nearest target (each crate picks its own target, no matching). Every unsolved
/// crate stuck in a corner adds `CORNER_DEADLOCK_PENALTY`.
///
/// The value is not admissible: it can undercount when crates share a target, and the
/// penalty dwarfs any real distance.
///
/// # Arguments
/// * `state`: The state to evaluate.
///
/// # Returns
/// `0` if `state` is solved, otherwise the distance sum plus deadlock penalties.
///
/// # Examples
/// ```
/// use sokoban_solver::heuristics::estimate_remaining_cost;
/// use sokoban_solver::utils::state_from_str_array;
///
/// let state = state_from_str_array(&["#######", "#@$  .#", "#######"]).unwrap();
/// assert_eq!(estimate_remaining_cost(&state), 3);
/// ```
pub fn estimate_remaining_cost(state: &PuzzleState) -> u32 {
    if state.is_solved() {
        return 0;
    }

    let targets = state.targets();
    let mut total = 0;
    for crate_pos in state.unsolved_crates() {
        let nearest = targets
            .iter()
            .map(|&target| crate_pos.manhattan_distance(target))
            .min()
            .unwrap_or(0);
        total += nearest;
        if is_corner_deadlock(state, crate_pos) {
            total += CORNER_DEADLOCK_PENALTY;
        }
    }
    total
}

/// Checks whether the crate at `pos` is pinned into a corner.
///
/// A crate is pinned when a wall or the grid boundary blocks it on the left or right
/// and also on the top or bottom. Only the static terrain is considered; other crates
/// never count as blockers, so freeze deadlocks involving several crates go undetected.
pub fn is_corner_deadlock(state: &PuzzleState, pos: Position) -> bool {
    let grid = state.grid();
    let blocked = |direction: Direction| grid.is_blocked(pos.step(direction));

    let horizontal = blocked(Direction::Left) || blocked(Direction::Right);
    let vertical = blocked(Direction::Up) || blocked(Direction::Down);
    horizontal && vertical
}

/// Chooses a single greedy move toward the unsolved crate nearest to the player.
///
/// The preferred directions close the larger axis gap first, then the smaller one, and
/// finish with the remaining directions in `Direction::ALL` order. The first direction
/// that `apply_move` accepts is returned.
///
/// This function keeps no state, so it can be called repeatedly against a live state that
/// keeps changing underneath it.
///
/// # Arguments
/// * `state`: The current live state.
///
/// # Returns
/// * `Some(Direction)`: the chosen move.
/// * `None` if every crate is on a target or no direction is legal.
pub fn choose_greedy_move(state: &PuzzleState) -> Option<Direction> {
    let player = state.player();
    // `min_by_key` keeps the first of equal minima, so ties go to encounter order.
    let nearest = state
        .unsolved_crates()
        .min_by_key(|crate_pos| player.manhattan_distance(*crate_pos))?;

    preferred_directions(player, nearest)
        .into_iter()
        .find(|&direction| state.apply_move(direction).is_some())
}

/// Orders all four directions by how well they close the gap from `from` to `to`.
fn preferred_directions(from: Position, to: Position) -> Vec<Direction> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;

    let horizontal = if dx > 0 {
        Direction::Right
    } else {
        Direction::Left
    };
    let vertical = if dy > 0 {
        Direction::Down
    } else {
        Direction::Up
    };

    let mut order = Vec::with_capacity(4);
    if dy.abs() > dx.abs() {
        order.push(vertical);
        if dx != 0 {
            order.push(horizontal);
        }
    } else {
        order.push(horizontal);
        if dy != 0 {
            order.push(vertical);
        }
    }

    for direction in Direction::ALL {
        if !order.contains(&direction) {
            order.push(direction);
        }
    }
    order
}
