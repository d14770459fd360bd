use clap::Parser;
use sokoban_solver::config::{time_limit_from_secs, Algorithm, Difficulty, SearchBudget};
use sokoban_solver::controller::SolverController;
use sokoban_solver::engine::{Direction, Game, PuzzleState};
use sokoban_solver::levels::get_level;
use sokoban_solver::utils::{
    format_path, format_path_lurd, parse_path, state_from_str_array, state_from_text,
};
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Search algorithm to plan with
    #[clap(short, long, value_enum, default_value = "astar")]
    algorithm: Algorithm,

    /// Difficulty tier: selects the budget and the built-in level set
    #[clap(short, long, value_enum, default_value = "medium")]
    difficulty: Difficulty,

    /// Index of the built-in level to play when no level file is given
    #[clap(short, long, default_value_t = 0)]
    level: usize,

    /// Override the search time limit, in seconds
    #[clap(short, long)]
    time_limit: Option<f64>,

    /// Override the node-expansion ceiling
    #[clap(long)]
    max_nodes: Option<usize>,

    /// Stop replaying after this many moves (the fallback can run forever)
    #[clap(long, default_value_t = 1000)]
    max_steps: usize,

    /// Replay these LURD moves instead of searching (e.g. "rRdLL")
    #[clap(short, long)]
    moves: Option<String>,

    /// Path to a level file in the usual `#@$.*+` notation
    level_file: Option<PathBuf>,
}

fn read_level_file(path: &PathBuf) -> Result<PuzzleState, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;
    state_from_text(&content).map_err(|e| format!("Invalid level: {}", e))
}

fn load_state(args: &Args) -> Result<PuzzleState, String> {
    match &args.level_file {
        Some(path) => read_level_file(path),
        None => state_from_str_array(get_level(args.difficulty, args.level))
            .map_err(|e| format!("Invalid built-in level: {}", e)),
    }
}

fn build_budget(args: &Args) -> Result<SearchBudget, String> {
    let mut budget = SearchBudget::new(args.algorithm, args.difficulty);
    if let Some(secs) = args.time_limit {
        budget = budget.with_time_limit(time_limit_from_secs(secs)?);
    }
    if let Some(max_nodes) = args.max_nodes {
        budget = budget.with_max_nodes(max_nodes);
    }
    Ok(budget)
}

/// Plays the controller's moves on `game` until solved, stuck or `max_steps` is reached.
fn play_with_ai(budget: SearchBudget, game: &mut Game, max_steps: usize) -> Vec<Direction> {
    let mut ai = SolverController::with_budget(budget);
    ai.compute_solution(game.state());

    if let Some(report) = ai.last_report() {
        println!(
            "{} finished with {:?} after {} nodes in {:.2?}",
            report.algorithm, report.termination, report.nodes_expanded, report.elapsed
        );
        if let Some(path) = &report.path {
            println!("Plan ({}): {}", path.len(), format_path(path));
        }
    }
    if ai.is_using_fallback() {
        println!("No plan found, playing greedy fallback moves.");
    }

    let mut played = Vec::new();
    while !game.is_solved() && played.len() < max_steps {
        let Some(direction) = ai.get_next_move(game.state()) else {
            break;
        };
        if !game.process_move(direction) {
            eprintln!("Planned move {} was rejected, stopping.", direction);
            break;
        }
        played.push(direction);
    }
    played
}

/// Replays `moves` on `game`, stopping at the first blocked move.
fn replay_moves(moves: &[Direction], game: &mut Game) -> Vec<Direction> {
    let mut played = Vec::new();
    for &direction in moves {
        if !game.process_move(direction) {
            eprintln!("Move {} after {} moves is blocked, stopping.", direction, played.len());
            break;
        }
        played.push(direction);
    }
    played
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let setup = load_state(&args).and_then(|state| {
        let budget = build_budget(&args)?;
        let moves = args.moves.as_deref().map(parse_path).transpose()?;
        Ok((state, budget, moves))
    });
    let (initial, budget, moves) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    println!("Initial state:\n{}", initial);

    let mut game = Game::new(initial.clone());
    let played = match &moves {
        Some(moves) => replay_moves(moves, &mut game),
        None => play_with_ai(budget, &mut game, args.max_steps),
    };

    let notation = format_path_lurd(&initial, &played).unwrap_or_default();
    println!("Moves ({}): {}", played.len(), notation);
    println!("Final state:\n{}", game.state());
    println!(
        "Solved: {}, moves: {}, pushes: {}, score: {}, time: {:.2?}",
        game.is_solved(),
        game.moves(),
        game.pushes(),
        game.score(),
        game.elapsed()
    );
}
