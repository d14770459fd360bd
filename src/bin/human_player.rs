use clap::Parser;
use sokoban_solver::config::{Algorithm, Difficulty};
use sokoban_solver::controller::SolverController;
use sokoban_solver::engine::{Direction, Game};
use sokoban_solver::levels::get_level;
use sokoban_solver::utils::{state_from_str_array, state_from_text};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Difficulty tier of the built-in level (also the hint budget)
    #[clap(short, long, value_enum, default_value = "easy")]
    difficulty: Difficulty,

    /// Index of the built-in level
    #[clap(short, long, default_value_t = 0)]
    level: usize,

    /// Algorithm used for hints
    #[clap(short, long, value_enum, default_value = "astar")]
    algorithm: Algorithm,

    /// Path to a level file; overrides the built-in level
    level_file: Option<PathBuf>,
}

fn parse_direction(input: &str) -> Option<Direction> {
    match input {
        "w" | "up" => Some(Direction::Up),
        "s" | "down" => Some(Direction::Down),
        "a" | "left" => Some(Direction::Left),
        "d" | "right" => Some(Direction::Right),
        _ => None,
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let loaded = match &args.level_file {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("Failed to read file: {}", e))
            .and_then(|text| state_from_text(&text).map_err(|e| format!("Invalid level: {}", e))),
        None => state_from_str_array(get_level(args.difficulty, args.level))
            .map_err(|e| format!("Invalid built-in level: {}", e)),
    };
    let initial = match loaded {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let mut game = Game::new(initial);
    let mut advisor = SolverController::new(args.algorithm, args.difficulty);
    println!("Welcome to Sokoban!");

    loop {
        println!("---------------------");
        println!(
            "Moves: {}, Pushes: {}, Score: {}",
            game.moves(),
            game.pushes(),
            game.score()
        );
        println!("{}", game.state());

        if game.is_solved() {
            println!("---------------------");
            println!("🎉 SOLVED! 🎉");
            println!("Moves: {}, Pushes: {}", game.moves(), game.pushes());
            println!("Score: {} (lower is better)", game.score());
            println!("Time: {:.2?}", game.elapsed());
            println!("---------------------");
            break;
        }

        print!("Move with w/a/s/d, 'h' for a hint, 'u' to undo, 'r' to restart, 'q' to quit: ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => {
                println!("Error reading input. Please try again.");
                continue;
            }
        }
        let command = input.trim().to_lowercase();

        match command.as_str() {
            "q" => {
                println!("Thanks for playing!");
                break;
            }
            "u" => {
                if game.undo_last_move() {
                    println!("Move undone.");
                } else {
                    println!("Nothing to undo.");
                }
            }
            "r" => {
                game.restart();
                println!("Level restarted.");
            }
            "h" => {
                // Hints always plan from the position on screen.
                advisor.reset();
                advisor.compute_solution(game.state());
                match advisor.get_next_move(game.state()) {
                    Some(direction) => println!("Hint: try moving {}.", direction),
                    None => println!("No hint available from here."),
                }
            }
            other => match parse_direction(other) {
                Some(direction) => {
                    if !game.process_move(direction) {
                        println!("Blocked: cannot move {}.", direction);
                    }
                }
                None => println!("Invalid input. Use w/a/s/d, h, u, r or q."),
            },
        }
    }
}
