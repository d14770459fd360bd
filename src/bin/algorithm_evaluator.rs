use clap::Parser;
use sokoban_solver::config::{time_limit_from_secs, Algorithm, Difficulty, SearchBudget};
use sokoban_solver::levels::levels_for;
use sokoban_solver::solver::{strategy_for, Termination};
use sokoban_solver::utils::{replay_path, state_from_str_array};
use std::collections::HashMap;
use std::process;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Cap every search at this many seconds instead of the tier default
    #[clap(short, long)]
    time_limit: Option<f64>,
}

#[derive(Default)]
struct Tally {
    runs: usize,
    solved: usize,
    nodes: usize,
    solution_moves: usize,
    time: Duration,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let time_limit = match args.time_limit.map(time_limit_from_secs).transpose() {
        Ok(limit) => limit,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let mut tallies: HashMap<Algorithm, Tally> = HashMap::new();
    println!("Starting algorithm evaluation over the built-in levels...");

    for difficulty in Difficulty::ALL {
        for (index, &rows) in levels_for(difficulty).iter().enumerate() {
            let initial = match state_from_str_array(rows) {
                Ok(state) => state,
                Err(e) => {
                    eprintln!("Skipping {} level {}: {}", difficulty, index, e);
                    continue;
                }
            };
            println!("\nLevel {} #{}", difficulty, index);

            for algorithm in Algorithm::ALL {
                let mut budget = SearchBudget::new(algorithm, difficulty);
                if let Some(limit) = time_limit {
                    budget = budget.with_time_limit(limit);
                }
                let report = strategy_for(algorithm).run(&initial, &budget.limits());

                let moves = report.path.as_ref().map_or(0, Vec::len);
                if report.is_solved() {
                    let verified = report
                        .path
                        .as_deref()
                        .and_then(|path| replay_path(&initial, path))
                        .is_some_and(|end| end.is_solved());
                    if !verified {
                        eprintln!(
                            "Error: {} reported a solution on {} level {} that does not replay.",
                            algorithm, difficulty, index
                        );
                    }
                }
                println!(
                    "  {:<4} {:<18} nodes: {:<7} moves: {:<4} time: {:.2?}",
                    algorithm.to_string(),
                    format!("{:?}", report.termination),
                    report.nodes_expanded,
                    moves,
                    report.elapsed
                );

                let tally = tallies.entry(algorithm).or_default();
                tally.runs += 1;
                tally.nodes += report.nodes_expanded;
                tally.time += report.elapsed;
                if report.termination == Termination::Solved {
                    tally.solved += 1;
                    tally.solution_moves += moves;
                }
            }
        }
    }

    println!("\n--- Evaluation Complete ---");
    for algorithm in Algorithm::ALL {
        let Some(tally) = tallies.get(&algorithm) else {
            println!("{}: no runs recorded.", algorithm);
            continue;
        };
        let avg_moves = if tally.solved > 0 {
            tally.solution_moves as f64 / tally.solved as f64
        } else {
            0.0
        };
        println!(
            "{:<4}: solved {}/{}, avg nodes {:.0}, avg solution length {:.1}, total time {:.2?}",
            algorithm.to_string(),
            tally.solved,
            tally.runs,
            tally.nodes as f64 / tally.runs.max(1) as f64,
            avg_moves,
            tally.time
        );
    }
}
