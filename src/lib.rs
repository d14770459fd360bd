//! # Sokoban Solver Library
//!
//! This library provides the puzzle model for Sokoban-style box pushing and a search
//! subsystem that always ends with something actionable, even on puzzles it cannot solve.
//!
//! It is used by three binaries:
//! - `human_player`: Interactive play on the command line, with undo and AI hints.
//! - `ai_solver`: Loads a level, lets the AI controller play it, and reports the result.
//! - `algorithm_evaluator`: Runs every search algorithm over the built-in levels and
//!   tabulates nodes, path lengths and times.
//!
//! ## Modules
//! - `engine`: The static grid (`Grid`), the puzzle state (`PuzzleState`) with its pure move
//!   rules and canonical key, and a live play session (`Game`).
//! - `heuristics`: The remaining-cost estimate, corner deadlock detection and the greedy
//!   single-step fallback.
//! - `config`: Algorithm and difficulty selection plus the time, node and depth budgets.
//! - `solver`: A*, BFS and DFS sharing one expansion and termination contract.
//! - `controller`: `SolverController`, which turns one search into a stream of moves and
//!   falls back to the greedy strategy when search produces nothing.
//! - `levels`: The built-in level catalog.
//! - `utils`: Level parsing, path notation and path replay.

pub mod config;
pub mod controller;
pub mod engine;
pub mod heuristics;
pub mod levels;
pub mod solver;
pub mod utils;
