use clap::Parser;
use npuzzle_solver::board::Board;
use npuzzle_solver::config::{SolverOptions, Variant};
use npuzzle_solver::driver::{self, DEFAULT_ITERATION_LIMIT};
use npuzzle_solver::search::SearchNode;
use npuzzle_solver::utils::board_from_str;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Solver variant
    #[clap(short, long, value_enum, default_value = "greedy")]
    variant: Variant,

    /// Board rows (ignored with --board)
    #[clap(long, default_value_t = 4)]
    rows: usize,

    /// Board columns (ignored with --board)
    #[clap(long, default_value_t = 4)]
    cols: usize,

    /// Number of random legal shuffle moves (default: 5 * rows * cols)
    #[clap(short, long)]
    shuffle: Option<usize>,

    /// RNG seed for the shuffle
    #[clap(long, default_value_t = 0)]
    seed: u64,

    /// Path to a board file: one row per line, labels separated by
    /// whitespace, '.' or '0' for the blank
    #[clap(short, long)]
    board: Option<PathBuf>,

    /// Heuristic weight (static/dynamic/alpha variants)
    #[clap(short, long, default_value_t = 1.0)]
    epsilon: f64,

    /// Anticipated solution length (dynamic variant)
    #[clap(long, default_value_t = 50)]
    path_length: usize,

    /// Lower cost modulation weight (alpha variant)
    #[clap(long, default_value_t = 0.0)]
    lambda: f64,

    /// Upper cost modulation weight (alpha variant)
    #[clap(long, default_value_t = 1.0)]
    big_lambda: f64,

    /// Cap on solver iterations before giving up
    #[clap(long, default_value_t = DEFAULT_ITERATION_LIMIT)]
    limit: usize,
}

fn load_board(args: &Args) -> Result<Board, String> {
    match &args.board {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
            board_from_str(&content)
        }
        None => {
            let mut board = Board::new(args.rows, args.cols);
            let steps = args.shuffle.unwrap_or(args.rows * args.cols * 5);
            let mut rng = SmallRng::seed_from_u64(args.seed);
            board.shuffle(steps, &mut rng);
            Ok(board)
        }
    }
}

fn main() {
    let args = Args::parse();

    let board = match load_board(&args) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("Invalid board: {}", e);
            process::exit(1);
        }
    };
    if !board.solvable() {
        eprintln!("This board is not solvable:\n{}", board);
        process::exit(1);
    }

    println!("Initial board:\n{}", board);

    let options = SolverOptions {
        variant: args.variant,
        epsilon: args.epsilon,
        path_length: args.path_length,
        lambda: args.lambda,
        big_lambda: args.big_lambda,
    };
    let mut solver = match options.build(SearchNode::new(Vec::new(), board.key())) {
        Ok(solver) => solver,
        Err(e) => {
            eprintln!("Invalid solver options: {}", e);
            process::exit(1);
        }
    };

    match driver::run(&board, &mut solver, args.limit) {
        Ok(solution) => {
            let word: String = solution.moves.iter().map(|m| m.letter()).collect();
            println!("Solved in {} moves ({} solver iterations):", solution.moves.len(), solution.iterations);
            println!("  {}", if word.is_empty() { "(already solved)" } else { word.as_str() });
            let mut replay = board.clone();
            if let Err(e) = replay.apply(&solution.moves) {
                eprintln!("Solution failed to replay: {}", e);
                process::exit(1);
            }
            println!("\nFinal board:\n{}", replay);
        }
        Err(e) => {
            eprintln!("No solution found: {}", e);
            process::exit(1);
        }
    }
}
