use clap::Parser;
use npuzzle_solver::board::Board;
use npuzzle_solver::config::{SolverOptions, Variant};
use npuzzle_solver::driver::{self, DEFAULT_ITERATION_LIMIT};
use npuzzle_solver::search::SearchNode;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::HashMap;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Board rows
    #[clap(long, default_value_t = 3)]
    rows: usize,

    /// Board columns
    #[clap(long, default_value_t = 3)]
    cols: usize,

    /// Shuffle moves per board
    #[clap(short, long, default_value_t = 25)]
    shuffle: usize,

    /// Number of shuffled boards to evaluate
    #[clap(short, long, default_value_t = 10)]
    boards: usize,

    /// First RNG seed; board k uses seed + k
    #[clap(long, default_value_t = 0)]
    seed: u64,

    /// Heuristic weight for the weighted variants
    #[clap(short, long, default_value_t = 2.0)]
    epsilon: f64,
}

fn main() {
    let args = Args::parse();

    let variants: Vec<(&str, SolverOptions)> = vec![
        (
            "plain",
            SolverOptions {
                variant: Variant::Plain,
                ..SolverOptions::default()
            },
        ),
        (
            "static",
            SolverOptions {
                variant: Variant::StaticWeighted,
                epsilon: args.epsilon,
                ..SolverOptions::default()
            },
        ),
        (
            "dynamic",
            SolverOptions {
                variant: Variant::DynamicWeighted,
                epsilon: args.epsilon,
                path_length: args.shuffle,
                ..SolverOptions::default()
            },
        ),
        (
            "alpha",
            SolverOptions {
                variant: Variant::AlphA,
                epsilon: args.epsilon,
                ..SolverOptions::default()
            },
        ),
        (
            "greedy",
            SolverOptions {
                variant: Variant::Greedy,
                ..SolverOptions::default()
            },
        ),
    ];
    for (name, options) in &variants {
        if let Err(e) = options.validate() {
            eprintln!("Invalid options for {}: {}", name, e);
            std::process::exit(1);
        }
    }

    // (solution length, expanded states) per variant, across all boards.
    let mut results: HashMap<&str, Vec<(usize, usize)>> = HashMap::new();

    println!(
        "Evaluating {} variants on {} shuffled {}x{} boards...",
        variants.len(),
        args.boards,
        args.rows,
        args.cols
    );

    for board_idx in 0..args.boards {
        let current_seed = args.seed + board_idx as u64;
        let mut board = Board::new(args.rows, args.cols);
        let mut rng = SmallRng::seed_from_u64(current_seed);
        board.shuffle(args.shuffle, &mut rng);

        println!("\nBoard {} (seed {}):", board_idx, current_seed);

        for (name, options) in &variants {
            let mut solver = match options.build(SearchNode::new(Vec::new(), board.key())) {
                Ok(solver) => solver,
                Err(e) => {
                    eprintln!("  {:<8} failed to build: {}", name, e);
                    continue;
                }
            };
            match driver::run(&board, &mut solver, DEFAULT_ITERATION_LIMIT) {
                Ok(solution) => {
                    let expanded = solver.expanded();
                    println!(
                        "  {:<8} {:>4} moves, {:>6} states expanded",
                        name,
                        solution.moves.len(),
                        expanded
                    );
                    results
                        .entry(*name)
                        .or_default()
                        .push((solution.moves.len(), expanded));
                }
                Err(e) => {
                    eprintln!("  {:<8} failed: {}", name, e);
                }
            }
        }
    }

    println!("\n--- Averages over {} boards ---", args.boards);
    let mut averages: Vec<(&str, f64, f64)> = results
        .iter()
        .filter(|(_, runs)| !runs.is_empty())
        .map(|(name, runs)| {
            let moves: usize = runs.iter().map(|&(m, _)| m).sum();
            let expanded: usize = runs.iter().map(|&(_, e)| e).sum();
            (
                *name,
                moves as f64 / runs.len() as f64,
                expanded as f64 / runs.len() as f64,
            )
        })
        .collect();
    averages.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    for (name, avg_moves, avg_expanded) in averages {
        println!(
            "{:<8} {:>8.1} moves, {:>10.1} states expanded",
            name, avg_moves, avg_expanded
        );
    }
}
