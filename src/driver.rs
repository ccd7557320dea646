//! Headless driving loop for the solver engines.
//!
//! The engine hands out *candidate full move sequences*; the caller owns a
//! working board and keeps it in sync: diff the candidate against the moves
//! already applied, roll back the divergent suffix, apply the new suffix,
//! and, if the goal has not been reached, report every legal neighbor of
//! the new frontier state back to the solver before asking again. This
//! module runs that loop to completion without any pacing; interactive
//! callers time-slice the same steps instead.

use thiserror::Error;

use crate::board::{Board, Move};
use crate::config::Solver;
use crate::error::EngineError;
use crate::search::SearchNode;

/// Default cap on driving-loop iterations before giving up.
pub const DEFAULT_ITERATION_LIMIT: usize = 1_000_000;

/// Failure modes of the driving loop.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The solver reported an engine error (see [`EngineError`]).
    #[error("solver failed: {0}")]
    Engine(#[from] EngineError),
    /// The iteration cap was reached before the goal.
    #[error("no solution within {0} solver iterations")]
    IterationLimit(usize),
}

/// A completed solve.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Move sequence that takes the initial board to the goal state.
    pub moves: Vec<Move>,
    /// Number of `next` queries the loop needed.
    pub iterations: usize,
}

/// Drives `solver` from `initial` until a candidate sequence reaches the
/// goal state, and returns that sequence.
///
/// # Errors
/// Propagates engine errors and fails with
/// [`DriverError::IterationLimit`] after `iteration_limit` queries.
pub fn run(initial: &Board, solver: &mut Solver, iteration_limit: usize) -> Result<Solution, DriverError> {
    let mut board = initial.clone();
    let mut applied: Vec<Move> = Vec::new();

    for iteration in 1..=iteration_limit {
        let next = solver.next()?;

        // Keep the shared prefix, roll back the rest, apply the new tail.
        let shared = applied
            .iter()
            .zip(next.iter())
            .take_while(|(a, b)| a == b)
            .count();
        board.reverse(&applied[shared..])?;
        board.apply(&next[shared..])?;
        applied = next;

        if board.is_goal() {
            return Ok(Solution {
                moves: applied,
                iterations: iteration,
            });
        }

        for mv in Move::ALL {
            if !board.check_move(mv) {
                continue;
            }
            board.move_tile(mv)?;
            let mut moves = applied.clone();
            moves.push(mv);
            let h = if solver.wants_residual_heuristic() {
                board.residual_manhattan()
            } else {
                board.manhattan()
            };
            solver.add(SearchNode::new(moves, board.key()), h)?;
            board.move_tile(mv.inverse())?;
        }
    }

    Err(DriverError::IterationLimit(iteration_limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SolverOptions, Variant};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn solve_with(board: &Board, variant: Variant) -> Solution {
        let options = SolverOptions {
            variant,
            ..SolverOptions::default()
        };
        let mut solver = options
            .build(SearchNode::new(Vec::new(), board.key()))
            .unwrap();
        run(board, &mut solver, DEFAULT_ITERATION_LIMIT).unwrap()
    }

    fn assert_solves(board: &Board, solution: &Solution) {
        let mut replay = board.clone();
        replay.apply(&solution.moves).unwrap();
        assert!(replay.is_goal(), "replayed sequence misses the goal:\n{}", replay);
    }

    #[test]
    fn test_goal_board_needs_no_moves() {
        let board = Board::new(3, 3);
        let solution = solve_with(&board, Variant::Plain);
        assert!(solution.moves.is_empty());
        assert_eq!(solution.iterations, 1);
    }

    #[test]
    fn test_plain_inverts_a_fixed_shuffle() {
        // Shuffled by exactly L,U,R,D: the optimal solution has 4 moves
        // (the inverse sequence U,L,D,R, or an equal-length equivalent).
        let mut board = Board::new(3, 3);
        board
            .apply(&[Move::Left, Move::Up, Move::Right, Move::Down])
            .unwrap();
        let solution = solve_with(&board, Variant::Plain);
        assert_eq!(solution.moves.len(), 4);
        assert_solves(&board, &solution);
    }

    #[test]
    fn test_plain_is_optimal_for_short_shuffles() {
        let mut board = Board::new(3, 3);
        board
            .apply(&[Move::Left, Move::Up, Move::Left, Move::Down, Move::Right])
            .unwrap();
        let solution = solve_with(&board, Variant::Plain);
        assert!(
            solution.moves.len() <= 5,
            "expected at most 5 moves, got {}",
            solution.moves.len()
        );
        assert_solves(&board, &solution);
    }

    #[test]
    fn test_every_search_variant_reaches_the_goal() {
        let mut rng = SmallRng::seed_from_u64(41);
        let mut board = Board::new(3, 3);
        board.shuffle(30, &mut rng);
        for variant in [
            Variant::Plain,
            Variant::StaticWeighted,
            Variant::DynamicWeighted,
            Variant::AlphA,
        ] {
            let solution = solve_with(&board, variant);
            assert_solves(&board, &solution);
        }
    }

    #[test]
    fn test_greedy_solves_a_large_board() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut board = Board::new(6, 6);
        board.shuffle(200, &mut rng);
        let solution = solve_with(&board, Variant::Greedy);
        assert_solves(&board, &solution);
    }

    #[test]
    fn test_iteration_limit_is_reported() {
        let mut rng = SmallRng::seed_from_u64(13);
        let mut board = Board::new(3, 3);
        board.shuffle(30, &mut rng);
        let options = SolverOptions::default();
        let mut solver = options
            .build(SearchNode::new(Vec::new(), board.key()))
            .unwrap();
        let err = run(&board, &mut solver, 1).unwrap_err();
        assert!(matches!(err, DriverError::IterationLimit(1)));
    }
}
