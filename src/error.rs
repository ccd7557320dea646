//! Engine error kinds.
//!
//! None of these are retried internally: every error propagates to the
//! caller, which decides whether to abort the solve attempt, reset the
//! board, or report a bug.

use crate::board::Move;
use thiserror::Error;

/// Error type for board and solver operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// The blank has no neighbor in the requested direction. This is a
    /// programming or state-desync error; callers should gate moves with
    /// `Board::check_move` first.
    #[error("no legal move in direction {0}")]
    InvalidMove(Move),

    /// The priority queue ran out of nodes before an unvisited state was
    /// found. The search space is exhausted without reaching the goal,
    /// which is fatal for this solver instance.
    #[error("search frontier exhausted before reaching the goal")]
    EmptyFrontier,

    /// Blank routing found neither a direct step nor a detour. Given a
    /// solvable board this is an invariant violation, not a recoverable
    /// condition.
    #[error("blank routing hit a dead end at ({row}, {col})")]
    DeadEnd {
        /// Row of the blank when routing stalled.
        row: usize,
        /// Column of the blank when routing stalled.
        col: usize,
    },

    /// A stalled placement matched none of the known deadlock patterns.
    /// This indicates a gap in the deadlock classification, not a
    /// board-data problem.
    #[error(
        "unclassified placement deadlock: tile at ({tile_row}, {tile_col}), \
         destination ({dest_row}, {dest_col})\n{board}"
    )]
    DeadlockUnclassified {
        /// Row of the tile being placed when the stall was detected.
        tile_row: usize,
        /// Column of the tile being placed.
        tile_col: usize,
        /// Row of the destination cell.
        dest_row: usize,
        /// Column of the destination cell.
        dest_col: usize,
        /// Rendered board state at the time of the miss.
        board: String,
    },
}
