//! Core board representation for the sliding-tile puzzle.
//!
//! This module defines the puzzle's fundamental components:
//! - `Move`: The four blank displacements and their inverses.
//! - `Board`: An `rows x cols` grid of tile labels with exactly one blank,
//!   plus move application/validation, shuffling, rollback, Manhattan
//!   heuristics, and the solved-prefix accessors the constructive solver
//!   relies on.
//! - `StateKey`: A packed, fixed-width serialization of a board state used
//!   as the deduplication key by the search algorithms.

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use crate::error::EngineError;

/// Label of the blank cell. All other labels are `1..rows*cols - 1`.
pub const BLANK: u16 = 0;

/// A single move, always interpreted as the *blank* moving in this
/// direction. Equivalently, the tile adjacent to the blank in the opposite
/// direction slides into the blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Left,
    Right,
    Up,
    Down,
}

impl Move {
    /// All four directions, in the order the driver expands them.
    pub const ALL: [Move; 4] = [Move::Left, Move::Right, Move::Up, Move::Down];

    /// The exact inverse of this move (`L <-> R`, `U <-> D`), used for
    /// backtracking and for rolling a board back to an earlier state.
    ///
    /// # Examples
    /// ```
    /// use npuzzle_solver::board::Move;
    /// assert_eq!(Move::Left.inverse(), Move::Right);
    /// assert_eq!(Move::Up.inverse(), Move::Down);
    /// ```
    pub fn inverse(self) -> Move {
        match self {
            Move::Left => Move::Right,
            Move::Right => Move::Left,
            Move::Up => Move::Down,
            Move::Down => Move::Up,
        }
    }

    /// Single-letter representation (`L`, `R`, `U`, `D`).
    pub fn letter(self) -> char {
        match self {
            Move::Left => 'L',
            Move::Right => 'R',
            Move::Up => 'U',
            Move::Down => 'D',
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A `(row, column)` cell coordinate.
pub type Position = (usize, usize);

/// Content-addressed, fixed-width serialization of a board state.
///
/// Stores the row-major label slice plus the board dimensions, so a `Board`
/// can be reconstructed from the key alone. Used as the visited-set key and
/// as the state payload carried through the search tree, replacing a
/// delimited-string encoding with something that hashes without
/// per-comparison parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    rows: u16,
    cols: u16,
    cells: Box<[u16]>,
}

impl StateKey {
    /// The row-major label slice of the serialized state.
    pub fn labels(&self) -> &[u16] {
        &self.cells
    }

    /// `true` if the serialized state is the sorted goal (ascending labels
    /// with the blank in the last cell).
    pub fn is_goal(&self) -> bool {
        let cells = &self.cells;
        match cells.split_last() {
            Some((&last, rest)) => last == BLANK && rest.windows(2).all(|w| w[0] <= w[1]),
            None => false,
        }
    }
}

/// The puzzle board: a `rows x cols` grid of distinct labels
/// `1..rows*cols - 1` plus exactly one [`BLANK`], stored row-major.
///
/// The board is created fixed-size and solved (or from a caller-supplied
/// grid), mutated in place by [`Board::move_tile`], and never resized; a
/// dimension change constructs a fresh board. The engine itself performs no
/// input validation (see `utils::board_from_str` for a validating parser).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    grid: Vec<u16>,
    blank: Position,
}

impl Board {
    /// Creates a solved `rows x cols` board: labels in ascending order with
    /// the blank in the bottom-right cell.
    ///
    /// # Panics
    /// Panics if either dimension is smaller than 2.
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(rows >= 2 && cols >= 2, "board must be at least 2x2");
        let mut grid: Vec<u16> = (1..=(rows * cols) as u16).collect();
        *grid.last_mut().expect("grid is non-empty") = BLANK;
        Board {
            rows,
            cols,
            grid,
            blank: (rows - 1, cols - 1),
        }
    }

    /// Creates a board from a row-major label slice.
    ///
    /// The labels are taken as-is; the caller is responsible for supplying a
    /// permutation of `1..rows*cols - 1` plus one [`BLANK`].
    ///
    /// # Panics
    /// Panics if `labels` has the wrong length or contains no blank.
    pub fn from_grid(rows: usize, cols: usize, labels: Vec<u16>) -> Self {
        assert_eq!(labels.len(), rows * cols, "label count must match dimensions");
        let blank_index = labels
            .iter()
            .position(|&v| v == BLANK)
            .expect("grid must contain the blank label");
        Board {
            rows,
            cols,
            grid: labels,
            blank: (blank_index / cols, blank_index % cols),
        }
    }

    /// Reconstructs a board from a serialized state.
    pub fn from_key(key: &StateKey) -> Self {
        Self::from_grid(key.rows as usize, key.cols as usize, key.cells.to_vec())
    }

    /// `(rows, cols)` of this board.
    pub fn dimension(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// The label at `(r, c)`.
    ///
    /// # Panics
    /// Panics if `r` or `c` are outside the board.
    pub fn get(&self, r: usize, c: usize) -> u16 {
        assert!(r < self.rows && c < self.cols, "cell out of bounds");
        self.grid[r * self.cols + c]
    }

    /// The row-major label slice.
    pub fn flat(&self) -> &[u16] {
        &self.grid
    }

    /// Current position of the blank.
    pub fn blank(&self) -> Position {
        self.blank
    }

    /// Serializes the current state into a [`StateKey`].
    pub fn key(&self) -> StateKey {
        StateKey {
            rows: self.rows as u16,
            cols: self.cols as u16,
            cells: self.grid.clone().into_boxed_slice(),
        }
    }

    /// The label that belongs at `(r, c)` in the sorted order. The
    /// bottom-right cell's sorted label is `rows*cols`, which never occurs
    /// in the grid (the blank sits there in the goal state), so comparing
    /// against it is always false for that cell.
    pub fn goal_label(&self, r: usize, c: usize) -> u16 {
        (r * self.cols + c + 1) as u16
    }

    /// `true` if the board is in the goal state: ascending labels with the
    /// blank in the last cell.
    pub fn is_goal(&self) -> bool {
        self.key().is_goal()
    }

    /// Number of leading rows that are completely solved.
    pub fn start_row(&self) -> usize {
        (0..self.rows)
            .take_while(|&r| (0..self.cols).all(|c| self.get(r, c) == self.goal_label(r, c)))
            .count()
    }

    /// Number of leading columns that are completely solved.
    pub fn start_col(&self) -> usize {
        (0..self.cols)
            .take_while(|&c| (0..self.rows).all(|r| self.get(r, c) == self.goal_label(r, c)))
            .count()
    }

    /// `true` if the blank can move in the given direction.
    pub fn check_move(&self, m: Move) -> bool {
        let (r, c) = self.blank;
        match m {
            Move::Left => c > 0,
            Move::Right => c + 1 < self.cols,
            Move::Up => r > 0,
            Move::Down => r + 1 < self.rows,
        }
    }

    /// Moves the blank one cell in the given direction, sliding the
    /// neighboring tile into the vacated cell. O(1).
    ///
    /// # Errors
    /// [`EngineError::InvalidMove`] if the blank has no neighbor in that
    /// direction; the board is left untouched.
    pub fn move_tile(&mut self, m: Move) -> Result<(), EngineError> {
        if !self.check_move(m) {
            return Err(EngineError::InvalidMove(m));
        }
        let (r, c) = self.blank;
        let to = match m {
            Move::Left => (r, c - 1),
            Move::Right => (r, c + 1),
            Move::Up => (r - 1, c),
            Move::Down => (r + 1, c),
        };
        self.grid[r * self.cols + c] = self.grid[to.0 * self.cols + to.1];
        self.grid[to.0 * self.cols + to.1] = BLANK;
        self.blank = to;
        Ok(())
    }

    /// The single direction that would swap the blank with the tile at
    /// `pos`, or `None` if `pos` is not adjacent to the blank.
    pub fn valid_move_for(&self, pos: Position) -> Option<Move> {
        let (r, c) = pos;
        let (br, bc) = self.blank;
        if r == br && c + 1 == bc {
            Some(Move::Left)
        } else if r == br && bc + 1 == c {
            Some(Move::Right)
        } else if c == bc && r + 1 == br {
            Some(Move::Up)
        } else if c == bc && br + 1 == r {
            Some(Move::Down)
        } else {
            None
        }
    }

    /// Applies a move sequence in order.
    ///
    /// # Errors
    /// Propagates the first [`EngineError::InvalidMove`]; earlier moves of
    /// the sequence remain applied.
    pub fn apply(&mut self, moves: &[Move]) -> Result<(), EngineError> {
        for &m in moves {
            self.move_tile(m)?;
        }
        Ok(())
    }

    /// Replays the inverses of `moves` in reverse order, rolling the board
    /// back to the state it was in before the sequence was applied.
    pub fn reverse(&mut self, moves: &[Move]) -> Result<(), EngineError> {
        for &m in moves.iter().rev() {
            self.move_tile(m.inverse())?;
        }
        Ok(())
    }

    /// Applies `steps` uniformly-random *legal* moves, chosen from the
    /// directions available at the blank's current position on every step.
    /// The result is always reachable from the goal and therefore solvable.
    pub fn shuffle<R: Rng>(&mut self, steps: usize, rng: &mut R) {
        for _ in 0..steps {
            let legal: Vec<Move> = Move::ALL
                .iter()
                .copied()
                .filter(|&m| self.check_move(m))
                .collect();
            if let Some(&m) = legal.choose(rng) {
                // Cannot fail: the move was drawn from the legal set.
                let _ = self.move_tile(m);
            }
        }
    }

    /// Position of `label`, or `None` if it is absent (which signals caller
    /// misuse for any valid label). Linear scan.
    pub fn find(&self, label: u16) -> Option<Position> {
        self.grid
            .iter()
            .position(|&v| v == label)
            .map(|i| (i / self.cols, i % self.cols))
    }

    /// Sum of Manhattan distances (`|dr| + |dc|`) between every non-blank
    /// tile's current and goal positions.
    pub fn manhattan(&self) -> usize {
        let mut h = 0;
        for r in 0..self.rows {
            for c in 0..self.cols {
                let v = self.get(r, c);
                if v == BLANK {
                    continue;
                }
                let gr = (v as usize - 1) / self.cols;
                let gc = (v as usize - 1) % self.cols;
                h += gr.abs_diff(r) + gc.abs_diff(c);
            }
        }
        h
    }

    /// Manhattan distance restricted to the trailing 3x3 block, plus a
    /// `(rows + cols) * 9` penalty for every foreign tile inside the block.
    ///
    /// This is the heuristic handed to the search once the constructive
    /// solver has reduced the puzzle to its residual region: the penalty
    /// steers the search away from states where an unrelated tile has
    /// wandered into the target block.
    pub fn residual_manhattan(&self) -> usize {
        let r0 = self.rows.saturating_sub(3);
        let c0 = self.cols.saturating_sub(3);
        let mut h = 0;
        for r in r0..self.rows {
            for c in c0..self.cols {
                let v = self.get(r, c);
                if v == BLANK {
                    continue;
                }
                let gr = (v as usize - 1) / self.cols;
                let gc = (v as usize - 1) % self.cols;
                if gr < r0 || gc < c0 {
                    h += (self.rows + self.cols) * 9;
                }
                h += gr.abs_diff(r) + gc.abs_diff(c);
            }
        }
        h
    }

    /// Permutation-parity solvability test.
    ///
    /// Counts inversions among the non-blank labels; for odd-width boards
    /// the inversion count of a solvable state is even, while even-width
    /// boards fold the blank's row into the parity.
    pub fn solvable(&self) -> bool {
        let inversions: usize = self
            .grid
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != BLANK)
            .map(|(i, &v)| {
                self.grid[i + 1..]
                    .iter()
                    .filter(|&&next| next != BLANK && next < v)
                    .count()
            })
            .sum();
        if self.cols % 2 == 1 {
            inversions % 2 == 0
        } else {
            (inversions + self.blank.0) % 2 == (self.rows - 1) % 2
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.rows * self.cols - 1).to_string().len();
        for r in 0..self.rows {
            for c in 0..self.cols {
                let v = self.get(r, c);
                if v == BLANK {
                    write!(f, "{:>width$} ", ".")?;
                } else {
                    write!(f, "{:>width$} ", v)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
