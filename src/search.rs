//! Weighted A* search family.
//!
//! All variants share one skeleton: a priority queue of [`SearchNode`]
//! seeded with the initial state at cost 0, and a visited map keyed by the
//! serialized state that enforces at most one expansion per distinct state.
//! The only difference between variants is the cost formula, expressed as
//! the closed [`CostStrategy`] enum:
//!
//! | Variant           | f(n)                                              |
//! |-------------------|---------------------------------------------------|
//! | `Plain`           | `g + h`                                           |
//! | `StaticWeighted`  | `g + eps*h`                                       |
//! | `DynamicWeighted` | `g + (1 + eps*w)*h`, `w = 1 - d/N` while `d <= N` |
//! | `AlphA`           | `(1 + wa)*(g + eps*h)`                            |
//!
//! `g(n)` is the accumulated move-sequence length and `h(n)` is supplied by
//! the caller (typically a Manhattan heuristic). The heap is max-oriented
//! and the search wants minimum f, so entries are prioritized by `-f`.
//!
//! Weighting trades optimality for speed by design: none of the weighted
//! variants guarantee shortest solutions. Parameters are validated by the
//! configuration layer before construction, not here.

use std::collections::HashMap;

use crate::board::{Move, StateKey};
use crate::error::EngineError;
use crate::pqueue::PriorityQueue;

/// A frontier entry: the replayable move sequence from the root and the
/// serialized state it reaches. The sequence length doubles as `g(n)`
/// (uniform step cost).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchNode {
    /// Moves from the root state to this node.
    pub moves: Vec<Move>,
    /// Serialized state reached by `moves`.
    pub state: StateKey,
}

impl SearchNode {
    pub fn new(moves: Vec<Move>, state: StateKey) -> Self {
        SearchNode { moves, state }
    }

    /// Accumulated path cost `g(n)`.
    pub fn g(&self) -> usize {
        self.moves.len()
    }
}

/// Cost-function strategy for the shared search skeleton. Each variant
/// carries only its own parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CostStrategy {
    /// `f(n) = g(n) + h(n)`: standard A*, admissible if `h` is.
    Plain,
    /// `f(n) = g(n) + eps*h(n)` with `eps >= 1`: inflates the heuristic,
    /// trading optimality for speed.
    StaticWeighted { epsilon: f64 },
    /// `f(n) = g(n) + (1 + eps*w(n))*h(n)` with `w(n) = 1 - d(n)/N` while
    /// `d(n) <= N`, else `0`. The weight decays toward zero as the path
    /// approaches the anticipated solution length `N`, converging to
    /// near-unweighted behavior close to the expected goal depth.
    DynamicWeighted {
        epsilon: f64,
        anticipated_length: usize,
    },
    /// `fa(n) = (1 + wa)*(g(n) + eps*h(n))` with `wa = lambda` if
    /// `g(parent(n)) >= g(n-hat)` else `big_lambda`, where `n-hat` is the
    /// most recently visited node and `lambda <= big_lambda`.
    ///
    /// "Most recently visited" follows the insertion order of the visited
    /// map; because heap tie order is unspecified, two nodes with equal f
    /// may visit in either order, so cost assignment is not bit-stable
    /// across heap implementations.
    AlphA {
        epsilon: f64,
        lambda: f64,
        big_lambda: f64,
    },
}

impl CostStrategy {
    /// Computes `f(n)` for a node about to enter the frontier.
    /// `last_visited_g` is the path length of the most recently visited
    /// node, or `None` before the first visit (treated as 0; callers seed
    /// one expansion via [`SearchEngine::next`] before adding).
    fn cost(&self, node: &SearchNode, h: usize, last_visited_g: Option<usize>) -> f64 {
        let g = node.g() as f64;
        let h = h as f64;
        match *self {
            CostStrategy::Plain => g + h,
            CostStrategy::StaticWeighted { epsilon } => g + epsilon * h,
            CostStrategy::DynamicWeighted {
                epsilon,
                anticipated_length,
            } => {
                let w = if node.g() <= anticipated_length {
                    1.0 - g / anticipated_length as f64
                } else {
                    0.0
                };
                g + (1.0 + epsilon * w) * h
            }
            CostStrategy::AlphA {
                epsilon,
                lambda,
                big_lambda,
            } => {
                let f = g + epsilon * h;
                let parent_g = node.g().saturating_sub(1);
                let wa = if parent_g >= last_visited_g.unwrap_or(0) {
                    lambda
                } else {
                    big_lambda
                };
                (1.0 + wa) * f
            }
        }
    }
}

fn neg_cost(entry: &(f64, SearchNode)) -> f64 {
    -entry.0
}

type Frontier = PriorityQueue<(f64, SearchNode), fn(&(f64, SearchNode)) -> f64>;

/// The shared search skeleton: frontier, visited map, and the strategy that
/// prices new nodes.
pub struct SearchEngine {
    frontier: Frontier,
    visited: HashMap<StateKey, SearchNode>,
    last_visited_g: Option<usize>,
    strategy: CostStrategy,
}

impl SearchEngine {
    /// Creates a search seeded with `initial` at cost 0.
    pub fn new(strategy: CostStrategy, initial: SearchNode) -> Self {
        let mut frontier: Frontier = PriorityQueue::new(neg_cost);
        frontier.push((0.0, initial));
        SearchEngine {
            frontier,
            visited: HashMap::new(),
            last_visited_g: None,
            strategy,
        }
    }

    /// Pops nodes until one with an unvisited state appears, marks it
    /// visited, and returns its move sequence.
    ///
    /// # Errors
    /// [`EngineError::EmptyFrontier`] if the frontier is exhausted first:
    /// the puzzle has no remaining unexplored state, which should not
    /// happen for a solvable instance before the goal is reached.
    pub fn next(&mut self) -> Result<Vec<Move>, EngineError> {
        loop {
            let (_, node) = self.frontier.pop().ok_or(EngineError::EmptyFrontier)?;
            if self.visited.contains_key(&node.state) {
                continue;
            }
            self.last_visited_g = Some(node.g());
            let moves = node.moves.clone();
            self.visited.insert(node.state.clone(), node);
            return Ok(moves);
        }
    }

    /// Prices `node` with the strategy's cost formula and pushes it onto
    /// the frontier. `h` is the caller-supplied heuristic value for the
    /// node's state.
    pub fn add(&mut self, node: SearchNode, h: usize) {
        let f = self.strategy.cost(&node, h, self.last_visited_g);
        self.frontier.push((f, node));
    }

    /// The node that first reached `state`, if it has been visited.
    pub fn visited_node(&self, state: &StateKey) -> Option<&SearchNode> {
        self.visited.get(state)
    }

    /// Number of states expanded so far.
    pub fn expanded(&self) -> usize {
        self.visited.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn node_after(board: &Board, moves: &[Move]) -> SearchNode {
        let mut b = board.clone();
        b.apply(moves).unwrap();
        SearchNode::new(moves.to_vec(), b.key())
    }

    #[test]
    fn test_plain_cost_is_g_plus_h() {
        let board = Board::new(3, 3);
        let node = node_after(&board, &[Move::Left, Move::Up]);
        let f = CostStrategy::Plain.cost(&node, 7, Some(0));
        assert_eq!(f, 9.0);
    }

    #[test]
    fn test_static_weight_scales_heuristic() {
        let board = Board::new(3, 3);
        let node = node_after(&board, &[Move::Left]);
        let strategy = CostStrategy::StaticWeighted { epsilon: 3.0 };
        assert_eq!(strategy.cost(&node, 4, None), 1.0 + 12.0);
    }

    #[test]
    fn test_dynamic_weight_decays_with_depth() {
        let board = Board::new(4, 4);
        let strategy = CostStrategy::DynamicWeighted {
            epsilon: 2.0,
            anticipated_length: 4,
        };
        // Depth 2 of 4: w = 0.5, f = 2 + (1 + 2*0.5)*10 = 22.
        let shallow = node_after(&board, &[Move::Left, Move::Right]);
        assert_eq!(strategy.cost(&shallow, 10, None), 22.0);
        // Depth 4 of 4: w = 0, f = 4 + 10 = 14.
        let at_limit = node_after(&board, &[Move::Left, Move::Right, Move::Left, Move::Right]);
        assert_eq!(strategy.cost(&at_limit, 10, None), 14.0);
        // Beyond the anticipated length the weight stays 0.
        let deep = node_after(
            &board,
            &[Move::Left, Move::Right, Move::Left, Move::Right, Move::Left],
        );
        assert_eq!(strategy.cost(&deep, 10, None), 15.0);
    }

    #[test]
    fn test_alpha_weight_tracks_last_visited() {
        let board = Board::new(3, 3);
        let strategy = CostStrategy::AlphA {
            epsilon: 1.0,
            lambda: 0.0,
            big_lambda: 1.0,
        };
        let node = node_after(&board, &[Move::Left, Move::Up]); // g = 2, parent g = 1
        // Parent keeps pace with the last visited node: weight lambda.
        assert_eq!(strategy.cost(&node, 3, Some(1)), 5.0);
        // Parent lags behind: weight big_lambda doubles the cost.
        assert_eq!(strategy.cost(&node, 3, Some(2)), 10.0);
    }

    #[test]
    fn test_next_returns_minimum_f_first() {
        let board = Board::new(3, 3);
        let mut search = SearchEngine::new(CostStrategy::Plain, SearchNode::new(Vec::new(), board.key()));
        assert_eq!(search.next().unwrap(), Vec::<Move>::new());

        let costly = node_after(&board, &[Move::Left]);
        let cheap = node_after(&board, &[Move::Up]);
        search.add(costly.clone(), 9); // f = 10
        search.add(cheap.clone(), 2); // f = 3
        assert_eq!(search.next().unwrap(), cheap.moves);
        assert_eq!(search.next().unwrap(), costly.moves);
    }

    #[test]
    fn test_next_skips_already_visited_states() {
        let board = Board::new(3, 3);
        let mut search = SearchEngine::new(CostStrategy::Plain, SearchNode::new(Vec::new(), board.key()));
        search.next().unwrap();

        let node = node_after(&board, &[Move::Left]);
        search.add(node.clone(), 1);
        search.add(node.clone(), 5); // same state, worse cost
        assert_eq!(search.next().unwrap(), node.moves);
        assert_eq!(search.expanded(), 2);
        // The duplicate is skipped on pop, leaving nothing to visit.
        assert_eq!(search.next(), Err(EngineError::EmptyFrontier));
    }

    #[test]
    fn test_empty_frontier_error() {
        let board = Board::new(2, 2);
        let mut search = SearchEngine::new(CostStrategy::Plain, SearchNode::new(Vec::new(), board.key()));
        search.next().unwrap();
        assert_eq!(search.next(), Err(EngineError::EmptyFrontier));
    }

    #[test]
    fn test_visited_node_keeps_first_reacher() {
        let board = Board::new(3, 3);
        let mut search = SearchEngine::new(CostStrategy::Plain, SearchNode::new(Vec::new(), board.key()));
        search.next().unwrap();
        assert!(search.visited_node(&board.key()).is_some());
        let unseen = node_after(&board, &[Move::Up]);
        assert!(search.visited_node(&unseen.state).is_none());
    }
}
