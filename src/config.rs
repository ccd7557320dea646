//! Solver selection and option validation.
//!
//! The engine assumes well-formed numeric parameters and never clamps or
//! re-validates them; out-of-range values are rejected here, before a
//! solver is constructed.

use clap::ValueEnum;
use thiserror::Error;

use crate::board::Move;
use crate::error::EngineError;
use crate::greedy::GreedySolver;
use crate::search::{CostStrategy, SearchEngine, SearchNode};

/// The recognized solver variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Plain A*: `f(n) = g(n) + h(n)`.
    Plain,
    /// Statically weighted A*: `f(n) = g(n) + eps*h(n)`.
    StaticWeighted,
    /// Dynamically weighted A*: the heuristic weight decays toward zero as
    /// the path approaches the anticipated solution length.
    DynamicWeighted,
    /// AlphA*: cost modulated by whether the parent keeps pace with the
    /// most recently expanded node.
    #[value(name = "alpha")]
    AlphA,
    /// Constructive row/column placement with a search hand-off for the
    /// residual region. The only practical choice for large boards.
    Greedy,
}

/// Rejection reasons for out-of-range solver options.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("epsilon must be at least 1, got {0}")]
    Epsilon(f64),
    #[error("anticipated path length must be positive")]
    PathLength,
    #[error("lambda must be at least -1, got {0}")]
    Lambda(f64),
    #[error("big lambda must be at least lambda, got lambda {lambda} and big lambda {big_lambda}")]
    LambdaOrder { lambda: f64, big_lambda: f64 },
}

/// Solver configuration consumed by the binaries and embedding callers.
/// Fields irrelevant to the chosen variant are ignored.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    pub variant: Variant,
    /// Heuristic weight, `>= 1` (all weighted variants).
    pub epsilon: f64,
    /// Anticipated solution length `N`, `> 0` (dynamic weighting only).
    pub path_length: usize,
    /// Lower cost modulation weight, `>= -1` (AlphA* only).
    pub lambda: f64,
    /// Upper cost modulation weight, `>= lambda` (AlphA* only).
    pub big_lambda: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            variant: Variant::Plain,
            epsilon: 1.0,
            path_length: 50,
            lambda: 0.0,
            big_lambda: 1.0,
        }
    }
}

impl SolverOptions {
    /// Checks every constraint relevant to the chosen variant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.variant {
            Variant::Plain | Variant::Greedy => Ok(()),
            Variant::StaticWeighted => self.check_epsilon(),
            Variant::DynamicWeighted => {
                self.check_epsilon()?;
                if self.path_length == 0 {
                    return Err(ConfigError::PathLength);
                }
                Ok(())
            }
            Variant::AlphA => {
                self.check_epsilon()?;
                if self.lambda < -1.0 {
                    return Err(ConfigError::Lambda(self.lambda));
                }
                if self.big_lambda < self.lambda {
                    return Err(ConfigError::LambdaOrder {
                        lambda: self.lambda,
                        big_lambda: self.big_lambda,
                    });
                }
                Ok(())
            }
        }
    }

    fn check_epsilon(&self) -> Result<(), ConfigError> {
        if self.epsilon < 1.0 {
            return Err(ConfigError::Epsilon(self.epsilon));
        }
        Ok(())
    }

    /// Validates the options and constructs the solver, seeded with
    /// `initial` (typically an empty move sequence plus the shuffled
    /// board's state).
    pub fn build(&self, initial: SearchNode) -> Result<Solver, ConfigError> {
        self.validate()?;
        let solver = match self.variant {
            Variant::Plain => Solver::Search(SearchEngine::new(CostStrategy::Plain, initial)),
            Variant::StaticWeighted => Solver::Search(SearchEngine::new(
                CostStrategy::StaticWeighted {
                    epsilon: self.epsilon,
                },
                initial,
            )),
            Variant::DynamicWeighted => Solver::Search(SearchEngine::new(
                CostStrategy::DynamicWeighted {
                    epsilon: self.epsilon,
                    anticipated_length: self.path_length,
                },
                initial,
            )),
            Variant::AlphA => Solver::Search(SearchEngine::new(
                CostStrategy::AlphA {
                    epsilon: self.epsilon,
                    lambda: self.lambda,
                    big_lambda: self.big_lambda,
                },
                initial,
            )),
            Variant::Greedy => Solver::Greedy(GreedySolver::new(initial)),
        };
        Ok(solver)
    }
}

/// The active solver: a weighted-A* engine or the constructive placer,
/// behind one `next`/`add` surface.
pub enum Solver {
    Search(SearchEngine),
    Greedy(GreedySolver),
}

impl Solver {
    /// The next candidate move sequence.
    pub fn next(&mut self) -> Result<Vec<Move>, EngineError> {
        match self {
            Solver::Search(search) => search.next(),
            Solver::Greedy(greedy) => greedy.next(),
        }
    }

    /// Reports a newly discovered neighbor state with its heuristic value.
    pub fn add(&mut self, node: SearchNode, h: usize) -> Result<(), EngineError> {
        match self {
            Solver::Search(search) => {
                search.add(node, h);
                Ok(())
            }
            Solver::Greedy(greedy) => greedy.add(node, h),
        }
    }

    /// `true` if this solver's neighbor reports should carry the residual
    /// Manhattan heuristic instead of the full-board one.
    pub fn wants_residual_heuristic(&self) -> bool {
        matches!(self, Solver::Greedy(_))
    }

    /// Number of states the underlying search has expanded.
    pub fn expanded(&self) -> usize {
        match self {
            Solver::Search(search) => search.expanded(),
            Solver::Greedy(greedy) => greedy.expanded(),
        }
    }
}
