//! Mine-clearing game engine with a probability-driven automatic player and a
//! multi-threaded harness for measuring its win rate.

pub mod board;
pub mod config;
pub mod error;
pub mod estimator;
pub mod grid;
pub mod harness;
pub mod minefield;
pub mod solver;

pub use board::{Board, Cell, CellView, GameState, Ignored, MoveOutcome};
pub use config::{BatchConfig, Validate};
pub use error::{Error, Result};
pub use estimator::{Estimate, ProbabilityEstimator};
pub use grid::{Coord, Grid};
pub use harness::{play_seeded, run_batch, run_batch_observed, BatchObserver, BatchReport, NoopObserver};
pub use solver::{EstimatorPolicy, GameSummary, Policy, PolicyKind, RandomPolicy, Session, Solver};
