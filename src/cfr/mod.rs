//! CFR (Counterfactual Regret Minimization) Solver Module.
//!
//! This module provides a generic implementation of the CFR algorithm family
//! for computing Nash equilibrium strategies in extensive-form games.
//!
//! # Overview
//!
//! CFR is an iterative algorithm that converges to Nash equilibrium by:
//! 1. Computing counterfactual regret for each action at each decision point
//! 2. Updating strategies to minimize regret over time
//! 3. Averaging strategies across iterations to converge to equilibrium
//!
//! # Supported Variants
//!
//! - **Vanilla CFR** (default): Full traversal of the decision tree below a
//!   sampled chance outcome
//! - **CFR+**: Floors negative regrets to zero for faster convergence
//! - **Linear CFR**: Weights later iterations more heavily in the average
//!
//! Iterations run in parallel on a rayon pool and share one
//! [`InfoSetStore`]; each information set is guarded by its own lock.
//!
//! # Usage
//!
//! To use the CFR solver with your game:
//!
//! 1. Implement the `Game` trait for your game
//! 2. Create a `CFRSolver` with your game and configuration
//! 3. Call `train()` to run iterations
//! 4. Extract strategies using `get_average_strategy()` or export them all
//!    with `strategy_table()`
//!
//! # Example
//!
//! ```
//! use holdem_cfr::cfr::{CFRConfig, CFRSolver};
//! use holdem_cfr::games::kuhn::{KuhnInfoState, KuhnPoker};
//!
//! let config = CFRConfig::default().with_seed(42).with_threads(1);
//! let mut solver = CFRSolver::new(KuhnPoker::new(), config);
//!
//! // Train for 10,000 iterations
//! let stats = solver.train(10_000);
//! println!("Trained {} info sets in {:.2}s", stats.info_sets, stats.elapsed_seconds);
//!
//! // Equilibrium strategy for player 0 holding the King at the root
//! let key = KuhnInfoState::parse('K', "").unwrap();
//! let strategy = solver.get_average_strategy(&key).unwrap();
//! assert_eq!(strategy.len(), 2);
//! ```
//!
//! # Theory
//!
//! CFR is based on the principle of regret minimization:
//!
//! **Regret**: The difference between the value of an action and the value of the current strategy.
//! ```text
//! Regret(a) = Value(a) - Value(current_strategy)
//! ```
//!
//! **Regret Matching**: Set strategy proportional to positive regrets.
//! ```text
//! Strategy(a) = max(0, Regret(a)) / sum(max(0, Regret(a')))
//! ```
//!
//! **Convergence**: Average regret decreases as O(1/sqrt(T)), and the average strategy
//! converges to Nash equilibrium.
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Tammelin, O. "Solving Large Imperfect Information Games Using CFR+" (2014)

pub mod config;
pub mod game;
pub mod history;
pub mod solver;
pub mod storage;

// Re-export main types for convenient access
pub use config::{CFRConfig, CFRStats, ConfigError, ConvergencePoint};
pub use game::{Action, Game, GameState, InfoState};
pub use history::ActionHistory;
pub use solver::CFRSolver;
pub use storage::{regret_matching, InfoSetStore, StrategyEntry, StrategySnapshot, StrategyTable};
