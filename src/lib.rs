//! # Hold'em CFR
//!
//! Counterfactual Regret Minimization for two-player poker, together with the
//! hand evaluator and betting state machine needed to turn trained strategies
//! into live play.
//!
//! ## Features
//!
//! - **Generic CFR Engine**: Works with any game implementing the `Game` trait
//! - **Variants**: Vanilla CFR by default, CFR+ and Linear CFR as switches
//! - **Parallel Training**: Rayon workers share a per-key locked store
//! - **Hand Evaluation**: Ten categories with exact tie-breaks, ace-low wheel
//! - **Live Play**: Validated betting, pot awards and a trained-strategy bot
//!
//! ## Quick Start
//!
//! ```
//! use holdem_cfr::cfr::{CFRConfig, CFRSolver};
//! use holdem_cfr::games::kuhn::KuhnPoker;
//!
//! let mut solver = CFRSolver::new(KuhnPoker::new(), CFRConfig::default().with_seed(7));
//! solver.train(1_000);
//!
//! let table = solver.strategy_table();
//! let json = table.to_json().unwrap();
//! assert!(json.contains("\"Kb\""));
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: Core CFR algorithm, store and configuration
//! - [`games`]: Kuhn poker, heads-up hold'em and rock-paper-scissors
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      CFR Solver (Generic)                       │
//! │  - Regret matching        - Strategy averaging                  │
//! │  - Parallel iterations    - Strategy table export               │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ implements Game trait
//!                               ▼
//!              ┌────────────────┴────────────────┐
//!              │                                 │
//!              ▼                                 ▼
//!         ┌─────────┐                   ┌─────────────────┐
//!         │  Kuhn   │                   │ Heads-up Hold'em│
//!         │  Poker  │                   │ betting + eval  │
//!         └─────────┘                   └─────────────────┘
//! ```

#![warn(missing_docs)]

/// CFR (Counterfactual Regret Minimization) solver module.
///
/// This is the core module containing the generic CFR algorithm.
pub mod cfr;

/// Error types shared across the crate.
pub mod error;

/// Game implementations module.
///
/// Contains Kuhn Poker for validation, heads-up hold'em and
/// rock-paper-scissors.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use cfr::{Action, CFRConfig, CFRSolver, CFRStats, Game, GameState, InfoState};
pub use error::{PokerError, Result};
