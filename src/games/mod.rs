//! Game implementations for the CFR solver.
//!
//! ## Available Games
//!
//! - [`kuhn`]: Kuhn Poker, a 3-card game with a known Nash equilibrium used
//!   to validate the solver
//! - [`holdem`]: Heads-up Texas hold'em with a pass/call/raise abstraction,
//!   plus the hand evaluator and betting machine used for live play
//! - [`rps`]: Rock-paper-scissors trained by plain regret matching
//!
//! ## Adding New Games
//!
//! 1. Create a new module under `src/games/`
//! 2. Define state, action, and info state types
//! 3. Implement the `Game` trait
//! 4. Add tests that verify expected behavior
//!
//! See the [`kuhn`] module for a complete example.

pub mod holdem;
pub mod kuhn;
pub mod rps;
