//! Information state for heads-up hold'em.
//!
//! A player knows their own hole cards, the board cards revealed so far and
//! the public action history. Keys look like `A♥K♠|` preflop and
//! `A♥K♠2♣7♦9♥|cp/b` once the flop is out, with `/` closing each street.

use std::fmt;

use super::card::{Board, HoleCards};
use crate::cfr::game::InfoState;
use crate::cfr::history::ActionHistory;

/// What the acting player knows at a decision point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoldemInfoState {
    /// The acting player's hole cards.
    pub hole: HoleCards,
    /// Board cards visible on the current street.
    pub board: Board,
    /// Public betting history.
    pub history: ActionHistory,
}

impl HoldemInfoState {
    /// Create a new info state.
    pub fn new(hole: HoleCards, board: Board, history: ActionHistory) -> Self {
        Self {
            hole,
            board,
            history,
        }
    }
}

impl InfoState for HoldemInfoState {
    fn key(&self) -> String {
        format!("{}{}|{}", self.hole, self.board, self.history)
    }
}

impl fmt::Display for HoldemInfoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
