//! Heads-up hold'em as a CFR game.
//!
//! The solver plays a three-token abstraction of the real betting machine:
//!
//! | token | action | concrete move |
//! |-------|--------|---------------|
//! | `p` | Pass | check, or fold when facing a bet |
//! | `c` | Call | call (only offered when facing a bet) |
//! | `b` | Raise | raise `to_call + raise_increment`, all-in if short |
//!
//! At most `max_raises_per_street` raises are offered per street. The chance
//! root deals both hands and the whole board at once; the information state
//! only reveals the board cards of the current street.

use rand::Rng;
use std::fmt;

use super::betting::{BettingState, HandPhase};
use super::card::{Board, Deck, HoleCards};
use super::config::HoldemConfig;
use super::hand_eval::HandEvaluator;
use super::info_state::HoldemInfoState;
use super::action::PlayerAction;
use crate::cfr::game::{Action, Game, GameState};
use crate::cfr::history::ActionHistory;
use crate::error::Result;

/// Abstract solver actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoldemAction {
    /// Check, or fold when facing a bet.
    Pass,
    /// Call the outstanding bet.
    Call,
    /// Raise by the configured increment.
    Raise,
}

impl HoldemAction {
    /// All actions in table order.
    pub const ALL: [HoldemAction; 3] = [HoldemAction::Pass, HoldemAction::Call, HoldemAction::Raise];

    /// Position of this action in [`HoldemAction::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl Action for HoldemAction {
    fn token(&self) -> u8 {
        match self {
            HoldemAction::Pass => b'p',
            HoldemAction::Call => b'c',
            HoldemAction::Raise => b'b',
        }
    }
}

impl fmt::Display for HoldemAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoldemAction::Pass => write!(f, "Pass"),
            HoldemAction::Call => write!(f, "Call"),
            HoldemAction::Raise => write!(f, "Raise"),
        }
    }
}

/// Full hand state: chips, all dealt cards and the token history.
#[derive(Debug, Clone)]
pub struct HoldemState {
    /// Betting machine, with both players' hole cards.
    pub betting: BettingState,
    /// The whole run-out, `None` until the chance root is sampled.
    pub board: Option<Board>,
    /// Abstract actions taken so far, `/` between streets.
    pub history: ActionHistory,
}

impl GameState for HoldemState {}

impl HoldemState {
    /// Board cards visible on the current street (all five once betting is over).
    pub fn visible_board(&self) -> Board {
        let Some(board) = self.board else {
            return Board::new();
        };
        match self.betting.street() {
            Some(street) => board.prefix(street.num_board_cards()),
            None => board,
        }
    }

    /// Both players' hole cards, if dealt.
    pub fn holes(&self) -> Option<[HoleCards; 2]> {
        Some([self.betting.seat(0).hole?, self.betting.seat(1).hole?])
    }
}

impl fmt::Display for HoldemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hole = |seat: usize| {
            self.betting
                .seat(seat)
                .hole
                .map_or_else(|| "??".to_string(), |h| h.to_string())
        };
        write!(
            f,
            "P0:{} P1:{} Board:{} History:{} | {}",
            hole(0),
            hole(1),
            self.visible_board(),
            self.history,
            self.betting
        )
    }
}

/// Heads-up no-limit hold'em with a fixed-increment raise abstraction.
#[derive(Debug, Clone, Default)]
pub struct HeadsUpHoldem {
    config: HoldemConfig,
    evaluator: HandEvaluator,
}

impl HeadsUpHoldem {
    /// Create a game for a table configuration.
    pub fn new(config: HoldemConfig) -> Self {
        Self {
            config,
            evaluator: HandEvaluator::new(),
        }
    }

    /// Get the table configuration.
    pub fn config(&self) -> &HoldemConfig {
        &self.config
    }

    /// A state with the given cards dealt and blinds posted. Seat 0 is the
    /// small blind.
    pub fn deal(&self, holes: [HoleCards; 2], board: Board) -> HoldemState {
        let mut state = self.initial_state();
        state.betting.deal_hole(0, holes[0]);
        state.betting.deal_hole(1, holes[1]);
        state.board = Some(board);
        state
    }

    /// Deal two hands and a five-card board from a shuffled deck.
    pub fn deal_random<R: Rng>(&self, rng: &mut R) -> Result<HoldemState> {
        let mut deck = Deck::shuffled(rng);
        let holes = [deck.deal_hole()?, deck.deal_hole()?];
        let board = Board::from_cards(&deck.deal_n(5)?);
        Ok(self.deal(holes, board))
    }

    /// Showdown winner for a finished, dealt hand.
    fn showdown_winner(&self, state: &HoldemState) -> Option<usize> {
        let holes = state.holes().expect("showdown without hole cards");
        let board = state.board.expect("showdown without a board");
        self.evaluator.showdown(&holes, board.cards()).winner
    }

    /// Concrete move for an abstract action.
    fn concrete(&self, state: &HoldemState, action: HoldemAction) -> PlayerAction {
        let betting = &state.betting;
        let player = betting.current_player().expect("action at a non-decision node");
        let to_call = betting.to_call(player);
        match action {
            HoldemAction::Pass if to_call > 0 => PlayerAction::Fold,
            HoldemAction::Pass => PlayerAction::Check,
            HoldemAction::Call => PlayerAction::Call,
            HoldemAction::Raise => {
                let bounds = betting
                    .legal_actions()
                    .raise
                    .expect("raise offered without raise bounds");
                let amount = to_call.saturating_add(self.config.raise_increment);
                PlayerAction::Raise(amount.clamp(bounds.min, bounds.max))
            }
        }
    }
}

impl Game for HeadsUpHoldem {
    type State = HoldemState;
    type Action = HoldemAction;
    type InfoState = HoldemInfoState;

    fn initial_state(&self) -> Self::State {
        let stack = self.config.starting_stack;
        HoldemState {
            betting: BettingState::new(
                [stack, stack],
                0,
                self.config.small_blind,
                self.config.big_blind,
            ),
            board: None,
            history: ActionHistory::new(),
        }
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.board.is_some() && state.betting.is_terminal()
    }

    fn get_payoff(&self, state: &Self::State, player: usize) -> f64 {
        debug_assert!(self.is_terminal(state), "get_payoff called on non-terminal state");

        let winner = match state.betting.phase() {
            HandPhase::Showdown => self.showdown_winner(state),
            _ => None,
        };
        state.betting.payoffs(winner)[player]
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        if self.is_chance(state) {
            return None;
        }
        state.betting.current_player()
    }

    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.is_chance(state) || self.is_terminal(state) {
            return vec![];
        }
        let legal = state.betting.legal_actions();
        let mut actions = vec![HoldemAction::Pass];
        if legal.call.is_some() {
            actions.push(HoldemAction::Call);
        }
        if legal.raise.is_some()
            && state.betting.raises_this_street() < self.config.max_raises_per_street
        {
            actions.push(HoldemAction::Raise);
        }
        actions
    }

    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        let street = state.betting.street();
        let concrete = self.concrete(state, *action);

        let mut next = state.clone();
        next.betting
            .act(concrete)
            .unwrap_or_else(|e| panic!("abstract action {} at {}: {}", action, state, e));
        next.history.push(action.token());

        let next_street = next.betting.street();
        if next_street.is_some() && next_street != street {
            next.history.end_street();
        }
        next
    }

    fn info_state(&self, state: &Self::State) -> Self::InfoState {
        let player = state
            .betting
            .current_player()
            .expect("info_state requires a decision node");
        let hole = state
            .betting
            .seat(player)
            .hole
            .expect("info_state requires dealt hole cards");
        HoldemInfoState::new(hole, state.visible_board(), state.history)
    }

    fn is_chance(&self, state: &Self::State) -> bool {
        state.board.is_none()
    }

    fn sample_chance<R: Rng>(&self, state: &Self::State, rng: &mut R) -> Self::State {
        debug_assert!(self.is_chance(state), "sample_chance called on non-chance state");
        self.deal_random(rng)
            .expect("a fresh deck holds two hands and a board")
    }
}
