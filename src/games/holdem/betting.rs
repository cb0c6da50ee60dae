//! Heads-up betting state machine.
//!
//! One `BettingState` drives a single hand from the posted blinds through
//! the four streets to a fold or a showdown. The same machine backs both the
//! solver's training game and live play, so all chip movement rules live
//! here:
//!
//! - blinds are posted at construction, capped at each stack;
//! - the small blind acts first preflop, the big blind first on later streets;
//! - a round ends once both players have acted since the last raise with
//!   equal bets, or as soon as bets are equal and someone is all-in;
//! - an all-in that cannot be fully called returns the uncalled excess to the
//!   bettor, and the remaining streets run out with no further betting.
//!
//! Invalid actions are rejected with [`PokerError::InvalidAction`] and never
//! change the state.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::action::PlayerAction;
use super::card::{Card, HoleCards, Street};
use crate::error::{PokerError, Result};

/// One player's chips and status in the current hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Seat {
    /// Chips behind.
    pub stack: u32,
    /// Chips put in on the current street.
    pub bet: u32,
    /// Chips put in over the whole hand.
    pub contributed: u32,
    /// Whether this player folded.
    pub folded: bool,
    /// Private cards, once dealt.
    pub hole: Option<HoleCards>,
}

/// Where the hand stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandPhase {
    /// Players are betting on this street.
    Betting(Street),
    /// Betting is over; the evaluator decides the pot.
    Showdown,
    /// One player folded; the other takes the pot.
    FoldedOut {
        /// Seat that did not fold.
        winner: usize,
    },
}

/// Inclusive bounds on a legal raise amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaiseBounds {
    /// Smallest legal raise.
    pub min: u32,
    /// Largest legal raise (the whole stack).
    pub max: u32,
}

/// The legal action set for the player to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LegalActions {
    /// Folding is allowed (something is owed).
    pub fold: bool,
    /// Checking is allowed (nothing is owed).
    pub check: bool,
    /// Chips a call would move, if calling is allowed.
    pub call: Option<u32>,
    /// Raise range, if raising is allowed.
    pub raise: Option<RaiseBounds>,
}

impl LegalActions {
    /// Check whether an action is in this set.
    pub fn allows(&self, action: &PlayerAction) -> bool {
        match action {
            PlayerAction::Fold => self.fold,
            PlayerAction::Check => self.check,
            PlayerAction::Call => self.call.is_some(),
            PlayerAction::Raise(amount) => self
                .raise
                .map_or(false, |r| (r.min..=r.max).contains(amount)),
            PlayerAction::AllIn => self.raise.is_some() || self.call.is_some(),
        }
    }
}

/// What an external actor sees before choosing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Chips in the middle.
    pub pot: u32,
    /// Current-street bets, by seat.
    pub bets: [u32; 2],
    /// Stacks, by seat.
    pub stacks: [u32; 2],
    /// Seat to act, if betting is open.
    pub to_act: Option<usize>,
    /// Current street, if betting is open.
    pub street: Option<Street>,
    /// Visible community cards.
    pub board: Vec<Card>,
    /// Legal actions for `to_act`.
    pub legal: LegalActions,
}

/// Betting state for one heads-up hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BettingState {
    seats: [Seat; 2],
    pot: u32,
    phase: HandPhase,
    to_act: usize,
    sb_seat: usize,
    big_blind: u32,
    min_raise: u32,
    acted: [bool; 2],
    raises_this_street: u8,
}

impl BettingState {
    /// Start a hand: post both blinds and hand the action to the small blind.
    pub fn new(stacks: [u32; 2], sb_seat: usize, small_blind: u32, big_blind: u32) -> Self {
        assert!(sb_seat < 2, "seat index out of range: {}", sb_seat);
        let bb_seat = 1 - sb_seat;

        let mut state = Self {
            seats: [
                Seat {
                    stack: stacks[0],
                    ..Seat::default()
                },
                Seat {
                    stack: stacks[1],
                    ..Seat::default()
                },
            ],
            pot: 0,
            phase: HandPhase::Betting(Street::Preflop),
            to_act: sb_seat,
            sb_seat,
            big_blind,
            min_raise: big_blind,
            acted: [false; 2],
            raises_this_street: 0,
        };

        state.put_in(sb_seat, small_blind);
        state.put_in(bb_seat, big_blind);
        state.settle();
        state
    }

    /// Give a seat its hole cards.
    pub fn deal_hole(&mut self, seat: usize, hole: HoleCards) {
        self.seats[seat].hole = Some(hole);
    }

    /// Get a seat.
    pub fn seat(&self, seat: usize) -> &Seat {
        &self.seats[seat]
    }

    /// Both seats.
    pub fn seats(&self) -> &[Seat; 2] {
        &self.seats
    }

    /// Chips in the middle.
    pub fn pot(&self) -> u32 {
        self.pot
    }

    /// Current phase.
    pub fn phase(&self) -> HandPhase {
        self.phase
    }

    /// Current street, if betting is still open.
    pub fn street(&self) -> Option<Street> {
        match self.phase {
            HandPhase::Betting(street) => Some(street),
            _ => None,
        }
    }

    /// Seat to act, if betting is still open.
    pub fn current_player(&self) -> Option<usize> {
        self.street().map(|_| self.to_act)
    }

    /// Small-blind seat.
    pub fn sb_seat(&self) -> usize {
        self.sb_seat
    }

    /// Big-blind seat.
    pub fn bb_seat(&self) -> usize {
        1 - self.sb_seat
    }

    /// Big blind, also the minimum raise on every street.
    pub fn big_blind(&self) -> u32 {
        self.big_blind
    }

    /// Raises made on the current street.
    pub fn raises_this_street(&self) -> u8 {
        self.raises_this_street
    }

    /// Whether the hand is over (folded out or at showdown).
    pub fn is_terminal(&self) -> bool {
        !matches!(self.phase, HandPhase::Betting(_))
    }

    /// Chips `seat` owes to match the opponent's bet.
    pub fn to_call(&self, seat: usize) -> u32 {
        self.seats[1 - seat].bet.saturating_sub(self.seats[seat].bet)
    }

    /// Legal actions for the player to act. Empty once the hand is over.
    pub fn legal_actions(&self) -> LegalActions {
        if self.is_terminal() {
            return LegalActions::default();
        }
        let p = self.to_act;
        let seat = &self.seats[p];
        let opponent = &self.seats[1 - p];
        let to_call = self.to_call(p);

        let raise = (opponent.stack > 0 && seat.stack > to_call).then(|| RaiseBounds {
            min: self.min_raise.max(to_call + 1).min(seat.stack),
            max: seat.stack,
        });

        LegalActions {
            fold: to_call > 0,
            check: to_call == 0,
            call: (to_call > 0).then(|| to_call.min(seat.stack)),
            raise,
        }
    }

    /// Check an action against the rules and return its normalized form:
    /// a fold with nothing owed becomes a check and `AllIn` becomes a call or
    /// a raise of the whole stack.
    pub fn validate(&self, action: PlayerAction) -> Result<PlayerAction> {
        let reject = |reason: &str| Err(PokerError::invalid_action(action, reason));

        if self.is_terminal() {
            return reject("hand is over");
        }
        let p = self.to_act;
        let seat = &self.seats[p];
        let to_call = self.to_call(p);

        let action = match action {
            PlayerAction::Fold if to_call == 0 => PlayerAction::Check,
            other => other.resolve_all_in(seat.stack, to_call),
        };

        match action {
            PlayerAction::Fold => Ok(action),
            PlayerAction::Check if to_call == 0 => Ok(action),
            PlayerAction::Check => reject("cannot check facing a bet"),
            PlayerAction::Call if to_call > 0 => Ok(action),
            PlayerAction::Call => reject("nothing to call"),
            PlayerAction::Raise(amount) => {
                if self.seats[1 - p].stack == 0 {
                    return reject("opponent is all-in");
                }
                if amount <= to_call {
                    return reject("raise must exceed the amount owed");
                }
                if amount > seat.stack {
                    return reject("raise exceeds stack");
                }
                if amount < self.min_raise && amount != seat.stack {
                    return reject("raise below the minimum");
                }
                Ok(action)
            }
            PlayerAction::AllIn => unreachable!("all-in is resolved above"),
        }
    }

    /// Apply an action in place, leaving the state untouched on error.
    pub fn act(&mut self, action: PlayerAction) -> Result<()> {
        let action = self.validate(action)?;
        let p = self.to_act;

        match action {
            PlayerAction::Fold => {
                self.seats[p].folded = true;
                self.phase = HandPhase::FoldedOut { winner: 1 - p };
                return Ok(());
            }
            PlayerAction::Check => {}
            PlayerAction::Call => {
                let owed = self.to_call(p).min(self.seats[p].stack);
                self.put_in(p, owed);
            }
            PlayerAction::Raise(amount) => {
                self.put_in(p, amount);
                self.acted = [false; 2];
                self.raises_this_street += 1;
            }
            PlayerAction::AllIn => unreachable!("all-in is resolved by validate"),
        }

        self.acted[p] = true;
        self.to_act = 1 - p;
        self.settle();
        Ok(())
    }

    /// Return the state after an action, leaving `self` untouched.
    pub fn apply(&self, action: PlayerAction) -> Result<Self> {
        let mut next = self.clone();
        next.act(action)?;
        Ok(next)
    }

    /// Net chip result per seat for a finished hand.
    ///
    /// `showdown_winner` is only read at showdown (`None` is a tie); a folded
    /// hand always pays the non-folder. Ties are split exactly, so the two
    /// entries always sum to zero.
    pub fn payoffs(&self, showdown_winner: Option<usize>) -> [f64; 2] {
        let contributed = [
            self.seats[0].contributed as f64,
            self.seats[1].contributed as f64,
        ];
        match self.winner(showdown_winner) {
            Some(w) => {
                let mut result = [0.0; 2];
                result[w] = contributed[1 - w];
                result[1 - w] = -contributed[1 - w];
                result
            }
            None => {
                let half = self.pot as f64 / 2.0;
                [half - contributed[0], half - contributed[1]]
            }
        }
    }

    /// Pay the pot out to the stacks and return each seat's share.
    ///
    /// On a tie each seat gets half and an odd chip goes to the big blind.
    pub fn award_pot(&mut self, showdown_winner: Option<usize>) -> Result<[u32; 2]> {
        if !self.is_terminal() {
            return Err(PokerError::invalid_action("award pot", "hand still in progress"));
        }

        let mut shares = [0u32; 2];
        match self.winner(showdown_winner) {
            Some(w) => shares[w] = self.pot,
            None => {
                let half = self.pot / 2;
                shares = [half, half];
                shares[self.bb_seat()] += self.pot % 2;
            }
        }

        for (seat, share) in self.seats.iter_mut().zip(shares) {
            seat.stack += share;
            seat.bet = 0;
        }
        self.pot = 0;
        Ok(shares)
    }

    /// Request snapshot for an external actor.
    pub fn snapshot(&self, board: &[Card]) -> TableSnapshot {
        TableSnapshot {
            pot: self.pot,
            bets: [self.seats[0].bet, self.seats[1].bet],
            stacks: [self.seats[0].stack, self.seats[1].stack],
            to_act: self.current_player(),
            street: self.street(),
            board: board.to_vec(),
            legal: self.legal_actions(),
        }
    }

    fn winner(&self, showdown_winner: Option<usize>) -> Option<usize> {
        match self.phase {
            HandPhase::FoldedOut { winner } => Some(winner),
            _ => showdown_winner,
        }
    }

    /// Move up to `amount` chips from a stack into the pot.
    fn put_in(&mut self, seat: usize, amount: u32) {
        let seat = &mut self.seats[seat];
        let amount = amount.min(seat.stack);
        seat.stack -= amount;
        seat.bet += amount;
        seat.contributed += amount;
        self.pot += amount;
    }

    /// Return an uncalled excess once the shorter player has no chips left.
    fn refund_uncalled(&mut self) {
        for short in 0..2 {
            let long = 1 - short;
            if self.seats[short].stack == 0 && self.seats[short].bet < self.seats[long].bet {
                let excess = self.seats[long].bet - self.seats[short].bet;
                let seat = &mut self.seats[long];
                seat.bet -= excess;
                seat.contributed -= excess;
                seat.stack += excess;
                self.pot -= excess;
            }
        }
    }

    fn round_complete(&self) -> bool {
        let [a, b] = &self.seats;
        a.bet == b.bet && (a.stack == 0 || b.stack == 0 || self.acted == [true, true])
    }

    fn settle(&mut self) {
        self.refund_uncalled();
        let HandPhase::Betting(street) = self.phase else {
            return;
        };
        if !self.round_complete() {
            return;
        }

        let all_in = self.seats.iter().any(|s| s.stack == 0);
        match street.next() {
            Some(next) if !all_in => {
                for seat in &mut self.seats {
                    seat.bet = 0;
                }
                self.acted = [false; 2];
                self.raises_this_street = 0;
                self.min_raise = self.big_blind;
                self.to_act = self.bb_seat();
                self.phase = HandPhase::Betting(next);
            }
            _ => self.phase = HandPhase::Showdown,
        }
    }
}

impl fmt::Display for BettingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pot {} | stacks {}/{} | bets {}/{} | {:?}",
            self.pot,
            self.seats[0].stack,
            self.seats[1].stack,
            self.seats[0].bet,
            self.seats[1].bet,
            self.phase
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> BettingState {
        BettingState::new([5000, 5000], 0, 250, 500)
    }

    fn total_chips(state: &BettingState) -> u32 {
        state.seats().iter().map(|s| s.stack).sum::<u32>() + state.pot()
    }

    #[test]
    fn test_blinds_posted() {
        let state = fresh();
        assert_eq!(state.pot(), 750);
        assert_eq!(state.seat(0).bet, 250);
        assert_eq!(state.seat(1).bet, 500);
        assert_eq!(state.current_player(), Some(0));
        assert_eq!(state.street(), Some(Street::Preflop));

        let legal = state.legal_actions();
        assert!(legal.fold);
        assert!(!legal.check);
        assert_eq!(legal.call, Some(250));
        assert_eq!(legal.raise, Some(RaiseBounds { min: 500, max: 4750 }));
    }

    #[test]
    fn test_check_down_to_showdown() {
        let mut state = fresh();
        state.act(PlayerAction::Call).unwrap();
        // Big blind keeps the option.
        assert_eq!(state.street(), Some(Street::Preflop));
        assert_eq!(state.current_player(), Some(1));
        state.act(PlayerAction::Check).unwrap();

        for street in [Street::Flop, Street::Turn, Street::River] {
            assert_eq!(state.street(), Some(street));
            assert_eq!(state.current_player(), Some(1));
            state.act(PlayerAction::Check).unwrap();
            state.act(PlayerAction::Check).unwrap();
        }
        assert_eq!(state.phase(), HandPhase::Showdown);
        assert_eq!(state.pot(), 1000);

        let shares = state.award_pot(Some(0)).unwrap();
        assert_eq!(shares, [1000, 0]);
        assert_eq!(state.pot(), 0);
        assert_eq!(state.seat(0).stack, 5500);
        assert_eq!(state.seat(1).stack, 4500);
    }

    #[test]
    fn test_raise_reopens_action() {
        let mut state = fresh();
        state.act(PlayerAction::Raise(1000)).unwrap();
        assert_eq!(state.seat(0).bet, 1250);
        assert_eq!(state.raises_this_street(), 1);
        assert_eq!(state.current_player(), Some(1));

        state.act(PlayerAction::Raise(1500)).unwrap();
        assert_eq!(state.seat(1).bet, 2000);
        assert_eq!(state.current_player(), Some(0));

        state.act(PlayerAction::Call).unwrap();
        assert_eq!(state.street(), Some(Street::Flop));
        assert_eq!(state.pot(), 4000);
        assert_eq!(state.raises_this_street(), 0);
        assert_eq!(total_chips(&state), 10_000);
    }

    #[test]
    fn test_invalid_actions_leave_state_untouched() {
        let mut state = fresh();
        let before = state.clone();

        for action in [
            PlayerAction::Check,
            PlayerAction::Raise(250),
            PlayerAction::Raise(400),
            PlayerAction::Raise(6000),
        ] {
            assert!(matches!(
                state.act(action),
                Err(PokerError::InvalidAction { .. })
            ));
            assert_eq!(state, before);
        }

        state.act(PlayerAction::Call).unwrap();
        assert!(state.act(PlayerAction::Call).is_err());
        assert!(state.apply(PlayerAction::Call).is_err());
    }

    #[test]
    fn test_fold_normalized_to_check() {
        let mut state = fresh();
        state.act(PlayerAction::Call).unwrap();
        assert_eq!(state.validate(PlayerAction::Fold), Ok(PlayerAction::Check));
        state.act(PlayerAction::Fold).unwrap();
        assert_eq!(state.street(), Some(Street::Flop));
    }

    #[test]
    fn test_fold_ends_hand() {
        let mut state = fresh();
        state.act(PlayerAction::Fold).unwrap();
        assert_eq!(state.phase(), HandPhase::FoldedOut { winner: 1 });
        assert!(state.seat(0).folded);
        assert_eq!(state.payoffs(None), [-250.0, 250.0]);
        assert!(state.act(PlayerAction::Check).is_err());

        let shares = state.award_pot(None).unwrap();
        assert_eq!(shares, [0, 750]);
        assert_eq!(state.seat(0).stack, 4750);
        assert_eq!(state.seat(1).stack, 5250);
    }

    #[test]
    fn test_short_all_in_refunds_excess() {
        let mut state = BettingState::new([5000, 2000], 0, 250, 500);
        state.act(PlayerAction::AllIn).unwrap();
        assert_eq!(state.seat(0).stack, 0);

        // Opponent is all-in, so no raise back.
        assert_eq!(state.legal_actions().raise, None);
        assert!(state.validate(PlayerAction::Raise(1500)).is_err());

        state.act(PlayerAction::Call).unwrap();
        assert_eq!(state.phase(), HandPhase::Showdown);
        assert_eq!(state.seat(0).contributed, 2000);
        assert_eq!(state.seat(0).stack, 3000);
        assert_eq!(state.pot(), 4000);
        assert_eq!(total_chips(&state), 7000);

        state.award_pot(Some(1)).unwrap();
        assert_eq!(state.seat(0).stack, 3000);
        assert_eq!(state.seat(1).stack, 4000);
    }

    #[test]
    fn test_all_in_from_blind() {
        let state = BettingState::new([200, 5000], 0, 250, 500);
        assert_eq!(state.phase(), HandPhase::Showdown);
        assert_eq!(state.pot(), 400);
        assert_eq!(state.seat(1).stack, 4800);
    }

    #[test]
    fn test_raise_bounds_facing_large_bet() {
        let mut state = BettingState::new([5000, 5000], 0, 250, 500);
        state.act(PlayerAction::Raise(4500)).unwrap();
        // BB owes 4250 and has 4500 behind.
        let legal = state.legal_actions();
        assert_eq!(legal.raise, Some(RaiseBounds { min: 4251, max: 4500 }));
        assert!(state.validate(PlayerAction::Raise(4250)).is_err());
        assert_eq!(state.validate(PlayerAction::Raise(4400)), Ok(PlayerAction::Raise(4400)));
        assert_eq!(state.validate(PlayerAction::AllIn), Ok(PlayerAction::Raise(4500)));
    }

    #[test]
    fn test_payoffs_zero_sum() {
        let mut state = fresh();
        state.act(PlayerAction::Raise(1000)).unwrap();
        state.act(PlayerAction::Call).unwrap();
        state.act(PlayerAction::Check).unwrap();
        state.act(PlayerAction::Raise(500)).unwrap();
        state.act(PlayerAction::Call).unwrap();
        state.act(PlayerAction::Check).unwrap();
        state.act(PlayerAction::Check).unwrap();
        state.act(PlayerAction::Check).unwrap();
        state.act(PlayerAction::Check).unwrap();
        assert_eq!(state.phase(), HandPhase::Showdown);

        for winner in [Some(0), Some(1), None] {
            let [a, b] = state.payoffs(winner);
            assert_eq!(a + b, 0.0);
        }
        assert_eq!(state.payoffs(Some(0)), [1750.0, -1750.0]);
        assert_eq!(state.payoffs(None), [0.0, 0.0]);
    }

    #[test]
    fn test_tie_splits_pot() {
        let mut state = fresh();
        state.act(PlayerAction::Call).unwrap();
        for _ in 0..7 {
            state.act(PlayerAction::Check).unwrap();
        }
        assert_eq!(state.phase(), HandPhase::Showdown);
        assert_eq!(state.award_pot(None).unwrap(), [500, 500]);
        assert_eq!(state.seat(0).stack, 5000);
        assert_eq!(state.seat(1).stack, 5000);
    }

    #[test]
    fn test_award_before_end_rejected() {
        let mut state = fresh();
        assert!(state.award_pot(Some(0)).is_err());
        assert_eq!(state.pot(), 750);
    }

    #[test]
    fn test_snapshot() {
        let state = fresh();
        let snap = state.snapshot(&[]);
        assert_eq!(snap.pot, 750);
        assert_eq!(snap.bets, [250, 500]);
        assert_eq!(snap.stacks, [4750, 4500]);
        assert_eq!(snap.to_act, Some(0));
        assert!(snap.legal.allows(&PlayerAction::Call));
        assert!(!snap.legal.allows(&PlayerAction::Check));
        assert!(snap.legal.allows(&PlayerAction::Raise(4750)));
        assert!(!snap.legal.allows(&PlayerAction::Raise(4751)));
    }
}
