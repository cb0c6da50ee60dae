//! Live play on top of the betting machine.
//!
//! [`LiveHand`] runs one hand with concrete chip amounts for an external
//! actor (a person or a [`TrainedPolicy`](super::policy::TrainedPolicy)),
//! recording the same token history the solver trains on so trained
//! strategies can be looked up by key. [`HeadsUpMatch`] carries stacks from
//! hand to hand and swaps the blinds after each one.

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::action::PlayerAction;
use super::betting::{BettingState, HandPhase, TableSnapshot};
use super::card::{Board, Deck, HoleCards};
use super::config::HoldemConfig;
use super::hand_eval::{HandCategory, HandEvaluator};
use super::info_state::HoldemInfoState;
use crate::cfr::game::InfoState;
use crate::cfr::history::{ActionHistory, STREET_SEPARATOR};
use crate::error::{PokerError, Result};

/// Hand-result notification sent once a hand ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandResult {
    /// Winning seat, `None` on a split pot.
    pub winner: Option<usize>,
    /// Winning category at showdown, `None` when the hand was folded out.
    pub category: Option<HandCategory>,
    /// Chips each seat received from the pot.
    pub payouts: [u32; 2],
    /// Stacks after the payout.
    pub stacks: [u32; 2],
}

/// One hand in progress.
#[derive(Debug, Clone)]
pub struct LiveHand {
    betting: BettingState,
    board: Board,
    history: ActionHistory,
    off_tree: bool,
    evaluator: HandEvaluator,
}

impl LiveHand {
    /// Post blinds and deal from a freshly shuffled deck.
    pub fn new<R: Rng>(
        config: &HoldemConfig,
        stacks: [u32; 2],
        sb_seat: usize,
        rng: &mut R,
    ) -> Result<Self> {
        let mut deck = Deck::shuffled(rng);
        let holes = [deck.deal_hole()?, deck.deal_hole()?];
        let board = Board::from_cards(&deck.deal_n(5)?);
        Ok(Self::with_cards(config, stacks, sb_seat, holes, board))
    }

    /// Post blinds with known cards.
    pub fn with_cards(
        config: &HoldemConfig,
        stacks: [u32; 2],
        sb_seat: usize,
        holes: [HoleCards; 2],
        board: Board,
    ) -> Self {
        let mut betting = BettingState::new(stacks, sb_seat, config.small_blind, config.big_blind);
        betting.deal_hole(0, holes[0]);
        betting.deal_hole(1, holes[1]);
        Self {
            betting,
            board,
            history: ActionHistory::new(),
            off_tree: false,
            evaluator: HandEvaluator::new(),
        }
    }

    /// The underlying betting state.
    pub fn betting(&self) -> &BettingState {
        &self.betting
    }

    /// Seat to act, `None` once betting is over.
    pub fn to_act(&self) -> Option<usize> {
        self.betting.current_player()
    }

    /// A seat's hole cards.
    pub fn hole(&self, seat: usize) -> Option<HoleCards> {
        self.betting.seat(seat).hole
    }

    /// Board cards revealed so far.
    pub fn visible_board(&self) -> Board {
        match self.betting.street() {
            Some(street) => self.board.prefix(street.num_board_cards()),
            None => self.board,
        }
    }

    /// Token history of the hand so far.
    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    /// Request snapshot for the player to act.
    pub fn snapshot(&self) -> TableSnapshot {
        self.betting.snapshot(self.visible_board().cards())
    }

    /// Validate and apply an action. On error nothing changes and the actor
    /// should be asked again.
    pub fn apply(&mut self, action: PlayerAction) -> Result<()> {
        let seat = self
            .to_act()
            .ok_or_else(|| PokerError::invalid_action(action, "hand is over"))?;
        let street = self.betting.street();
        let action = self.betting.validate(action)?;
        self.betting.act(action)?;
        debug!("seat {} {} -> {}", seat, action, self.betting);

        self.record(action.token());
        let next_street = self.betting.street();
        if next_street.is_some() && next_street != street {
            self.record(STREET_SEPARATOR);
        }
        Ok(())
    }

    fn record(&mut self, token: u8) {
        if self.history.is_full() {
            self.off_tree = true;
        } else {
            self.history.push(token);
        }
    }

    /// Information-set key for `seat`, in the solver's key format.
    ///
    /// `None` if the history outgrew what a trained table can contain.
    pub fn info_key(&self, seat: usize) -> Option<String> {
        if self.off_tree {
            return None;
        }
        let hole = self.hole(seat)?;
        Some(HoldemInfoState::new(hole, self.visible_board(), self.history).key())
    }

    /// Whether betting is over.
    pub fn is_finished(&self) -> bool {
        self.betting.is_terminal()
    }

    /// Settle a finished hand: decide the winner and pay out the pot.
    pub fn finish(&mut self) -> Result<HandResult> {
        let (winner, category) = match self.betting.phase() {
            HandPhase::FoldedOut { winner } => (Some(winner), None),
            HandPhase::Showdown => {
                let holes = [
                    self.hole(0).ok_or_else(|| PokerError::invalid_action("showdown", "seat 0 has no cards"))?,
                    self.hole(1).ok_or_else(|| PokerError::invalid_action("showdown", "seat 1 has no cards"))?,
                ];
                let outcome = self.evaluator.showdown(&holes, self.board.cards());
                (outcome.winner, Some(outcome.category))
            }
            HandPhase::Betting(_) => {
                return Err(PokerError::invalid_action("finish", "hand still in progress"));
            }
        };

        let payouts = self.betting.award_pot(winner)?;
        let stacks = [self.betting.seat(0).stack, self.betting.seat(1).stack];
        Ok(HandResult {
            winner,
            category,
            payouts,
            stacks,
        })
    }
}

/// A sequence of hands between two players until one runs out of chips.
#[derive(Debug, Clone)]
pub struct HeadsUpMatch {
    config: HoldemConfig,
    stacks: [u32; 2],
    sb_seat: usize,
    hands_played: u64,
}

impl HeadsUpMatch {
    /// Start a match with both players at the starting stack; seat 0 posts
    /// the first small blind.
    pub fn new(config: HoldemConfig) -> Self {
        let stack = config.starting_stack;
        Self {
            config,
            stacks: [stack, stack],
            sb_seat: 0,
            hands_played: 0,
        }
    }

    /// Current stacks.
    pub fn stacks(&self) -> [u32; 2] {
        self.stacks
    }

    /// Seat posting the next small blind.
    pub fn sb_seat(&self) -> usize {
        self.sb_seat
    }

    /// Hands completed.
    pub fn hands_played(&self) -> u64 {
        self.hands_played
    }

    /// The match ends when either player is out of chips.
    pub fn is_over(&self) -> bool {
        self.stacks.iter().any(|&s| s == 0)
    }

    /// Deal the next hand.
    pub fn next_hand<R: Rng>(&self, rng: &mut R) -> Result<LiveHand> {
        LiveHand::new(&self.config, self.stacks, self.sb_seat, rng)
    }

    /// Record a finished hand and swap the blinds.
    pub fn record(&mut self, result: &HandResult) {
        self.stacks = result.stacks;
        self.sb_seat = 1 - self.sb_seat;
        self.hands_played += 1;
        match result.winner {
            Some(w) => info!(
                "hand {}: seat {} wins {} ({}), stacks {:?}",
                self.hands_played,
                w,
                result.payouts[w],
                result.category.map_or("fold", |c| c.name()),
                self.stacks
            ),
            None => info!("hand {}: split pot, stacks {:?}", self.hands_played, self.stacks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::holdem::card::Street;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed_hand(sb_seat: usize) -> LiveHand {
        LiveHand::with_cards(
            &HoldemConfig::default(),
            [5000, 5000],
            sb_seat,
            [
                HoleCards::parse("A♠ A♦").unwrap(),
                HoleCards::parse("K♣ Q♣").unwrap(),
            ],
            Board::parse("2♥ 7♦ 9♣ J♠ 3♦").unwrap(),
        )
    }

    #[test]
    fn test_snapshot_and_keys() {
        let mut hand = fixed_hand(0);
        let snap = hand.snapshot();
        assert_eq!(snap.pot, 750);
        assert_eq!(snap.to_act, Some(0));
        assert!(snap.board.is_empty());
        assert_eq!(hand.info_key(0).unwrap(), "A♠A♦|");

        hand.apply(PlayerAction::Call).unwrap();
        hand.apply(PlayerAction::Check).unwrap();
        assert_eq!(hand.betting().street(), Some(Street::Flop));
        assert_eq!(hand.snapshot().board.len(), 3);
        assert_eq!(hand.info_key(1).unwrap(), "K♣Q♣2♥7♦9♣|cp/");
    }

    #[test]
    fn test_rejected_action_is_not_recorded() {
        let mut hand = fixed_hand(0);
        assert!(hand.apply(PlayerAction::Check).is_err());
        assert!(hand.history().is_empty());
        assert_eq!(hand.snapshot().pot, 750);
    }

    #[test]
    fn test_fold_result() {
        let mut hand = fixed_hand(1);
        assert_eq!(hand.to_act(), Some(1));
        hand.apply(PlayerAction::Fold).unwrap();
        assert!(hand.is_finished());

        let result = hand.finish().unwrap();
        assert_eq!(result.winner, Some(0));
        assert_eq!(result.category, None);
        assert_eq!(result.payouts, [750, 0]);
        assert_eq!(result.stacks, [5250, 4750]);
    }

    #[test]
    fn test_showdown_result() {
        let mut hand = fixed_hand(0);
        hand.apply(PlayerAction::AllIn).unwrap();
        hand.apply(PlayerAction::Call).unwrap();
        assert!(hand.is_finished());
        assert_eq!(hand.visible_board().len(), 5);

        let result = hand.finish().unwrap();
        assert_eq!(result.winner, Some(0));
        assert_eq!(result.category, Some(HandCategory::OnePair));
        assert_eq!(result.stacks, [10_000, 0]);
    }

    #[test]
    fn test_finish_before_end_rejected() {
        let mut hand = fixed_hand(0);
        assert!(hand.finish().is_err());
    }

    #[test]
    fn test_match_swaps_blinds_and_conserves_chips() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut game = HeadsUpMatch::new(HoldemConfig::small());
        for _ in 0..20 {
            if game.is_over() {
                break;
            }
            let sb = game.sb_seat();
            let mut hand = game.next_hand(&mut rng).unwrap();
            assert_eq!(hand.to_act(), Some(sb));
            // Small blind always shoves, big blind always calls.
            hand.apply(PlayerAction::AllIn).unwrap();
            if !hand.is_finished() {
                hand.apply(PlayerAction::Call).unwrap();
            }
            let result = hand.finish().unwrap();
            assert_eq!(result.stacks.iter().sum::<u32>(), 2000);
            game.record(&result);
            assert_eq!(game.sb_seat(), 1 - sb);
        }
        assert!(game.hands_played() > 0);
    }
}
