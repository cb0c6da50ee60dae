//! Bot decisions from a trained strategy table.
//!
//! The table holds a distribution over the solver's three tokens. A bot needs
//! concrete actions, so `p` is split between fold and check, `c` is a call
//! and `b` is spread over raises of one, two and four big blinds on top of
//! the call, plus an all-in. Information sets the table does not contain
//! fall back to a fixed playing style.

use log::warn;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::action::PlayerAction;
use super::dealer::LiveHand;
use super::game::HoldemAction;
use crate::cfr::game::Action;
use crate::cfr::storage::StrategyTable;
use crate::error::{PokerError, Result};

/// Number of concrete candidates a bot samples from.
pub const NUM_CANDIDATES: usize = 7;

/// Default number of draws before giving up on the sampled distribution.
pub const DEFAULT_MAX_RETRIES: usize = 32;

/// Sample from weighted candidates until one passes `is_valid`.
///
/// Gives up after `max_retries` draws, or immediately if the weights cannot
/// form a distribution, and returns `fallback` instead.
pub fn choose_weighted<T, R, F>(
    candidates: &[(T, f64)],
    rng: &mut R,
    mut is_valid: F,
    max_retries: usize,
    fallback: T,
) -> T
where
    T: Clone,
    R: Rng + ?Sized,
    F: FnMut(&T) -> bool,
{
    let dist = match WeightedIndex::new(candidates.iter().map(|(_, w)| *w)) {
        Ok(dist) => dist,
        Err(e) => {
            warn!("cannot sample candidates ({}), using fallback", e);
            return fallback;
        }
    };

    for _ in 0..max_retries {
        let (candidate, _) = &candidates[dist.sample(rng)];
        if is_valid(candidate) {
            return candidate.clone();
        }
    }
    warn!("no valid candidate after {} draws, using fallback", max_retries);
    fallback
}

/// Hand-authored distributions over the seven candidates
/// `[fold, check, call, raise 1bb, raise 2bb, raise 4bb, all-in]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BotStyle {
    /// Balanced default.
    Optimal,
    /// Plays many hands and raises often.
    #[default]
    LooseAggressive,
    /// Plays few hands and raises often.
    TightAggressive,
    /// Plays few hands and mostly calls.
    TightPassive,
    /// Plays many hands and mostly calls.
    LoosePassive,
}

impl BotStyle {
    /// Candidate weights for this style.
    pub fn weights(&self) -> [f64; NUM_CANDIDATES] {
        match self {
            BotStyle::Optimal => [0.2, 0.3, 0.2, 0.14, 0.1, 0.05, 0.01],
            BotStyle::LooseAggressive => [0.2, 0.2, 0.2, 0.15, 0.1, 0.1, 0.05],
            BotStyle::TightAggressive => [0.05, 0.2, 0.1, 0.25, 0.2, 0.15, 0.05],
            BotStyle::TightPassive => [0.1, 0.25, 0.4, 0.1, 0.05, 0.05, 0.05],
            BotStyle::LoosePassive => [0.1, 0.3, 0.4, 0.1, 0.05, 0.03, 0.02],
        }
    }
}

/// A bot that plays the trained average strategy.
#[derive(Debug, Clone)]
pub struct TrainedPolicy {
    table: StrategyTable,
    big_blind: u32,
    max_retries: usize,
    style: BotStyle,
}

impl TrainedPolicy {
    /// Create a policy over a strategy table.
    pub fn new(table: StrategyTable, big_blind: u32) -> Self {
        Self {
            table,
            big_blind,
            max_retries: DEFAULT_MAX_RETRIES,
            style: BotStyle::default(),
        }
    }

    /// Style used for information sets missing from the table.
    pub fn with_style(mut self, style: BotStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the retry bound for sampling.
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Get the strategy table.
    pub fn table(&self) -> &StrategyTable {
        &self.table
    }

    /// Candidate weights for an information-set key.
    pub fn weights(&self, key: Option<&str>) -> [f64; NUM_CANDIDATES] {
        let Some(entry) = key.and_then(|k| self.table.get(k).ok()) else {
            if let Some(key) = key {
                warn!("no trained strategy for {}, playing {:?}", key, self.style);
            }
            return self.style.weights();
        };

        let mut trained = [0.0; 3];
        for action in HoldemAction::ALL {
            trained[action.index()] = entry.probability(&action.name());
        }
        let [pass, call, raise] = trained;
        [
            pass * 0.7,
            pass * 0.3,
            call,
            raise * 0.5,
            raise * 0.3,
            raise * 0.15,
            raise * 0.05,
        ]
    }

    /// Choose a legal action for the player to act.
    pub fn choose<R: Rng + ?Sized>(&self, hand: &LiveHand, rng: &mut R) -> Result<PlayerAction> {
        let seat = hand
            .to_act()
            .ok_or_else(|| PokerError::invalid_action("choose", "hand is over"))?;
        let betting = hand.betting();
        let to_call = betting.to_call(seat);
        let bb = self.big_blind;

        let actions = [
            PlayerAction::Fold,
            PlayerAction::Check,
            PlayerAction::Call,
            PlayerAction::Raise(to_call + bb),
            PlayerAction::Raise(to_call + 2 * bb),
            PlayerAction::Raise(to_call + 4 * bb),
            PlayerAction::AllIn,
        ];
        let weights = self.weights(hand.info_key(seat).as_deref());
        let candidates: Vec<(PlayerAction, f64)> = actions.into_iter().zip(weights).collect();

        let fallback = if betting.legal_actions().check {
            PlayerAction::Check
        } else {
            PlayerAction::Fold
        };
        let chosen = choose_weighted(
            &candidates,
            rng,
            |a| betting.validate(*a).is_ok(),
            self.max_retries,
            fallback,
        );
        betting.validate(chosen)
    }
}
