//! Kuhn Poker implementation for CFR validation.
//!
//! Kuhn Poker is a simplified poker game used to validate CFR implementations
//! because it has a known, mathematically proven Nash equilibrium.
//!
//! ## Game Rules
//!
//! - 3 cards: Jack, Queen, King
//! - 2 players, each antes 1 chip
//! - Each player receives 1 card
//! - Player 0 acts first: Pass or Bet (1 chip)
//! - Higher card wins at showdown
//!
//! ## Game Tree
//!
//! ```text
//! P0
//! ├── p
//! │   └── P1
//! │       ├── p → showdown, ±1
//! │       └── b
//! │           └── P0
//! │               ├── p → P1 wins 1
//! │               └── b → showdown, ±2
//! └── b
//!     └── P1
//!         ├── p → P0 wins 1
//!         └── b → showdown, ±2
//! ```
//!
//! ## Known Nash Equilibrium
//!
//! - **Player 0 with Jack**: Bet with probability α ∈ [0, 1/3]
//! - **Player 0 with Queen**: Always Pass, call a bet with probability α + 1/3
//! - **Player 0 with King**: Bet with probability 3α
//! - **Player 1 facing Bet with Jack**: Always Fold
//! - **Player 1 facing Bet with Queen**: Call with probability 1/3
//! - **Player 1 facing Bet with King**: Always Call
//!
//! **Expected Value**: Player 0 EV = -1/18 ≈ -0.0556
//!
//! Information-set keys are the card letter followed by the history, e.g.
//! `"J"`, `"Qpb"`, `"Kb"`.

use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

use crate::cfr::game::{Action, Game, GameState, InfoState};
use crate::cfr::history::ActionHistory;

/// Card letters, indexed by card value.
const CARD_NAMES: [char; 3] = ['J', 'Q', 'K'];

/// Actions in Kuhn Poker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KuhnAction {
    /// Pass (check if no bet, fold if facing bet)
    Pass,
    /// Bet (or call if facing bet)
    Bet,
}

impl Action for KuhnAction {
    fn token(&self) -> u8 {
        match self {
            KuhnAction::Pass => b'p',
            KuhnAction::Bet => b'b',
        }
    }
}

impl fmt::Display for KuhnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KuhnAction::Pass => write!(f, "Pass"),
            KuhnAction::Bet => write!(f, "Bet"),
        }
    }
}

/// Information state in Kuhn Poker: own card and the public history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KuhnInfoState {
    /// Player's card (0=Jack, 1=Queen, 2=King)
    pub card: u8,
    /// Actions taken so far.
    pub history: ActionHistory,
}

impl KuhnInfoState {
    /// Info state for a card letter and a history string, e.g. `("K", "b")`.
    pub fn parse(card: char, history: &str) -> Option<Self> {
        let card = CARD_NAMES.iter().position(|&c| c == card)? as u8;
        Some(Self {
            card,
            history: ActionHistory::from_tokens(history),
        })
    }
}

impl InfoState for KuhnInfoState {
    fn key(&self) -> String {
        format!("{}{}", CARD_NAMES[self.card as usize], self.history)
    }
}

impl fmt::Display for KuhnInfoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Complete game state in Kuhn Poker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KuhnState {
    /// Cards dealt to each player (0=Jack, 1=Queen, 2=King)
    pub cards: [u8; 2],
    /// Actions taken so far
    pub history: ActionHistory,
    /// Whether cards have been dealt (for chance node handling)
    pub dealt: bool,
}

impl KuhnState {
    /// A dealt state with the given cards and history string.
    pub fn dealt(cards: [u8; 2], history: &str) -> Self {
        Self {
            cards,
            history: ActionHistory::from_tokens(history),
            dealt: true,
        }
    }

    /// Player about to act (or who would act next) by history length.
    fn mover(&self) -> usize {
        self.history.len() % 2
    }
}

impl GameState for KuhnState {}

impl Default for KuhnState {
    fn default() -> Self {
        Self {
            cards: [0, 0],
            history: ActionHistory::new(),
            dealt: false,
        }
    }
}

impl fmt::Display for KuhnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "P0:{} P1:{} History:{}",
            CARD_NAMES[self.cards[0] as usize], CARD_NAMES[self.cards[1] as usize], self.history
        )
    }
}

/// Kuhn Poker game.
#[derive(Debug, Clone, Default)]
pub struct KuhnPoker;

impl KuhnPoker {
    /// Create a new Kuhn Poker game.
    pub fn new() -> Self {
        Self
    }

    /// All six equally likely deals.
    pub fn deals() -> Vec<KuhnState> {
        let mut deals = Vec::with_capacity(6);
        for a in 0..3u8 {
            for b in 0..3u8 {
                if a != b {
                    deals.push(KuhnState::dealt([a, b], ""));
                }
            }
        }
        deals
    }

    /// Payoff for the player about to act at a terminal history.
    ///
    /// "pp": higher card wins 1. "bp"/"pbp": the bettor (who is next to act
    /// in turn order) wins 1. Any history ending "bb": higher card wins 2.
    fn mover_payoff(state: &KuhnState) -> f64 {
        let mover = state.mover();
        let mover_wins = state.cards[mover] > state.cards[1 - mover];
        let h = &state.history;

        if h.ends_with("bp") {
            1.0
        } else if h.ends_with("bb") {
            if mover_wins {
                2.0
            } else {
                -2.0
            }
        } else if mover_wins {
            1.0
        } else {
            -1.0
        }
    }
}

impl Game for KuhnPoker {
    type State = KuhnState;
    type Action = KuhnAction;
    type InfoState = KuhnInfoState;

    fn initial_state(&self) -> Self::State {
        KuhnState::default()
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        let h = &state.history;
        h.len() > 1 && (h.ends_with("pp") || h.ends_with("bp") || h.ends_with("bb"))
    }

    fn get_payoff(&self, state: &Self::State, player: usize) -> f64 {
        debug_assert!(self.is_terminal(state), "get_payoff called on non-terminal state");

        let payoff = Self::mover_payoff(state);
        if player == state.mover() {
            payoff
        } else {
            -payoff
        }
    }

    fn current_player(&self, state: &Self::State) -> Option<usize> {
        if self.is_terminal(state) || self.is_chance(state) {
            return None;
        }
        Some(state.mover())
    }

    fn perspective(&self, state: &Self::State) -> usize {
        state.mover()
    }

    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.is_terminal(state) || self.is_chance(state) {
            return vec![];
        }
        vec![KuhnAction::Pass, KuhnAction::Bet]
    }

    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State {
        let mut new_state = *state;
        new_state.history.push(action.token());
        new_state
    }

    fn info_state(&self, state: &Self::State) -> Self::InfoState {
        KuhnInfoState {
            card: state.cards[state.mover()],
            history: state.history,
        }
    }

    fn is_chance(&self, state: &Self::State) -> bool {
        !state.dealt
    }

    fn sample_chance<R: Rng>(&self, state: &Self::State, rng: &mut R) -> Self::State {
        debug_assert!(self.is_chance(state), "sample_chance called on non-chance state");

        let mut cards = [0u8, 1, 2];
        cards.shuffle(rng);
        KuhnState::dealt([cards[0], cards[1]], "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::{CFRConfig, CFRSolver};

    #[test]
    fn test_kuhn_game_tree() {
        let game = KuhnPoker::new();

        let state = game.initial_state();
        assert!(!state.dealt);
        assert!(game.is_chance(&state));

        let dealt_state = KuhnState::dealt([2, 0], "");
        assert!(!game.is_chance(&dealt_state));
        assert!(!game.is_terminal(&dealt_state));
        assert_eq!(game.current_player(&dealt_state), Some(0));

        let actions = game.available_actions(&dealt_state);
        assert_eq!(actions, vec![KuhnAction::Pass, KuhnAction::Bet]);

        let pb = game.apply_action(&game.apply_action(&dealt_state, &KuhnAction::Pass), &KuhnAction::Bet);
        assert_eq!(pb.history.to_string(), "pb");
        assert_eq!(pb.to_string(), "P0:K P1:J History:pb");
        assert_eq!(KuhnAction::Bet.to_string(), "Bet");
        assert_eq!(game.current_player(&pb), Some(0));
        assert!(!game.is_terminal(&pb));
    }

    #[test]
    fn test_kuhn_terminal_payoffs() {
        let game = KuhnPoker::new();

        let cases = [
            // K vs J
            ([2, 0], "pp", 1.0),
            ([2, 0], "bp", 1.0),
            ([2, 0], "bb", 2.0),
            ([2, 0], "pbp", -1.0),
            ([2, 0], "pbb", 2.0),
            // J vs K
            ([0, 2], "pp", -1.0),
            ([0, 2], "bp", 1.0),
            ([0, 2], "bb", -2.0),
            ([0, 2], "pbp", -1.0),
            ([0, 2], "pbb", -2.0),
        ];

        for (cards, history, p0_payoff) in cases {
            let state = KuhnState::dealt(cards, history);
            assert!(game.is_terminal(&state), "{} should be terminal", history);
            assert_eq!(game.get_payoff(&state, 0), p0_payoff, "{:?} {}", cards, history);
            assert_eq!(game.get_payoff(&state, 1), -p0_payoff, "{:?} {}", cards, history);
        }
    }

    #[test]
    fn test_kuhn_info_states() {
        let game = KuhnPoker::new();

        let state = KuhnState::dealt([1, 2], "p");
        assert_eq!(game.current_player(&state), Some(1));

        let info = game.info_state(&state);
        assert_eq!(info.card, 2);
        assert_eq!(info.key(), "Kp");
        assert_eq!(KuhnInfoState::parse('K', "p"), Some(info));

        let root = game.info_state(&KuhnState::dealt([0, 1], ""));
        assert_eq!(root.key(), "J");
    }

    #[test]
    fn test_kuhn_deals() {
        let deals = KuhnPoker::deals();
        assert_eq!(deals.len(), 6);
        assert!(deals.iter().all(|d| d.cards[0] != d.cards[1] && d.dealt));
    }

    fn strategy(solver: &CFRSolver<KuhnPoker>, card: char, history: &str) -> Vec<f64> {
        let info = KuhnInfoState::parse(card, history).unwrap();
        solver.get_average_strategy(&info).unwrap()
    }

    #[test]
    fn test_kuhn_cfr_convergence() {
        let game = KuhnPoker::new();
        let config = CFRConfig::default().with_seed(42).with_threads(1);
        let mut solver = CFRSolver::new(game, config);

        solver.train(20_000);

        // 3 cards × 4 decision histories ("", "p", "b", "pb")
        assert_eq!(solver.num_info_sets(), 12);

        let table = solver.strategy_table();
        for (key, entry) in table.iter() {
            let sum: f64 = entry.strategy.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "{} sums to {}", key, sum);
            assert!(entry.strategy.iter().all(|&p| p >= 0.0));
            assert_eq!(entry.actions, vec!["p", "b"]);
        }

        // Index 0 = Pass, index 1 = Bet
        let jack_root = strategy(&solver, 'J', "");
        assert!(
            jack_root[1] <= 1.0 / 3.0 + 0.05,
            "Jack bet probability {} should be at most 1/3",
            jack_root[1]
        );

        let jack_pb = strategy(&solver, 'J', "pb");
        assert!(jack_pb[1] <= 0.05, "Jack should fold to a bet after passing, calls {}", jack_pb[1]);

        let jack_b = strategy(&solver, 'J', "b");
        assert!(jack_b[1] <= 0.05, "Jack should fold to a bet, calls {}", jack_b[1]);

        let king_b = strategy(&solver, 'K', "b");
        assert!(king_b[1] >= 0.95, "King should call a bet, calls {}", king_b[1]);

        let queen_b = strategy(&solver, 'Q', "b");
        assert!(
            (queen_b[1] - 1.0 / 3.0).abs() < 0.15,
            "Queen call probability {} should be near 1/3",
            queen_b[1]
        );

        let value: f64 = KuhnPoker::deals()
            .iter()
            .map(|deal| solver.expected_value(deal, 0))
            .sum::<f64>()
            / 6.0;
        assert!(
            (value + 1.0 / 18.0).abs() < 0.02,
            "game value {} should be near -1/18",
            value
        );
    }

    #[test]
    fn test_kuhn_parallel_training() {
        let config = CFRConfig::default().with_seed(7).with_threads(4);
        let mut solver = CFRSolver::new(KuhnPoker::new(), config);
        let stats = solver.train(20_000).clone();

        assert_eq!(stats.iterations, 20_000);
        assert_eq!(solver.num_info_sets(), 12);
        let king_b = strategy(&solver, 'K', "b");
        assert!(king_b[1] >= 0.95);
        assert!(stats.average_game_value.abs() < 0.5);
    }
}
