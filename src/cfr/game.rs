//! Game trait definition for the CFR solver.
//!
//! Any two-player zero-sum game that implements the `Game` trait can be solved
//! with [`CFRSolver`](crate::cfr::CFRSolver). The solver only sees states,
//! abstract actions and information states; card dealing and betting rules
//! stay inside the game.

use std::fmt::Debug;
use std::hash::Hash;

/// Trait for actions that can be taken in a game.
///
/// Every action has a one-byte token used to build the compact
/// [`ActionHistory`](crate::cfr::ActionHistory) and a display name written
/// into exported strategy tables.
pub trait Action: Clone + Eq + Hash + Debug + Send + Sync {
    /// Single-byte history token (e.g. `b'p'`).
    fn token(&self) -> u8;

    /// Name used in exported strategy tables.
    fn name(&self) -> String {
        char::from(self.token()).to_string()
    }
}

/// Trait for information states (what a player knows at a decision point).
///
/// Two game states that look identical to the acting player (same private
/// cards, same public cards, same action history) must produce equal
/// information states. The solver hashes the value directly; `key` is only
/// rendered when a table is exported.
pub trait InfoState: Clone + Eq + Hash + Debug + Send + Sync {
    /// Canonical string key for this information state.
    fn key(&self) -> String;
}

/// Trait for game states.
///
/// A game state contains all information about the current state of the game,
/// including private information that players may not see.
pub trait GameState: Clone + Debug + Send + Sync {}

/// The main Game trait.
///
/// # Example
/// ```ignore
/// struct MyGame;
///
/// impl Game for MyGame {
///     type State = MyGameState;
///     type Action = MyAction;
///     type InfoState = MyInfoState;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game: Clone + Send + Sync {
    /// The type representing a complete game state.
    type State: GameState;

    /// The type representing an action a player can take.
    type Action: Action;

    /// The type representing what a player knows at a decision point.
    type InfoState: InfoState;

    /// Create the initial (undealt) game state.
    fn initial_state(&self) -> Self::State;

    /// Check if the given state is terminal.
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Net payoff for `player` at a terminal state.
    ///
    /// Payoffs are zero-sum: `get_payoff(s, 0) == -get_payoff(s, 1)`.
    fn get_payoff(&self, state: &Self::State, player: usize) -> f64;

    /// Index of the player to act, `None` at terminal and chance nodes.
    fn current_player(&self, state: &Self::State) -> Option<usize>;

    /// Player whose point of view the solver uses for the value of `state`.
    ///
    /// At decision nodes this must be the acting player. Terminal and chance
    /// nodes may use any fixed convention; the solver converts between
    /// perspectives by negation.
    fn perspective(&self, state: &Self::State) -> usize {
        self.current_player(state).unwrap_or(0)
    }

    /// Legal abstract actions at the current state, in a fixed order.
    ///
    /// The order is part of the strategy table contract: the same information
    /// state must always yield the same list.
    fn available_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Apply an action to a state and return the resulting new state.
    ///
    /// The input state is never modified. Passing an action that
    /// `available_actions` did not return is a programming error.
    fn apply_action(&self, state: &Self::State, action: &Self::Action) -> Self::State;

    /// Information state of the player to act.
    fn info_state(&self, state: &Self::State) -> Self::InfoState;

    /// Check if the current state is a chance node.
    fn is_chance(&self, _state: &Self::State) -> bool {
        false
    }

    /// Sample an outcome from a chance node.
    fn sample_chance<R: rand::Rng>(&self, state: &Self::State, _rng: &mut R) -> Self::State {
        state.clone()
    }
}

