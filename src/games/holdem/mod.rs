//! Heads-up Texas hold'em.
//!
//! ## Modules
//!
//! - `card`: Card, hole cards, board, street and deck
//! - `hand_eval`: Showdown hand evaluation
//! - `action`: Concrete betting actions for live play
//! - `betting`: Betting state machine shared by training and live play
//! - `config`: Stacks, blinds and the raise abstraction
//! - `info_state`: Information state for CFR
//! - `game`: Three-token training game
//! - `dealer`: Live hands and matches
//! - `policy`: Bot decisions from a trained strategy table

pub mod action;
pub mod betting;
pub mod card;
pub mod config;
pub mod dealer;
pub mod game;
pub mod hand_eval;
pub mod info_state;
pub mod policy;

// Re-export commonly used types
pub use action::PlayerAction;
pub use betting::{BettingState, HandPhase, LegalActions, RaiseBounds, Seat, TableSnapshot};
pub use card::{parse_cards, Board, Card, Deck, HoleCards, Street};
pub use config::HoldemConfig;
pub use dealer::{HandResult, HeadsUpMatch, LiveHand};
pub use game::{HeadsUpHoldem, HoldemAction, HoldemState};
pub use hand_eval::{HandCategory, HandEvaluator, HandValue, ShowdownOutcome, TieBreak};
pub use info_state::HoldemInfoState;
pub use policy::{choose_weighted, BotStyle, TrainedPolicy};
