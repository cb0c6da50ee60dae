//! Error types shared by the card model, the betting state machine and the
//! strategy store.

use thiserror::Error;

/// Errors produced by poker operations.
///
/// The CFR recursion itself never returns these: a malformed history during
/// training is a programming error and fails fast with a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PokerError {
    /// The requested action is not legal in the current betting state.
    /// The state is left untouched.
    #[error("invalid action {action}: {reason}")]
    InvalidAction {
        /// Display form of the rejected action.
        action: String,
        /// Why the action was rejected.
        reason: String,
    },

    /// More cards were requested than remain in the deck.
    #[error("requested {requested} cards but only {remaining} remain")]
    InsufficientCards {
        /// Number of cards requested.
        requested: usize,
        /// Number of cards left in the deck.
        remaining: usize,
    },

    /// No information set with this key was ever created.
    #[error("unknown information set key: {0}")]
    UnknownInformationSetKey(String),

    /// A card token could not be parsed.
    #[error("malformed card token: {0:?}")]
    MalformedCardToken(String),
}

impl PokerError {
    pub(crate) fn invalid_action(action: impl ToString, reason: impl Into<String>) -> Self {
        PokerError::InvalidAction {
            action: action.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PokerError>;
