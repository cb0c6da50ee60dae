//! Concrete betting actions for live play.
//!
//! These carry real chip amounts, unlike the three-token abstraction the
//! solver trains over (see [`super::game::HoldemAction`]).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PokerError;

/// A betting action submitted by a player or bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Give up the hand.
    Fold,
    /// Pass when nothing is owed.
    Check,
    /// Match the opponent's bet.
    Call,
    /// Put `amount` more chips in, exceeding the amount owed.
    Raise(u32),
    /// Put the whole stack in.
    AllIn,
}

impl PlayerAction {
    /// Check if this action puts in more than the amount owed.
    pub fn is_aggressive(&self) -> bool {
        matches!(self, PlayerAction::Raise(_) | PlayerAction::AllIn)
    }

    /// Resolve `AllIn` against a stack: a raise of the whole stack when it
    /// exceeds the amount owed, otherwise a call.
    pub fn resolve_all_in(self, stack: u32, to_call: u32) -> Self {
        match self {
            PlayerAction::AllIn if stack > to_call => PlayerAction::Raise(stack),
            PlayerAction::AllIn => PlayerAction::Call,
            other => other,
        }
    }

    /// Solver token this action maps to: fold and check are both `p`.
    pub fn token(&self) -> u8 {
        match self {
            PlayerAction::Fold | PlayerAction::Check => b'p',
            PlayerAction::Call => b'c',
            PlayerAction::Raise(_) | PlayerAction::AllIn => b'b',
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::Fold => write!(f, "fold"),
            PlayerAction::Check => write!(f, "check"),
            PlayerAction::Call => write!(f, "call"),
            PlayerAction::Raise(amt) => write!(f, "raise {}", amt),
            PlayerAction::AllIn => write!(f, "allin"),
        }
    }
}

impl FromStr for PlayerAction {
    type Err = PokerError;

    /// Parse `fold`, `check`, `call`, `allin` or `raise <amount>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let verb = parts.next().unwrap_or("").to_ascii_lowercase();
        let action = match verb.as_str() {
            "fold" => PlayerAction::Fold,
            "check" => PlayerAction::Check,
            "call" => PlayerAction::Call,
            "allin" | "all-in" => PlayerAction::AllIn,
            "raise" => {
                let amount = parts
                    .next()
                    .and_then(|a| a.parse::<u32>().ok())
                    .ok_or_else(|| PokerError::invalid_action(s, "raise needs a whole-chip amount"))?;
                PlayerAction::Raise(amount)
            }
            _ => return Err(PokerError::invalid_action(s, "unknown action")),
        };
        if parts.next().is_some() {
            return Err(PokerError::invalid_action(s, "unexpected trailing input"));
        }
        Ok(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        assert_eq!("fold".parse::<PlayerAction>(), Ok(PlayerAction::Fold));
        assert_eq!("Check".parse::<PlayerAction>(), Ok(PlayerAction::Check));
        assert_eq!("raise 750".parse::<PlayerAction>(), Ok(PlayerAction::Raise(750)));
        assert_eq!("all-in".parse::<PlayerAction>(), Ok(PlayerAction::AllIn));

        assert!(matches!(
            "raise".parse::<PlayerAction>(),
            Err(PokerError::InvalidAction { .. })
        ));
        assert!("raise -5".parse::<PlayerAction>().is_err());
        assert!("call 10".parse::<PlayerAction>().is_err());
        assert!("bet".parse::<PlayerAction>().is_err());
    }

    #[test]
    fn test_resolve_all_in() {
        assert_eq!(PlayerAction::AllIn.resolve_all_in(900, 250), PlayerAction::Raise(900));
        assert_eq!(PlayerAction::AllIn.resolve_all_in(200, 250), PlayerAction::Call);
        assert_eq!(PlayerAction::Check.resolve_all_in(200, 0), PlayerAction::Check);
    }

    #[test]
    fn test_tokens() {
        assert_eq!(PlayerAction::Fold.token(), b'p');
        assert_eq!(PlayerAction::Check.token(), b'p');
        assert_eq!(PlayerAction::Call.token(), b'c');
        assert_eq!(PlayerAction::Raise(10).token(), b'b');
        assert_eq!(PlayerAction::AllIn.token(), b'b');
        assert_eq!(PlayerAction::Raise(10).to_string(), "raise 10");
    }
}
