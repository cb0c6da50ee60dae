//! Compact action history used inside information-set keys.
//!
//! A history is a short run of one-byte action tokens with an optional
//! street separator. It is stored inline in a fixed array so that cloning a
//! game state or hashing an information state never allocates.

use std::fmt;

/// Maximum number of tokens (including separators) a history can hold.
pub const HISTORY_CAPACITY: usize = 48;

/// Token written between betting rounds.
pub const STREET_SEPARATOR: u8 = b'/';

/// Fixed-capacity sequence of action tokens from the root of a hand.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionHistory {
    tokens: [u8; HISTORY_CAPACITY],
    len: u8,
}

impl ActionHistory {
    /// Empty history.
    pub const fn new() -> Self {
        Self {
            tokens: [0; HISTORY_CAPACITY],
            len: 0,
        }
    }

    /// Build a history from a token string such as `"pb"` or `"cp/b"`.
    ///
    /// # Panics
    /// Panics if the string is longer than [`HISTORY_CAPACITY`].
    pub fn from_tokens(s: &str) -> Self {
        let mut history = Self::new();
        for byte in s.bytes() {
            history.push(byte);
        }
        history
    }

    /// Append a token.
    ///
    /// # Panics
    /// Exceeding the capacity means the game produced an unbounded betting
    /// sequence; this is a defect in the caller.
    #[inline]
    pub fn push(&mut self, token: u8) {
        let len = self.len as usize;
        assert!(len < HISTORY_CAPACITY, "action history overflow: {}", self);
        self.tokens[len] = token;
        self.len += 1;
    }

    /// Mark the end of a betting round.
    #[inline]
    pub fn end_street(&mut self) {
        self.push(STREET_SEPARATOR);
    }

    /// Return a copy with `token` appended.
    #[inline]
    pub fn with(mut self, token: u8) -> Self {
        self.push(token);
        self
    }

    /// All tokens, separators included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.tokens[..self.len as usize]
    }

    /// Tokens of the current betting round only.
    pub fn current_street(&self) -> &[u8] {
        let bytes = self.as_bytes();
        match bytes.iter().rposition(|&b| b == STREET_SEPARATOR) {
            Some(pos) => &bytes[pos + 1..],
            None => bytes,
        }
    }

    /// Number of stored tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// True if no action has been taken.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// True if no further token fits.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == HISTORY_CAPACITY
    }

    /// Most recent token, if any.
    pub fn last(&self) -> Option<u8> {
        self.as_bytes().last().copied()
    }

    /// True if the history ends with the given token string.
    pub fn ends_with(&self, suffix: &str) -> bool {
        self.as_bytes().ends_with(suffix.as_bytes())
    }
}

impl Default for ActionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.as_bytes() {
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}

impl fmt::Debug for ActionHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionHistory({:?})", self.to_string())
    }
}
