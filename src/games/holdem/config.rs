//! Table configuration for heads-up hold'em, loaded from JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::cfr::config::ConfigError;

/// Largest per-street raise cap. Four streets of `cap + 2` actions plus
/// three street separators must fit in an action history.
pub const MAX_RAISES_PER_STREET: u8 = 8;

/// Stacks, blinds and the solver's abstract raise size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoldemConfig {
    /// Chips each player starts a hand with.
    pub starting_stack: u32,
    /// Small blind.
    pub small_blind: u32,
    /// Big blind, also the minimum raise.
    pub big_blind: u32,
    /// Chips the solver's single raise action adds on top of a call.
    pub raise_increment: u32,
    /// Raises the solver allows per street.
    pub max_raises_per_street: u8,
}

impl Default for HoldemConfig {
    fn default() -> Self {
        Self {
            starting_stack: 5000,
            small_blind: 250,
            big_blind: 500,
            raise_increment: 500,
            max_raises_per_street: 2,
        }
    }
}

impl HoldemConfig {
    /// Create the default table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A shallow table with one raise per street. Keeps the game tree small
    /// enough for quick training runs.
    pub fn small() -> Self {
        Self {
            starting_stack: 1000,
            small_blind: 50,
            big_blind: 100,
            raise_increment: 200,
            max_raises_per_street: 1,
        }
    }

    /// Set the starting stack.
    pub fn with_stack(mut self, stack: u32) -> Self {
        self.starting_stack = stack;
        self
    }

    /// Set the blinds.
    pub fn with_blinds(mut self, small: u32, big: u32) -> Self {
        self.small_blind = small;
        self.big_blind = big;
        self
    }

    /// Set the abstract raise increment.
    pub fn with_raise_increment(mut self, increment: u32) -> Self {
        self.raise_increment = increment;
        self
    }

    /// Set the per-street raise cap.
    pub fn with_max_raises(mut self, max_raises: u8) -> Self {
        self.max_raises_per_street = max_raises;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.small_blind == 0 || self.big_blind == 0 || self.small_blind > self.big_blind {
            return Err(ConfigError::InvalidBlinds {
                small: self.small_blind,
                big: self.big_blind,
            });
        }
        if self.starting_stack == 0 {
            return Err(ConfigError::InvalidStack);
        }
        if self.raise_increment == 0 {
            return Err(ConfigError::InvalidRaiseIncrement);
        }
        if self.max_raises_per_street > MAX_RAISES_PER_STREET {
            return Err(ConfigError::TooManyRaises {
                requested: self.max_raises_per_street,
                max: MAX_RAISES_PER_STREET,
            });
        }
        Ok(())
    }

    /// Parse and validate a configuration from a JSON string. Missing fields
    /// take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }
}
