//! Configuration options for the CFR solver.
//!
//! This module provides the solver configuration, its validation errors and
//! the statistics reported after training.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the CFR solver.
///
/// The default is vanilla chance-sampled CFR: negative regrets are kept and
/// every iteration contributes to the average strategy with the same weight.
///
/// # Example
/// ```
/// use holdem_cfr::cfr::CFRConfig;
///
/// let config = CFRConfig::default().with_seed(7).with_threads(1);
/// assert!(!config.use_cfr_plus);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CFRConfig {
    /// Floor accumulated regrets at zero after every update (CFR+).
    pub use_cfr_plus: bool,

    /// Weight strategy sums by the iteration number (Linear CFR).
    pub use_linear_cfr: bool,

    /// Number of worker threads.
    ///
    /// `Some(1)` runs the deterministic sequential path. `None` uses the
    /// global rayon pool.
    pub num_threads: Option<usize>,

    /// Random seed for reproducibility.
    ///
    /// If set, every iteration draws its cards from an RNG derived from this
    /// seed and the iteration index.
    pub seed: Option<u64>,

    /// Stop training once this many seconds have elapsed.
    ///
    /// Checked between root iterations only.
    pub time_budget_secs: Option<f64>,

    /// Iterations between progress reports when training with a callback.
    pub report_interval: u64,
}

impl Default for CFRConfig {
    fn default() -> Self {
        Self {
            use_cfr_plus: false,
            use_linear_cfr: false,
            num_threads: None,
            seed: None,
            time_budget_secs: None,
            report_interval: 1_000,
        }
    }
}

impl CFRConfig {
    /// Create a new CFRConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// CFR+ with linear averaging, usually the fastest to converge.
    pub fn fast() -> Self {
        Self {
            use_cfr_plus: true,
            use_linear_cfr: true,
            ..Default::default()
        }
    }

    /// Builder method: set whether to use CFR+.
    pub fn with_cfr_plus(mut self, enable: bool) -> Self {
        self.use_cfr_plus = enable;
        self
    }

    /// Builder method: set whether to use Linear CFR.
    pub fn with_linear_cfr(mut self, enable: bool) -> Self {
        self.use_linear_cfr = enable;
        self
    }

    /// Builder method: set number of threads.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = Some(threads);
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder method: set a wall-clock budget in seconds.
    pub fn with_time_budget(mut self, seconds: f64) -> Self {
        self.time_budget_secs = Some(seconds);
        self
    }

    /// Builder method: set the progress report interval.
    pub fn with_report_interval(mut self, interval: u64) -> Self {
        self.report_interval = interval;
        self
    }

    /// True when training should run on the calling thread.
    pub fn is_sequential(&self) -> bool {
        self.num_threads == Some(1)
    }

    /// Validate the configuration and return any errors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_threads == Some(0) {
            return Err(ConfigError::InvalidThreads(0));
        }

        if let Some(budget) = self.time_budget_secs {
            if !(budget > 0.0) {
                return Err(ConfigError::InvalidTimeBudget(budget));
            }
        }

        if self.report_interval == 0 {
            return Err(ConfigError::InvalidReportInterval);
        }

        Ok(())
    }
}

/// Errors that can occur when validating or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Thread count must be at least one.
    #[error("thread count {0} is invalid, expected at least 1")]
    InvalidThreads(usize),

    /// Time budget must be positive.
    #[error("time budget {0}s must be positive")]
    InvalidTimeBudget(f64),

    /// Report interval must be positive.
    #[error("report interval must be positive")]
    InvalidReportInterval,

    /// Blinds must be positive with the small blind not above the big blind.
    #[error("invalid blinds: small {small}, big {big}")]
    InvalidBlinds {
        /// Small blind.
        small: u32,
        /// Big blind.
        big: u32,
    },

    /// Starting stacks must be positive.
    #[error("starting stack must be positive")]
    InvalidStack,

    /// The abstract raise size must be positive.
    #[error("raise increment must be positive")]
    InvalidRaiseIncrement,

    /// The per-street raise cap would overflow the action history.
    #[error("at most {max} raises per street are supported, got {requested}")]
    TooManyRaises {
        /// Requested cap.
        requested: u8,
        /// Largest supported cap.
        max: u8,
    },

    /// JSON could not be parsed.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Statistics tracked during CFR training.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CFRStats {
    /// Total number of iterations completed.
    pub iterations: u64,

    /// Number of unique information sets discovered.
    pub info_sets: usize,

    /// Total time spent training (in seconds).
    pub elapsed_seconds: f64,

    /// Iterations per second.
    pub iterations_per_second: f64,

    /// Mean root utility for player 0 over all iterations so far.
    pub average_game_value: f64,

    /// Whether the last training call stopped early.
    pub cancelled: bool,

    /// History of convergence indicator measurements.
    pub convergence_history: Vec<ConvergencePoint>,
}

/// A single convergence indicator measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergencePoint {
    /// Iteration number when this measurement was taken.
    pub iteration: u64,
    /// Mean L1 change of the average strategies since the previous report, times 100.
    pub indicator: f64,
}

impl CFRStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update iterations per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = self.iterations as f64 / self.elapsed_seconds;
        }
    }

    /// Record a convergence indicator measurement.
    pub fn record_convergence(&mut self, iteration: u64, indicator: f64) {
        self.convergence_history.push(ConvergencePoint {
            iteration,
            indicator,
        });
    }

    /// Most recent convergence indicator, if any was recorded.
    pub fn last_indicator(&self) -> Option<f64> {
        self.convergence_history.last().map(|p| p.indicator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_vanilla() {
        let config = CFRConfig::default();
        assert!(!config.use_cfr_plus);
        assert!(!config.use_linear_cfr);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(matches!(
            CFRConfig::default().with_threads(0).validate(),
            Err(ConfigError::InvalidThreads(0))
        ));
        assert!(matches!(
            CFRConfig::default().with_time_budget(-1.0).validate(),
            Err(ConfigError::InvalidTimeBudget(_))
        ));
        assert!(matches!(
            CFRConfig::default().with_report_interval(0).validate(),
            Err(ConfigError::InvalidReportInterval)
        ));
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = CFRConfig::fast().with_seed(3);
        let json = serde_json::to_string(&config).unwrap();
        let back: CFRConfig = serde_json::from_str(&json).unwrap();
        assert!(back.use_cfr_plus);
        assert_eq!(back.seed, Some(3));
    }
}
