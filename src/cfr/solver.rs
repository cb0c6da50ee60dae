//! Chance-sampled Counterfactual Regret Minimization solver.
//!
//! Each iteration samples one chance outcome at the root (for poker: every
//! private and public card of the hand), then walks the whole betting tree
//! below it. At every decision node:
//!
//! 1. the current strategy comes from regret matching and is added to the
//!    strategy sum weighted by the actor's own reach;
//! 2. each action is explored with the actor's reach scaled by its
//!    probability, and child utilities are converted to the actor's point of
//!    view;
//! 3. regrets grow by `(action utility - node utility) * opponent reach`.
//!
//! Iterations are independent apart from the shared [`InfoSetStore`], so
//! they run on a rayon pool. Each iteration owns its RNG, seeded from the
//! configured seed and its index, so a seeded single-threaded run is fully
//! reproducible.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::cfr::config::{CFRConfig, CFRStats};
use crate::cfr::game::Game;
use crate::cfr::storage::{InfoSetStore, StrategySnapshot, StrategyTable};
use crate::error::Result;

/// Mixes the iteration index into the base seed.
const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// The main CFR solver.
///
/// # Example
/// ```
/// use holdem_cfr::cfr::{CFRConfig, CFRSolver};
/// use holdem_cfr::games::kuhn::KuhnPoker;
///
/// let config = CFRConfig::default().with_seed(1).with_threads(1);
/// let mut solver = CFRSolver::new(KuhnPoker::new(), config);
/// solver.train(100);
/// assert_eq!(solver.num_info_sets(), 12);
/// ```
pub struct CFRSolver<G: Game> {
    /// The game being solved.
    game: G,

    /// Configuration for the solver.
    config: CFRConfig,

    /// Regrets and strategy sums.
    store: InfoSetStore<G::InfoState>,

    /// Completed iterations.
    iteration: u64,

    /// Statistics tracking.
    stats: CFRStats,

    /// Sum of root utilities for player 0.
    utility_sum: f64,

    /// Seed every per-iteration RNG is derived from.
    base_seed: u64,
}

impl<G: Game> CFRSolver<G> {
    /// Create a new CFR solver for the given game.
    pub fn new(game: G, config: CFRConfig) -> Self {
        let base_seed = match config.seed {
            Some(seed) => seed,
            None => StdRng::from_entropy().gen(),
        };

        Self {
            game,
            config,
            store: InfoSetStore::new(),
            iteration: 0,
            stats: CFRStats::new(),
            utility_sum: 0.0,
            base_seed,
        }
    }

    /// Run one iteration on the calling thread.
    ///
    /// Returns the sampled root utility for player 0.
    pub fn run_iteration(&mut self) -> f64 {
        self.iteration += 1;
        let utility = self.iterate(self.iteration);
        self.utility_sum += utility;
        utility
    }

    /// Train the solver for a specified number of iterations.
    pub fn train(&mut self, iterations: u64) -> &CFRStats {
        self.train_inner(iterations, None)
    }

    /// Train, stopping early once `cancel` is set.
    ///
    /// The flag is checked before each root iteration; an iteration that has
    /// started always runs to completion.
    pub fn train_with_cancel(&mut self, iterations: u64, cancel: &AtomicBool) -> &CFRStats {
        self.train_inner(iterations, Some(cancel))
    }

    fn train_inner(&mut self, iterations: u64, cancel: Option<&AtomicBool>) -> &CFRStats {
        let start_time = Instant::now();
        info!(
            "training {} iterations ({} threads)",
            iterations,
            self.thread_label()
        );

        let pool = self.build_pool();
        let done = self.run_batch(iterations, cancel, start_time, pool.as_ref());
        self.finish(start_time, done < iterations);

        info!(
            "finished at iteration {} in {:.2}s: {} info sets, game value {:.4}",
            self.stats.iterations,
            self.stats.elapsed_seconds,
            self.stats.info_sets,
            self.stats.average_game_value
        );
        &self.stats
    }

    /// Train with a callback for progress tracking.
    ///
    /// Every `callback_interval` iterations the convergence indicator is
    /// measured against the previous report and the callback receives the
    /// updated statistics.
    pub fn train_with_callback<F>(
        &mut self,
        iterations: u64,
        callback_interval: u64,
        mut callback: F,
    ) -> &CFRStats
    where
        F: FnMut(&CFRStats),
    {
        let start_time = Instant::now();
        let interval = callback_interval.max(1);
        let mut snapshot: StrategySnapshot<G::InfoState> = self.store.snapshot();
        let mut remaining = iterations;
        let mut cancelled = false;
        let pool = self.build_pool();

        info!(
            "training {} iterations ({} threads), reporting every {}",
            iterations,
            self.thread_label(),
            interval
        );

        while remaining > 0 && !cancelled {
            let chunk = remaining.min(interval);
            let done = self.run_batch(chunk, None, start_time, pool.as_ref());
            remaining -= chunk;
            cancelled = done < chunk;

            let indicator = self.store.convergence_indicator(&snapshot);
            snapshot = self.store.snapshot();
            self.stats.record_convergence(self.iteration, indicator);
            self.finish(start_time, cancelled);

            debug!(
                "iteration {}: {} info sets, game value {:.4}, indicator {:.3}",
                self.iteration, self.stats.info_sets, self.stats.average_game_value, indicator
            );
            callback(&self.stats);
        }

        &self.stats
    }

    /// Dedicated pool for an explicit thread count, built once per training
    /// call. `None` means the global pool (or no pool when sequential).
    fn build_pool(&self) -> Option<ThreadPool> {
        if self.config.is_sequential() {
            return None;
        }
        let threads = self.config.num_threads?;
        match ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => Some(pool),
            Err(err) => {
                warn!("could not build a {}-thread pool ({}), using the global pool", threads, err);
                None
            }
        }
    }

    /// Run up to `count` iterations; returns how many completed.
    fn run_batch(
        &mut self,
        count: u64,
        cancel: Option<&AtomicBool>,
        start: Instant,
        pool: Option<&ThreadPool>,
    ) -> u64 {
        if self.config.is_sequential() {
            let mut done = 0;
            while done < count && !self.should_stop(cancel, start) {
                self.run_iteration();
                done += 1;
            }
            return done;
        }

        let first = self.iteration + 1;
        let (done, utility) = match pool {
            Some(pool) => pool.install(|| self.par_iterations(first, count, cancel, start)),
            None => self.par_iterations(first, count, cancel, start),
        };

        self.iteration += done;
        self.utility_sum += utility;
        done
    }

    fn par_iterations(
        &self,
        first: u64,
        count: u64,
        cancel: Option<&AtomicBool>,
        start: Instant,
    ) -> (u64, f64) {
        (first..first + count)
            .into_par_iter()
            .filter_map(|t| {
                if self.should_stop(cancel, start) {
                    None
                } else {
                    Some(self.iterate(t))
                }
            })
            .fold(|| (0u64, 0.0f64), |(n, sum), u| (n + 1, sum + u))
            .reduce(|| (0, 0.0), |a, b| (a.0 + b.0, a.1 + b.1))
    }

    fn should_stop(&self, cancel: Option<&AtomicBool>, start: Instant) -> bool {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return true;
        }
        match self.config.time_budget_secs {
            Some(budget) => start.elapsed().as_secs_f64() >= budget,
            None => false,
        }
    }

    fn finish(&mut self, start_time: Instant, cancelled: bool) {
        self.stats.iterations = self.iteration;
        self.stats.info_sets = self.store.num_info_sets();
        self.stats.elapsed_seconds = start_time.elapsed().as_secs_f64();
        self.stats.cancelled = cancelled;
        self.stats.average_game_value = if self.iteration > 0 {
            self.utility_sum / self.iteration as f64
        } else {
            0.0
        };
        self.stats.update_rate();
    }

    fn thread_label(&self) -> String {
        match self.config.num_threads {
            Some(n) => n.to_string(),
            None => format!("{} (auto)", rayon::current_num_threads()),
        }
    }

    /// One root traversal for iteration `t`; root utility for player 0.
    fn iterate(&self, t: u64) -> f64 {
        let mut rng = StdRng::seed_from_u64(self.base_seed ^ t.wrapping_mul(SEED_MIX));
        let root = self.game.initial_state();
        let utility = self.cfr(&root, [1.0, 1.0], t, &mut rng);

        if self.game.perspective(&root) == 0 {
            utility
        } else {
            -utility
        }
    }

    /// Recursive CFR. Returns the utility of `state` for
    /// `self.game.perspective(state)`.
    fn cfr(&self, state: &G::State, reach: [f64; 2], t: u64, rng: &mut StdRng) -> f64 {
        if self.game.is_terminal(state) {
            return self.game.get_payoff(state, self.game.perspective(state));
        }

        if self.game.is_chance(state) {
            let next = self.game.sample_chance(state, rng);
            let utility = self.cfr(&next, reach, t, rng);
            return self.convert(&next, self.game.perspective(state), utility);
        }

        let player = match self.game.current_player(state) {
            Some(p) => p,
            None => return self.game.get_payoff(state, self.game.perspective(state)),
        };
        debug_assert_eq!(self.game.perspective(state), player);

        let actions = self.game.available_actions(state);
        let info_state = self.game.info_state(state);

        let weight = if self.config.use_linear_cfr {
            reach[player] * t as f64
        } else {
            reach[player]
        };
        let strategy = self.store.get_strategy(&info_state, &actions, weight);

        let mut action_utils = vec![0.0; actions.len()];
        let mut node_util = 0.0;
        for (i, action) in actions.iter().enumerate() {
            let child = self.game.apply_action(state, action);
            let mut child_reach = reach;
            child_reach[player] *= strategy[i];

            let utility = self.cfr(&child, child_reach, t, rng);
            action_utils[i] = self.convert(&child, player, utility);
            node_util += strategy[i] * action_utils[i];
        }

        let opponent_reach = reach[1 - player];
        let deltas: Vec<f64> = action_utils
            .iter()
            .map(|&u| (u - node_util) * opponent_reach)
            .collect();
        self.store
            .accumulate_regrets(&info_state, &deltas, self.config.use_cfr_plus);

        node_util
    }

    /// Re-express a child's utility from `player`'s point of view.
    #[inline]
    fn convert(&self, child: &G::State, player: usize, utility: f64) -> f64 {
        if self.game.perspective(child) == player {
            utility
        } else {
            -utility
        }
    }

    /// Expected value for `player` when both sides follow the average
    /// strategies, starting from a state whose chance outcome is resolved.
    ///
    /// Information sets never seen in training are played uniformly.
    pub fn expected_value(&self, state: &G::State, player: usize) -> f64 {
        if self.game.is_terminal(state) {
            return self.game.get_payoff(state, player);
        }
        debug_assert!(!self.game.is_chance(state), "expected_value needs a dealt state");

        let actions = self.game.available_actions(state);
        let info_state = self.game.info_state(state);
        let strategy = self
            .store
            .get_average_strategy(&info_state)
            .unwrap_or_else(|_| vec![1.0 / actions.len() as f64; actions.len()]);

        actions
            .iter()
            .zip(&strategy)
            .map(|(action, &p)| p * self.expected_value(&self.game.apply_action(state, action), player))
            .sum()
    }

    /// Get the average strategy for an information set.
    pub fn get_average_strategy(&self, info_state: &G::InfoState) -> Result<Vec<f64>> {
        self.store.get_average_strategy(info_state)
    }

    /// Get the current regret-matching strategy for an information set.
    pub fn get_current_strategy(&self, info_state: &G::InfoState) -> Result<Vec<f64>> {
        self.store.current_strategy(info_state)
    }

    /// Export every average strategy as a string-keyed table.
    pub fn strategy_table(&self) -> StrategyTable {
        self.store.export()
    }

    /// Get the current iteration count.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Get the number of information sets discovered.
    pub fn num_info_sets(&self) -> usize {
        self.store.num_info_sets()
    }

    /// Get current statistics.
    pub fn stats(&self) -> &CFRStats {
        &self.stats
    }

    /// Get reference to the store for analysis.
    pub fn store(&self) -> &InfoSetStore<G::InfoState> {
        &self.store
    }

    /// Get reference to the game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &CFRConfig {
        &self.config
    }

    /// Reset the solver to its initial state.
    pub fn reset(&mut self) {
        self.store.clear();
        self.iteration = 0;
        self.utility_sum = 0.0;
        self.stats = CFRStats::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::game::{Action, GameState, InfoState};

    /// Matching pennies with a sequential move: player 1 does not see the
    /// first coin, so the equilibrium is 50/50 for both.
    #[derive(Debug, Clone)]
    struct Pennies;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    enum Coin {
        Heads,
        Tails,
    }

    impl Action for Coin {
        fn token(&self) -> u8 {
            match self {
                Coin::Heads => b'h',
                Coin::Tails => b't',
            }
        }
    }

    #[derive(Debug, Clone)]
    struct PenniesState(Vec<Coin>);

    impl GameState for PenniesState {}

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Seat(usize);

    impl InfoState for Seat {
        fn key(&self) -> String {
            format!("P{}", self.0)
        }
    }

    impl Game for Pennies {
        type State = PenniesState;
        type Action = Coin;
        type InfoState = Seat;

        fn initial_state(&self) -> PenniesState {
            PenniesState(Vec::new())
        }

        fn is_terminal(&self, state: &PenniesState) -> bool {
            state.0.len() == 2
        }

        fn get_payoff(&self, state: &PenniesState, player: usize) -> f64 {
            let p0 = if state.0[0] == state.0[1] { 1.0 } else { -1.0 };
            if player == 0 {
                p0
            } else {
                -p0
            }
        }

        fn current_player(&self, state: &PenniesState) -> Option<usize> {
            (state.0.len() < 2).then_some(state.0.len())
        }

        fn available_actions(&self, _state: &PenniesState) -> Vec<Coin> {
            vec![Coin::Heads, Coin::Tails]
        }

        fn apply_action(&self, state: &PenniesState, action: &Coin) -> PenniesState {
            let mut next = state.0.clone();
            next.push(action.clone());
            PenniesState(next)
        }

        fn info_state(&self, state: &PenniesState) -> Seat {
            Seat(state.0.len())
        }
    }

    #[test]
    fn test_pennies_converges_to_uniform() {
        let config = CFRConfig::default().with_seed(5).with_threads(1);
        let mut solver = CFRSolver::new(Pennies, config);
        solver.train(5_000);

        assert_eq!(solver.num_info_sets(), 2);
        for seat in [Seat(0), Seat(1)] {
            let avg = solver.get_average_strategy(&seat).unwrap();
            assert!((avg[0] - 0.5).abs() < 0.05, "{:?}: {:?}", seat, avg);
        }
        let value = solver.expected_value(&PenniesState(Vec::new()), 0);
        assert!(value.abs() < 0.05);
    }

    #[test]
    fn test_seeded_sequential_runs_are_identical() {
        let run = || {
            let config = CFRConfig::default().with_seed(9).with_threads(1);
            let mut solver = CFRSolver::new(Pennies, config);
            solver.train(200);
            solver.strategy_table()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_parallel_training_counts_iterations() {
        let config = CFRConfig::default().with_seed(2).with_threads(4);
        let mut solver = CFRSolver::new(Pennies, config);
        let stats = solver.train(1_000);
        assert_eq!(stats.iterations, 1_000);
        assert!(!stats.cancelled);

        let table = solver.strategy_table();
        for (_, entry) in table.iter() {
            assert!((entry.strategy.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_cancel_before_start_runs_nothing() {
        let cancel = AtomicBool::new(true);
        for threads in [1, 2] {
            let config = CFRConfig::default().with_seed(1).with_threads(threads);
            let mut solver = CFRSolver::new(Pennies, config);
            let stats = solver.train_with_cancel(100, &cancel);
            assert_eq!(stats.iterations, 0);
            assert!(stats.cancelled);
        }
    }

    #[test]
    fn test_callback_reports_progress() {
        let config = CFRConfig::default().with_seed(4).with_threads(1);
        let mut solver = CFRSolver::new(Pennies, config);
        let mut seen = Vec::new();
        solver.train_with_callback(1_000, 250, |stats| seen.push(stats.iterations));

        assert_eq!(seen, vec![250, 500, 750, 1_000]);
        assert_eq!(solver.stats().convergence_history.len(), 4);
    }

    #[test]
    fn test_parallel_callback_runs_every_chunk() {
        let config = CFRConfig::default().with_seed(6).with_threads(2);
        let mut solver = CFRSolver::new(Pennies, config);
        let mut seen = Vec::new();
        let stats = solver.train_with_callback(400, 50, |stats| seen.push(stats.iterations));

        assert_eq!(stats.iterations, 400);
        assert_eq!(seen, (1..=8).map(|i| i * 50).collect::<Vec<u64>>());
    }

    #[test]
    fn test_current_strategy_is_a_distribution() {
        let config = CFRConfig::default().with_seed(3).with_threads(1);
        let mut solver = CFRSolver::new(Pennies, config);
        assert!(solver.get_current_strategy(&Seat(0)).is_err());

        solver.train(100);
        let current = solver.get_current_strategy(&Seat(0)).unwrap();
        assert_eq!(current.len(), 2);
        assert!((current.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(current.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn test_reset_clears_store() {
        let config = CFRConfig::default().with_seed(4).with_threads(1);
        let mut solver = CFRSolver::new(Pennies, config);
        solver.train(10);
        solver.reset();
        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.num_info_sets(), 0);
    }
}
