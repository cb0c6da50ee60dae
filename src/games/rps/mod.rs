//! Rock-paper-scissors by sampled regret matching.
//!
//! A single simultaneous move has no tree to walk, so this trainer skips the
//! [`Game`](crate::cfr::Game) machinery and runs regret matching directly:
//! each round both learners draw a throw from their current strategy, then
//! every throw's regret grows by how much better it would have done against
//! the opponent's actual throw. The average strategy of self-play approaches
//! the uniform equilibrium; against a fixed opponent it approaches a best
//! response.
//!
//! ```
//! use holdem_cfr::games::rps::RpsTrainer;
//!
//! let mut trainer = RpsTrainer::new(Some(3));
//! trainer.train(20_000);
//! let avg = trainer.average_strategy(0);
//! assert!(avg.iter().all(|&p| (p - 1.0 / 3.0).abs() < 0.1));
//! ```

use log::{debug, info};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cfr::storage::{normalize, regret_matching, StrategyEntry, StrategyTable};

/// Number of throws.
pub const NUM_THROWS: usize = 3;

/// A rock-paper-scissors throw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Throw {
    /// Beats scissors.
    Rock,
    /// Beats rock.
    Paper,
    /// Beats paper.
    Scissors,
}

impl Throw {
    /// All throws, in strategy order.
    pub const ALL: [Throw; NUM_THROWS] = [Throw::Rock, Throw::Paper, Throw::Scissors];

    /// Position in a strategy vector.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Token used in exported tables.
    pub fn token(&self) -> &'static str {
        match self {
            Throw::Rock => "r",
            Throw::Paper => "p",
            Throw::Scissors => "s",
        }
    }

    /// Payoff of `self` against `other`: 1 win, 0 draw, -1 loss.
    pub fn payoff(&self, other: Throw) -> f64 {
        match (self.index() + NUM_THROWS - other.index()) % NUM_THROWS {
            0 => 0.0,
            1 => 1.0,
            _ => -1.0,
        }
    }
}

impl fmt::Display for Throw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Throw::Rock => write!(f, "Rock"),
            Throw::Paper => write!(f, "Paper"),
            Throw::Scissors => write!(f, "Scissors"),
        }
    }
}

/// Expected payoff of each throw against a mixed strategy.
pub fn throw_values(opponent: &[f64; NUM_THROWS]) -> [f64; NUM_THROWS] {
    Throw::ALL.map(|mine| {
        Throw::ALL
            .iter()
            .map(|theirs| opponent[theirs.index()] * mine.payoff(*theirs))
            .sum()
    })
}

/// The pure throw with the highest expected payoff against `opponent`.
pub fn best_response(opponent: &[f64; NUM_THROWS]) -> Throw {
    let values = throw_values(opponent);
    let mut best = Throw::Rock;
    for throw in Throw::ALL {
        if values[throw.index()] > values[best.index()] {
            best = throw;
        }
    }
    best
}

/// How much a best response gains against `strategy`. Zero only at the
/// uniform equilibrium.
pub fn exploitability(strategy: &[f64; NUM_THROWS]) -> f64 {
    throw_values(strategy).into_iter().fold(f64::MIN, f64::max)
}

/// Regret and strategy sums for one player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegretLearner {
    regret_sum: [f64; NUM_THROWS],
    strategy_sum: [f64; NUM_THROWS],
}

impl RegretLearner {
    /// Current strategy by regret matching.
    pub fn strategy(&self) -> [f64; NUM_THROWS] {
        to_array(&regret_matching(&self.regret_sum))
    }

    /// Average of every strategy played so far.
    pub fn average_strategy(&self) -> [f64; NUM_THROWS] {
        to_array(&normalize(&self.strategy_sum))
    }

    /// Accumulated regrets.
    pub fn regrets(&self) -> &[f64; NUM_THROWS] {
        &self.regret_sum
    }

    /// Record one round: `strategy` was played, `mine` was drawn from it and
    /// the opponent threw `theirs`.
    pub fn observe(&mut self, strategy: &[f64; NUM_THROWS], mine: Throw, theirs: Throw) {
        let realized = mine.payoff(theirs);
        for throw in Throw::ALL {
            let i = throw.index();
            self.strategy_sum[i] += strategy[i];
            self.regret_sum[i] += throw.payoff(theirs) - realized;
        }
    }
}

fn to_array(v: &[f64]) -> [f64; NUM_THROWS] {
    let mut out = [0.0; NUM_THROWS];
    out.copy_from_slice(v);
    out
}

fn draw<R: Rng>(strategy: &[f64; NUM_THROWS], rng: &mut R) -> Throw {
    match WeightedIndex::new(strategy) {
        Ok(dist) => Throw::ALL[dist.sample(rng)],
        Err(_) => Throw::ALL[rng.gen_range(0..NUM_THROWS)],
    }
}

/// Two regret-matching learners playing rock-paper-scissors.
#[derive(Debug, Clone)]
pub struct RpsTrainer {
    learners: [RegretLearner; 2],
    iterations: u64,
    rng: StdRng,
}

impl RpsTrainer {
    /// New trainer; `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            learners: [RegretLearner::default(), RegretLearner::default()],
            iterations: 0,
            rng,
        }
    }

    /// Rounds played so far.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// A player's learner.
    pub fn learner(&self, player: usize) -> &RegretLearner {
        &self.learners[player]
    }

    /// A player's average strategy.
    pub fn average_strategy(&self, player: usize) -> [f64; NUM_THROWS] {
        self.learners[player].average_strategy()
    }

    /// Self-play: both players learn from each other.
    pub fn train(&mut self, iterations: u64) {
        for _ in 0..iterations {
            let strategies = [self.learners[0].strategy(), self.learners[1].strategy()];
            let throws = [
                draw(&strategies[0], &mut self.rng),
                draw(&strategies[1], &mut self.rng),
            ];
            self.learners[0].observe(&strategies[0], throws[0], throws[1]);
            self.learners[1].observe(&strategies[1], throws[1], throws[0]);
            self.iterations += 1;
        }
        info!(
            "rps self-play: {} rounds, averages {:?} / {:?}",
            self.iterations,
            self.average_strategy(0),
            self.average_strategy(1)
        );
    }

    /// Player 0 learns against a fixed mixed opponent; player 1 is untouched.
    pub fn train_against(&mut self, opponent: &[f64; NUM_THROWS], iterations: u64) {
        for _ in 0..iterations {
            let strategy = self.learners[0].strategy();
            let mine = draw(&strategy, &mut self.rng);
            let theirs = draw(opponent, &mut self.rng);
            self.learners[0].observe(&strategy, mine, theirs);
            self.iterations += 1;
        }
        debug!(
            "rps vs {:?}: {} rounds, average {:?}",
            opponent,
            self.iterations,
            self.average_strategy(0)
        );
    }

    /// Both average strategies as a table keyed `P0` and `P1`.
    pub fn strategy_table(&self) -> StrategyTable {
        let mut table = StrategyTable::new();
        for (player, learner) in self.learners.iter().enumerate() {
            table.insert(
                format!("P{}", player),
                StrategyEntry {
                    actions: Throw::ALL.iter().map(|t| t.token().to_string()).collect(),
                    strategy: learner.average_strategy().to_vec(),
                },
            );
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payoffs() {
        assert_eq!(Throw::Paper.payoff(Throw::Rock), 1.0);
        assert_eq!(Throw::Rock.payoff(Throw::Scissors), 1.0);
        assert_eq!(Throw::Scissors.payoff(Throw::Paper), 1.0);
        assert_eq!(Throw::Rock.payoff(Throw::Paper), -1.0);
        for t in Throw::ALL {
            assert_eq!(t.payoff(t), 0.0);
        }
    }

    #[test]
    fn test_best_response_and_exploitability() {
        let uniform = [1.0 / 3.0; 3];
        assert!(exploitability(&uniform).abs() < 1e-12);

        let rock_heavy = [0.5, 0.25, 0.25];
        assert_eq!(best_response(&rock_heavy), Throw::Paper);
        assert!((exploitability(&rock_heavy) - 0.25).abs() < 1e-12);
        assert_eq!(best_response(&[0.2, 0.6, 0.2]), Throw::Scissors);
    }

    #[test]
    fn test_observe_accumulates_regret() {
        let mut learner = RegretLearner::default();
        let uniform = learner.strategy();
        assert_eq!(uniform, [1.0 / 3.0; 3]);

        // Threw rock into paper: paper would have drawn, scissors would have won.
        learner.observe(&uniform, Throw::Rock, Throw::Paper);
        assert_eq!(learner.regrets(), &[0.0, 1.0, 2.0]);
        let s = learner.strategy();
        assert!((s[1] - 1.0 / 3.0).abs() < 1e-12);
        assert!((s[2] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_self_play_approaches_uniform() {
        let mut trainer = RpsTrainer::new(Some(11));
        trainer.train(100);
        assert_eq!(trainer.iterations(), 100);

        trainer.train(99_900);
        assert_eq!(trainer.iterations(), 100_000);
        for player in 0..2 {
            let avg = trainer.average_strategy(player);
            assert!((avg.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            for p in avg {
                assert!((p - 1.0 / 3.0).abs() < 0.05, "player {}: {:?}", player, avg);
            }
        }
        let late = exploitability(&trainer.average_strategy(0));
        assert!(late < 0.05, "exploitability {}", late);
    }

    #[test]
    fn test_learns_best_response_to_fixed_opponent() {
        let opponent = [0.5, 0.25, 0.25];
        let mut trainer = RpsTrainer::new(Some(5));
        trainer.train_against(&opponent, 20_000);

        let avg = trainer.average_strategy(0);
        assert!(avg[Throw::Paper.index()] > 0.9, "{:?}", avg);
        assert_eq!(trainer.learner(1), &RegretLearner::default());
    }

    #[test]
    fn test_strategy_table_export() {
        let mut trainer = RpsTrainer::new(Some(1));
        trainer.train(1_000);
        let table = trainer.strategy_table();
        assert_eq!(table.len(), 2);
        let p0 = table.get("P0").unwrap();
        assert_eq!(p0.actions, vec!["r", "p", "s"]);
        assert!((p0.probability("r") - trainer.average_strategy(0)[0]).abs() < 1e-12);
    }
}
