//! Storage for CFR regrets and strategies.
//!
//! The store maps information states to nodes holding cumulative regrets and
//! cumulative strategy weights. Nodes are created lazily on first visit and
//! never removed. The outer map sits behind a `RwLock` that is only taken for
//! writing when a new node is inserted; each node carries its own `Mutex`, so
//! updates to one information set never block work on another.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cfr::game::{Action, InfoState};
use crate::error::{PokerError, Result};

/// Regret matching: probabilities proportional to positive regrets.
///
/// Negative regrets are clipped to zero. If nothing positive remains the
/// result is uniform, so the output is always a probability simplex.
pub fn regret_matching(regrets: &[f64]) -> Vec<f64> {
    let n = regrets.len();
    let positive_sum: f64 = regrets.iter().map(|&r| r.max(0.0)).sum();

    if positive_sum > 0.0 {
        regrets.iter().map(|&r| r.max(0.0) / positive_sum).collect()
    } else {
        vec![1.0 / n as f64; n]
    }
}

/// Normalize strategy sums into an average strategy (uniform if all zero).
pub(crate) fn normalize(sums: &[f64]) -> Vec<f64> {
    let total: f64 = sums.iter().sum();
    if total > 0.0 {
        sums.iter().map(|&x| x / total).collect()
    } else {
        vec![1.0 / sums.len() as f64; sums.len()]
    }
}

/// Per information-set accumulators.
#[derive(Debug, Clone)]
struct Node {
    regret_sum: Vec<f64>,
    strategy_sum: Vec<f64>,
    actions: Vec<String>,
}

impl Node {
    fn new(actions: Vec<String>) -> Self {
        let n = actions.len();
        Self {
            regret_sum: vec![0.0; n],
            strategy_sum: vec![0.0; n],
            actions,
        }
    }
}

/// Thread-safe store of regrets and strategy sums, keyed by information state.
#[derive(Debug)]
pub struct InfoSetStore<K> {
    nodes: RwLock<FxHashMap<K, Mutex<Node>>>,
}

impl<K> Default for InfoSetStore<K>
where
    K: InfoState,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> InfoSetStore<K>
where
    K: InfoState,
{
    /// Create new empty storage.
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(FxHashMap::default()),
        }
    }

    /// Run `f` on the node for `key`, creating it from `actions` if needed.
    fn with_node<A, F, T>(&self, key: &K, actions: &[A], f: F) -> T
    where
        A: Action,
        F: FnOnce(&mut Node) -> T,
    {
        {
            let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(node) = nodes.get(key) {
                let mut node = node.lock().unwrap_or_else(PoisonError::into_inner);
                debug_assert_eq!(
                    node.actions.len(),
                    actions.len(),
                    "action count changed for info set {}",
                    key.key()
                );
                return f(&mut *node);
            }
        }

        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        let node = nodes
            .entry(key.clone())
            .or_insert_with(|| Mutex::new(Node::new(actions.iter().map(Action::name).collect())));
        let node = node.get_mut().unwrap_or_else(PoisonError::into_inner);
        f(node)
    }

    /// Current strategy for an information set by regret matching.
    ///
    /// Creates the node on first visit. The returned strategy is also added
    /// to the node's strategy sum, weighted by `reach_weight` (the acting
    /// player's own reach probability, times the iteration for Linear CFR).
    pub fn get_strategy<A: Action>(&self, key: &K, actions: &[A], reach_weight: f64) -> Vec<f64> {
        self.with_node(key, actions, |node| {
            let strategy = regret_matching(&node.regret_sum);
            for (sum, &p) in node.strategy_sum.iter_mut().zip(&strategy) {
                *sum += reach_weight * p;
            }
            strategy
        })
    }

    /// Add regret deltas to an existing information set.
    ///
    /// With `cfr_plus` the accumulated regrets are floored at zero.
    pub fn accumulate_regrets(&self, key: &K, deltas: &[f64], cfr_plus: bool) {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        let Some(node) = nodes.get(key) else {
            debug_assert!(false, "regret update for unvisited info set {}", key.key());
            return;
        };
        let mut node = node.lock().unwrap_or_else(PoisonError::into_inner);
        debug_assert_eq!(node.regret_sum.len(), deltas.len());

        for (r, &d) in node.regret_sum.iter_mut().zip(deltas) {
            *r += d;
            if cfr_plus && *r < 0.0 {
                *r = 0.0;
            }
        }
    }

    /// Current regret-matching strategy without touching any accumulator.
    pub fn current_strategy(&self, key: &K) -> Result<Vec<f64>> {
        self.read_node(key, |node| regret_matching(&node.regret_sum))
    }

    /// Average strategy for an information set.
    ///
    /// Returns a uniform strategy when the node exists but was never reached
    /// with positive weight, and `UnknownInformationSetKey` when it was never
    /// created.
    pub fn get_average_strategy(&self, key: &K) -> Result<Vec<f64>> {
        self.read_node(key, |node| normalize(&node.strategy_sum))
    }

    /// Cumulative regrets for an information set.
    pub fn regrets(&self, key: &K) -> Result<Vec<f64>> {
        self.read_node(key, |node| node.regret_sum.clone())
    }

    /// Action names stored for an information set.
    pub fn action_names(&self, key: &K) -> Result<Vec<String>> {
        self.read_node(key, |node| node.actions.clone())
    }

    fn read_node<T>(&self, key: &K, f: impl FnOnce(&Node) -> T) -> Result<T> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        let node = nodes
            .get(key)
            .ok_or_else(|| PokerError::UnknownInformationSetKey(key.key()))?;
        let node = node.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(&*node))
    }

    /// Get the number of information sets stored.
    pub fn num_info_sets(&self) -> usize {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if an info set exists in storage.
    pub fn contains(&self, key: &K) -> bool {
        self.nodes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.nodes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Export average strategies keyed by their canonical string key.
    pub fn export(&self) -> StrategyTable {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        let entries = nodes
            .iter()
            .map(|(key, node)| {
                let node = node.lock().unwrap_or_else(PoisonError::into_inner);
                (
                    key.key(),
                    StrategyEntry {
                        actions: node.actions.clone(),
                        strategy: normalize(&node.strategy_sum),
                    },
                )
            })
            .collect();
        StrategyTable { entries }
    }

    /// Snapshot of all current average strategies.
    pub fn snapshot(&self) -> StrategySnapshot<K> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        let strategies = nodes
            .iter()
            .map(|(key, node)| {
                let node = node.lock().unwrap_or_else(PoisonError::into_inner);
                (key.clone(), normalize(&node.strategy_sum))
            })
            .collect();
        StrategySnapshot { strategies }
    }

    /// Convergence indicator relative to an earlier snapshot.
    ///
    /// Mean over information sets of the L1 distance between the current and
    /// snapshotted average strategies, times 100. Information sets discovered
    /// after the snapshot are compared against uniform. Returns infinity when
    /// the store is empty.
    pub fn convergence_indicator(&self, snapshot: &StrategySnapshot<K>) -> f64 {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        if nodes.is_empty() {
            return f64::INFINITY;
        }

        let total: f64 = nodes
            .iter()
            .map(|(key, node)| {
                let node = node.lock().unwrap_or_else(PoisonError::into_inner);
                let current = normalize(&node.strategy_sum);
                let uniform = 1.0 / current.len() as f64;
                match snapshot.strategies.get(key) {
                    Some(old) => current.iter().zip(old).map(|(a, b)| (a - b).abs()).sum::<f64>(),
                    None => current.iter().map(|p| (p - uniform).abs()).sum::<f64>(),
                }
            })
            .sum();

        100.0 * total / nodes.len() as f64
    }
}

/// Average strategies captured at one point of training.
#[derive(Debug, Clone)]
pub struct StrategySnapshot<K> {
    /// Average strategy per information state.
    pub strategies: FxHashMap<K, Vec<f64>>,
}

impl<K> Default for StrategySnapshot<K> {
    fn default() -> Self {
        Self {
            strategies: FxHashMap::default(),
        }
    }
}

/// One exported information set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyEntry {
    /// Action names, in the order the game lists them.
    pub actions: Vec<String>,
    /// Average strategy, same order as `actions`.
    pub strategy: Vec<f64>,
}

impl StrategyEntry {
    /// Probability of the named action, zero if it is not available here.
    pub fn probability(&self, action: &str) -> f64 {
        self.actions
            .iter()
            .position(|a| a == action)
            .and_then(|i| self.strategy.get(i).copied())
            .unwrap_or(0.0)
    }
}

/// Exported average strategies: the table bots consult after training.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyTable {
    entries: BTreeMap<String, StrategyEntry>,
}

impl StrategyTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, key: impl Into<String>, entry: StrategyEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Exact-key lookup.
    pub fn get(&self, key: &str) -> Result<&StrategyEntry> {
        self.entries
            .get(key)
            .ok_or_else(|| PokerError::UnknownInformationSetKey(key.to_string()))
    }

    /// Strategy for `key`, or `fallback` when the key was never trained.
    pub fn strategy_or<'a>(&'a self, key: &str, fallback: &'a [f64]) -> &'a [f64] {
        match self.entries.get(key) {
            Some(entry) => &entry.strategy,
            None => fallback,
        }
    }

    /// Number of information sets in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &StrategyEntry)> {
        self.entries.iter()
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a table from a JSON string.
    ///
    /// Every entry must list exactly one probability per action.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let table: Self = serde_json::from_str(json)?;
        if let Some((key, entry)) = table
            .entries
            .iter()
            .find(|(_, e)| e.actions.len() != e.strategy.len())
        {
            return Err(serde::de::Error::custom(format!(
                "entry {} has {} actions but {} probabilities",
                key,
                entry.actions.len(),
                entry.strategy.len()
            )));
        }
        Ok(table)
    }
}
