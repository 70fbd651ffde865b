//! Q-value-guided scheduling (`spec.md` §4.3's `ReinforcementLearning`).
//!
//! A lightweight tabular Q-learning scheduler: state is a hash of the
//! enabled set's shape (its sorted `OperationId` values), actions are
//! "pick the Nth enabled operation", and the reward signal is the step
//! count reached before the iteration ended (longer-surviving
//! interleavings are reinforced, biasing exploration toward
//! deeper-reaching schedules across iterations).

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

// Layer 2: Third-party crate imports
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg64;

// Layer 3: Internal module imports
use super::strategy::SchedulingStrategy;
use crate::util::OperationId;

const LEARNING_RATE: f64 = 0.3;
const EXPLORATION_RATE: f64 = 0.15;

type StateHash = u64;

/// Tabular Q-learning over (state-hash, action-index) pairs, with
/// epsilon-greedy exploration. Unfair: it optimizes for bug-finding depth
/// rather than guaranteeing every interleaving is eventually tried.
pub struct ReinforcementLearningStrategy {
    rng: Pcg64,
    q_values: HashMap<(StateHash, usize), f64>,
    history: Vec<(StateHash, usize)>,
    steps: usize,
}

impl ReinforcementLearningStrategy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
            q_values: HashMap::new(),
            history: Vec::new(),
            steps: 0,
        }
    }

    fn hash_state(enabled: &[OperationId]) -> StateHash {
        let mut sorted: Vec<u64> = enabled.iter().map(|op| op.value()).collect();
        sorted.sort_unstable();
        let mut hasher = DefaultHasher::new();
        sorted.hash(&mut hasher);
        hasher.finish()
    }

    fn best_action(&self, state: StateHash, arity: usize) -> usize {
        (0..arity)
            .max_by(|a, b| {
                let qa = self.q_values.get(&(state, *a)).copied().unwrap_or(0.0);
                let qb = self.q_values.get(&(state, *b)).copied().unwrap_or(0.0);
                qa.partial_cmp(&qb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(0)
    }

    /// Propagate the final step count of a completed iteration back into
    /// every (state, action) pair visited along the way.
    fn reinforce(&mut self, reward: f64) {
        for (state, action) in self.history.drain(..) {
            let entry = self.q_values.entry((state, action)).or_insert(0.0);
            *entry += LEARNING_RATE * (reward - *entry);
        }
    }
}

impl SchedulingStrategy for ReinforcementLearningStrategy {
    fn next_operation(&mut self, enabled: &[OperationId], _current: Option<OperationId>) -> Option<OperationId> {
        if enabled.is_empty() {
            return None;
        }
        let state = Self::hash_state(enabled);
        let action = if self.rng.gen_bool(EXPLORATION_RATE) {
            self.rng.gen_range(0..enabled.len())
        } else {
            self.best_action(state, enabled.len())
        };
        self.history.push((state, action));
        Some(enabled[action])
    }

    fn next_boolean(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn next_integer(&mut self, max_exclusive: u64) -> u64 {
        self.rng.gen_range(0..max_exclusive)
    }

    fn prepare_next_iteration(&mut self) -> bool {
        let reward = self.steps as f64;
        self.reinforce(reward);
        self.steps = 0;
        true
    }

    fn step_count(&self) -> usize {
        self.steps
    }

    fn is_fair(&self) -> bool {
        false
    }

    fn record_step(&mut self) {
        self.steps += 1;
    }

    fn name(&self) -> &str {
        "ReinforcementLearning"
    }
}
