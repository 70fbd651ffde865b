//! Uniform-random scheduling (`spec.md` §4.3's `Random` strategy), seeded
//! from `rand_pcg` for bitwise-reproducible runs across platforms.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use rand::Rng;
use rand_pcg::Pcg64;
use rand::SeedableRng;

// Layer 3: Internal module imports
use super::strategy::SchedulingStrategy;
use crate::util::OperationId;

/// Picks uniformly among the enabled set at every scheduling point.
/// Unfair: never contributes to liveness temperature and is bounded by
/// `MaxUnfairSchedulingSteps`.
pub struct RandomStrategy {
    rng: Pcg64,
    seed: u64,
    steps: usize,
}

impl RandomStrategy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
            seed,
            steps: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl SchedulingStrategy for RandomStrategy {
    fn next_operation(&mut self, enabled: &[OperationId], _current: Option<OperationId>) -> Option<OperationId> {
        if enabled.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..enabled.len());
        Some(enabled[index])
    }

    fn next_boolean(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn next_integer(&mut self, max_exclusive: u64) -> u64 {
        self.rng.gen_range(0..max_exclusive)
    }

    fn prepare_next_iteration(&mut self) -> bool {
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
        "Random"
    }
}
