//! Probability-biased scheduling (`spec.md` §4.3's `Probabilistic(N)`):
//! flips a biased coin with probability `1/2^N` of switching away from the
//! current operation, rather than choosing uniformly every time.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg64;

// Layer 3: Internal module imports
use super::strategy::SchedulingStrategy;
use crate::util::OperationId;

/// Stays on the current operation unless a biased coin with `P(switch) =
/// 1/2^priority_change_count` comes up, in which case a new operation is
/// chosen uniformly from the remainder of the enabled set. Unfair.
pub struct ProbabilisticStrategy {
    rng: Pcg64,
    priority_change_count: u32,
    steps: usize,
}

impl ProbabilisticStrategy {
    pub fn new(seed: u64, priority_change_count: u32) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
            priority_change_count,
            steps: 0,
        }
    }

    fn switch_probability(&self) -> f64 {
        1.0 / f64::from(1u32 << self.priority_change_count.min(30))
    }
}

impl SchedulingStrategy for ProbabilisticStrategy {
    fn next_operation(&mut self, enabled: &[OperationId], current: Option<OperationId>) -> Option<OperationId> {
        if enabled.is_empty() {
            return None;
        }
        let stay = current.filter(|c| enabled.contains(c));
        match stay {
            Some(current) if !self.rng.gen_bool(self.switch_probability()) => Some(current),
            Some(current) => {
                let rest: Vec<_> = enabled.iter().copied().filter(|op| *op != current).collect();
                if rest.is_empty() {
                    Some(current)
                } else {
                    let index = self.rng.gen_range(0..rest.len());
                    Some(rest[index])
                }
            }
            None => {
                let index = self.rng.gen_range(0..enabled.len());
                Some(enabled[index])
            }
        }
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
        "Probabilistic"
    }
}
