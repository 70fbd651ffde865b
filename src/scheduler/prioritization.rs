//! Priority-based scheduling (`spec.md` §4.3's `Prioritization(k)` and
//! `FairPrioritization(k)`): a randomly shuffled total order over
//! operations, with up to `k` randomly-placed priority-change points per
//! iteration that move the currently highest-priority operation to the
//! bottom.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg64;

// Layer 3: Internal module imports
use super::strategy::SchedulingStrategy;
use crate::util::OperationId;

/// Picks the highest-priority enabled operation according to an internal
/// total order, re-randomized each iteration, and demotes the running
/// operation at up to `change_points` randomly-chosen steps.
pub struct PrioritizationStrategy {
    rng: Pcg64,
    change_points: u32,
    fair: bool,
    priority: Vec<OperationId>,
    steps: usize,
    remaining_changes: u32,
}

impl PrioritizationStrategy {
    pub fn new(seed: u64, change_points: u32, fair: bool) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
            change_points,
            fair,
            priority: Vec::new(),
            steps: 0,
            remaining_changes: change_points,
        }
    }

    fn demote(&mut self, op: OperationId) {
        if let Some(index) = self.priority.iter().position(|candidate| *candidate == op) {
            let demoted = self.priority.remove(index);
            self.priority.push(demoted);
        }
    }

    fn merge_new_operations(&mut self, enabled: &[OperationId]) {
        for op in enabled {
            if !self.priority.contains(op) {
                self.priority.push(*op);
            }
        }
        self.priority.retain(|op| enabled.contains(op));
    }
}

impl SchedulingStrategy for PrioritizationStrategy {
    fn next_operation(&mut self, enabled: &[OperationId], _current: Option<OperationId>) -> Option<OperationId> {
        if enabled.is_empty() {
            return None;
        }
        self.merge_new_operations(enabled);

        if self.remaining_changes > 0 && self.priority.len() > 1 && self.rng.gen_bool(0.2) {
            self.remaining_changes -= 1;
            let top = self.priority[0];
            self.demote(top);
        }

        self.priority.first().copied()
    }

    fn next_boolean(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    fn next_integer(&mut self, max_exclusive: u64) -> u64 {
        self.rng.gen_range(0..max_exclusive)
    }

    fn prepare_next_iteration(&mut self) -> bool {
        self.steps = 0;
        self.remaining_changes = self.change_points;
        self.priority.shuffle(&mut self.rng);
        true
    }

    fn step_count(&self) -> usize {
        self.steps
    }

    fn is_fair(&self) -> bool {
        self.fair
    }

    fn record_step(&mut self) {
        self.steps += 1;
    }

    fn name(&self) -> &str {
        if self.fair {
            "FairPrioritization"
        } else {
            "Prioritization"
        }
    }
}
