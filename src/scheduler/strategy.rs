//! The [`SchedulingStrategy`] trait every scheduling algorithm implements
//! (`spec.md` §4.3).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::error::SchedulerError;
use crate::util::OperationId;

/// A pluggable algorithm for choosing the next operation to run and for
/// answering nondeterministic-choice requests, all seeded for
/// reproducibility.
///
/// Implementors must guarantee: given the same seed, the same sequence of
/// `enabled` sets, and the same sequence of `GetNextBoolean`/
/// `GetNextInteger` call sites, two runs produce identical choices.
pub trait SchedulingStrategy: Send {
    /// Choose the next operation to run from `enabled`, given the
    /// currently running operation (`None` before the first choice).
    /// Returns `None` when `enabled` is empty.
    fn next_operation(&mut self, enabled: &[OperationId], current: Option<OperationId>) -> Option<OperationId>;

    fn next_boolean(&mut self) -> bool;

    /// A value in `0..max_exclusive`. `max_exclusive` must be nonzero.
    fn next_integer(&mut self, max_exclusive: u64) -> u64;

    /// Reset per-iteration state and report whether another iteration
    /// should run. Strategies with a finite exploration space (DFS)
    /// return `false` once exhausted.
    fn prepare_next_iteration(&mut self) -> bool;

    fn step_count(&self) -> usize;

    /// Fair strategies are bounded by `MaxFairSchedulingSteps` and
    /// contribute to liveness-temperature tracking; unfair strategies are
    /// bounded by `MaxUnfairSchedulingSteps` and never accrue temperature.
    fn is_fair(&self) -> bool;

    /// Called once per chosen operation, after the choice is made, so
    /// step-counting strategies can advance. Default implementation does
    /// nothing; strategies that track steps via `next_operation` itself
    /// don't need to override this.
    fn record_step(&mut self) {}

    fn name(&self) -> &str;

    /// Record the operation the runtime observed as currently running,
    /// just before asking for the next choice. Only [`super::super::trace::replay::ReplayStrategy`]
    /// does anything with this — it compares `observed` against the
    /// recorded trace and latches a [`SchedulerError::ReplayDivergence`]
    /// on mismatch, surfaced via [`SchedulingStrategy::divergence`].
    fn check_current(&mut self, _observed: Option<OperationId>) {}

    /// A latched divergence from [`SchedulingStrategy::check_current`], if
    /// any. Default strategies never diverge from anything.
    fn divergence(&self) -> Option<&SchedulerError> {
        None
    }
}
