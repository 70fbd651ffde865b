//! Scheduler and liveness failure kinds (`spec.md` §4.3, §4.4, §7).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::util::OperationId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The enabled set was empty while one or more operations sat in
    /// `PausedOnReceive` (`spec.md` §4.3).
    #[error("deadlock: {paused} operation(s) paused on receive, none enabled")]
    Deadlock { paused: usize },

    /// `ConsiderDepthBoundHitAsBug` was set and the step bound was reached
    /// without the iteration completing.
    #[error("bounded-depth bug: reached step bound {bound} without completion")]
    MaxStepsHit { bound: usize },

    /// Liveness temperature reached the configured threshold while a
    /// monitor sat in a hot state.
    #[error("liveness violation: temperature {temperature} reached threshold in monitor '{monitor}'")]
    LivenessViolation { monitor: String, temperature: usize },

    /// User code attempted uncontrolled synchronization with no fuzzing
    /// fallback configured.
    #[error("uncontrolled concurrency detected at operation {operation}")]
    UncontrolledConcurrency { operation: OperationId },

    /// Replay observed a (point-kind, current-op) pair that diverges from
    /// the recorded trace.
    #[error("replay divergence at step {step}: expected {expected}, observed {observed}")]
    ReplayDivergence {
        step: usize,
        expected: String,
        observed: String,
    },
}
