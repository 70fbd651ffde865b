//! [`EngineError`]: the controlled runtime's failure surface (`spec.md`
//! §7), grounded on the teacher's `system::SystemError` thiserror pattern
//! (`system/errors.rs`) — one closed enum with `#[from]` conversions rather
//! than a boxed trait object, plus transient/fatal classification helpers.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::scheduler::SchedulerError;
use crate::util::{ActorId, OperationId};

/// Every way a controlled run can fail (`spec.md` §7's error kinds).
#[derive(Debug, Error)]
pub enum EngineError {
    /// A handler-recorded `Assert` failed, or `MonitorError::SafetyViolation`
    /// fired — wrapped with the originating operation, state, and message.
    #[error("assertion failed at operation {operation} (state {state}): {message}")]
    AssertionFailure {
        operation: OperationId,
        state: String,
        message: String,
    },

    /// Dispatch found no handler for an event and no class-level default
    /// was installed (`spec.md` §4.2's final on_event_unhandled fallback).
    #[error("unhandled event '{event}' in state {state} on operation {operation}")]
    UnhandledEvent {
        operation: OperationId,
        state: String,
        event: String,
    },

    /// A structural misconfiguration: an unknown monitor type, a state
    /// table that failed to finalize, or similar programming errors
    /// surfaced before any scheduling point runs.
    #[error("structural error: {0}")]
    StructuralError(String),

    /// An event marked `must_handle` was dropped because its target had
    /// already halted or was otherwise unreachable (`spec.md` §4.1, §7's
    /// "Halt drop" testable property, violated).
    #[error("event marked must-handle was dropped for actor {target}: {event}")]
    DroppedMustHandle { target: ActorId, event: String },

    /// Scheduler-level failures: deadlock, step-bound-as-bug, liveness
    /// violation, uncontrolled concurrency, or replay divergence.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl EngineError {
    /// True for failures that are a property of this particular
    /// interleaving rather than the program under test — re-running with a
    /// different seed may not reproduce them.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EngineError::Scheduler(SchedulerError::Deadlock { .. })
                | EngineError::Scheduler(SchedulerError::MaxStepsHit { .. })
        )
    }

    /// True for failures that indicate a genuine bug in the program under
    /// test, independent of which interleaving was explored.
    pub fn is_bug(&self) -> bool {
        matches!(
            self,
            EngineError::AssertionFailure { .. }
                | EngineError::UnhandledEvent { .. }
                | EngineError::DroppedMustHandle { .. }
                | EngineError::Scheduler(SchedulerError::LivenessViolation { .. })
        )
    }

    /// True when the failure means the engine's own configuration or
    /// wiring is wrong, not the program under test.
    pub fn is_structural(&self) -> bool {
        matches!(self, EngineError::StructuralError(_))
    }
}
