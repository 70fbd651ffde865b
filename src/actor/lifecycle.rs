//! Actor execution status, per the state diagram in `spec.md` §4.6.
//!
//! ```text
//! Active ──RaiseHalt / Halt-event──▶ Halting ──handler returns──▶ Halted(terminal)
//! Active ──OnException.Halt──▶ Halting
//! Halted is terminal: Enqueue returns Dropped; all timers disposed.
//! ```

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc}; // §3.2 MANDATORY

// Layer 3: Internal module imports
// (none)

/// An actor's position in the halt lifecycle (`spec.md` §3's `Actor` data
/// model: `ExecutionStatus ∈ {Active, Halting, Halted}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Normal operation: dispatch loop runs as events become available.
    Active,
    /// Halt requested; finishing the current action before closing.
    Halting,
    /// Terminal. The inbox is closed and all timers are disposed.
    Halted,
}

impl Default for ExecutionStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Tracks an actor's status transitions and when the last one happened.
#[derive(Debug, Clone)]
pub struct ActorLifecycle {
    status: ExecutionStatus,
    last_transition: DateTime<Utc>,
}

impl ActorLifecycle {
    pub fn new() -> Self {
        Self {
            status: ExecutionStatus::Active,
            last_transition: Utc::now(), // §3.2
        }
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn last_transition(&self) -> DateTime<Utc> {
        self.last_transition
    }

    /// Move to `next`, rejecting transitions the state diagram forbids
    /// (e.g. resurrecting a `Halted` actor).
    pub fn transition_to(&mut self, next: ExecutionStatus) {
        debug_assert!(
            !(self.status == ExecutionStatus::Halted && next != ExecutionStatus::Halted),
            "Halted is terminal"
        );
        self.status = next;
        self.last_transition = Utc::now(); // §3.2
    }

    pub fn is_halted(&self) -> bool {
        self.status == ExecutionStatus::Halted
    }

    pub fn is_active(&self) -> bool {
        self.status == ExecutionStatus::Active
    }
}

impl Default for ActorLifecycle {
    fn default() -> Self {
        Self::new()
    }
}
