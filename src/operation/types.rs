//! The `Operation` data model (`spec.md` §3, §4.3).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::util::{ActorId, OperationId};

/// A schedulable unit's current position with respect to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    /// Eligible to be chosen by the strategy at the next scheduling point.
    Enabled,
    /// Suspended on a `ReceiveEventAsync`; only a matching enqueue wakes it.
    PausedOnReceive,
    /// Suspended on an external resource (awaited task, timer).
    PausedOnResource,
    /// Finished; no further scheduling.
    Completed,
}

/// The kind of suspension point an operation most recently passed through,
/// recorded for trace records (`spec.md` §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulingPointKind {
    Create,
    Enqueue,
    Dequeue,
    SendEvent,
    AwaitTask,
    NondeterministicChoice,
    TimerStartStop,
    Yield,
}

/// What kind of schedulable unit an [`Operation`] represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    /// A state-machine actor, identified by its [`ActorId`].
    Actor(ActorId),
    /// A user-spawned controlled task with no actor identity.
    Task,
}

/// One schedulable unit: an actor or a user-spawned controlled task.
#[derive(Debug, Clone)]
pub struct Operation {
    pub id: OperationId,
    pub kind: OperationKind,
    pub status: OperationStatus,
    pub last_point: Option<SchedulingPointKind>,
}

impl Operation {
    pub fn new_actor(actor_id: ActorId) -> Self {
        Self {
            id: OperationId::new(),
            kind: OperationKind::Actor(actor_id),
            status: OperationStatus::Enabled,
            last_point: Some(SchedulingPointKind::Create),
        }
    }

    pub fn new_task() -> Self {
        Self {
            id: OperationId::new(),
            kind: OperationKind::Task,
            status: OperationStatus::Enabled,
            last_point: Some(SchedulingPointKind::Create),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.status == OperationStatus::Enabled
    }

    pub fn is_completed(&self) -> bool {
        self.status == OperationStatus::Completed
    }
}
