//! The closed vocabulary of runtime-observable events (`spec.md` §2's
//! data-flow description: "monitors observe each externally visible step
//! → coverage builder and trace recorder observe the same stream").
//!
//! Unlike the teacher's generic `MonitoringEvent` trait (any `Send + Sync
//! + Clone + Debug + Serialize` type keyed by a `const EVENT_TYPE`), this
//! runtime has a fixed, small set of observable occurrences, so
//! [`ObserverEvent`] is a closed enum rather than an open trait
//! hierarchy — the same closed-vocabulary choice made for
//! [`crate::event::Event`].

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use serde::Serialize;

// Layer 3: Internal module imports
use crate::util::{ActorId, OperationId};

/// Event severity levels for filtering, ordered lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum EventSeverity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

/// One externally-visible step of the controlled runtime.
#[derive(Debug, Clone, Serialize)]
pub enum ObserverEvent {
    ActorCreated {
        at: DateTime<Utc>,
        actor: String,
        type_name: String,
    },
    ActorHalted {
        at: DateTime<Utc>,
        actor: String,
    },
    EventEnqueued {
        at: DateTime<Utc>,
        target: String,
        event_type: String,
    },
    EventDequeued {
        at: DateTime<Utc>,
        actor: String,
        event_type: String,
    },
    EventDropped {
        at: DateTime<Utc>,
        target: String,
        event_type: String,
    },
    StateTransitioned {
        at: DateTime<Utc>,
        actor: String,
        from: String,
        to: String,
    },
    MonitorInvoked {
        at: DateTime<Utc>,
        monitor: String,
        event_type: String,
    },
    SchedulingDecision {
        at: DateTime<Utc>,
        step: usize,
        chosen: Option<OperationId>,
    },
    AssertionFailed {
        at: DateTime<Utc>,
        message: String,
    },
    LivenessTemperatureRaised {
        at: DateTime<Utc>,
        monitor: String,
        temperature: usize,
    },
    IterationCompleted {
        at: DateTime<Utc>,
        steps: usize,
    },
}

impl ObserverEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ObserverEvent::ActorCreated { at, .. }
            | ObserverEvent::ActorHalted { at, .. }
            | ObserverEvent::EventEnqueued { at, .. }
            | ObserverEvent::EventDequeued { at, .. }
            | ObserverEvent::EventDropped { at, .. }
            | ObserverEvent::StateTransitioned { at, .. }
            | ObserverEvent::MonitorInvoked { at, .. }
            | ObserverEvent::SchedulingDecision { at, .. }
            | ObserverEvent::AssertionFailed { at, .. }
            | ObserverEvent::LivenessTemperatureRaised { at, .. }
            | ObserverEvent::IterationCompleted { at, .. } => *at,
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            ObserverEvent::AssertionFailed { .. } => EventSeverity::Critical,
            ObserverEvent::LivenessTemperatureRaised { .. } | ObserverEvent::EventDropped { .. } => {
                EventSeverity::Warning
            }
            ObserverEvent::ActorCreated { .. }
            | ObserverEvent::ActorHalted { .. }
            | ObserverEvent::IterationCompleted { .. } => EventSeverity::Info,
            ObserverEvent::EventEnqueued { .. }
            | ObserverEvent::EventDequeued { .. }
            | ObserverEvent::StateTransitioned { .. }
            | ObserverEvent::MonitorInvoked { .. }
            | ObserverEvent::SchedulingDecision { .. } => EventSeverity::Debug,
        }
    }
}

pub fn actor_created(actor: &ActorId) -> ObserverEvent {
    ObserverEvent::ActorCreated {
        at: Utc::now(),
        actor: actor.name().to_string(),
        type_name: actor.type_name().to_string(),
    }
}
