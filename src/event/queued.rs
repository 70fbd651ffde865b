// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc}; // §3.2 MANDATORY

// Layer 3: Internal module imports
use super::types::Event;
use crate::util::EventGroup;

/// Whether a dropped event must be observed by the host.
///
/// Mirrors `spec.md` §7's `DroppedMustHandle` error kind: an event sent
/// with `must_handle = true` that is lost because the target already
/// halted fails the test rather than being silently swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryRequirement {
    /// Losing this event on halt is acceptable.
    BestEffort,
    /// Losing this event on halt is a `DroppedMustHandle` failure.
    MustHandle,
}

impl Default for DeliveryRequirement {
    fn default() -> Self {
        Self::BestEffort
    }
}

/// Per-send metadata threaded alongside an [`Event`] through the inbox.
#[derive(Debug, Clone)]
pub struct EventMetadata {
    pub enqueued_at: DateTime<Utc>,
    pub requirement: DeliveryRequirement,
}

impl EventMetadata {
    pub fn new(requirement: DeliveryRequirement) -> Self {
        Self {
            enqueued_at: Utc::now(), // §3.2
            requirement,
        }
    }
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self::new(DeliveryRequirement::BestEffort)
    }
}

/// A `(Event, EventGroup, Metadata)` tuple as queued on an actor's inbox.
///
/// This is the `weft` analog of the teacher's generic `MessageEnvelope<M>`:
/// the same "payload plus routing metadata" shape, but carrying the closed
/// tagged-variant [`Event`] instead of a single generic message type, since
/// one inbox here must hold heterogeneous event types.
#[derive(Debug, Clone)]
pub struct QueuedEvent {
    pub event: Event,
    pub group: EventGroup,
    pub metadata: EventMetadata,
}

impl QueuedEvent {
    pub fn new(event: Event, group: EventGroup) -> Self {
        Self {
            event,
            group,
            metadata: EventMetadata::default(),
        }
    }

    pub fn with_requirement(mut self, requirement: DeliveryRequirement) -> Self {
        self.metadata.requirement = requirement;
        self
    }

    pub fn must_handle(&self) -> bool {
        self.metadata.requirement == DeliveryRequirement::MustHandle
    }
}
