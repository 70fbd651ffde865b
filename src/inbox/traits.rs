//! The per-actor inbox interface (`spec.md` §4.1).

// Layer 1: Standard library imports
use std::collections::HashSet;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::event::{Event, EventTypeId, QueuedEvent};
use crate::util::EventGroup;

/// Outcome of [`EventQueue::enqueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueStatus {
    /// The event was accepted and a paused receive was satisfied by it.
    ReceiveSatisfied,
    /// The event was accepted; the target's handler loop was idle, so the
    /// runtime must start (schedule) it.
    EventHandlerNotRunning,
    /// The event was accepted; the target's handler loop is already running.
    EventHandlerRunning,
    /// The inbox was closed; the event was dropped.
    Dropped,
}

/// Outcome of [`EventQueue::dequeue`], in the priority order `spec.md`
/// §4.1 specifies: raised, then queued, then synthetic default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DequeueStatus {
    /// The event came from the single-slot raised priority inbox.
    Raised,
    /// The event was the next eligible FIFO entry.
    Success,
    /// No real event was available; this is the synthetic default event.
    Default,
    /// Nothing is available and no default handler is installed; the
    /// handler loop should exit (go idle).
    Unavailable,
}

/// A pending `ReceiveEventAsync` descriptor: the set of event types the
/// actor is waiting for, plus an optional predicate over the event.
pub struct ReceiveDescriptor {
    pub types: HashSet<EventTypeId>,
    pub predicate: Option<Box<dyn Fn(&Event) -> bool + Send + Sync>>,
}

impl ReceiveDescriptor {
    pub fn matches(&self, event: &Event) -> bool {
        self.types.contains(&event.event_type()) && self.predicate.as_ref().is_none_or(|p| p(event))
    }
}

impl std::fmt::Debug for ReceiveDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiveDescriptor")
            .field("types", &self.types.len())
            .field("has_predicate", &self.predicate.is_some())
            .finish()
    }
}

/// The per-actor FIFO inbox interface from `spec.md` §4.1.
///
/// A concrete implementation owns the raised slot, the FIFO, the
/// defer/ignore sets, the pending receive descriptor, and the closed flag;
/// see [`crate::inbox::queue::Inbox`].
pub trait EventQueue {
    /// Append `event` to the FIFO, unless closed.
    fn enqueue(&mut self, event: Event, group: EventGroup, must_handle: bool) -> EnqueueStatus;

    /// Set the raised slot. Panics (a programming error per `spec.md`
    /// §4.1) if the slot was already occupied.
    fn raise(&mut self, event: Event, group: EventGroup);

    /// Pop the next dispatchable entry in priority order.
    fn dequeue(&mut self) -> (DequeueStatus, Option<QueuedEvent>);

    /// Immediately satisfy or else register a pending receive.
    fn receive_async(&mut self, descriptor: ReceiveDescriptor) -> Option<QueuedEvent>;

    /// Mark the inbox closed; further enqueues are dropped.
    fn close(&mut self);

    fn is_closed(&self) -> bool;

    /// Replace the set of event types currently deferred.
    fn set_deferred(&mut self, types: HashSet<EventTypeId>);

    /// Replace the set of event types currently ignored.
    fn set_ignored(&mut self, types: HashSet<EventTypeId>);

    /// True if a default handler is installed for the owning actor's
    /// current state (controls whether `Dequeue` can synthesize
    /// [`DequeueStatus::Default`]).
    fn has_default_handler(&self) -> bool;

    fn set_has_default_handler(&mut self, has_default: bool);
}
