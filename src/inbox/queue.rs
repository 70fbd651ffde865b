//! FIFO [`Inbox`] implementation backing [`crate::inbox::EventQueue`].

// Layer 1: Standard library imports
use std::collections::{HashSet, VecDeque};

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::metrics::InboxMetrics;
use super::traits::{DequeueStatus, EnqueueStatus, EventQueue, ReceiveDescriptor};
use crate::event::{DeliveryRequirement, Event, EventTypeId, QueuedEvent};
use crate::util::EventGroup;

/// Concrete per-actor inbox: FIFO plus raised slot, defer/ignore sets, a
/// pending receive descriptor, and the closed flag, exactly as laid out in
/// `spec.md` §3's "Inbox (EventQueue)" data model.
pub struct Inbox {
    queue: VecDeque<QueuedEvent>,
    raised: Option<QueuedEvent>,
    deferred: HashSet<EventTypeId>,
    ignored: HashSet<EventTypeId>,
    receive: Option<ReceiveDescriptor>,
    /// Event handed straight to a satisfied `ReceiveAsync`, bypassing the
    /// FIFO and the raised slot entirely (`spec.md` §4.1: "bypasses
    /// state-dispatch"). Drained by whoever resumes the parked receive.
    receive_result: Option<QueuedEvent>,
    closed: bool,
    has_default_handler: bool,
    pub metrics: InboxMetrics,
    /// Events dropped after close, for the host's `OnEventDropped` hook.
    pub(crate) dropped_after_close: Vec<QueuedEvent>,
}

impl Inbox {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            raised: None,
            deferred: HashSet::new(),
            ignored: HashSet::new(),
            receive: None,
            receive_result: None,
            closed: false,
            has_default_handler: false,
            metrics: InboxMetrics::default(),
            dropped_after_close: Vec::new(),
        }
    }

    /// True when the receive descriptor, if any, is satisfiable by a
    /// currently-queued event (used by the scheduler to distinguish a
    /// genuinely-stuck receive from one that will resolve on its own).
    pub fn receive_would_satisfy(&self) -> bool {
        match &self.receive {
            Some(desc) => self.queue.iter().any(|q| desc.matches(&q.event)),
            None => false,
        }
    }

    pub fn is_paused_on_receive(&self) -> bool {
        self.receive.is_some()
    }

    /// Take the event handed to a just-satisfied `ReceiveAsync`, if any.
    pub fn take_receive_result(&mut self) -> Option<QueuedEvent> {
        self.receive_result.take()
    }

    pub fn has_receive_result(&self) -> bool {
        self.receive_result.is_some()
    }

    /// Stash an event that satisfied a receive the instant it was
    /// registered, so the next `step` delivers it without waiting for a
    /// fresh `enqueue` to resolve it (`spec.md` §4.1's "ReceiveAsync":
    /// "if a matching event is already queued, extract and return it
    /// immediately").
    pub(crate) fn set_receive_result(&mut self, queued: QueuedEvent) {
        self.receive_result = Some(queued);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty() && self.raised.is_none()
    }
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue for Inbox {
    fn enqueue(&mut self, event: Event, group: EventGroup, must_handle: bool) -> EnqueueStatus {
        if self.closed {
            let requirement = if must_handle {
                DeliveryRequirement::MustHandle
            } else {
                DeliveryRequirement::BestEffort
            };
            self.dropped_after_close
                .push(QueuedEvent::new(event, group).with_requirement(requirement));
            self.metrics.dropped += 1;
            return EnqueueStatus::Dropped;
        }

        self.metrics.enqueued += 1;

        if let Some(desc) = &self.receive {
            if desc.matches(&event) {
                self.receive = None;
                self.receive_result = Some(QueuedEvent::new(event, group));
                return EnqueueStatus::ReceiveSatisfied;
            }
        }

        let was_idle = self.queue.is_empty() && self.raised.is_none();
        let requirement = if must_handle {
            DeliveryRequirement::MustHandle
        } else {
            DeliveryRequirement::BestEffort
        };
        self.queue
            .push_back(QueuedEvent::new(event, group).with_requirement(requirement));

        if was_idle {
            EnqueueStatus::EventHandlerNotRunning
        } else {
            EnqueueStatus::EventHandlerRunning
        }
    }

    fn raise(&mut self, event: Event, group: EventGroup) {
        assert!(self.raised.is_none(), "Raise called with a raised event already pending");
        self.raised = Some(QueuedEvent::new(event, group));
    }

    fn dequeue(&mut self) -> (DequeueStatus, Option<QueuedEvent>) {
        if let Some(raised) = self.raised.take() {
            self.metrics.dequeued += 1;
            return (DequeueStatus::Raised, Some(raised));
        }

        // Scan the FIFO for the first entry that is neither deferred nor
        // ignored; ignored entries are dropped here, deferred ones are
        // left in place (spec.md §4.1 ordering guarantee).
        let mut idx = 0;
        while idx < self.queue.len() {
            let ty = self.queue[idx].event.event_type();
            if self.ignored.contains(&ty) {
                self.queue.remove(idx);
                self.metrics.ignored += 1;
                continue;
            }
            if self.deferred.contains(&ty) {
                idx += 1;
                continue;
            }
            let event = self.queue.remove(idx).expect("checked index in bounds");
            self.metrics.dequeued += 1;
            return (DequeueStatus::Success, Some(event));
        }

        if self.has_default_handler {
            self.metrics.defaulted += 1;
            return (
                DequeueStatus::Default,
                Some(QueuedEvent::new(Event::Default, EventGroup::NULL)),
            );
        }

        (DequeueStatus::Unavailable, None)
    }

    fn receive_async(&mut self, descriptor: ReceiveDescriptor) -> Option<QueuedEvent> {
        if let Some(idx) = self.queue.iter().position(|q| descriptor.matches(&q.event)) {
            return self.queue.remove(idx);
        }
        self.receive = Some(descriptor);
        None
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn set_deferred(&mut self, types: HashSet<EventTypeId>) {
        self.deferred = types;
    }

    fn set_ignored(&mut self, types: HashSet<EventTypeId>) {
        self.ignored = types;
    }

    fn has_default_handler(&self) -> bool {
        self.has_default_handler
    }

    fn set_has_default_handler(&mut self, has_default: bool) {
        self.has_default_handler = has_default;
    }
}
