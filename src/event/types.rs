// Layer 1: Standard library imports
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::actor::StateId;

/// Compile-time-stable identity for a user-defined event payload type.
///
/// Built from [`std::any::TypeId`] plus the type's name for diagnostics.
/// Two instances constructed via [`EventTypeId::of`] for the same `T`
/// always compare equal, mirroring the teacher's `Message::MESSAGE_TYPE`
/// compile-time identity, adapted to a runtime key because a single actor
/// here dispatches many distinct event types rather than one.
#[derive(Debug, Clone, Copy)]
pub struct EventTypeId {
    id: TypeId,
    name: &'static str,
}

impl EventTypeId {
    /// Compute the identity for a concrete user event payload type.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The type's diagnostic name (not guaranteed stable across compilations).
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventTypeId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventTypeId {}

impl std::hash::Hash for EventTypeId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for EventTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A type-erased user event payload, carried by [`Event::User`].
///
/// Cloning an `Event` clones this `Arc`, not the payload, which keeps
/// `Raise`/re-enqueue cheap even for large payloads.
#[derive(Clone)]
pub struct UserEvent {
    type_id: EventTypeId,
    payload: Arc<dyn Any + Send + Sync>,
}

impl UserEvent {
    /// Wrap a concrete payload as a type-erased user event.
    pub fn new<T: Send + Sync + 'static>(payload: T) -> Self {
        Self {
            type_id: EventTypeId::of::<T>(),
            payload: Arc::new(payload),
        }
    }

    /// The event's type identity, used for handler-table lookup.
    pub fn event_type(&self) -> EventTypeId {
        self.type_id
    }

    /// Attempt to downcast the payload back to its concrete type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for UserEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserEvent").field("type", &self.type_id).finish()
    }
}

/// Identity of a timer, scoped to the owning actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub(crate) u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Payload carried by [`Event::TimerElapsed`] / [`Event::TimerSetup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerInfo {
    pub id: TimerId,
    pub periodic: bool,
}

/// A domain value carrying a type identity and optional payload.
///
/// The well-known variants are closed (matching `spec.md`'s tagged-variant
/// design note); every other event type is represented by [`Event::User`].
/// An `Event` carries no identity of its own: two sends of equal events
/// remain two distinct enqueue events as far as the inbox is concerned.
#[derive(Debug, Clone)]
pub enum Event {
    /// Requests a graceful shutdown of the receiving actor.
    Halt,
    /// Synthetic event dequeued when nothing else is available and a
    /// default handler is installed.
    Default,
    /// Matches any handler registered as a wildcard in the current state.
    WildCard,
    /// Request a goto-transition to the named state.
    GotoState(StateId),
    /// Request a push-transition to the named state.
    PushState(StateId),
    /// Request popping the top of the state stack.
    PopState,
    /// A previously armed timer has fired.
    TimerElapsed(TimerInfo),
    /// A timer has been armed (observability only; not dispatched).
    TimerSetup(TimerInfo),
    /// The actor's inbox is empty and it has no outstanding work.
    Quiescent,
    /// A user-defined event with a type-erased payload.
    User(UserEvent),
}

impl Event {
    /// Wrap a concrete payload as a [`Event::User`] event.
    pub fn user<T: Send + Sync + 'static>(payload: T) -> Self {
        Self::User(UserEvent::new(payload))
    }

    /// The event's type identity for handler-table lookup.
    ///
    /// Well-known variants use a fixed reserved [`EventTypeId`]; user
    /// events use the identity of their concrete payload type.
    pub fn event_type(&self) -> EventTypeId {
        match self {
            Event::Halt => EventTypeId::of::<HaltTag>(),
            Event::Default => EventTypeId::of::<DefaultTag>(),
            Event::WildCard => EventTypeId::of::<WildCardTag>(),
            Event::GotoState(_) => EventTypeId::of::<GotoTag>(),
            Event::PushState(_) => EventTypeId::of::<PushTag>(),
            Event::PopState => EventTypeId::of::<PopTag>(),
            Event::TimerElapsed(_) => EventTypeId::of::<TimerElapsedTag>(),
            Event::TimerSetup(_) => EventTypeId::of::<TimerSetupTag>(),
            Event::Quiescent => EventTypeId::of::<QuiescentTag>(),
            Event::User(u) => u.event_type(),
        }
    }

    /// True for the well-known events that are never user-dispatchable
    /// data, only control signals.
    pub fn is_control(&self) -> bool {
        !matches!(self, Event::User(_))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Halt => write!(f, "Halt"),
            Event::Default => write!(f, "Default"),
            Event::WildCard => write!(f, "WildCard"),
            Event::GotoState(s) => write!(f, "GotoState({s})"),
            Event::PushState(s) => write!(f, "PushState({s})"),
            Event::PopState => write!(f, "PopState"),
            Event::TimerElapsed(t) => write!(f, "TimerElapsed({})", t.id),
            Event::TimerSetup(t) => write!(f, "TimerSetup({})", t.id),
            Event::Quiescent => write!(f, "Quiescent"),
            Event::User(u) => write!(f, "User({})", u.event_type()),
        }
    }
}

// Zero-sized marker types giving the well-known variants stable TypeIds
// distinct from any user payload type.
struct HaltTag;
struct DefaultTag;
struct WildCardTag;
struct GotoTag;
struct PushTag;
struct PopTag;
struct TimerElapsedTag;
struct TimerSetupTag;
struct QuiescentTag;
