//! The actor-facing API surface (`spec.md` §6, "Actor-facing API").
//!
//! Handler code never talks to the runtime or other actors' inboxes
//! directly; it records intent on an [`ActorContext`] as an [`Effect`], and
//! the dispatch engine drains those effects into real scheduler actions
//! once the handler returns. This keeps `StateMachine::on_event` a plain
//! synchronous-looking call while still letting the engine enforce "exactly
//! one operation runs at a time" (`spec.md` §4.3).

// Layer 1: Standard library imports
use std::collections::HashSet;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc}; // §3.2 MANDATORY

// Layer 3: Internal module imports
use super::dynamic::{BoxedActor, DynActor};
use super::state::StateId;
use super::traits::StateMachine;
use crate::event::{Event, EventTypeId, TimerId, TimerInfo};
use crate::inbox::ReceiveDescriptor;
use crate::util::{ActorId, EventGroup};

/// A deferred request made by handler code, drained by the engine after
/// the handler returns.
///
/// `CreateActor` carries a type-erased factory rather than the child's
/// machine value directly, since `Effect` itself cannot be generic over
/// every `StateMachine` type an actor might spawn — the same necessary
/// `dyn` seam as [`DynActor`].
pub enum Effect {
    SendEvent {
        target: ActorId,
        event: Event,
        group: Option<EventGroup>,
        must_handle: bool,
    },
    CreateActor {
        id: ActorId,
        factory: Box<dyn FnOnce(ActorId) -> Box<dyn DynActor> + Send>,
        initial_event: Option<Event>,
        group: Option<EventGroup>,
    },
    InvokeMonitor {
        monitor_type: String,
        event: Event,
    },
    Assert {
        condition: bool,
        message: String,
    },
    StartTimer {
        info: TimerInfo,
        delay_steps: u64,
    },
    StopTimer {
        id: TimerId,
    },
    /// `ReceiveEventAsync(types, predicate?)`: drained inside
    /// [`super::machine::ActorInstance`] itself, never by the engine's
    /// cross-actor effect loop — a receive only ever touches the issuing
    /// actor's own inbox.
    Receive {
        descriptor: ReceiveDescriptor,
    },
}

impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::SendEvent { target, event, .. } => {
                write!(f, "SendEvent {{ target: {target:?}, event: {event} }}")
            }
            Effect::CreateActor { id, .. } => write!(f, "CreateActor {{ id: {id:?} }}"),
            Effect::InvokeMonitor { monitor_type, event } => {
                write!(f, "InvokeMonitor {{ monitor_type: {monitor_type}, event: {event} }}")
            }
            Effect::Assert { condition, message } => {
                write!(f, "Assert {{ condition: {condition}, message: {message} }}")
            }
            Effect::StartTimer { info, delay_steps } => {
                write!(f, "StartTimer {{ info: {info:?}, delay_steps: {delay_steps} }}")
            }
            Effect::StopTimer { id } => write!(f, "StopTimer {{ id: {id:?} }}"),
            Effect::Receive { descriptor } => write!(f, "Receive {{ descriptor: {descriptor:?} }}"),
        }
    }
}

/// Per-handler-invocation context: identity, group, and the effect/raise
/// outbox drained by the dispatch engine.
pub struct ActorContext {
    id: ActorId,
    current_group: EventGroup,
    created_at: DateTime<Utc>,
    current_state: Option<StateId>,
    effects: Vec<Effect>,
    raise_request: Option<Event>,
    next_timer: u64,
}

impl ActorContext {
    pub fn new(id: ActorId) -> Self {
        Self {
            id,
            current_group: EventGroup::NULL,
            created_at: Utc::now(), // §3.2
            current_state: None,
            effects: Vec::new(),
            raise_request: None,
            next_timer: 1,
        }
    }

    pub fn id(&self) -> &ActorId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The correlation group this actor observed while handling the event
    /// currently in progress (`spec.md` §3's "Group inheritance").
    pub fn current_group(&self) -> EventGroup {
        self.current_group
    }

    pub fn set_current_group(&mut self, group: EventGroup) {
        self.current_group = group;
    }

    pub fn current_state(&self) -> Option<StateId> {
        self.current_state
    }

    pub(crate) fn set_current_state(&mut self, state: StateId) {
        self.current_state = Some(state);
    }

    /// `SendEvent(target, event, group?, options?)`.
    pub fn send_event(&mut self, target: ActorId, event: Event) {
        self.send_event_with(target, event, None, false);
    }

    pub fn send_event_with(
        &mut self,
        target: ActorId,
        event: Event,
        group: Option<EventGroup>,
        must_handle: bool,
    ) {
        self.effects.push(Effect::SendEvent {
            target,
            event,
            group,
            must_handle,
        });
    }

    /// `CreateActor(type, name?, initialEvent?, group?) -> ActorId`.
    ///
    /// The id is allocated immediately (a cheap atomic increment); the
    /// spawn itself is realized by the engine when it drains effects and
    /// calls the factory built from `machine`.
    pub fn create_actor<M, F>(
        &mut self,
        type_name: impl Into<String>,
        name: Option<String>,
        build: F,
        initial_event: Option<Event>,
        group: Option<EventGroup>,
    ) -> ActorId
    where
        M: StateMachine,
        F: FnOnce() -> M + Send + 'static,
    {
        let id = ActorId::new(type_name, name);
        let factory: Box<dyn FnOnce(ActorId) -> Box<dyn DynActor> + Send> =
            Box::new(move |child_id| Box::new(BoxedActor::new(child_id, build())));
        self.effects.push(Effect::CreateActor {
            id: id.clone(),
            factory,
            initial_event,
            group,
        });
        id
    }

    /// `RaiseEvent(e)`: completes the current action and schedules `e` to
    /// be the very next event dispatched.
    pub fn raise_event(&mut self, event: Event) {
        assert!(self.raise_request.is_none(), "Raise called twice within one handler");
        self.raise_request = Some(event);
    }

    pub fn raise_goto_state(&mut self, target: StateId) {
        self.raise_event(Event::GotoState(target));
    }

    pub fn raise_push_state(&mut self, target: StateId) {
        self.raise_event(Event::PushState(target));
    }

    pub fn raise_pop_state(&mut self) {
        self.raise_event(Event::PopState);
    }

    pub fn raise_halt(&mut self) {
        self.raise_event(Event::Halt);
    }

    pub fn start_timer(&mut self, periodic: bool, delay_steps: u64) -> TimerId {
        let id = TimerId(self.next_timer);
        self.next_timer += 1;
        self.effects.push(Effect::StartTimer {
            info: TimerInfo { id, periodic },
            delay_steps,
        });
        id
    }

    pub fn stop_timer(&mut self, id: TimerId) {
        self.effects.push(Effect::StopTimer { id });
    }

    pub fn invoke_monitor(&mut self, monitor_type: impl Into<String>, event: Event) {
        self.effects.push(Effect::InvokeMonitor {
            monitor_type: monitor_type.into(),
            event,
        });
    }

    pub fn assert(&mut self, condition: bool, message: impl Into<String>) {
        self.effects.push(Effect::Assert {
            condition,
            message: message.into(),
        });
    }

    /// `ReceiveEventAsync(types, predicate?)`: suspend the current handler
    /// call until an event matching `types` (and, if given, `predicate`) is
    /// available, resuming with that event delivered directly to
    /// [`StateMachine::on_event`] on a later scheduling point (`spec.md`
    /// §6, §4.2's "receive suspension").
    pub fn receive_event_async(
        &mut self,
        types: HashSet<EventTypeId>,
        predicate: Option<Box<dyn Fn(&Event) -> bool + Send + Sync>>,
    ) {
        assert!(
            !self.effects.iter().any(|e| matches!(e, Effect::Receive { .. })),
            "ReceiveEventAsync called twice within one handler"
        );
        self.effects.push(Effect::Receive {
            descriptor: ReceiveDescriptor { types, predicate },
        });
    }

    /// Drain accumulated effects for the engine to apply.
    pub(crate) fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub(crate) fn take_raise(&mut self) -> Option<Event> {
        self.raise_request.take()
    }

    /// Pull any `Receive` request out of the effect outbox before the rest
    /// reaches the engine — a receive is resolved against the issuing
    /// actor's own inbox, never routed through the runtime's cross-actor
    /// effect application.
    pub(crate) fn take_receive_request(&mut self) -> Option<ReceiveDescriptor> {
        let idx = self.effects.iter().position(|e| matches!(e, Effect::Receive { .. }))?;
        match self.effects.remove(idx) {
            Effect::Receive { descriptor } => Some(descriptor),
            _ => unreachable!("index matched by the same predicate above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_twice_in_one_handler_panics() {
        let mut ctx = ActorContext::new(ActorId::new("Test", None));
        ctx.raise_event(Event::Halt);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            ctx.raise_event(Event::PopState);
        }));
        assert!(result.is_err());
    }

    struct Reply;

    #[test]
    fn receive_twice_in_one_handler_panics() {
        let mut ctx = ActorContext::new(ActorId::new("Test", None));
        let mut types = HashSet::new();
        types.insert(EventTypeId::of::<Reply>());
        ctx.receive_event_async(types.clone(), None);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            ctx.receive_event_async(types, None);
        }));
        assert!(result.is_err());
    }

    #[test]
    fn receive_request_is_pulled_out_ahead_of_other_effects() {
        let mut ctx = ActorContext::new(ActorId::new("Test", None));
        ctx.assert(true, "fine");
        let mut types = HashSet::new();
        types.insert(EventTypeId::of::<Reply>());
        ctx.receive_event_async(types, None);

        let descriptor = ctx.take_receive_request();
        assert!(descriptor.is_some());
        assert!(ctx.take_receive_request().is_none(), "already drained");

        let remaining = ctx.take_effects();
        assert_eq!(remaining.len(), 1);
        assert!(matches!(remaining[0], Effect::Assert { .. }));
    }

    #[derive(Debug)]
    struct NeverFails;
    impl std::fmt::Display for NeverFails {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "never fails")
        }
    }
    impl std::error::Error for NeverFails {}

    struct Child;

    #[async_trait::async_trait]
    impl StateMachine for Child {
        type Error = NeverFails;

        fn state_table() -> crate::actor::state::StateTable {
            crate::actor::state::StateTableBuilder::new()
                .state(crate::actor::state::StateDecl::new("Init"))
                .finalize("Init")
                .unwrap()
        }

        async fn on_event(&mut self, _ctx: &mut ActorContext, _state: StateId, _event: &Event) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn create_actor_allocates_id_before_engine_realizes_it() {
        let mut ctx = ActorContext::new(ActorId::new("Parent", None));
        let child = ctx.create_actor("Child", None, || Child, None, None);
        let effects = ctx.take_effects();
        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::CreateActor { id, .. } => assert_eq!(id, &child),
            _ => panic!("expected CreateActor effect"),
        }
    }

    #[test]
    fn group_inheritance_is_readable_during_handling() {
        let mut ctx = ActorContext::new(ActorId::new("Test", None));
        let g = EventGroup::new();
        ctx.set_current_group(g);
        assert_eq!(ctx.current_group(), g);
    }
}
