//! The hierarchical state-machine dispatch engine (`spec.md` §4.2).
//!
//! [`ActorInstance`] owns one actor's inbox, state stack, and user
//! [`StateMachine`] value, and advances it one dequeue at a time via
//! [`ActorInstance::step`] — exactly one scheduling point's worth of work,
//! matching the "at most one operation executes at a time" rule in
//! `spec.md` §4.3. The surrounding runtime decides *when* to call `step`;
//! this module only knows how to dispatch a single event correctly.

// Layer 1: Standard library imports
use std::collections::HashSet;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::context::{ActorContext, Effect};
use super::lifecycle::{ActorLifecycle, ExecutionStatus};
use super::state::{HandlerKind, StateId, StateTable};
use super::traits::{OnExceptionOutcome, StateMachine};
#[cfg(test)]
use crate::event::EventTypeId;
use crate::event::{Event, QueuedEvent};
use crate::inbox::{DequeueStatus, EventQueue, Inbox};
use crate::util::ActorId;

/// What happened during one [`ActorInstance::step`] call.
#[derive(Debug)]
pub enum StepOutcome {
    /// An event was dispatched (handled, ignored-by-fallthrough, or
    /// transitioned) without error.
    Dispatched,
    /// The actor reached `Halted`.
    Halted,
    /// Nothing was available to dequeue; the actor goes idle until its
    /// next enqueue.
    Idle,
    /// An unrecoverable dispatch error the host must surface as an
    /// `AssertionFailure` (`spec.md` §7).
    Fatal(DispatchFault),
}

/// Context captured when a dispatch error must end the iteration.
#[derive(Debug)]
pub struct DispatchFault {
    pub state: StateId,
    pub event: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// One live actor: identity, inbox, state stack, and the user's state
/// machine value.
pub struct ActorInstance<M: StateMachine> {
    pub id: ActorId,
    pub machine: M,
    pub inbox: Inbox,
    pub lifecycle: ActorLifecycle,
    table: StateTable,
    stack: Vec<StateId>,
}

impl<M: StateMachine> ActorInstance<M> {
    pub fn new(id: ActorId, machine: M) -> Self {
        let table = M::state_table();
        let initial = table.initial();
        let mut inbox = Inbox::new();
        inbox.set_has_default_handler(M::has_default_handler());
        let mut instance = Self {
            id,
            machine,
            inbox,
            lifecycle: ActorLifecycle::new(),
            table,
            stack: vec![initial],
        };
        instance.apply_state_entry_sets();
        instance
    }

    pub fn current_state(&self) -> StateId {
        *self.stack.last().expect("state stack is never empty while active")
    }

    pub fn state_name(&self, id: StateId) -> &str {
        self.table.name_of(id)
    }

    fn apply_state_entry_sets(&mut self) {
        let node = self.table.state(self.current_state());
        let mut deferred = HashSet::new();
        let mut ignored = HashSet::new();
        for (ty, kind) in &node.effective {
            match kind {
                HandlerKind::Defer => {
                    deferred.insert(*ty);
                }
                HandlerKind::Ignore => {
                    ignored.insert(*ty);
                }
                _ => {}
            }
        }
        self.inbox.set_deferred(deferred);
        self.inbox.set_ignored(ignored);
    }

    /// Call `on_initialize` then the initial state's entry handler. A
    /// `Raise` recorded during either is drained into the inbox here, the
    /// same way [`ActorInstance::finish_step`] does after a later
    /// dispatch — otherwise an entry-time raise (`spec.md` §8 scenario 1)
    /// would sit in `ctx` forever since nothing else calls `finish_step`
    /// before the first real dequeue.
    pub async fn initialize(&mut self, ctx: &mut ActorContext) -> Result<(), M::Error> {
        self.machine.on_initialize(ctx).await?;
        let initial = self.current_state();
        ctx.set_current_state(initial);
        self.machine.on_entry(ctx, initial).await?;
        if let Some(raised) = ctx.take_raise() {
            self.inbox.raise(raised, ctx.current_group());
        }
        Ok(())
    }

    async fn begin_halt(&mut self, ctx: &mut ActorContext) {
        self.lifecycle.transition_to(ExecutionStatus::Halting);
        self.machine.on_halt(ctx).await;
        self.inbox.close();
        self.lifecycle.transition_to(ExecutionStatus::Halted);
    }

    /// `Goto(target)`: exit every frame on the stack down to (not
    /// including) the lowest common ancestor of the currently active state
    /// and `target`, then enter `target` (`spec.md` §4.2 item 4). A `Push`
    /// earlier in the run can leave several frames on `self.stack`; all of
    /// them above the LCA are unwound, not just the innermost one. The LCA
    /// is matched only against states actually present on the stack — an
    /// ancestor that was never itself pushed never halts the unwind early,
    /// since it was never an explicit frame to begin with.
    async fn perform_goto(&mut self, target: StateId, ctx: &mut ActorContext) -> Result<(), M::Error> {
        let lca = self.table.lowest_common_ancestor(self.current_state(), target);
        loop {
            let Some(&top) = self.stack.last() else {
                break;
            };
            if Some(top) == lca {
                break;
            }
            self.stack.pop();
            self.machine.on_exit(ctx, top).await?;
        }
        self.stack.push(target);
        self.apply_state_entry_sets();
        ctx.set_current_state(target);
        self.machine.on_entry(ctx, target).await
    }

    async fn perform_push(&mut self, target: StateId, ctx: &mut ActorContext) -> Result<(), M::Error> {
        self.stack.push(target);
        self.apply_state_entry_sets();
        ctx.set_current_state(target);
        self.machine.on_entry(ctx, target).await
    }

    /// Advance the actor by exactly one dequeue. Returns effects the
    /// handler recorded on `ctx`, drained by the caller after this call.
    pub async fn step(&mut self, ctx: &mut ActorContext) -> StepOutcome {
        if self.lifecycle.is_halted() {
            return StepOutcome::Halted;
        }

        if let Some(queued) = self.inbox.take_receive_result() {
            return self.dispatch_receive_result(queued, ctx).await;
        }

        let (status, queued) = self.inbox.dequeue();
        let queued: QueuedEvent = match status {
            DequeueStatus::Unavailable => return StepOutcome::Idle,
            _ => queued.expect("non-Unavailable dequeue always carries an event"),
        };

        ctx.set_current_group(queued.group);
        self.machine.on_event_dequeued(ctx, &queued.event).await;
        let event = queued.event;

        match event {
            Event::Halt => {
                self.begin_halt(ctx).await;
                return StepOutcome::Halted;
            }
            Event::PopState => {
                if self.stack.len() <= 1 {
                    // Open question resolved in SPEC_FULL.md §9: popping
                    // the last frame halts gracefully instead of erroring.
                    self.begin_halt(ctx).await;
                    return StepOutcome::Halted;
                }
                self.stack.pop();
                self.apply_state_entry_sets();
                ctx.set_current_state(self.current_state());
                self.machine.on_event_handled(ctx, &Event::PopState).await;
                return self.finish_step(ctx);
            }
            Event::GotoState(target) => {
                let result = self.perform_goto(target, ctx).await;
                let state = self.current_state();
                return self.finish_result(result, ctx, state, "GotoState").await;
            }
            Event::PushState(target) => {
                let result = self.perform_push(target, ctx).await;
                let state = self.current_state();
                return self.finish_result(result, ctx, state, "PushState").await;
            }
            Event::Default => {
                let state = self.current_state();
                let result = self.machine.on_default_event(ctx, &Event::Default).await;
                return self.finish_result(result, ctx, state, "Default").await;
            }
            other => {
                let state = self.current_state();
                let handler = self.table.lookup(state, other.event_type());
                match handler {
                    Some(HandlerKind::Do) => {
                        let result = self.machine.on_event(ctx, state, &other).await;
                        self.finish_result(result, ctx, state, &other.to_string()).await
                    }
                    Some(HandlerKind::Goto(target)) => {
                        let result = self.perform_goto(target, ctx).await;
                        self.finish_result(result, ctx, state, &other.to_string()).await
                    }
                    Some(HandlerKind::Push(target)) => {
                        let result = self.perform_push(target, ctx).await;
                        self.finish_result(result, ctx, state, &other.to_string()).await
                    }
                    Some(HandlerKind::Defer) | Some(HandlerKind::Ignore) => {
                        // The inbox filters these before they ever reach
                        // dispatch; reaching here means its defer/ignore
                        // sets are stale.
                        debug_assert!(false, "defer/ignore event reached dispatch");
                        self.finish_step(ctx)
                    }
                    None => {
                        if M::has_default_handler() {
                            let result = self.machine.on_default_event(ctx, &other).await;
                            self.finish_result(result, ctx, state, &other.to_string()).await
                        } else {
                            let outcome = self.machine.on_event_unhandled(ctx, &other).await;
                            self.apply_exception_outcome(outcome, ctx, state, &other.to_string(), None).await
                        }
                    }
                }
            }
        }
    }

    async fn finish_result(
        &mut self,
        result: Result<(), M::Error>,
        ctx: &mut ActorContext,
        state: StateId,
        event_desc: &str,
    ) -> StepOutcome {
        match result {
            Ok(()) => {
                self.machine.on_event_handled(ctx, &Event::Default).await;
                self.finish_step(ctx)
            }
            Err(e) => {
                let outcome = self.machine.on_exception(ctx, &e).await;
                self.apply_exception_outcome(outcome, ctx, state, event_desc, Some(Box::new(e)))
                    .await
            }
        }
    }

    async fn apply_exception_outcome(
        &mut self,
        outcome: OnExceptionOutcome,
        ctx: &mut ActorContext,
        state: StateId,
        event_desc: &str,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> StepOutcome {
        match outcome {
            OnExceptionOutcome::RethrowException => StepOutcome::Fatal(DispatchFault {
                state,
                event: event_desc.to_string(),
                source,
            }),
            OnExceptionOutcome::HandledException => self.finish_step(ctx),
            OnExceptionOutcome::Halt => {
                // begin_halt is async; callers of this sync-looking helper
                // already awaited everything else, so do it inline here.
                self.lifecycle.transition_to(ExecutionStatus::Halting);
                self.inbox.close();
                self.lifecycle.transition_to(ExecutionStatus::Halted);
                StepOutcome::Halted
            }
        }
    }

    fn finish_step(&mut self, ctx: &mut ActorContext) -> StepOutcome {
        if let Some(raised) = ctx.take_raise() {
            self.inbox.raise(raised, ctx.current_group());
        }
        if let Some(descriptor) = ctx.take_receive_request() {
            if let Some(queued) = self.inbox.receive_async(descriptor) {
                // Already satisfiable from the FIFO: stash it so the very
                // next `step` delivers it, instead of recursing into
                // dispatch from inside this one (`spec.md` §4.1's
                // "ReceiveAsync": "extract and return it immediately").
                self.inbox.set_receive_result(queued);
            }
        }
        StepOutcome::Dispatched
    }

    /// Deliver an event that satisfied a pending `ReceiveEventAsync`
    /// straight to [`StateMachine::on_event`], bypassing the defer/ignore
    /// and handler-table filtering `dequeue` applies to ordinary FIFO
    /// entries (`spec.md` §4.1: "bypasses state-dispatch").
    async fn dispatch_receive_result(&mut self, queued: QueuedEvent, ctx: &mut ActorContext) -> StepOutcome {
        ctx.set_current_group(queued.group);
        self.machine.on_event_dequeued(ctx, &queued.event).await;
        let state = self.current_state();
        let result = self.machine.on_event(ctx, state, &queued.event).await;
        self.finish_result(result, ctx, state, &queued.event.to_string()).await
    }

    /// Drain effects recorded by the handler that just ran.
    pub fn take_effects(ctx: &mut ActorContext) -> Vec<Effect> {
        ctx.take_effects()
    }

    pub fn is_halted(&self) -> bool {
        self.lifecycle.is_halted()
    }

    pub fn is_idle(&self) -> bool {
        self.inbox.is_empty() && !self.inbox.is_paused_on_receive() && !self.inbox.has_receive_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::state::{StateDecl, StateTableBuilder};
    use async_trait::async_trait;
    use std::fmt;

    #[derive(Debug)]
    struct NeverFails;
    impl fmt::Display for NeverFails {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "never fails")
        }
    }
    impl std::error::Error for NeverFails {}

    struct Ping;
    struct Pop;

    struct Toggle {
        log: Vec<&'static str>,
    }

    #[async_trait]
    impl StateMachine for Toggle {
        type Error = NeverFails;

        fn state_table() -> StateTable {
            StateTableBuilder::new()
                .state(StateDecl::new("Init").on_entry().handle::<Ping>(HandlerKind::Goto(StateId(1))).unwrap())
                .state(StateDecl::new("Final").on_entry().handle::<Pop>(HandlerKind::Do).unwrap())
                .finalize("Init")
                .unwrap()
        }

        async fn on_event(&mut self, _ctx: &mut ActorContext, _state: StateId, _event: &Event) -> Result<(), Self::Error> {
            self.log.push("on_event");
            Ok(())
        }

        async fn on_entry(&mut self, _ctx: &mut ActorContext, state: StateId) -> Result<(), Self::Error> {
            self.log.push(if state.0 == 0 { "enter_init" } else { "enter_final" });
            Ok(())
        }
    }

    #[tokio::test]
    async fn goto_via_table_transitions_and_calls_entry() {
        let id = ActorId::new("Toggle", None);
        let mut instance = ActorInstance::new(id, Toggle { log: vec![] });
        let mut ctx = ActorContext::new(instance.id.clone());
        instance.initialize(&mut ctx).await.unwrap();
        assert_eq!(instance.machine.log, vec!["enter_init"]);

        instance.inbox.enqueue(Event::user(Ping), crate::util::EventGroup::NULL, false);
        let outcome = instance.step(&mut ctx).await;
        assert!(matches!(outcome, StepOutcome::Dispatched));
        assert_eq!(instance.current_state(), StateId(1));
        assert_eq!(instance.machine.log, vec!["enter_init", "enter_final"]);
    }

    #[tokio::test]
    async fn pop_on_single_frame_halts_gracefully() {
        let id = ActorId::new("Toggle", None);
        let mut instance = ActorInstance::new(id, Toggle { log: vec![] });
        let mut ctx = ActorContext::new(instance.id.clone());
        instance.initialize(&mut ctx).await.unwrap();

        instance.inbox.raise(Event::PopState, crate::util::EventGroup::NULL);
        let outcome = instance.step(&mut ctx).await;
        assert!(matches!(outcome, StepOutcome::Halted));
        assert!(instance.is_halted());
    }

    #[tokio::test]
    async fn raise_in_handler_is_dispatched_next() {
        struct Raiser;
        #[async_trait]
        impl StateMachine for Raiser {
            type Error = NeverFails;

            fn state_table() -> StateTable {
                StateTableBuilder::new()
                    .state(StateDecl::new("Init").handle::<Ping>(HandlerKind::Do).unwrap().handle::<Pop>(HandlerKind::Do).unwrap())
                    .finalize("Init")
                    .unwrap()
            }

            async fn on_event(&mut self, ctx: &mut ActorContext, _state: StateId, event: &Event) -> Result<(), Self::Error> {
                if event.event_type() == EventTypeId::of::<Ping>() {
                    ctx.raise_event(Event::user(Pop));
                }
                Ok(())
            }
        }

        let id = ActorId::new("Raiser", None);
        let mut instance = ActorInstance::new(id, Raiser);
        let mut ctx = ActorContext::new(instance.id.clone());
        instance.initialize(&mut ctx).await.unwrap();

        instance.inbox.enqueue(Event::user(Ping), crate::util::EventGroup::NULL, false);
        instance.step(&mut ctx).await;

        let (status, queued) = instance.inbox.dequeue();
        assert_eq!(status, DequeueStatus::Raised);
        assert_eq!(queued.unwrap().event.event_type(), EventTypeId::of::<Pop>());
    }

    struct Wanted;

    struct Waiter {
        log: Vec<&'static str>,
    }

    #[async_trait]
    impl StateMachine for Waiter {
        type Error = NeverFails;

        fn state_table() -> StateTable {
            StateTableBuilder::new()
                .state(StateDecl::new("Init").handle::<Ping>(HandlerKind::Do).unwrap())
                .finalize("Init")
                .unwrap()
        }

        async fn on_event(&mut self, ctx: &mut ActorContext, _state: StateId, event: &Event) -> Result<(), Self::Error> {
            if event.event_type() == EventTypeId::of::<Ping>() {
                let mut types = HashSet::new();
                types.insert(EventTypeId::of::<Wanted>());
                ctx.receive_event_async(types, None);
                self.log.push("asked");
            } else {
                self.log.push("resumed");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn receive_is_satisfied_immediately_when_already_queued() {
        let id = ActorId::new("Waiter", None);
        let mut instance = ActorInstance::new(id, Waiter { log: vec![] });
        let mut ctx = ActorContext::new(instance.id.clone());
        instance.initialize(&mut ctx).await.unwrap();

        instance.inbox.enqueue(Event::user(Wanted), crate::util::EventGroup::NULL, false);
        instance.inbox.enqueue(Event::user(Ping), crate::util::EventGroup::NULL, false);

        instance.step(&mut ctx).await;
        assert_eq!(instance.machine.log, vec!["asked"]);
        assert!(!instance.inbox.is_paused_on_receive(), "already-queued match resolves without suspending");

        let outcome = instance.step(&mut ctx).await;
        assert!(matches!(outcome, StepOutcome::Dispatched));
        assert_eq!(instance.machine.log, vec!["asked", "resumed"]);
    }

    #[tokio::test]
    async fn receive_suspends_then_resumes_on_a_later_enqueue() {
        let id = ActorId::new("Waiter", None);
        let mut instance = ActorInstance::new(id, Waiter { log: vec![] });
        let mut ctx = ActorContext::new(instance.id.clone());
        instance.initialize(&mut ctx).await.unwrap();

        instance.inbox.enqueue(Event::user(Ping), crate::util::EventGroup::NULL, false);
        instance.step(&mut ctx).await;
        assert_eq!(instance.machine.log, vec!["asked"]);
        assert!(instance.inbox.is_paused_on_receive());
        assert!(!instance.is_idle(), "paused-on-receive is its own status, not idle");

        instance.inbox.enqueue(Event::user(Wanted), crate::util::EventGroup::NULL, false);
        assert!(!instance.inbox.is_paused_on_receive(), "matching enqueue resolves the receive");

        let outcome = instance.step(&mut ctx).await;
        assert!(matches!(outcome, StepOutcome::Dispatched));
        assert_eq!(instance.machine.log, vec!["asked", "resumed"]);
    }
}
