//! Type-erased actor handles.
//!
//! The runtime holds many actor types at once inside a single registry,
//! which Rust cannot express with the generic [`ActorInstance<M>`] alone.
//! [`DynActor`] is the minimal object-safe surface the engine needs to
//! drive any actor without knowing its concrete [`StateMachine`] type —
//! the same necessary, deliberate dyn usage as [`crate::event::UserEvent`]'s
//! type-erased payload, kept to this one seam.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::context::{ActorContext, Effect};
use super::machine::{ActorInstance, StepOutcome};
use super::traits::StateMachine;
use crate::event::Event;
use crate::inbox::{EnqueueStatus, EventQueue};
use crate::util::{ActorId, EventGroup};

/// Object-safe handle to one live actor of any [`StateMachine`] type.
#[async_trait]
pub trait DynActor: Send {
    fn id(&self) -> &ActorId;

    fn enqueue(&mut self, event: Event, group: EventGroup, must_handle: bool) -> EnqueueStatus;

    fn raise(&mut self, event: Event, group: EventGroup);

    fn is_halted(&self) -> bool;

    fn is_idle(&self) -> bool;

    /// True while this actor sits on a `ReceiveEventAsync` with nothing
    /// queued to satisfy it — the runtime tracks this as its own
    /// [`crate::operation::OperationStatus::PausedOnReceive`] status since
    /// it isn't observable from [`DynActor::is_idle`] alone.
    fn is_paused_on_receive(&self) -> bool;

    fn current_state_name(&self) -> &str;

    /// The correlation group this actor observed while handling the event
    /// currently (or most recently) in progress — what an unset `group` on
    /// an outgoing [`Effect::SendEvent`] inherits (`spec.md` §3's "Group
    /// inheritance").
    fn current_group(&self) -> EventGroup;

    /// Run `on_initialize` and the initial state's entry handler,
    /// returning any effects they recorded. A structural error is
    /// reported as its `Display` text, since the caller has no way to
    /// name the concrete `M::Error` type.
    async fn initialize(&mut self) -> Result<Vec<Effect>, String>;

    /// Advance exactly one scheduling point, returning the outcome and
    /// any effects the handler recorded.
    async fn step(&mut self) -> (StepOutcome, Vec<Effect>);
}

/// Wraps one [`ActorInstance<M>`] with its own persistent [`ActorContext`]
/// behind the [`DynActor`] object-safe interface.
pub struct BoxedActor<M: StateMachine> {
    instance: ActorInstance<M>,
    ctx: ActorContext,
}

impl<M: StateMachine> BoxedActor<M> {
    pub fn new(id: ActorId, machine: M) -> Self {
        let ctx = ActorContext::new(id.clone());
        Self {
            instance: ActorInstance::new(id, machine),
            ctx,
        }
    }
}

#[async_trait]
impl<M: StateMachine> DynActor for BoxedActor<M> {
    fn id(&self) -> &ActorId {
        &self.instance.id
    }

    fn enqueue(&mut self, event: Event, group: EventGroup, must_handle: bool) -> EnqueueStatus {
        self.instance.inbox.enqueue(event, group, must_handle)
    }

    fn raise(&mut self, event: Event, group: EventGroup) {
        self.instance.inbox.raise(event, group);
    }

    fn is_halted(&self) -> bool {
        self.instance.is_halted()
    }

    fn is_idle(&self) -> bool {
        self.instance.is_idle()
    }

    fn is_paused_on_receive(&self) -> bool {
        self.instance.inbox.is_paused_on_receive()
    }

    fn current_state_name(&self) -> &str {
        self.instance.state_name(self.instance.current_state())
    }

    fn current_group(&self) -> EventGroup {
        self.ctx.current_group()
    }

    async fn initialize(&mut self) -> Result<Vec<Effect>, String> {
        self.instance
            .initialize(&mut self.ctx)
            .await
            .map_err(|e| e.to_string())?;
        Ok(ActorInstance::<M>::take_effects(&mut self.ctx))
    }

    async fn step(&mut self) -> (StepOutcome, Vec<Effect>) {
        let outcome = self.instance.step(&mut self.ctx).await;
        let effects = ActorInstance::<M>::take_effects(&mut self.ctx);
        (outcome, effects)
    }
}
