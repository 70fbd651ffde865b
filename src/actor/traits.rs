//! The [`StateMachine`] trait actors implement, and the outcomes it can
//! return from its callbacks (`spec.md` §4.2, "Callbacks").

// Layer 1: Standard library imports
use std::error::Error;

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::context::ActorContext;
use super::state::{StateId, StateTable};
use crate::event::Event;

/// What the runtime should do after an action raises an error, or after
/// dispatch finds no handler for an event (`spec.md` §4.2, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnExceptionOutcome {
    /// Wrap the error with operation/state/action context and fail the
    /// iteration.
    RethrowException,
    /// Treat the error as handled; dispatch continues normally.
    HandledException,
    /// Begin a graceful halt.
    Halt,
}

/// A hierarchical state machine actor.
///
/// Implementors provide the static [`StateTable`] once (built lazily and
/// cached per type by the runtime, `spec.md` §9's per-runtime class
/// registry) and the single [`StateMachine::on_event`] reducer that runs
/// whenever dispatch resolves a state's handler to [`crate::actor::state::HandlerKind::Do`].
/// Goto/push/pop transitions declared in the table are carried out by the
/// engine directly and never reach `on_event`.
#[async_trait]
pub trait StateMachine: Send + Sync + 'static {
    type Error: Error + Send + Sync + 'static;

    /// Build (or rebuild) this type's state tree. Called once per type and
    /// cached; must be a pure function of the type, not of `self`.
    fn state_table() -> StateTable
    where
        Self: Sized;

    /// Invoked when dispatch resolves the current state's handler for
    /// `event` to `Do`, including resolution via wildcard.
    async fn on_event(&mut self, ctx: &mut ActorContext, state: StateId, event: &Event) -> Result<(), Self::Error>;

    /// Class-level default handler (`spec.md` §4.2 step 2's final
    /// fallback). Also invoked for the synthetic [`Event::Default`].
    async fn on_default_event(&mut self, _ctx: &mut ActorContext, _event: &Event) -> Result<(), Self::Error> {
        Ok(())
    }

    /// True if [`StateMachine::on_default_event`] is overridden; used by
    /// the inbox to decide whether it may synthesize a default dequeue.
    /// Override alongside `on_default_event` when installing one.
    fn has_default_handler() -> bool
    where
        Self: Sized,
    {
        false
    }

    async fn on_initialize(&mut self, _ctx: &mut ActorContext) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn on_entry(&mut self, _ctx: &mut ActorContext, _state: StateId) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn on_exit(&mut self, _ctx: &mut ActorContext, _state: StateId) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn on_event_dequeued(&mut self, _ctx: &mut ActorContext, _event: &Event) {}

    async fn on_event_handled(&mut self, _ctx: &mut ActorContext, _event: &Event) {}

    async fn on_event_ignored(&mut self, _ctx: &mut ActorContext, _event: &Event) {}

    async fn on_event_deferred(&mut self, _ctx: &mut ActorContext, _event: &Event) {}

    async fn on_event_unhandled(&mut self, _ctx: &mut ActorContext, _event: &Event) -> OnExceptionOutcome {
        OnExceptionOutcome::RethrowException
    }

    async fn on_exception(&mut self, _ctx: &mut ActorContext, _error: &Self::Error) -> OnExceptionOutcome {
        OnExceptionOutcome::RethrowException
    }

    async fn on_halt(&mut self, _ctx: &mut ActorContext) {}
}
