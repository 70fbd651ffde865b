//! Hierarchical state-machine actors: identity-free dispatch over a
//! [`crate::inbox::Inbox`], per `spec.md` §4.2.
//!
//! - [`traits`] — the [`StateMachine`] trait implementors provide.
//! - [`state`] — the static `(state, event) -> action` table.
//! - [`context`] — the actor-facing API (`ActorContext`/`Effect`).
//! - [`lifecycle`] — [`ExecutionStatus`] and its transitions.
//! - [`machine`] — [`ActorInstance`], the per-actor dispatch loop.
//! - [`dynamic`] — [`DynActor`], the type-erased handle the runtime registry holds.

pub mod context;
pub mod dynamic;
pub mod lifecycle;
pub mod machine;
pub mod state;
pub mod traits;

pub use context::{ActorContext, Effect};
pub use dynamic::{BoxedActor, DynActor};
pub use lifecycle::{ActorLifecycle, ExecutionStatus};
pub use machine::{ActorInstance, DispatchFault, StepOutcome};
pub use state::{HandlerKind, StateDecl, StateId, StateTable, StateTableBuilder, StateTableError};
pub use traits::{OnExceptionOutcome, StateMachine};
