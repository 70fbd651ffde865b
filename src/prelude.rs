//! Prelude module for convenient imports.
//!
//! Re-exports the types most programs under test and their harnesses need.
//! Import this module to get started quickly:
//!
//! ```rust
//! use weft::prelude::*;
//! ```
//!
//! # What's Included
//!
//! ## Actor model
//! - [`StateMachine`] - the trait an actor implements
//! - [`ActorContext`] - the handler-facing effect/raise outbox
//! - [`Event`] - the closed event vocabulary, plus [`EventTypeId`]
//! - [`StateTable`], [`StateTableBuilder`], [`StateDecl`], [`HandlerKind`], [`StateId`] - building a state tree
//!
//! ## Runtime
//! - [`ControlledRuntime`] - the single-threaded scheduling loop
//! - [`EngineConfig`], [`EngineConfigBuilder`], [`StrategyKind`] - runtime tunables
//! - [`EngineError`] - the runtime's failure surface
//!
//! ## Scheduling and verification
//! - [`SchedulingStrategy`] - the pluggable interleaving algorithm interface
//! - [`Monitor`] - safety/liveness specification automata
//!
//! ## Identity
//! - [`ActorId`] - actor identity
//! - [`EventGroup`] - correlation group for causally related sends
//!
//! # Example
//!
//! ```rust
//! use weft::prelude::*;
//! use async_trait::async_trait;
//! use std::convert::Infallible;
//!
//! struct Ping;
//!
//! struct Greeter;
//!
//! #[async_trait]
//! impl StateMachine for Greeter {
//!     type Error = Infallible;
//!
//!     fn state_table() -> StateTable {
//!         StateTableBuilder::new()
//!             .state(StateDecl::new("Init").handle::<Ping>(HandlerKind::Do).unwrap())
//!             .finalize("Init")
//!             .unwrap()
//!     }
//!
//!     async fn on_event(&mut self, ctx: &mut ActorContext, _state: StateId, _event: &Event) -> Result<(), Self::Error> {
//!         ctx.raise_halt();
//!         Ok(())
//!     }
//! }
//! ```

// Actor model
pub use crate::actor::{
    ActorContext, HandlerKind, StateDecl, StateId, StateMachine, StateTable, StateTableBuilder,
};
pub use crate::event::{Event, EventTypeId};

// Runtime
pub use crate::runtime::{ControlledRuntime, EngineConfig, EngineConfigBuilder, EngineError, StrategyKind};

// Scheduling and verification
pub use crate::monitor::Monitor;
pub use crate::scheduler::SchedulingStrategy;

// Identity
pub use crate::util::{ActorId, EventGroup};
