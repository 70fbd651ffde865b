#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
//! # weft - a systematic concurrency testing core for actor- and task-based programs
//!
//! `weft` drives a program built from hierarchical state-machine actors
//! through many controlled, seeded interleavings of its asynchronous
//! operations, looking for bugs that depend on scheduling order — deadlocks,
//! dropped must-handle events, assertion failures, and liveness violations —
//! and reproduces any failure bitwise from its recorded trace.
//!
//! # Quick Start
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
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut runtime = ControlledRuntime::with_noop_observer(EngineConfig::default());
//!     let id = runtime
//!         .create_actor_and_execute_async("Greeter", None, || Greeter, Some(Event::user(Ping)), None)
//!         .await
//!         .unwrap();
//!     assert!(runtime.is_halted(&id));
//! }
//! ```
//!
//! # Module Organization
//!
//! ## Actor model
//! - [`event`] - the closed [`event::Event`] vocabulary and its queued form
//! - [`inbox`] - per-actor FIFO plus raised-event slot
//! - [`actor`] - hierarchical state-machine dispatch (`StateMachine`, `ActorContext`, `DynActor`)
//! - [`operation`] - the schedulable-unit registry the scheduler chooses between
//!
//! ## Exploration
//! - [`scheduler`] - pluggable scheduling algorithms (random, probabilistic, prioritization, portfolio, DFS, reinforcement learning)
//! - [`monitor`] - safety/liveness specification automata
//! - [`coverage`] - the incremental coverage graph builder
//! - [`trace`] - trace recording and bitwise replay
//!
//! ## Infrastructure
//! - [`runtime`] - [`runtime::ControlledRuntime`], the single-threaded scheduling loop
//! - [`observability`] - a universal sink for the runtime's externally visible steps
//! - [`util`] - identity types shared across the engine (`ActorId`, `OperationId`, `EventGroup`)
//!
//! # Architecture Principles
//!
//! ## Single-threaded determinism
//! At most one operation executes at a time, by construction: the
//! [`runtime::ControlledRuntime`] drives every actor's dispatch loop itself
//! rather than spawning a task per actor, so a recorded seed and strategy
//! reproduce a failure bitwise.
//!
//! ## Two deliberate `dyn` seams
//! [`actor::DynActor`] lets the runtime hold actors of every concrete
//! [`actor::StateMachine`] type in one registry; [`monitor::MonitorCell`]
//! does the same for [`monitor::Monitor`] types. Both are kept to the
//! minimal surface the runtime actually needs.
//!
//! ## Effects over direct calls
//! Handler code never touches the runtime or another actor's inbox
//! directly; it records an [`actor::Effect`] on its [`actor::ActorContext`],
//! and the engine applies it after the handler returns, preserving
//! "exactly one operation runs at a time" even while handler code looks
//! like ordinary sequential Rust.

pub mod actor;
pub mod coverage;
pub mod event;
pub mod inbox;
pub mod monitor;
pub mod observability;
pub mod operation;
pub mod prelude;
pub mod runtime;
pub mod scheduler;
pub mod trace;
pub mod util;

pub use actor::{
    ActorContext, ActorLifecycle, BoxedActor, DispatchFault, DynActor, Effect, ExecutionStatus,
    HandlerKind, OnExceptionOutcome, StateDecl, StateId, StateMachine, StateTable,
    StateTableBuilder, StateTableError, StepOutcome,
};
pub use coverage::{CoverageBuilder, CoverageGraph, Link, LinkIndex, LinkKind, Node, NodeIndex, NodeKind};
pub use event::{DeliveryRequirement, Event, EventMetadata, EventTypeId, QueuedEvent, TimerId, TimerInfo, UserEvent};
pub use inbox::{DequeueStatus, EnqueueStatus, EventQueue, Inbox, InboxMetrics, ReceiveDescriptor};
pub use monitor::{Monitor, MonitorCell, MonitorCellImpl, MonitorError, MonitorInstance};
pub use observability::{
    actor_created, EventSeverity, InMemoryObserver, NoopObserver, Observer, ObserverError, ObserverEvent,
};
pub use operation::{Operation, OperationKind, OperationRegistry, OperationStatus, SchedulingPointKind};
pub use runtime::{ControlledRuntime, EngineConfig, EngineConfigBuilder, EngineError, StrategyKind};
pub use scheduler::{
    DfsStrategy, PortfolioStrategy, PrioritizationStrategy, ProbabilisticStrategy, RandomStrategy,
    ReinforcementLearningStrategy, SchedulerError, SchedulingStrategy,
};
pub use trace::{NondetChoice, ReplayStrategy, TraceFile, TraceRecord, TraceRecorder, TRACE_FORMAT_VERSION};
pub use util::{ActorId, EventGroup, OperationId};
