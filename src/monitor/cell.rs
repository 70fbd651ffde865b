//! Type-erased monitor handles.
//!
//! The runtime holds many monitor types at once keyed by name, which Rust
//! cannot express with the generic [`MonitorInstance<M>`] alone. [`MonitorCell`]
//! is the minimal object-safe surface the engine needs to drive any
//! registered monitor without knowing its concrete [`Monitor`] type — the
//! same necessary, deliberate dyn seam as [`crate::actor::DynActor`].

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::instance::MonitorInstance;
use super::traits::Monitor;
use crate::event::Event;

/// Object-safe handle to one registered monitor of any [`Monitor`] type.
pub trait MonitorCell: Send {
    fn name(&self) -> &str;

    /// Process one observed event, returning its `Display` text on
    /// failure since the caller has no way to name the concrete
    /// `M::Error` type.
    fn process(&mut self, event: &Event) -> Result<(), String>;

    fn note_fair_step(&mut self);

    fn is_hot(&self) -> bool;

    fn temperature(&self) -> usize;
}

/// Wraps one [`MonitorInstance<M>`] behind the [`MonitorCell`] object-safe
/// interface.
pub struct MonitorCellImpl<M: Monitor>(MonitorInstance<M>);

impl<M: Monitor> MonitorCellImpl<M> {
    pub fn new(instance: MonitorInstance<M>) -> Self {
        Self(instance)
    }
}

impl<M: Monitor> MonitorCell for MonitorCellImpl<M> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn process(&mut self, event: &Event) -> Result<(), String> {
        self.0.process(event).map_err(|e| e.to_string())
    }

    fn note_fair_step(&mut self) {
        self.0.note_fair_step();
    }

    fn is_hot(&self) -> bool {
        self.0.is_hot()
    }

    fn temperature(&self) -> usize {
        self.0.temperature()
    }
}
