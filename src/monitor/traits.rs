//! The [`Monitor`] trait: safety/liveness specification automata that
//! observe events synchronously but never send them (`spec.md` §4.4).

// Layer 1: Standard library imports
use std::collections::HashSet;
use std::error::Error;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::actor::{StateId, StateTable};
use crate::event::Event;

/// A specification automaton invoked synchronously via `Monitor(type,
/// event)`. Unlike [`crate::actor::StateMachine`], a monitor has no inbox
/// and is never itself a scheduling point: every invocation runs to
/// completion inline on the caller's step.
///
/// Monitor transitions are flat `Goto`-only (`spec.md` §4.4: "mirror
/// StateMachine transitions, but with no inbox and no scheduling") — a
/// monitor has no push/pop stack, since nothing ever needs to resume a
/// suspended monitor state.
pub trait Monitor: Send + Sync + 'static {
    type Error: Error + Send + Sync + 'static;

    fn state_table() -> StateTable
    where
        Self: Sized;

    /// States whose persistence raises liveness temperature
    /// (`spec.md` §4.4, §4.3's "Liveness-temperature threshold").
    fn hot_states() -> HashSet<StateId>
    where
        Self: Sized;

    /// Handle one observed event in `state`. A `Goto` handler in the
    /// state table transitions the monitor directly; a `Do` handler
    /// invokes this method for domain-specific assertions.
    fn on_event(&mut self, state: StateId, event: &Event) -> Result<(), Self::Error>;

    fn on_entry(&mut self, _state: StateId) {}
}
