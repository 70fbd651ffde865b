//! [`MonitorInstance`]: the runtime wrapper that drives a [`Monitor`]
//! through its flat state table and tracks liveness temperature.

// Layer 1: Standard library imports
use std::collections::HashSet;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::actor::{HandlerKind, StateId, StateTable};
use crate::event::Event;

use super::traits::Monitor;

/// Failure surfaced from a monitor invocation (`spec.md` §4.4's
/// `OnMonitorError`).
#[derive(Debug, Error)]
pub enum MonitorError<E> {
    #[error("monitor '{monitor}' has no handler for the observed event in state {state}")]
    Unhandled { monitor: &'static str, state: StateId },
    #[error("monitor '{monitor}' safety violation in state {state}: {source}")]
    SafetyViolation {
        monitor: &'static str,
        state: StateId,
        #[source]
        source: E,
    },
}

/// Wraps a user [`Monitor`] implementation with its materialized state
/// table, current state, and liveness-temperature counter.
pub struct MonitorInstance<M: Monitor> {
    name: &'static str,
    machine: M,
    table: StateTable,
    hot_states: HashSet<StateId>,
    current: StateId,
    temperature: usize,
}

impl<M: Monitor> MonitorInstance<M> {
    pub fn new(name: &'static str, machine: M) -> Self {
        let table = M::state_table();
        let hot_states = M::hot_states();
        let current = table.initial();
        Self {
            name,
            machine,
            table,
            hot_states,
            current,
            temperature: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }

    pub fn is_hot(&self) -> bool {
        self.hot_states.contains(&self.current)
    }

    pub fn temperature(&self) -> usize {
        self.temperature
    }

    /// Called once per fair scheduling step by the liveness checker
    /// (`spec.md` §4.3). Increments temperature while sitting in a hot
    /// state; a transition out of a hot state (see [`Self::process`])
    /// already resets it independently.
    pub fn note_fair_step(&mut self) {
        if self.is_hot() {
            self.temperature += 1;
        }
    }

    /// Process one observed event, transitioning on a `Goto` handler or
    /// invoking [`Monitor::on_event`] on a `Do` handler.
    pub fn process(&mut self, event: &Event) -> Result<(), MonitorError<M::Error>> {
        let was_hot = self.is_hot();
        let event_type = event.event_type();
        let handler = self.table.lookup(self.current, event_type);

        match handler {
            Some(HandlerKind::Goto(target)) => {
                self.current = target;
                self.machine.on_entry(target);
            }
            Some(HandlerKind::Do) => {
                self.machine
                    .on_event(self.current, event)
                    .map_err(|source| MonitorError::SafetyViolation {
                        monitor: self.name,
                        state: self.current,
                        source,
                    })?;
            }
            Some(HandlerKind::Ignore) | Some(HandlerKind::Defer) | Some(HandlerKind::Push(_)) | None => {
                return Err(MonitorError::Unhandled {
                    monitor: self.name,
                    state: self.current,
                });
            }
        }

        if was_hot && !self.is_hot() {
            self.temperature = 0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{StateDecl, StateTableBuilder};
    use std::convert::Infallible;

    struct Tick;

    struct AlwaysHot;

    impl Monitor for AlwaysHot {
        type Error = Infallible;

        fn state_table() -> StateTable {
            StateTableBuilder::new()
                .state(StateDecl::new("Looping").handle::<Tick>(HandlerKind::Goto(StateId(0))).unwrap())
                .finalize("Looping")
                .unwrap()
        }

        fn hot_states() -> HashSet<StateId> {
            let mut set = HashSet::new();
            set.insert(StateId(0));
            set
        }

        fn on_event(&mut self, _state: StateId, _event: &Event) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn temperature_rises_while_stuck_in_a_hot_state() {
        let mut instance = MonitorInstance::new("AlwaysHot", AlwaysHot);
        assert!(instance.is_hot());
        for _ in 0..5 {
            instance.note_fair_step();
        }
        assert_eq!(instance.temperature(), 5);
    }

    struct Escape;

    struct EscapesHot;

    impl Monitor for EscapesHot {
        type Error = Infallible;

        fn state_table() -> StateTable {
            let hot = StateDecl::new("Hot").handle::<Escape>(HandlerKind::Goto(StateId(1))).unwrap();
            let cold = StateDecl::new("Cold");
            StateTableBuilder::new().state(hot).state(cold).finalize("Hot").unwrap()
        }

        fn hot_states() -> HashSet<StateId> {
            let mut set = HashSet::new();
            set.insert(StateId(0));
            set
        }

        fn on_event(&mut self, _state: StateId, _event: &Event) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn leaving_a_hot_state_resets_temperature() {
        let mut instance = MonitorInstance::new("EscapesHot", EscapesHot);
        instance.note_fair_step();
        instance.note_fair_step();
        assert_eq!(instance.temperature(), 2);

        instance.process(&Event::user(Escape)).unwrap();
        assert!(!instance.is_hot());
        assert_eq!(instance.temperature(), 0);
    }
}
