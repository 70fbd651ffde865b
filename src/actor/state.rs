//! Static state-tree data: the `(state, event) -> action` table materialized
//! once per actor type, per `spec.md` §9's "Actor inheritance & mixins" and
//! "Cyclic graphs" design notes (arena-allocated nodes with integer indices
//! rather than parent/child pointers).

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::fmt;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::event::EventTypeId;

/// An arena index into a [`StateTable`]'s `states` vector.
///
/// Using a dense index instead of a name or pointer keeps the state stack
/// (`Vec<StateId>`) and coverage-graph node references cheap to copy and
/// free of lifetime annotations. The field is public and assigned in
/// `.state(...)` declaration order starting at zero, a contract a
/// [`StateMachine`](super::StateMachine) implementation needs to construct
/// `Goto`/`Push` targets, and [`crate::monitor::Monitor::hot_states`]
/// needs in order to name its own hot states at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(pub u32);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state#{}", self.0)
    }
}

/// What a state does with a matched event, before any user code runs.
///
/// `Defer` and `Ignore` are resolved by the inbox before dispatch ever
/// sees the event (per `spec.md` §4.1); `Do`/`Goto`/`Push` are resolved
/// by [`crate::actor::machine`] during dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// Invoke [`crate::actor::StateMachine::on_event`] without transitioning.
    Do,
    /// Run exit handlers up to the LCA, then enter the target state.
    Goto(StateId),
    /// Push the target state without running the current state's exit.
    Push(StateId),
    /// Leave the event queued until the defer is lifted.
    Defer,
    /// Drop the event without invoking user code.
    Ignore,
}

/// One node in a state tree: its own declared handlers, its parent (for
/// inheritance), and whether it declares entry/exit actions.
#[derive(Debug, Clone)]
pub struct StateNode {
    pub(crate) name: String,
    pub(crate) parent: Option<StateId>,
    pub(crate) declared: HashMap<EventTypeId, HandlerKind>,
    pub(crate) wildcard: Option<HandlerKind>,
    pub(crate) has_entry: bool,
    pub(crate) has_exit: bool,
    /// Declared handlers flattened with inherited ones, most-derived wins.
    /// Populated by [`StateTable::finalize`].
    pub(crate) effective: HashMap<EventTypeId, HandlerKind>,
}

/// Error raised while building a [`StateTable`]; fatal at actor construction
/// per `spec.md` §4.2's "enforced at setup time" inheritance rules.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StateTableError {
    #[error("state '{0}' declares two handlers for the same event type")]
    DuplicateHandler(String),
    #[error("state '{state}' inherits from unknown parent '{parent}'")]
    UnknownParent { state: String, parent: String },
    #[error("no state named '{0}' was declared")]
    UnknownState(String),
    #[error("state tree contains a cycle starting at '{0}'")]
    InheritanceCycle(String),
}

/// The complete, materialized state tree for one actor type.
///
/// Built once via [`StateTableBuilder`] and cached by the runtime's
/// per-actor-type registry (`spec.md` §9: "Global mutable state" ->
/// replaced by an explicit per-runtime registry keyed by actor type,
/// built on first use).
#[derive(Debug, Clone)]
pub struct StateTable {
    states: Vec<StateNode>,
    by_name: HashMap<String, StateId>,
    initial: StateId,
}

impl StateTable {
    pub fn state(&self, id: StateId) -> &StateNode {
        &self.states[id.0 as usize]
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn id_of(&self, name: &str) -> Option<StateId> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, id: StateId) -> &str {
        &self.states[id.0 as usize].name
    }

    /// Lowest common ancestor of two states in the inheritance tree, used
    /// to decide how much of the state stack a `Goto` needs to exit.
    pub fn lowest_common_ancestor(&self, a: StateId, b: StateId) -> Option<StateId> {
        let ancestors_of = |mut s: StateId| {
            let mut chain = vec![s];
            while let Some(p) = self.state(s).parent {
                chain.push(p);
                s = p;
            }
            chain
        };
        let chain_a = ancestors_of(a);
        let chain_b: std::collections::HashSet<_> = ancestors_of(b).into_iter().collect();
        chain_a.into_iter().find(|s| chain_b.contains(s))
    }

    /// Resolve the effective handler for an event type in `state`, checking
    /// the flattened inheritance table then the state's own wildcard.
    pub fn lookup(&self, state: StateId, event_type: EventTypeId) -> Option<HandlerKind> {
        let node = self.state(state);
        node.effective
            .get(&event_type)
            .copied()
            .or(node.wildcard)
    }
}

/// Declares one state while constructing a [`StateTable`].
#[derive(Debug, Clone, Default)]
pub struct StateDecl {
    name: String,
    parent: Option<String>,
    handlers: HashMap<EventTypeId, HandlerKind>,
    wildcard: Option<HandlerKind>,
    has_entry: bool,
    has_exit: bool,
}

impl StateDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn inherits(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn on_entry(mut self) -> Self {
        self.has_entry = true;
        self
    }

    pub fn on_exit(mut self) -> Self {
        self.has_exit = true;
        self
    }

    pub fn handle<T: 'static>(mut self, kind: HandlerKind) -> Result<Self, StateTableError> {
        let ty = EventTypeId::of::<T>();
        if self.handlers.insert(ty, kind).is_some() {
            return Err(StateTableError::DuplicateHandler(self.name.clone()));
        }
        Ok(self)
    }

    pub fn wildcard(mut self, kind: HandlerKind) -> Result<Self, StateTableError> {
        if self.wildcard.replace(kind).is_some() {
            return Err(StateTableError::DuplicateHandler(self.name.clone()));
        }
        Ok(self)
    }
}

/// Builds a [`StateTable`] from a flat list of [`StateDecl`]s, validating
/// and flattening inheritance at the end, as `spec.md` §9 requires.
#[derive(Debug, Default)]
pub struct StateTableBuilder {
    decls: Vec<StateDecl>,
}

impl StateTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(mut self, decl: StateDecl) -> Self {
        self.decls.push(decl);
        self
    }

    /// Resolve names into arena indices, flatten inheritance chains, and
    /// check for cycles.
    pub fn finalize(self, initial: &str) -> Result<StateTable, StateTableError> {
        let mut by_name = HashMap::new();
        for (idx, d) in self.decls.iter().enumerate() {
            by_name.insert(d.name.clone(), StateId(idx as u32));
        }

        let mut states = Vec::with_capacity(self.decls.len());
        for d in &self.decls {
            let parent = match &d.parent {
                Some(p) => Some(*by_name.get(p).ok_or_else(|| StateTableError::UnknownParent {
                    state: d.name.clone(),
                    parent: p.clone(),
                })?),
                None => None,
            };
            states.push(StateNode {
                name: d.name.clone(),
                parent,
                declared: d.handlers.clone(),
                wildcard: d.wildcard,
                has_entry: d.has_entry,
                has_exit: d.has_exit,
                effective: HashMap::new(),
            });
        }

        // Detect cycles before flattening (would otherwise loop forever).
        for (idx, node) in states.iter().enumerate() {
            let mut seen = std::collections::HashSet::new();
            seen.insert(StateId(idx as u32));
            let mut cur = node.parent;
            while let Some(p) = cur {
                if !seen.insert(p) {
                    return Err(StateTableError::InheritanceCycle(node.name.clone()));
                }
                cur = states[p.0 as usize].parent;
            }
        }

        // Flatten: walk from the root ancestor down to each state, letting
        // more-derived declarations override base ones.
        for idx in 0..states.len() {
            let mut chain = vec![StateId(idx as u32)];
            let mut cur = states[idx].parent;
            while let Some(p) = cur {
                chain.push(p);
                cur = states[p.0 as usize].parent;
            }
            chain.reverse(); // root-first
            let mut effective = HashMap::new();
            for sid in chain {
                for (ty, kind) in &states[sid.0 as usize].declared {
                    effective.insert(*ty, *kind);
                }
            }
            states[idx].effective = effective;
        }

        let initial = *by_name
            .get(initial)
            .ok_or_else(|| StateTableError::UnknownState(initial.to_string()))?;

        Ok(StateTable {
            states,
            by_name,
            initial,
        })
    }
}
