//! [`CoverageBuilder`]: the incremental observer that turns a stream of
//! create/send/receive/state-transition events into a [`CoverageGraph`]
//! (`spec.md` §4.5).

// Layer 1: Standard library imports
use std::collections::HashMap;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::graph::{alias_event_label, CoverageGraph, Link, LinkKind, Node, NodeIndex, NodeKind};

/// Identifies a container node: either one per actor instance, or one
/// per actor type under `CollapseInstances` (`spec.md` §4.5).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ContainerKey {
    Instance(u64),
    Type(String),
}

/// Builds a [`CoverageGraph`] incrementally as the runtime reports
/// create/send/receive/transition events. Not itself a scheduling
/// observer: the runtime calls these methods synchronously from its own
/// event-reporting hooks.
pub struct CoverageBuilder {
    graph: CoverageGraph,
    collapse_instances: bool,
    merge_event_links: bool,
    containers: HashMap<ContainerKey, NodeIndex>,
    states: HashMap<(NodeIndex, String), NodeIndex>,
}

impl CoverageBuilder {
    pub fn new(collapse_instances: bool, merge_event_links: bool) -> Self {
        Self {
            graph: CoverageGraph::new(),
            collapse_instances,
            merge_event_links,
            containers: HashMap::new(),
            states: HashMap::new(),
        }
    }

    pub fn graph(&self) -> &CoverageGraph {
        &self.graph
    }

    pub fn into_graph(self) -> CoverageGraph {
        self.graph
    }

    fn container_key(&self, actor_value: u64, type_name: &str) -> ContainerKey {
        if self.collapse_instances {
            ContainerKey::Type(type_name.to_string())
        } else {
            ContainerKey::Instance(actor_value)
        }
    }

    /// Record an actor (or monitor) instance, returning its container
    /// node, creating one on first observation.
    pub fn record_actor(&mut self, actor_value: u64, type_name: &str) -> NodeIndex {
        let key = self.container_key(actor_value, type_name);
        if let Some(index) = self.containers.get(&key) {
            return *index;
        }
        let label = if self.collapse_instances {
            type_name.to_string()
        } else {
            format!("{type_name}#{actor_value}")
        };
        let index = self.graph.push_node(Node {
            kind: NodeKind::Actor,
            label,
        });
        self.containers.insert(key, index);
        index
    }

    pub fn record_monitor(&mut self, monitor_name: &str) -> NodeIndex {
        let key = ContainerKey::Type(format!("monitor::{monitor_name}"));
        if let Some(index) = self.containers.get(&key) {
            return *index;
        }
        let index = self.graph.push_node(Node {
            kind: NodeKind::Monitor,
            label: monitor_name.to_string(),
        });
        self.containers.insert(key, index);
        index
    }

    /// Record a state belonging to `container`, creating the state node
    /// and its `Contains` edge on first observation.
    pub fn record_state(&mut self, container: NodeIndex, state_name: &str) -> NodeIndex {
        let key = (container, state_name.to_string());
        if let Some(index) = self.states.get(&key) {
            return *index;
        }
        let index = self.graph.push_node(Node {
            kind: NodeKind::StateMachine,
            label: state_name.to_string(),
        });
        self.graph.push_link(Link {
            from: container,
            to: index,
            kind: LinkKind::Contains,
            count: 1,
        });
        self.states.insert(key, index);
        index
    }

    /// Record a dispatched event causing a transition between two state
    /// nodes (which may be the same node, for a self-loop `Do` handler).
    pub fn record_transition(&mut self, from_state: NodeIndex, to_state: NodeIndex, raw_event_label: &str) {
        let kind = LinkKind::Transition {
            event_label: alias_event_label(raw_event_label),
        };
        if self.merge_event_links {
            if let Some(link) = self.graph.find_link_mut(from_state, to_state, &kind) {
                link.count += 1;
                return;
            }
        }
        self.graph.push_link(Link {
            from: from_state,
            to: to_state,
            kind,
            count: 1,
        });
    }

    pub fn record_error(&mut self, container: NodeIndex, message: &str) -> NodeIndex {
        let index = self.graph.push_node(Node {
            kind: NodeKind::Error,
            label: message.to_string(),
        });
        self.graph.push_link(Link {
            from: container,
            to: index,
            kind: LinkKind::Contains,
            count: 1,
        });
        index
    }

    pub fn record_external_code(&mut self, container: NodeIndex, label: &str) -> NodeIndex {
        let index = self.graph.push_node(Node {
            kind: NodeKind::ExternalCode,
            label: label.to_string(),
        });
        self.graph.push_link(Link {
            from: container,
            to: index,
            kind: LinkKind::Contains,
            count: 1,
        });
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_instance_reuses_its_container_node() {
        let mut builder = CoverageBuilder::new(false, false);
        let a = builder.record_actor(1, "Worker");
        let b = builder.record_actor(1, "Worker");
        assert_eq!(a, b);
        assert_eq!(builder.graph().node_count(), 1);
    }

    #[test]
    fn collapse_instances_merges_same_type_actors() {
        let mut builder = CoverageBuilder::new(true, false);
        let a = builder.record_actor(1, "Worker");
        let b = builder.record_actor(2, "Worker");
        assert_eq!(a, b);
    }

    #[test]
    fn without_collapse_distinct_instances_get_distinct_nodes() {
        let mut builder = CoverageBuilder::new(false, false);
        let a = builder.record_actor(1, "Worker");
        let b = builder.record_actor(2, "Worker");
        assert_ne!(a, b);
    }

    #[test]
    fn merge_event_links_coalesces_parallel_transitions_with_a_count() {
        let mut builder = CoverageBuilder::new(false, true);
        let container = builder.record_actor(1, "Worker");
        let idle = builder.record_state(container, "Idle");
        let busy = builder.record_state(container, "Busy");

        builder.record_transition(idle, busy, "Start");
        builder.record_transition(idle, busy, "Start");

        let graph = builder.graph();
        let transitions: Vec<_> = graph
            .links()
            .filter(|l| matches!(l.kind, LinkKind::Transition { .. }))
            .collect();
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].count, 2);
    }

    #[test]
    fn without_merge_parallel_transitions_stay_distinct() {
        let mut builder = CoverageBuilder::new(false, false);
        let container = builder.record_actor(1, "Worker");
        let idle = builder.record_state(container, "Idle");
        let busy = builder.record_state(container, "Busy");

        builder.record_transition(idle, busy, "Start");
        builder.record_transition(idle, busy, "Start");

        let transitions = builder
            .graph()
            .links()
            .filter(|l| matches!(l.kind, LinkKind::Transition { .. }))
            .count();
        assert_eq!(transitions, 2);
    }

    #[test]
    fn well_known_events_are_aliased_to_short_labels() {
        assert_eq!(alias_event_label("GotoState"), "goto");
        assert_eq!(alias_event_label("Halt"), "halt");
        assert_eq!(alias_event_label("CustomPayload"), "CustomPayload");
    }
}
