//! The coverage graph's arena representation (`spec.md` §4.5, §3's
//! `CoverageGraph` glossary entry): a directed multigraph with typed
//! nodes and typed edges, stored as index-addressed `nodes[]`/`links[]`
//! vectors rather than a pointer graph, matching the same
//! arena-over-pointers choice made in [`crate::actor::state`].

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
// (none)

/// An arena index into a [`CoverageGraph`]'s `nodes` vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex(pub(crate) u32);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// An arena index into a [`CoverageGraph`]'s `links` vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkIndex(pub(crate) u32);

/// What kind of entity a [`Node`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Actor,
    StateMachine,
    Monitor,
    Error,
    ExternalCode,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub label: String,
}

/// What kind of relationship a [`Link`] represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// Parent→child nesting (actor/monitor → its states).
    Contains,
    /// An event-labeled transition between two state nodes. Well-known
    /// events are aliased to short labels (`spec.md` §4.5): `goto`,
    /// `halt`, `push`, `pop`, `default`, `*`.
    Transition { event_label: String },
}

#[derive(Debug, Clone)]
pub struct Link {
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub kind: LinkKind,
    /// Under `MergeEventLinks`, parallel edges coalesce into one and this
    /// accumulates their count; otherwise every link has `count == 1` and
    /// is kept as a distinct, uniquely-indexed entry.
    pub count: u32,
}

/// The complete, incrementally-built coverage multigraph for one test
/// iteration.
#[derive(Debug, Clone, Default)]
pub struct CoverageGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) links: Vec<Link>,
}

impl CoverageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index.0 as usize]
    }

    pub fn link(&self, index: LinkIndex) -> &Link {
        &self.links[index.0 as usize]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    pub(crate) fn push_node(&mut self, node: Node) -> NodeIndex {
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(node);
        index
    }

    pub(crate) fn find_link_mut(&mut self, from: NodeIndex, to: NodeIndex, kind: &LinkKind) -> Option<&mut Link> {
        self.links
            .iter_mut()
            .find(|link| link.from == from && link.to == to && &link.kind == kind)
    }

    pub(crate) fn push_link(&mut self, link: Link) -> LinkIndex {
        let index = LinkIndex(self.links.len() as u32);
        self.links.push(link);
        index
    }
}

/// Maps a well-known control event to its short coverage-graph label
/// (`spec.md` §4.5).
pub fn alias_event_label(raw: &str) -> String {
    match raw {
        "GotoState" => "goto".to_string(),
        "PushState" => "push".to_string(),
        "PopState" => "pop".to_string(),
        "Halt" => "halt".to_string(),
        "Default" => "default".to_string(),
        "WildCard" => "*".to_string(),
        other => other.to_string(),
    }
}
