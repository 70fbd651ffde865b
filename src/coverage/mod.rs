//! The coverage graph builder (`spec.md` §4.5).
//!
//! - [`graph`] — [`CoverageGraph`]'s arena representation: typed nodes and typed edges.
//! - [`builder`] — [`CoverageBuilder`], the incremental observer that populates it.

pub mod builder;
pub mod graph;

pub use builder::CoverageBuilder;
pub use graph::{alias_event_label, CoverageGraph, Link, LinkIndex, LinkKind, Node, NodeIndex, NodeKind};
