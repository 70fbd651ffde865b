// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::sync::atomic::{AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Process-wide monotonic counter backing [`ActorId::value`].
///
/// Counting up from zero (rather than a UUID) keeps replayed traces
/// human-readable and lets a strategy hash on a small dense integer instead
/// of a 128-bit value.
static NEXT_ACTOR_VALUE: AtomicU64 = AtomicU64::new(1);

/// Identity of an actor, unique within a single test iteration.
///
/// Equality and ordering are defined entirely by [`ActorId::value`]; `name`
/// and `type_name` are descriptive only and never participate in comparisons,
/// so two actors spawned with the same role and name but different values
/// never collide.
///
/// # Example
///
/// ```rust
/// use weft::util::ActorId;
///
/// let a = ActorId::new("Worker", Some("worker-1".to_string()));
/// let b = ActorId::new("Worker", Some("worker-2".to_string()));
/// assert_ne!(a, b);
/// assert_eq!(a.type_name(), "Worker");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorId {
    value: u64,
    name: String,
    type_name: String,
}

impl ActorId {
    /// Allocate a new, globally-unique actor identity.
    ///
    /// `name` defaults to `"{type_name}-{value}"` when not supplied, mirroring
    /// how the engine names actors created without an explicit name.
    pub fn new(type_name: impl Into<String>, name: Option<String>) -> Self {
        let value = NEXT_ACTOR_VALUE.fetch_add(1, Ordering::Relaxed);
        let type_name = type_name.into();
        let name = name.unwrap_or_else(|| format!("{type_name}-{value}"));
        Self {
            value,
            name,
            type_name,
        }
    }

    /// The integer value used for equality, ordering, and trace serialization.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// The actor's name, unique within a test iteration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The actor's declared type/role name (e.g. the `StateMachine` struct name).
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl PartialEq for ActorId {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for ActorId {}

impl std::hash::Hash for ActorId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl PartialOrd for ActorId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ActorId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.value)
    }
}

static NEXT_OPERATION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a schedulable [`Operation`](crate::operation::Operation).
///
/// One is allocated per spawned actor or per user-spawned controlled task.
/// Dense and monotonic for the same reason as [`ActorId`]: traces and
/// coverage graphs read better with small integers than with UUIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationId(u64);

impl OperationId {
    /// Allocate a new, globally-unique operation identity.
    pub fn new() -> Self {
        Self(NEXT_OPERATION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw integer value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

/// Correlation token propagated across sends so causally related operations
/// can be traced together.
///
/// `EventGroup::NULL` is the explicit "no group" sentinel described in the
/// data model: it is a real value rather than `Option::None` so "explicitly
/// cleared" and "never set" can both be represented where it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventGroup(Uuid);

impl EventGroup {
    /// The sentinel group meaning "explicitly unset".
    pub const NULL: EventGroup = EventGroup(Uuid::nil());

    /// Allocate a new, randomly-identified correlation group.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// True if this is the [`EventGroup::NULL`] sentinel.
    pub fn is_null(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for EventGroup {
    fn default() -> Self {
        Self::NULL
    }
}

impl Display for EventGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "<no-group>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_id_equality_is_value_based() {
        let a = ActorId::new("Role", Some("same-name".to_string()));
        let b = ActorId::new("Role", Some("same-name".to_string()));
        assert_ne!(a, b, "distinct spawns must never collide even with equal names");
    }

    #[test]
    fn actor_id_default_name_embeds_type_and_value() {
        let a = ActorId::new("Counter", None);
        assert!(a.name().starts_with("Counter-"));
    }

    #[test]
    fn actor_id_ordering_matches_value() {
        let a = ActorId::new("A", None);
        let b = ActorId::new("A", None);
        assert!(a.value() < b.value());
        assert!(a < b);
    }

    #[test]
    fn operation_id_unique_and_display() {
        let a = OperationId::new();
        let b = OperationId::new();
        assert_ne!(a, b);
        assert!(format!("{a}").starts_with("op#"));
    }

    #[test]
    fn event_group_null_sentinel() {
        let g = EventGroup::default();
        assert!(g.is_null());
        assert_eq!(g, EventGroup::NULL);

        let g2 = EventGroup::new();
        assert!(!g2.is_null());
        assert_ne!(g2, EventGroup::NULL);
    }
}
