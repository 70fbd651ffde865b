//! Lock-free operation registry, grounded on the teacher's
//! `broker::registry` DashMap-backed actor registry — same "O(1) lookup
//! without locks" shape, keyed by [`OperationId`] instead of an actor
//! address, since this registry tracks schedulability, not routing.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use super::types::{Operation, OperationStatus};
use crate::util::OperationId;

/// Owns every live [`Operation`], mutated only at scheduling points
/// (`spec.md` §5's shared-resource policy).
#[derive(Default)]
pub struct OperationRegistry {
    operations: DashMap<OperationId, Operation>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, operation: Operation) -> OperationId {
        let id = operation.id;
        self.operations.insert(id, operation);
        id
    }

    pub fn set_status(&self, id: OperationId, status: OperationStatus) {
        if let Some(mut op) = self.operations.get_mut(&id) {
            op.status = status;
        }
    }

    pub fn status(&self, id: OperationId) -> Option<OperationStatus> {
        self.operations.get(&id).map(|op| op.status)
    }

    pub fn complete(&self, id: OperationId) {
        self.set_status(id, OperationStatus::Completed);
    }

    /// Every operation currently [`OperationStatus::Enabled`], in a stable
    /// order determined by ascending [`OperationId`] so strategies can
    /// make deterministic choices from a deterministic seed.
    pub fn enabled(&self) -> Vec<OperationId> {
        let mut ids: Vec<OperationId> = self
            .operations
            .iter()
            .filter(|e| e.is_enabled())
            .map(|e| e.id)
            .collect();
        ids.sort_by_key(|id| id.value());
        ids
    }

    pub fn all_paused_on_receive(&self) -> bool {
        !self.operations.is_empty()
            && self
                .operations
                .iter()
                .all(|e| matches!(e.status, OperationStatus::PausedOnReceive | OperationStatus::Completed))
            && self
                .operations
                .iter()
                .any(|e| e.status == OperationStatus::PausedOnReceive)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn remove(&self, id: OperationId) {
        self.operations.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::types::Operation;

    #[test]
    fn enabled_returns_only_enabled_operations_in_id_order() {
        let registry = OperationRegistry::new();
        let a = registry.register(Operation::new_task());
        let b = registry.register(Operation::new_task());
        registry.set_status(a, OperationStatus::PausedOnReceive);

        let enabled = registry.enabled();
        assert_eq!(enabled, vec![b]);
    }

    #[test]
    fn all_paused_on_receive_detects_deadlock_shape() {
        let registry = OperationRegistry::new();
        let a = registry.register(Operation::new_task());
        registry.set_status(a, OperationStatus::PausedOnReceive);
        assert!(registry.all_paused_on_receive());
    }

    #[test]
    fn empty_registry_is_not_deadlocked() {
        let registry = OperationRegistry::new();
        assert!(!registry.all_paused_on_receive());
    }
}
