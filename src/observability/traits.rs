//! The [`Observer`] trait: a universal sink for [`ObserverEvent`]s,
//! adapted from the teacher's generic `Monitor<E>` trait
//! (`monitoring/traits.rs`) down to the closed event vocabulary this
//! runtime actually produces.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::error::ObserverError;
use super::types::{EventSeverity, ObserverEvent};

/// Universal interface for observing the controlled runtime's externally
/// visible steps. Implementations range from a zero-overhead no-op to a
/// full in-memory recorder with severity filtering.
#[async_trait]
pub trait Observer: Send + Sync {
    async fn record(&self, event: ObserverEvent) -> Result<(), ObserverError>;

    async fn snapshot(&self) -> Result<Vec<ObserverEvent>, ObserverError>;

    async fn reset(&self) -> Result<(), ObserverError>;

    /// The minimum severity this observer records; events below it are
    /// dropped without error. Defaults to recording everything.
    fn min_severity(&self) -> EventSeverity {
        EventSeverity::Trace
    }
}
