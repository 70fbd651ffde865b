//! [`InMemoryObserver`]: an in-process event history, grounded on the
//! teacher's planned `InMemoryMonitor` (`monitoring/traits.rs` doc
//! examples) but backed by `parking_lot::Mutex` rather than async-aware
//! locking, since recording never holds the lock across an await point.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;
use parking_lot::Mutex;

// Layer 3: Internal module imports
use super::error::ObserverError;
use super::traits::Observer;
use super::types::{EventSeverity, ObserverEvent};

/// Records every event at or above `min_severity` into an in-memory
/// buffer, optionally bounded to the most recent `capacity` events.
pub struct InMemoryObserver {
    min_severity: EventSeverity,
    capacity: Option<usize>,
    events: Mutex<Vec<ObserverEvent>>,
}

impl InMemoryObserver {
    pub fn new(min_severity: EventSeverity) -> Self {
        Self {
            min_severity,
            capacity: None,
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn with_capacity(min_severity: EventSeverity, capacity: usize) -> Self {
        Self {
            min_severity,
            capacity: Some(capacity),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

#[async_trait]
impl Observer for InMemoryObserver {
    async fn record(&self, event: ObserverEvent) -> Result<(), ObserverError> {
        if event.severity() < self.min_severity {
            return Ok(());
        }
        let mut events = self.events.lock();
        events.push(event);
        if let Some(capacity) = self.capacity {
            if events.len() > capacity {
                let overflow = events.len() - capacity;
                events.drain(0..overflow);
            }
        }
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<ObserverEvent>, ObserverError> {
        Ok(self.events.lock().clone())
    }

    async fn reset(&self) -> Result<(), ObserverError> {
        self.events.lock().clear();
        Ok(())
    }

    fn min_severity(&self) -> EventSeverity {
        self.min_severity
    }
}
