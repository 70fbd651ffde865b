//! [`NoopObserver`]: compiles away to nothing, for production-mode runs
//! that don't need an event history (teacher's "zero-cost option"
//! philosophy for `monitoring::NoopMonitor`).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::error::ObserverError;
use super::traits::Observer;
use super::types::ObserverEvent;

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

#[async_trait]
impl Observer for NoopObserver {
    async fn record(&self, _event: ObserverEvent) -> Result<(), ObserverError> {
        Ok(())
    }

    async fn snapshot(&self) -> Result<Vec<ObserverEvent>, ObserverError> {
        Ok(Vec::new())
    }

    async fn reset(&self) -> Result<(), ObserverError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_and_snapshots_are_no_ops() {
        let observer = NoopObserver;
        observer
            .record(ObserverEvent::IterationCompleted {
                at: chrono::Utc::now(),
                steps: 1,
            })
            .await
            .unwrap();
        assert!(observer.snapshot().await.unwrap().is_empty());
    }
}
