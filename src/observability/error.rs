//! Observer failure kinds, mirroring the teacher's `monitoring::error`
//! module shape (one variant per fallible `Observer` operation).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObserverError {
    #[error("failed to record observer event: {0}")]
    RecordError(String),
    #[error("failed to snapshot observer state: {0}")]
    SnapshotError(String),
    #[error("failed to reset observer state: {0}")]
    ResetError(String),
}
