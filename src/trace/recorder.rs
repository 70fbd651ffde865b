//! [`TraceRecorder`]: appends one [`TraceRecord`] per scheduling point and
//! serializes the result to the versioned trace format (`spec.md` §4.6).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::record::{NondetChoice, TraceFile, TraceRecord};
use crate::operation::SchedulingPointKind;
use crate::util::OperationId;

/// Observes the runtime's scheduling-point stream and accumulates a
/// [`TraceFile`] sufficient to replay the iteration bitwise.
pub struct TraceRecorder {
    file: TraceFile,
    step: usize,
}

impl TraceRecorder {
    pub fn new(seed: u64, strategy_name: impl Into<String>) -> Self {
        Self {
            file: TraceFile::new(seed, strategy_name),
            step: 0,
        }
    }

    pub fn record(
        &mut self,
        kind: SchedulingPointKind,
        current_op: Option<OperationId>,
        chosen_op: Option<OperationId>,
        nondet_choices: Vec<NondetChoice>,
    ) {
        self.file.records.push(TraceRecord {
            step: self.step,
            kind,
            current_op,
            chosen_op,
            nondet_choices,
        });
        self.step += 1;
    }

    pub fn len(&self) -> usize {
        self.file.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.records.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.file)
    }

    pub fn from_json(json: &str) -> serde_json::Result<TraceFile> {
        serde_json::from_str(json)
    }

    pub fn into_file(self) -> TraceFile {
        self.file
    }
}
