//! The persisted trace format (`spec.md` §4.6, §6: "Trace file"):
//! a versioned header, a seed, and one record per scheduling point.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
use crate::operation::SchedulingPointKind;
use crate::util::OperationId;

/// Current on-disk trace format version. Bumped whenever
/// [`TraceRecord`] or [`TraceFile`] gains or loses a field.
pub const TRACE_FORMAT_VERSION: u32 = 1;

/// A single nondeterministic choice resolved at a scheduling point,
/// recorded alongside the operation chosen so replay can answer
/// `GetNextBoolean`/`GetNextInteger` identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NondetChoice {
    Boolean(bool),
    Integer(u64),
}

/// One scheduling-point decision: `{step, kind, currentOp, chosenOp,
/// nondetChoices[]}` per `spec.md` §6.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub step: usize,
    pub kind: SchedulingPointKind,
    pub current_op: Option<OperationId>,
    pub chosen_op: Option<OperationId>,
    pub nondet_choices: Vec<NondetChoice>,
}

/// The complete on-disk trace: a versioned header, the iteration seed,
/// and the ordered records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceFile {
    pub version: u32,
    pub seed: u64,
    pub strategy_name: String,
    pub records: Vec<TraceRecord>,
}

impl TraceFile {
    pub fn new(seed: u64, strategy_name: impl Into<String>) -> Self {
        Self {
            version: TRACE_FORMAT_VERSION,
            seed,
            strategy_name: strategy_name.into(),
            records: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduling_point_kind_round_trips_through_json() {
        let json = serde_json::to_string(&SchedulingPointKind::Dequeue).unwrap();
        let restored: SchedulingPointKind = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, SchedulingPointKind::Dequeue);
    }

    #[test]
    fn trace_file_round_trips_through_json() {
        let mut file = TraceFile::new(42, "Random");
        file.records.push(TraceRecord {
            step: 0,
            kind: SchedulingPointKind::Create,
            current_op: None,
            chosen_op: Some(OperationId::new()),
            nondet_choices: vec![NondetChoice::Boolean(true)],
        });
        let json = serde_json::to_string(&file).unwrap();
        let restored: TraceFile = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.records.len(), 1);
        assert_eq!(restored.seed, 42);
    }
}
