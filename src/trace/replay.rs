//! [`ReplayStrategy`]: replaces the scheduler with one that replays a
//! recorded [`TraceFile`] and asserts every observed decision point
//! matches (`spec.md` §4.6).

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::record::{NondetChoice, TraceFile};
use crate::scheduler::{SchedulerError, SchedulingStrategy};
use crate::util::OperationId;

/// Replays a previously recorded trace verbatim. `next_operation`
/// consumes one record's `chosen_op`; `next_boolean`/`next_integer`
/// consume that same record's queued nondeterministic choices, in the
/// order they were originally requested.
///
/// Divergence detection (`current_op` mismatch) is surfaced via
/// [`ReplayStrategy::check_current`], which callers must invoke with the
/// operation the runtime believes is currently running before asking for
/// the next choice — `SchedulingStrategy` itself has no fallible methods,
/// so a mismatch is reported out of band rather than by panicking mid-call.
pub struct ReplayStrategy {
    file: TraceFile,
    cursor: usize,
    nondet_cursor: usize,
    divergence: Option<SchedulerError>,
}

impl ReplayStrategy {
    pub fn new(file: TraceFile) -> Self {
        Self {
            file,
            cursor: 0,
            nondet_cursor: 0,
            divergence: None,
        }
    }

    pub fn seed(&self) -> u64 {
        self.file.seed
    }

    /// Assert the runtime's observed `current_op` agrees with the
    /// recorded one at this step. Call before each `next_operation`.
    pub fn check_current(&mut self, observed: Option<OperationId>) {
        if self.divergence.is_some() {
            return;
        }
        let Some(record) = self.file.records.get(self.cursor) else {
            return;
        };
        if record.current_op != observed {
            self.divergence = Some(SchedulerError::ReplayDivergence {
                step: record.step,
                expected: format!("{:?}", record.current_op),
                observed: format!("{observed:?}"),
            });
        }
    }

    pub fn divergence(&self) -> Option<&SchedulerError> {
        self.divergence.as_ref()
    }

    fn current_record_nondet(&mut self) -> Option<NondetChoice> {
        let record = self.file.records.get(self.cursor)?;
        let choice = record.nondet_choices.get(self.nondet_cursor).copied();
        self.nondet_cursor += 1;
        choice
    }
}

impl SchedulingStrategy for ReplayStrategy {
    fn next_operation(&mut self, _enabled: &[OperationId], _current: Option<OperationId>) -> Option<OperationId> {
        let chosen = self.file.records.get(self.cursor)?.chosen_op;
        self.cursor += 1;
        self.nondet_cursor = 0;
        chosen
    }

    fn next_boolean(&mut self) -> bool {
        matches!(self.current_record_nondet(), Some(NondetChoice::Boolean(true)))
    }

    fn next_integer(&mut self, _max_exclusive: u64) -> u64 {
        match self.current_record_nondet() {
            Some(NondetChoice::Integer(value)) => value,
            _ => 0,
        }
    }

    fn prepare_next_iteration(&mut self) -> bool {
        // A replay is a single fixed iteration; nothing to prepare.
        self.cursor == 0
    }

    fn step_count(&self) -> usize {
        self.cursor
    }

    fn is_fair(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "Replay"
    }

    fn check_current(&mut self, observed: Option<OperationId>) {
        ReplayStrategy::check_current(self, observed);
    }

    fn divergence(&self) -> Option<&SchedulerError> {
        ReplayStrategy::divergence(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::SchedulingPointKind;
    use crate::trace::recorder::TraceRecorder;

    #[test]
    fn replays_chosen_operations_in_recorded_order() {
        let op_a = OperationId::new();
        let op_b = OperationId::new();
        let mut recorder = TraceRecorder::new(1, "Random");
        recorder.record(SchedulingPointKind::Dequeue, None, Some(op_a), vec![]);
        recorder.record(SchedulingPointKind::Dequeue, Some(op_a), Some(op_b), vec![]);

        let mut replay = ReplayStrategy::new(recorder.into_file());
        replay.check_current(None);
        assert_eq!(replay.next_operation(&[], None), Some(op_a));
        replay.check_current(Some(op_a));
        assert_eq!(replay.next_operation(&[], None), Some(op_b));
        assert!(replay.divergence().is_none());
    }

    #[test]
    fn detects_divergence_when_current_op_disagrees() {
        let op_a = OperationId::new();
        let unexpected = OperationId::new();
        let mut recorder = TraceRecorder::new(1, "Random");
        recorder.record(SchedulingPointKind::Dequeue, None, Some(op_a), vec![]);

        let mut replay = ReplayStrategy::new(recorder.into_file());
        replay.check_current(Some(unexpected));
        assert!(replay.divergence().is_some());
    }

    #[test]
    fn replays_nondeterministic_choices_alongside_the_operation() {
        let mut recorder = TraceRecorder::new(1, "Random");
        recorder.record(
            SchedulingPointKind::NondeterministicChoice,
            None,
            None,
            vec![NondetChoice::Boolean(true), NondetChoice::Integer(7)],
        );
        let mut replay = ReplayStrategy::new(recorder.into_file());
        assert!(replay.next_boolean());
        assert_eq!(replay.next_integer(100), 7);
    }
}
