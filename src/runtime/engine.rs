//! [`ControlledRuntime`]: the single-threaded cooperative scheduling loop
//! (`spec.md` §4.3, §5, §6).
//!
//! Unlike the teacher's `ActorSystem`, which spawns a router task plus one
//! tokio task per actor, this engine drives every actor from one logical
//! control loop: `spec.md` §5 requires that "at most one operation executes
//! at a time" be true by construction, not by locking, so actors are driven
//! synchronously by [`ControlledRuntime::advance`] rather than each owning
//! its own task. The teacher's task-per-actor shape survives only inside
//! [`crate::actor::ActorInstance::step`], which still `await`s handler
//! futures — just never two of them concurrently.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use chrono::Utc; // §3.2 MANDATORY

// Layer 3: Internal module imports
use super::config::{build_strategy, EngineConfig};
use super::error::EngineError;
use crate::actor::{BoxedActor, DynActor, Effect, StateMachine, StepOutcome};
use crate::coverage::{CoverageBuilder, CoverageGraph};
use crate::event::{Event, TimerId, TimerInfo};
use crate::inbox::EnqueueStatus;
use crate::monitor::{Monitor, MonitorCell, MonitorCellImpl, MonitorInstance};
use crate::observability::{actor_created, NoopObserver, Observer, ObserverEvent};
use crate::operation::{Operation, OperationRegistry, OperationStatus, SchedulingPointKind};
use crate::scheduler::{SchedulerError, SchedulingStrategy};
use crate::trace::{NondetChoice, TraceFile, TraceRecorder};
use crate::util::{ActorId, EventGroup, OperationId};

/// The public driver of one controlled test iteration (`spec.md` §6's
/// external runtime API, minus the harness/CLI layer it names as an
/// external collaborator).
pub struct ControlledRuntime {
    cells: HashMap<OperationId, Box<dyn DynActor>>,
    actor_index: HashMap<ActorId, OperationId>,
    monitors: HashMap<String, Box<dyn MonitorCell>>,
    operations: OperationRegistry,
    strategy: Box<dyn SchedulingStrategy>,
    config: EngineConfig,
    observer: Arc<dyn Observer>,
    coverage: Option<CoverageBuilder>,
    trace: Option<TraceRecorder>,
    /// Armed timers keyed by `(owning actor, timer id)` — `TimerId` is only
    /// unique within the actor that allocated it (`spec.md` §4.2's
    /// per-actor `next_timer` counter), so the pair is the real key.
    pending_timers: HashMap<(ActorId, TimerId), bool>,
    current_running: Option<OperationId>,
    fair_steps: usize,
    unfair_steps: usize,
}

impl ControlledRuntime {
    pub fn new(config: EngineConfig, observer: Arc<dyn Observer>) -> Self {
        let strategy = build_strategy(&config.strategy, config.seed);
        let strategy_name = strategy.name().to_string();
        Self {
            cells: HashMap::new(),
            actor_index: HashMap::new(),
            monitors: HashMap::new(),
            operations: OperationRegistry::new(),
            coverage: config
                .record_coverage
                .then(|| CoverageBuilder::new(config.collapse_instances, config.merge_event_links)),
            trace: config.record_trace.then(|| TraceRecorder::new(config.seed, strategy_name)),
            pending_timers: HashMap::new(),
            strategy,
            config,
            observer,
            current_running: None,
            fair_steps: 0,
            unfair_steps: 0,
        }
    }

    /// Convenience constructor for iterations that don't need observability
    /// (`spec.md` §9's "zero-cost option" for production-mode runs).
    pub fn with_noop_observer(config: EngineConfig) -> Self {
        Self::new(config, Arc::new(NoopObserver))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn coverage_graph(&self) -> Option<&CoverageGraph> {
        self.coverage.as_ref().map(CoverageBuilder::graph)
    }

    pub fn into_trace_file(self) -> Option<TraceFile> {
        self.trace.map(TraceRecorder::into_file)
    }

    pub fn step_count(&self) -> usize {
        self.fair_steps + self.unfair_steps
    }

    pub fn operation_of(&self, actor: &ActorId) -> Option<OperationId> {
        self.actor_index.get(actor).copied()
    }

    pub fn status_of(&self, actor: &ActorId) -> Option<OperationStatus> {
        self.operation_of(actor).and_then(|op| self.operations.status(op))
    }

    pub fn current_state_name_of(&self, actor: &ActorId) -> Option<String> {
        let op = self.operation_of(actor)?;
        self.cells.get(&op).map(|cell| cell.current_state_name().to_string())
    }

    pub fn is_halted(&self, actor: &ActorId) -> bool {
        self.operation_of(actor)
            .and_then(|op| self.cells.get(&op))
            .map(|cell| cell.is_halted())
            .unwrap_or(false)
    }

    /// `CreateActor(type, name?, initialEvent?, group?) -> ActorId`
    /// (`spec.md` §6).
    pub async fn create_actor<M, F>(
        &mut self,
        type_name: impl Into<String>,
        name: Option<String>,
        build: F,
        initial_event: Option<Event>,
        group: Option<EventGroup>,
    ) -> Result<ActorId, EngineError>
    where
        M: StateMachine,
        F: FnOnce() -> M + Send + 'static,
    {
        let id = ActorId::new(type_name, name);
        let factory: Box<dyn FnOnce(ActorId) -> Box<dyn DynActor> + Send> =
            Box::new(move |child_id| Box::new(BoxedActor::new(child_id, build())));
        self.spawn_cell(id.clone(), factory, initial_event, group).await?;
        Ok(id)
    }

    /// `CreateActorAndExecuteAsync(...)`: spawns, then drives the scheduler
    /// until nothing more is enabled this iteration (`spec.md` §6). Since
    /// this engine is single-threaded and cooperative, driving the whole
    /// iteration to quiescence is a safe superset of waiting for just the
    /// new actor — there is no other thread of control left to race.
    pub async fn create_actor_and_execute_async<M, F>(
        &mut self,
        type_name: impl Into<String>,
        name: Option<String>,
        build: F,
        initial_event: Option<Event>,
        group: Option<EventGroup>,
    ) -> Result<ActorId, EngineError>
    where
        M: StateMachine,
        F: FnOnce() -> M + Send + 'static,
    {
        let id = self.create_actor(type_name, name, build, initial_event, group).await?;
        self.run_to_completion().await?;
        Ok(id)
    }

    async fn spawn_cell(
        &mut self,
        id: ActorId,
        factory: Box<dyn FnOnce(ActorId) -> Box<dyn DynActor> + Send>,
        initial_event: Option<Event>,
        group: Option<EventGroup>,
    ) -> Result<(), EngineError> {
        let mut cell = factory(id.clone());
        if let Some(event) = initial_event {
            cell.enqueue(event, group.unwrap_or(EventGroup::NULL), false);
        }

        let operation = Operation::new_actor(id.clone());
        let op_id = self.operations.register(operation);
        self.actor_index.insert(id.clone(), op_id);

        if let Some(coverage) = &mut self.coverage {
            coverage.record_actor(id.value(), id.type_name());
        }
        if let Some(recorder) = &mut self.trace {
            recorder.record(SchedulingPointKind::Create, self.current_running, Some(op_id), Vec::new());
        }
        let _ = self.observer.record(actor_created(&id)).await;

        let init_result = cell.initialize().await;
        self.cells.insert(op_id, cell);
        match init_result {
            Ok(effects) => self.apply_effects(op_id, effects).await?,
            Err(message) => return Err(EngineError::StructuralError(message)),
        }

        let status = self.status_after_step(op_id);
        self.operations.set_status(op_id, status);
        Ok(())
    }

    fn status_after_step(&self, op: OperationId) -> OperationStatus {
        let cell = self.cells.get(&op).expect("status_after_step called with a live cell");
        if cell.is_halted() {
            OperationStatus::Completed
        } else if cell.is_paused_on_receive() {
            OperationStatus::PausedOnReceive
        } else if cell.is_idle() {
            OperationStatus::PausedOnResource
        } else {
            OperationStatus::Enabled
        }
    }

    /// `SendEvent(target, event, group?, mustHandle?)` (`spec.md` §6).
    pub async fn send_event(
        &mut self,
        target: ActorId,
        event: Event,
        group: Option<EventGroup>,
        must_handle: bool,
    ) -> Result<(), EngineError> {
        self.route_send(target, event, group.unwrap_or(EventGroup::NULL), must_handle).await
    }

    /// `SendEventAndExecuteAsync(...)`: same caveat as
    /// [`ControlledRuntime::create_actor_and_execute_async`].
    pub async fn send_event_and_execute_async(
        &mut self,
        target: ActorId,
        event: Event,
        group: Option<EventGroup>,
        must_handle: bool,
    ) -> Result<(), EngineError> {
        self.send_event(target, event, group, must_handle).await?;
        self.run_to_completion().await
    }

    async fn route_send(
        &mut self,
        target: ActorId,
        event: Event,
        group: EventGroup,
        must_handle: bool,
    ) -> Result<(), EngineError> {
        let Some(&op) = self.actor_index.get(&target) else {
            return self.handle_dropped(target, event, must_handle).await;
        };
        let event_type = event.event_type().to_string();
        let status = {
            let cell = self.cells.get_mut(&op).expect("actor_index entries always have a live cell");
            cell.enqueue(event.clone(), group, must_handle)
        };
        let _ = self
            .observer
            .record(ObserverEvent::EventEnqueued {
                at: Utc::now(),
                target: target.to_string(),
                event_type,
            })
            .await;
        match status {
            EnqueueStatus::Dropped => self.handle_dropped(target, event, must_handle).await,
            EnqueueStatus::EventHandlerNotRunning | EnqueueStatus::ReceiveSatisfied => {
                self.operations.set_status(op, OperationStatus::Enabled);
                Ok(())
            }
            EnqueueStatus::EventHandlerRunning => Ok(()),
        }
    }

    /// `spec.md` §7's "Halt drop" case: a `mustHandle` send that lands on a
    /// halted or unknown actor is an `EngineError::DroppedMustHandle`;
    /// best-effort sends are silently dropped. Either way `OnEventDropped`
    /// fires exactly once, matching the teacher's philosophy of
    /// "observable, not fatal" by default.
    async fn handle_dropped(&self, target: ActorId, event: Event, must_handle: bool) -> Result<(), EngineError> {
        let _ = self
            .observer
            .record(ObserverEvent::EventDropped {
                at: Utc::now(),
                target: target.to_string(),
                event_type: event.event_type().to_string(),
            })
            .await;
        if must_handle {
            return Err(EngineError::DroppedMustHandle {
                target,
                event: event.to_string(),
            });
        }
        Ok(())
    }

    /// `GetNextBoolean()` (`spec.md` §6).
    pub fn nondeterministic_boolean(&mut self) -> bool {
        let value = self.strategy.next_boolean();
        if let Some(recorder) = &mut self.trace {
            recorder.record(
                SchedulingPointKind::NondeterministicChoice,
                self.current_running,
                self.current_running,
                vec![NondetChoice::Boolean(value)],
            );
        }
        value
    }

    /// `GetNextInteger(maxExclusive)` (`spec.md` §6).
    pub fn nondeterministic_integer(&mut self, max_exclusive: u64) -> u64 {
        let value = self.strategy.next_integer(max_exclusive);
        if let Some(recorder) = &mut self.trace {
            recorder.record(
                SchedulingPointKind::NondeterministicChoice,
                self.current_running,
                self.current_running,
                vec![NondetChoice::Integer(value)],
            );
        }
        value
    }

    /// `Assert(condition, message)` called directly by host code, as
    /// opposed to the handler-recorded [`Effect::Assert`] drained in
    /// [`ControlledRuntime::apply_effects`].
    pub fn assert(&mut self, condition: bool, message: impl Into<String>) -> Result<(), EngineError> {
        if !condition {
            return Err(EngineError::AssertionFailure {
                operation: self.current_running.unwrap_or_default(),
                state: String::new(),
                message: message.into(),
            });
        }
        Ok(())
    }

    /// `RegisterMonitor(name, monitor)` (`spec.md` §6).
    pub fn register_monitor<M: Monitor>(&mut self, name: &'static str, machine: M) {
        let instance = MonitorInstance::new(name, machine);
        if let Some(coverage) = &mut self.coverage {
            coverage.record_monitor(name);
        }
        self.monitors.insert(name.to_string(), Box::new(MonitorCellImpl::new(instance)));
    }

    /// `Monitor(type, event)` (`spec.md` §4.4, §6): invoked synchronously,
    /// either directly by host code or drained from an actor's
    /// [`Effect::InvokeMonitor`].
    pub async fn invoke_monitor(&mut self, monitor_type: &str, event: &Event) -> Result<(), EngineError> {
        let event_type = event.event_type().to_string();
        let operation = self.current_running.unwrap_or_default();
        let Some(cell) = self.monitors.get_mut(monitor_type) else {
            return Err(EngineError::StructuralError(format!(
                "no monitor registered for type '{monitor_type}'"
            )));
        };
        if let Err(message) = cell.process(event) {
            let temperature = cell.temperature();
            return Err(EngineError::AssertionFailure {
                operation,
                state: format!("{monitor_type} (temperature {temperature})"),
                message,
            });
        }
        let _ = self
            .observer
            .record(ObserverEvent::MonitorInvoked {
                at: Utc::now(),
                monitor: monitor_type.to_string(),
                event_type,
            })
            .await;
        Ok(())
    }

    /// Arm or disarm a virtual timer recorded via [`Effect::StartTimer`] /
    /// [`Effect::StopTimer`], and fire every currently-armed timer on
    /// demand. There is no wall clock (`spec.md` §5): the host decides when
    /// timers are "due" by calling this, rather than `delay_steps` being
    /// its own scheduled dimension inside the main loop.
    pub async fn fire_pending_timers(&mut self) -> Result<(), EngineError> {
        let due: Vec<(ActorId, TimerId)> = self.pending_timers.keys().cloned().collect();
        for (actor, timer_id) in due {
            let periodic = match self.pending_timers.get(&(actor.clone(), timer_id)) {
                Some(periodic) => *periodic,
                None => continue,
            };
            if !periodic {
                self.pending_timers.remove(&(actor.clone(), timer_id));
            }
            let info = TimerInfo { id: timer_id, periodic };
            self.route_send(actor, Event::TimerElapsed(info), EventGroup::NULL, false).await?;
        }
        Ok(())
    }

    async fn apply_effects(&mut self, source: OperationId, effects: Vec<Effect>) -> Result<(), EngineError> {
        for effect in effects {
            match effect {
                Effect::SendEvent { target, event, group, must_handle } => {
                    // An unset group inherits the sender's current group
                    // rather than defaulting to NULL (`spec.md` §3, §8's
                    // "Group inheritance" testable property).
                    let group = group.unwrap_or_else(|| {
                        self.cells.get(&source).map(|cell| cell.current_group()).unwrap_or(EventGroup::NULL)
                    });
                    self.route_send(target, event, group, must_handle).await?;
                }
                Effect::CreateActor { id, factory, initial_event, group } => {
                    Box::pin(self.spawn_cell(id, factory, initial_event, group)).await?;
                }
                Effect::InvokeMonitor { monitor_type, event } => {
                    self.invoke_monitor(&monitor_type, &event).await?;
                }
                Effect::Assert { condition, message } => {
                    if !condition {
                        return Err(EngineError::AssertionFailure {
                            operation: source,
                            state: String::new(),
                            message,
                        });
                    }
                }
                Effect::StartTimer { info, delay_steps: _ } => {
                    if let Some(actor) = self.cells.get(&source).map(|cell| cell.id().clone()) {
                        self.pending_timers.insert((actor, info.id), info.periodic);
                    }
                }
                Effect::StopTimer { id } => {
                    if let Some(actor) = self.cells.get(&source).map(|cell| cell.id().clone()) {
                        self.pending_timers.remove(&(actor, id));
                    }
                }
                Effect::Receive { .. } => {
                    // `ActorContext::take_receive_request` pulls this out of
                    // the outbox before `take_effects` ever hands it to the
                    // engine; reaching here means that drain was skipped.
                    debug_assert!(false, "Effect::Receive reached the cross-actor effect loop");
                }
            }
        }
        Ok(())
    }

    /// Drive [`ControlledRuntime::advance`] until nothing more can run this
    /// iteration.
    pub async fn run_to_completion(&mut self) -> Result<(), EngineError> {
        while self.advance().await? {}
        let _ = self
            .observer
            .record(ObserverEvent::IterationCompleted {
                at: Utc::now(),
                steps: self.step_count(),
            })
            .await;
        Ok(())
    }

    /// Run exactly one scheduling point: choose an operation from the
    /// enabled set, dispatch it, and apply whatever it recorded. Returns
    /// `Ok(true)` if an operation ran, `Ok(false)` once this iteration is
    /// quiescent (`spec.md` §4.3's main loop).
    async fn advance(&mut self) -> Result<bool, EngineError> {
        let enabled = self.operations.enabled();
        if enabled.is_empty() {
            if self.operations.all_paused_on_receive() && self.config.report_potential_deadlocks_as_bugs {
                return Err(EngineError::from(SchedulerError::Deadlock {
                    paused: self.operations.len(),
                }));
            }
            return Ok(false);
        }

        let is_fair = self.strategy.is_fair();
        let step_bound_hit = if is_fair {
            self.fair_steps >= self.config.max_fair_scheduling_steps
        } else {
            self.unfair_steps >= self.config.max_unfair_scheduling_steps
        };
        if step_bound_hit {
            let bound = if is_fair {
                self.config.max_fair_scheduling_steps
            } else {
                self.config.max_unfair_scheduling_steps
            };
            if self.config.consider_depth_bound_hit_as_bug {
                return Err(EngineError::from(SchedulerError::MaxStepsHit { bound }));
            }
            return Ok(false);
        }

        self.strategy.check_current(self.current_running);
        if let Some(divergence) = self.strategy.divergence() {
            return Err(EngineError::from(divergence.clone()));
        }

        let Some(chosen) = self.strategy.next_operation(&enabled, self.current_running) else {
            return Ok(false);
        };

        if let Some(recorder) = &mut self.trace {
            recorder.record(SchedulingPointKind::Dequeue, self.current_running, Some(chosen), Vec::new());
        }
        let _ = self
            .observer
            .record(ObserverEvent::SchedulingDecision {
                at: Utc::now(),
                step: self.strategy.step_count(),
                chosen: Some(chosen),
            })
            .await;

        self.strategy.record_step();
        if is_fair {
            self.fair_steps += 1;
            self.note_fair_step_and_check_liveness()?;
        } else {
            self.unfair_steps += 1;
        }
        self.current_running = Some(chosen);

        let before_state = self
            .cells
            .get(&chosen)
            .expect("enabled operation must have a live cell")
            .current_state_name()
            .to_string();

        let (outcome, effects) = self
            .cells
            .get_mut(&chosen)
            .expect("enabled operation must have a live cell")
            .step()
            .await;

        self.record_coverage_transition(chosen, &before_state);
        self.apply_outcome(chosen, outcome)?;
        self.apply_effects(chosen, effects).await?;

        Ok(true)
    }

    fn record_coverage_transition(&mut self, op: OperationId, before_state: &str) {
        let Some(coverage) = &mut self.coverage else {
            return;
        };
        let Some(cell) = self.cells.get(&op) else {
            return;
        };
        let after_state = cell.current_state_name();
        if before_state == after_state {
            return;
        }
        let (actor_value, type_name) = (cell.id().value(), cell.id().type_name().to_string());
        let container = coverage.record_actor(actor_value, &type_name);
        let from = coverage.record_state(container, before_state);
        let to = coverage.record_state(container, after_state);
        // The concrete event label isn't visible through `DynActor::step`
        // (a deliberately narrow seam); transitions are labeled generically
        // rather than widening that interface for diagnostics alone.
        coverage.record_transition(from, to, "Dispatch");
    }

    fn note_fair_step_and_check_liveness(&mut self) -> Result<(), EngineError> {
        for cell in self.monitors.values_mut() {
            cell.note_fair_step();
            if cell.is_hot() && cell.temperature() >= self.config.liveness_temperature_threshold {
                return Err(EngineError::from(SchedulerError::LivenessViolation {
                    monitor: cell.name().to_string(),
                    temperature: cell.temperature(),
                }));
            }
        }
        Ok(())
    }

    fn apply_outcome(&mut self, op: OperationId, outcome: StepOutcome) -> Result<(), EngineError> {
        match outcome {
            StepOutcome::Halted => {
                self.operations.complete(op);
                Ok(())
            }
            StepOutcome::Fatal(fault) => {
                let state = format!("{:?}", fault.state);
                if fault.source.is_none() {
                    return Err(EngineError::UnhandledEvent {
                        operation: op,
                        state,
                        event: fault.event,
                    });
                }
                Err(EngineError::AssertionFailure {
                    operation: op,
                    state,
                    message: format!("{}: {}", fault.event, fault.source.expect("checked is_some above")),
                })
            }
            StepOutcome::Dispatched | StepOutcome::Idle => {
                let status = self.status_after_step(op);
                self.operations.set_status(op, status);
                Ok(())
            }
        }
    }
}
