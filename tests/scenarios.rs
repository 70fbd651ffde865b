//! End-to-end scheduling scenarios driven through the public
//! [`ControlledRuntime`] API rather than any single module in isolation.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use weft::prelude::*;
use weft::Observer;
use weft::{EngineError, EventSeverity, InMemoryObserver, ObserverEvent, SchedulerError};

#[derive(Debug)]
struct NeverFails;
impl fmt::Display for NeverFails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "never fails")
    }
}
impl std::error::Error for NeverFails {}

type Log = Arc<Mutex<Vec<String>>>;

// --- Scenario 1: goto via raise ------------------------------------------

struct E1;

struct GotoViaRaise {
    log: Log,
}

#[async_trait]
impl StateMachine for GotoViaRaise {
    type Error = NeverFails;

    fn state_table() -> StateTable {
        StateTableBuilder::new()
            .state(StateDecl::new("Init").on_entry().handle::<E1>(HandlerKind::Goto(StateId(1))).unwrap())
            .state(StateDecl::new("Final").on_entry())
            .finalize("Init")
            .unwrap()
    }

    async fn on_event(&mut self, _ctx: &mut ActorContext, _state: StateId, _event: &Event) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn on_entry(&mut self, ctx: &mut ActorContext, state: StateId) -> Result<(), Self::Error> {
        if state == StateId(0) {
            self.log.lock().push("InitOnEntry".to_string());
            ctx.raise_event(Event::user(E1));
            self.log.lock().push("RaiseEvent".to_string());
        } else {
            self.log.lock().push("CurrentState=Final".to_string());
            self.log.lock().push("OnFinal".to_string());
        }
        Ok(())
    }
}

#[tokio::test]
async fn goto_via_raise_reaches_final_through_the_raised_slot() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut engine = ControlledRuntime::with_noop_observer(EngineConfig::default());
    let id = engine
        .create_actor_and_execute_async("GotoViaRaise", None, {
            let log = log.clone();
            move || GotoViaRaise { log }
        }, None, None)
        .await
        .unwrap();

    assert_eq!(
        *log.lock(),
        vec!["InitOnEntry", "RaiseEvent", "CurrentState=Final", "OnFinal"]
    );
    assert_eq!(engine.current_state_name_of(&id).as_deref(), Some("Final"));
}

// --- Scenario 2: push + pop -----------------------------------------------

struct E1Push;
struct E2Push;

struct PushPop {
    log: Log,
}

#[async_trait]
impl StateMachine for PushPop {
    type Error = NeverFails;

    fn state_table() -> StateTable {
        StateTableBuilder::new()
            .state(StateDecl::new("Init").on_entry().handle::<E1Push>(HandlerKind::Push(StateId(1))).unwrap())
            .state(StateDecl::new("Final").on_entry().handle::<E2Push>(HandlerKind::Do).unwrap())
            .finalize("Init")
            .unwrap()
    }

    async fn on_event(&mut self, ctx: &mut ActorContext, _state: StateId, _event: &Event) -> Result<(), Self::Error> {
        ctx.raise_pop_state();
        Ok(())
    }

    async fn on_entry(&mut self, _ctx: &mut ActorContext, state: StateId) -> Result<(), Self::Error> {
        self.log.lock().push(if state == StateId(0) { "InitOnEntry".to_string() } else { "CurrentState=Final".to_string() });
        Ok(())
    }
}

#[tokio::test]
async fn push_then_pop_returns_to_the_pushing_state() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut engine = ControlledRuntime::with_noop_observer(EngineConfig::default());
    let id = engine
        .create_actor("PushPop", None, {
            let log = log.clone();
            move || PushPop { log }
        }, None, None)
        .await
        .unwrap();

    engine.send_event_and_execute_async(id.clone(), Event::user(E1Push), None, false).await.unwrap();
    assert_eq!(engine.current_state_name_of(&id).as_deref(), Some("Final"));

    engine.send_event_and_execute_async(id.clone(), Event::user(E2Push), None, false).await.unwrap();
    assert_eq!(engine.current_state_name_of(&id).as_deref(), Some("Init"), "popping Final returns to Init");
    assert_eq!(*log.lock(), vec!["InitOnEntry", "CurrentState=Final"]);
}

// --- Scenario 3: defer / ignore / inherit --------------------------------

struct E1Def;
struct E2Def;
struct E3Def;
struct E4Def;

/// `E3Def`'s ignore lives on `Base` so it survives the `Init -> Final`
/// push: ignore/defer come from the *current top-of-stack state's*
/// flattened inheritance chain, not from whatever state was pushed from,
/// so only a shared ancestor's declaration carries across a push.
struct DeferIgnoreInherit {
    log: Log,
}

#[async_trait]
impl StateMachine for DeferIgnoreInherit {
    type Error = NeverFails;

    fn state_table() -> StateTable {
        StateTableBuilder::new()
            .state(
                StateDecl::new("Base")
                    .handle::<E4Def>(HandlerKind::Do)
                    .unwrap()
                    .handle::<E3Def>(HandlerKind::Ignore)
                    .unwrap(),
            )
            .state(
                StateDecl::new("Init")
                    .inherits("Base")
                    .on_entry()
                    .handle::<E1Def>(HandlerKind::Push(StateId(2)))
                    .unwrap()
                    .handle::<E2Def>(HandlerKind::Defer)
                    .unwrap(),
            )
            .state(
                StateDecl::new("Final")
                    .inherits("Base")
                    .on_entry()
                    .handle::<E2Def>(HandlerKind::Do)
                    .unwrap(),
            )
            .finalize("Init")
            .unwrap()
    }

    async fn on_event(&mut self, _ctx: &mut ActorContext, _state: StateId, event: &Event) -> Result<(), Self::Error> {
        self.log.lock().push(format!("Handled({event})"));
        Ok(())
    }

    async fn on_entry(&mut self, _ctx: &mut ActorContext, state: StateId) -> Result<(), Self::Error> {
        if state == StateId(2) {
            self.log.lock().push("CurrentState=Final".to_string());
        }
        Ok(())
    }
}

#[tokio::test]
async fn defer_ignore_and_inherited_handlers_interleave_correctly() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut engine = ControlledRuntime::with_noop_observer(EngineConfig::default());
    let id = engine
        .create_actor("DeferIgnoreInherit", None, {
            let log = log.clone();
            move || DeferIgnoreInherit { log }
        }, None, None)
        .await
        .unwrap();

    // E2 is deferred in Init, E1 pushes to Final (where E2 is handled and
    // the defer no longer applies), E3 stays ignored throughout (declared
    // on the shared Base), E4 only has a Base-inherited handler.
    engine.send_event(id.clone(), Event::user(E2Def), None, false).await.unwrap();
    engine.send_event(id.clone(), Event::user(E1Def), None, false).await.unwrap();
    engine.send_event(id.clone(), Event::user(E3Def), None, false).await.unwrap();
    engine.send_event_and_execute_async(id.clone(), Event::user(E4Def), None, false).await.unwrap();

    assert_eq!(engine.current_state_name_of(&id).as_deref(), Some("Final"));
    assert_eq!(
        *log.lock(),
        vec![
            "CurrentState=Final".to_string(),
            format!("Handled({})", Event::user(E2Def)),
            format!("Handled({})", Event::user(E4Def)),
        ]
    );
}

// --- Scenario 4: operation-group propagation ------------------------------

struct Request;
struct Reply;

struct Responder {
    target: ActorId,
    observed_request_group: Arc<Mutex<Option<EventGroup>>>,
}

#[async_trait]
impl StateMachine for Responder {
    type Error = NeverFails;

    fn state_table() -> StateTable {
        StateTableBuilder::new()
            .state(StateDecl::new("Init").handle::<Request>(HandlerKind::Do).unwrap())
            .finalize("Init")
            .unwrap()
    }

    async fn on_event(&mut self, ctx: &mut ActorContext, _state: StateId, _event: &Event) -> Result<(), Self::Error> {
        *self.observed_request_group.lock() = Some(ctx.current_group());
        let reply_group = EventGroup::new();
        ctx.send_event_with(self.target.clone(), Event::user(Reply), Some(reply_group), false);
        Ok(())
    }
}

struct Originator {
    observed_reply_group: Arc<Mutex<Option<EventGroup>>>,
}

#[async_trait]
impl StateMachine for Originator {
    type Error = NeverFails;

    fn state_table() -> StateTable {
        StateTableBuilder::new()
            .state(StateDecl::new("Init").handle::<Reply>(HandlerKind::Do).unwrap())
            .finalize("Init")
            .unwrap()
    }

    async fn on_event(&mut self, ctx: &mut ActorContext, _state: StateId, _event: &Event) -> Result<(), Self::Error> {
        *self.observed_reply_group.lock() = Some(ctx.current_group());
        Ok(())
    }
}

#[tokio::test]
async fn a_reply_groups_own_correlation_travels_back_to_the_originator() {
    let observed_request_group = Arc::new(Mutex::new(None));
    let observed_reply_group = Arc::new(Mutex::new(None));

    let mut engine = ControlledRuntime::with_noop_observer(EngineConfig::default());
    let originator = engine
        .create_actor("Originator", None, {
            let observed_reply_group = observed_reply_group.clone();
            move || Originator { observed_reply_group }
        }, None, None)
        .await
        .unwrap();
    let responder = engine
        .create_actor("Responder", None, {
            let observed_request_group = observed_request_group.clone();
            move || Responder {
                target: originator.clone(),
                observed_request_group,
            }
        }, None, None)
        .await
        .unwrap();

    let g1 = EventGroup::new();
    engine
        .send_event_and_execute_async(responder, Event::user(Request), Some(g1), false)
        .await
        .unwrap();

    let seen_request_group = observed_request_group.lock().expect("responder handled its request");
    assert_eq!(seen_request_group, g1, "B observed g1 while handling its event");

    let seen_reply_group = observed_reply_group.lock().expect("originator handled the reply");
    assert_ne!(seen_reply_group, g1, "A observes the reply's own group g2, not B's inbound g1");
}

// --- Scenario 5: drop after halt ------------------------------------------

struct SelfAddressed;

struct DropAfterHalt {
    log: Log,
}

#[async_trait]
impl StateMachine for DropAfterHalt {
    type Error = NeverFails;

    fn state_table() -> StateTable {
        StateTableBuilder::new()
            .state(StateDecl::new("Init").handle::<SelfAddressed>(HandlerKind::Do).unwrap())
            .finalize("Init")
            .unwrap()
    }

    async fn on_event(&mut self, _ctx: &mut ActorContext, _state: StateId, _event: &Event) -> Result<(), Self::Error> {
        self.log.lock().push("handled".to_string());
        Ok(())
    }

    async fn on_halt(&mut self, ctx: &mut ActorContext) {
        let me = ctx.id().clone();
        ctx.send_event(me, Event::user(SelfAddressed));
        self.log.lock().push("on_halt".to_string());
    }
}

#[tokio::test]
async fn a_self_addressed_send_from_on_halt_is_dropped_not_handled() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let observer = Arc::new(InMemoryObserver::new(EventSeverity::Trace));
    let mut engine = ControlledRuntime::new(EngineConfig::default(), observer.clone());
    let id = engine
        .create_actor("DropAfterHalt", None, {
            let log = log.clone();
            move || DropAfterHalt { log }
        }, None, None)
        .await
        .unwrap();

    engine.send_event_and_execute_async(id.clone(), Event::Halt, None, false).await.unwrap();

    assert!(engine.is_halted(&id));
    assert_eq!(*log.lock(), vec!["on_halt"], "the self-addressed event never reaches on_event");

    let snapshot = observer.snapshot().await.unwrap();
    let drops = snapshot.iter().filter(|e| matches!(e, ObserverEvent::EventDropped { .. })).count();
    assert_eq!(drops, 1, "the post-halt self-send is dropped exactly once");
}

// --- Scenario 6: liveness hot-state bug -----------------------------------

struct HotLoopTick;

struct StaysInHotLoop;

#[async_trait]
impl StateMachine for StaysInHotLoop {
    type Error = NeverFails;

    fn state_table() -> StateTable {
        StateTableBuilder::new()
            .state(StateDecl::new("HotLoop").handle::<HotLoopTick>(HandlerKind::Do).unwrap())
            .finalize("HotLoop")
            .unwrap()
    }

    async fn on_event(&mut self, ctx: &mut ActorContext, _state: StateId, _event: &Event) -> Result<(), Self::Error> {
        let me = ctx.id().clone();
        ctx.send_event(me, Event::user(HotLoopTick));
        Ok(())
    }
}

struct HotLoopMonitor;

impl Monitor for HotLoopMonitor {
    type Error = Infallible;

    fn state_table() -> StateTable {
        StateTableBuilder::new().state(StateDecl::new("HotLoop")).finalize("HotLoop").unwrap()
    }

    fn hot_states() -> HashSet<StateId> {
        let mut hot = HashSet::new();
        hot.insert(StateId(0));
        hot
    }

    fn on_event(&mut self, _state: StateId, _event: &Event) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[tokio::test]
async fn never_leaving_a_hot_state_is_reported_within_the_temperature_threshold() {
    let config = EngineConfig::builder()
        .with_strategy(StrategyKind::Dfs)
        .with_liveness_temperature_threshold(100)
        .build()
        .unwrap();
    let mut engine = ControlledRuntime::with_noop_observer(config);
    engine.register_monitor("HotLoopMonitor", HotLoopMonitor);

    let result = engine
        .create_actor_and_execute_async("StaysInHotLoop", None, || StaysInHotLoop, Some(Event::user(HotLoopTick)), None)
        .await;

    assert!(matches!(result, Err(EngineError::Scheduler(SchedulerError::LivenessViolation { temperature, .. })) if temperature >= 100));
    assert!(engine.step_count() <= 100, "reported at or before the 100th fair step");
}

// --- Scenario 7: receive suspends a handler until a matching event arrives --

struct Ping;
struct Wanted;

/// Receive bypasses state-dispatch on resumption, so `Wanted` has no entry
/// in the state table at all — it only ever reaches `on_event` through the
/// suspended receive being satisfied.
struct Waiter {
    log: Log,
}

#[async_trait]
impl StateMachine for Waiter {
    type Error = NeverFails;

    fn state_table() -> StateTable {
        StateTableBuilder::new()
            .state(StateDecl::new("Init").handle::<Ping>(HandlerKind::Do).unwrap())
            .finalize("Init")
            .unwrap()
    }

    async fn on_event(&mut self, ctx: &mut ActorContext, _state: StateId, event: &Event) -> Result<(), Self::Error> {
        if event.event_type() == EventTypeId::of::<Ping>() {
            let mut types = HashSet::new();
            types.insert(EventTypeId::of::<Wanted>());
            ctx.receive_event_async(types, None);
            self.log.lock().push("asked".to_string());
        } else {
            self.log.lock().push("resumed".to_string());
        }
        Ok(())
    }
}

#[tokio::test]
async fn receive_event_async_suspends_and_resumes_through_the_runtime() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut engine = ControlledRuntime::with_noop_observer(EngineConfig::default());
    let id = engine
        .create_actor("Waiter", None, {
            let log = log.clone();
            move || Waiter { log }
        }, None, None)
        .await
        .unwrap();

    engine.send_event_and_execute_async(id.clone(), Event::user(Ping), None, false).await.unwrap();
    assert_eq!(*log.lock(), vec!["asked"], "the handler suspends instead of completing normally");

    engine.send_event_and_execute_async(id.clone(), Event::user(Wanted), None, false).await.unwrap();
    assert_eq!(*log.lock(), vec!["asked", "resumed"], "the matching event resumes the suspended handler");
}

// --- Scenario 8: a Push frame sits under a Goto to an unrelated state ------

struct PushThenGoto;
struct UnrelatedGoto;

/// `Init -(Push)-> Pushed -(Goto)-> Unrelated`, where `Unrelated` shares no
/// ancestor with `Pushed` on `self.stack`. The full `[Init, Pushed]` stack
/// must unwind down to empty before `Unrelated` is entered, not just the
/// innermost `Pushed` frame.
struct PushThenGotoMachine {
    log: Log,
}

#[async_trait]
impl StateMachine for PushThenGotoMachine {
    type Error = NeverFails;

    fn state_table() -> StateTable {
        StateTableBuilder::new()
            .state(
                StateDecl::new("Init")
                    .on_exit()
                    .handle::<PushThenGoto>(HandlerKind::Push(StateId(1)))
                    .unwrap(),
            )
            .state(
                StateDecl::new("Pushed")
                    .on_exit()
                    .handle::<UnrelatedGoto>(HandlerKind::Goto(StateId(2)))
                    .unwrap(),
            )
            .state(StateDecl::new("Unrelated").on_entry())
            .finalize("Init")
            .unwrap()
    }

    async fn on_event(&mut self, _ctx: &mut ActorContext, _state: StateId, _event: &Event) -> Result<(), Self::Error> {
        Ok(())
    }

    async fn on_exit(&mut self, _ctx: &mut ActorContext, state: StateId) -> Result<(), Self::Error> {
        self.log.lock().push(format!("Exit({})", state.0));
        Ok(())
    }

    async fn on_entry(&mut self, _ctx: &mut ActorContext, state: StateId) -> Result<(), Self::Error> {
        if state == StateId(2) {
            self.log.lock().push("CurrentState=Unrelated".to_string());
        }
        Ok(())
    }
}

#[tokio::test]
async fn goto_after_a_push_unwinds_every_frame_up_to_the_lowest_common_ancestor() {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let mut engine = ControlledRuntime::with_noop_observer(EngineConfig::default());
    let id = engine
        .create_actor("PushThenGoto", None, {
            let log = log.clone();
            move || PushThenGotoMachine { log }
        }, None, None)
        .await
        .unwrap();

    engine.send_event_and_execute_async(id.clone(), Event::user(PushThenGoto), None, false).await.unwrap();
    assert_eq!(engine.current_state_name_of(&id).as_deref(), Some("Pushed"));

    engine.send_event_and_execute_async(id.clone(), Event::user(UnrelatedGoto), None, false).await.unwrap();

    assert_eq!(engine.current_state_name_of(&id).as_deref(), Some("Unrelated"));
    assert_eq!(
        *log.lock(),
        vec!["Exit(1)", "Exit(0)", "CurrentState=Unrelated"],
        "both the pushed frame and the state pushed from are exited, innermost first"
    );
}
