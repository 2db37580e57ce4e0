//! The state engine: owns the current state, the reducer pipeline, the
//! subscribers and the effect runner.
//!
//! DISPATCH ORDER (fixed):
//!   1. Sample the clock.
//!   2. Fold the action through the pipeline.
//!   3. Hand the action and the states before and after to the effect runner.
//!   4. Apply any actions the runner queued, FIFO, from step 1.
//!   5. Once the queue is empty, notify every subscriber in subscription order.
//!
//! RULES:
//!   - The state is replaced, never shared mutably.
//!   - Subscribers see the state only once its follow-ups have settled,
//!     never halfway through a cascade.
//!   - Persistence is an ordinary subscriber.

use crate::{
    action::Action,
    clock::Clock,
    config::StoreConfig,
    effects::{Dispatcher, EffectRunner},
    error::{StoreError, StoreResult},
    persistence::ThrottledPersistence,
    reducer::{ReduceContext, ReducerPipeline},
    snapshot::{LoadOutcome, SnapshotStore},
    state::GameState,
    store::SnapshotBackend,
    types::Timestamp,
};
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver};

/// Follow-up actions applied per top-level dispatch before the engine
/// stops draining and leaves the rest for the next poll.
pub const MAX_CASCADE: usize = 1024;

pub trait Subscriber {
    fn name(&self) -> &'static str;

    /// Called once per dispatch or poll that changed anything, after every
    /// follow-up action has been applied.
    fn on_change(&mut self, state: &GameState, now: Timestamp);

    /// Called from the host loop between dispatches. Deferred work runs here.
    fn poll(&mut self, _state: &GameState, _now: Timestamp) {}

    /// Called on shutdown. Anything deferred must happen now.
    fn flush(&mut self, _state: &GameState, _now: Timestamp) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct GameEngine {
    state: GameState,
    pipeline: ReducerPipeline,
    clock: Box<dyn Clock>,
    dev_tools: bool,
    subscribers: Vec<(SubscriptionId, Box<dyn Subscriber>)>,
    next_subscription: u64,
    effects: Option<Box<dyn EffectRunner>>,
    dispatcher: Dispatcher,
    inbox: Receiver<Action>,
}

impl GameEngine {
    /// A bare engine over `state`: standard pipeline, no subscribers.
    pub fn new(state: GameState, clock: Box<dyn Clock>) -> Self {
        let (tx, inbox) = mpsc::channel();
        Self {
            state,
            pipeline: ReducerPipeline::standard(),
            clock,
            dev_tools: false,
            subscribers: Vec::new(),
            next_subscription: 0,
            effects: None,
            dispatcher: Dispatcher::new(tx),
            inbox,
        }
    }

    /// Build the production engine: load the saved state through the
    /// migration layer and subscribe throttled persistence.
    pub fn configure(
        config: &StoreConfig,
        backend: Box<dyn SnapshotBackend>,
        clock: Box<dyn Clock>,
    ) -> (Self, LoadOutcome) {
        let snapshots = SnapshotStore::new(backend, config.storage_key.clone())
            .with_minimum_version(config.minimum_store_version);
        let defaults = GameState::default();
        let outcome = snapshots.load(&defaults);
        log::info!("snapshot '{}' {}", snapshots.key(), outcome.label());

        let mut state = outcome.clone().into_state(defaults);
        if !matches!(outcome, LoadOutcome::Restored(_)) {
            // Fresh state: no idle time has passed.
            state.timestamp = clock.now();
        }

        let mut engine = Self::new(state, clock).with_dev_tools(config.dev_tools);
        engine.subscribe(Box::new(ThrottledPersistence::new(
            snapshots,
            config.throttle_ms,
        )));
        (engine, outcome)
    }

    pub fn with_dev_tools(mut self, enabled: bool) -> Self {
        self.dev_tools = enabled;
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn Subscriber>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        log::debug!("subscriber '{}' attached", subscriber.name());
        self.subscribers.push((id, subscriber));
        id
    }

    /// Returns whether `id` was subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() < before
    }

    /// Attach the effect runner. Only one may ever be attached.
    pub fn run_effects(&mut self, mut runner: Box<dyn EffectRunner>) -> StoreResult<()> {
        if self.effects.is_some() {
            return Err(StoreError::EffectsAlreadyRunning);
        }
        log::info!("effect runner '{}' started", runner.name());
        runner.start(&self.state, &self.dispatcher);
        self.effects = Some(runner);
        Ok(())
    }

    /// Reduce `action`, then any follow-ups it causes.
    pub fn dispatch(&mut self, action: Action) {
        // Actions sent earlier go first.
        let mut queue: VecDeque<Action> = self.inbox.try_iter().collect();
        queue.push_back(action);
        self.run_queue(queue);
    }

    /// Drain actions sent from outside a dispatch, then let subscribers
    /// run deferred work.
    pub fn poll(&mut self) {
        let queue: VecDeque<Action> = self.inbox.try_iter().collect();
        if !queue.is_empty() {
            self.run_queue(queue);
        }
        let now = self.clock.now();
        for (_, subscriber) in &mut self.subscribers {
            subscriber.poll(&self.state, now);
        }
    }

    /// Flush every subscriber. Call before dropping the engine.
    pub fn shutdown(&mut self) {
        let now = self.clock.now();
        for (_, subscriber) in &mut self.subscribers {
            subscriber.flush(&self.state, now);
        }
    }

    fn run_queue(&mut self, mut queue: VecDeque<Action>) {
        let mut applied = 0usize;
        while let Some(next) = queue.pop_front() {
            if applied == MAX_CASCADE {
                log::warn!("dispatch cascade hit {MAX_CASCADE} actions, deferring the rest");
                self.dispatcher.dispatch(next);
                for rest in queue.drain(..) {
                    self.dispatcher.dispatch(rest);
                }
                break;
            }
            self.apply(next);
            applied += 1;
            queue.extend(self.inbox.try_iter());
        }
        if applied > 0 {
            self.notify();
        }
    }

    fn apply(&mut self, action: Action) {
        let cx = ReduceContext { now: self.clock.now(), dev_tools: self.dev_tools };
        let current = std::mem::take(&mut self.state);
        let before = self.effects.is_some().then(|| current.clone());
        self.state = self.pipeline.reduce(current, &action, &cx);
        log::debug!("{} applied at {}", action.type_name(), cx.now);

        if let (Some(runner), Some(before)) = (self.effects.as_mut(), before) {
            runner.on_action(&action, &before, &self.state, &self.dispatcher);
        }
    }

    fn notify(&mut self) {
        let now = self.clock.now();
        for (_, subscriber) in &mut self.subscribers {
            subscriber.on_change(&self.state, now);
        }
    }
}
