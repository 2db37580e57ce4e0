//! Reducer trait and the ordered pipeline.
//!
//! RULE: Every reducer sees the same state value, in registration order.
//! There are no owned slices: a reducer may rewrite any field its concern
//! touches, and a later reducer sees the earlier reducers' output.
//!
//! ORDER (fixed, documented, never reordered):
//!   1. root: ledger, experience, resets, presets
//!   2. race: race fees, prizes, track stats
//!   3. garage: car purchases, brand completion
//!   4. money_tracker: must see the post-business-logic money
//!   5. timestamp: always last

use crate::{
    action::Action,
    garage_reducer::GarageReducer,
    money_tracker_reducer::MoneyTrackerReducer,
    race_reducer::RaceReducer,
    root_reducer::RootReducer,
    state::GameState,
    timestamp_reducer::TimestampReducer,
    types::Timestamp,
};

/// Per-dispatch inputs that are not part of the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReduceContext {
    pub now: Timestamp,
    pub dev_tools: bool,
}

impl ReduceContext {
    pub fn at(now: Timestamp) -> Self {
        Self { now, dev_tools: false }
    }
}

/// The contract every reducer must fulfill.
pub trait Reducer {
    /// Unique stable name for this reducer.
    fn name(&self) -> &'static str;

    /// Pure and total. Actions the reducer does not handle must return
    /// `state` unchanged.
    fn reduce(&self, state: GameState, action: &Action, cx: &ReduceContext) -> GameState;
}

pub struct ReducerPipeline {
    reducers: Vec<Box<dyn Reducer>>,
}

impl ReducerPipeline {
    pub fn empty() -> Self {
        Self { reducers: Vec::new() }
    }

    /// The production pipeline, in the documented order.
    pub fn standard() -> Self {
        let mut pipeline = Self::empty();
        pipeline.register(Box::new(RootReducer));
        pipeline.register(Box::new(RaceReducer));
        pipeline.register(Box::new(GarageReducer));
        pipeline.register(Box::new(MoneyTrackerReducer));
        pipeline.register(Box::new(TimestampReducer));
        pipeline
    }

    /// Append a reducer. Call in the documented order.
    pub fn register(&mut self, reducer: Box<dyn Reducer>) {
        self.reducers.push(reducer);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.reducers.iter().map(|r| r.name()).collect()
    }

    /// Fold `action` through every reducer, left to right.
    pub fn reduce(&self, state: GameState, action: &Action, cx: &ReduceContext) -> GameState {
        self.reducers.iter().fold(state, |cumulative, reducer| {
            log::trace!("{} <- {}", reducer.name(), action.type_name());
            reducer.reduce(cumulative, action, cx)
        })
    }
}

impl Default for ReducerPipeline {
    fn default() -> Self { Self::standard() }
}
