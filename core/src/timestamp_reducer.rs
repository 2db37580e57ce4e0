use crate::{
    action::Action,
    reducer::{ReduceContext, Reducer},
    state::GameState,
};

/// Wall-clock bookkeeping. Runs after every action.
/// `timelapse` is what offline/idle progress is computed from.
pub struct TimestampReducer;

impl Reducer for TimestampReducer {
    fn name(&self) -> &'static str { "timestamp" }

    fn reduce(&self, state: GameState, _action: &Action, cx: &ReduceContext) -> GameState {
        GameState {
            timelapse: cx.now - state.timestamp,
            timestamp: cx.now,
            ..state
        }
    }
}
