//! Money delta tracking and money-star unlocking.
//!
//! Runs after every action, after the domain reducers, so the delta
//! between `lastMoneyValue` and `money` is the net effect of this step.

use crate::{
    action::Action,
    reducer::{ReduceContext, Reducer},
    stars::{new_money_stars, STARS_PAGE},
    state::GameState,
    types::Money,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoneyDelta {
    pub earned: Money,
    pub spent: Money,
}

/// Only increases count as earned and only decreases as spent.
/// Both are truncated toward zero.
pub fn money_delta(state: &GameState) -> MoneyDelta {
    let diff = state.money - state.last_money_value;
    MoneyDelta {
        earned: diff.max(0.0).trunc(),
        spent: (-diff).max(0.0).trunc(),
    }
}

pub struct MoneyTrackerReducer;

impl Reducer for MoneyTrackerReducer {
    fn name(&self) -> &'static str { "money_tracker" }

    fn reduce(&self, mut state: GameState, _action: &Action, cx: &ReduceContext) -> GameState {
        let delta = money_delta(&state);
        state.total_money_earned += delta.earned;
        state.total_money_spent += delta.spent;
        state.last_money_value = state.money;

        let completed = new_money_stars(state.total_money_earned, &state.stars);
        if !completed.is_empty() {
            log::debug!("money stars earned: {completed:?}");
            for key in completed {
                state.stars.insert(key.to_string(), true);
            }
            state
                .page_notifications
                .entry(STARS_PAGE.to_string())
                .or_insert(cx.now);
        }
        state
    }
}
