use crate::{
    action::Action,
    reducer::{ReduceContext, Reducer},
    root_reducer::gain_experience,
    state::{ExpDomain, GameState},
};

/// Race experience for finishing, by position (1-based). Past the end: 0.
pub const RACE_EXP_BY_POSITION: [f64; 4] = [50.0, 30.0, 20.0, 10.0];

pub struct RaceReducer;

impl Reducer for RaceReducer {
    fn name(&self) -> &'static str { "race" }

    fn reduce(&self, mut state: GameState, action: &Action, _cx: &ReduceContext) -> GameState {
        match action {
            Action::StartRace { track_id, price, .. } => {
                if state.race_in_progress.is_some() || *price < 0.0 || state.money < *price {
                    return state;
                }
                state.money -= price;
                state.tracks_stats.entry(track_id.clone()).or_default().races += 1;
                state.race_in_progress = Some(track_id.clone());
                state
            }

            Action::EndRace { track_id, position, prize } => {
                if state.race_in_progress.as_deref() != Some(track_id.as_str()) {
                    return state;
                }
                state.race_in_progress = None;
                state.money += prize.max(0.0);
                if *position == 1 {
                    state.tracks_stats.entry(track_id.clone()).or_default().won += 1;
                }
                let exp = position
                    .checked_sub(1)
                    .and_then(|i| RACE_EXP_BY_POSITION.get(i as usize))
                    .copied()
                    .unwrap_or(0.0);
                gain_experience(&mut state, ExpDomain::Race, exp);
                state
            }

            // No payout and no experience; the fee stays spent.
            Action::AbandonRace { track_id } => {
                if state.race_in_progress.as_deref() == Some(track_id.as_str()) {
                    state.race_in_progress = None;
                }
                state
            }

            _ => state,
        }
    }
}
