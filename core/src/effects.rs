//! Effect runners: the side-effect layer around the pipeline.
//!
//! An effect runner watches dispatched actions and answers with more
//! actions through a `Dispatcher`. It may hold the dispatcher anywhere,
//! including another thread; the engine drains it on the next
//! `dispatch` or `poll`.

use crate::{
    action::Action,
    rng::{RaceRng, RngStream},
    state::GameState,
    types::Money,
};
use std::sync::mpsc::Sender;

/// Cloneable handle for sending actions back into the engine.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: Sender<Action>,
}

impl Dispatcher {
    pub(crate) fn new(tx: Sender<Action>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: Action) {
        if self.tx.send(action).is_err() {
            log::debug!("engine gone; dropping effect action");
        }
    }
}

pub trait EffectRunner {
    fn name(&self) -> &'static str;

    /// Called once, when the runner is attached.
    fn start(&mut self, state: &GameState, dispatch: &Dispatcher);

    /// Called after every reduction with the action and the states on
    /// either side of it.
    fn on_action(
        &mut self,
        action: &Action,
        before: &GameState,
        after: &GameState,
        dispatch: &Dispatcher,
    );
}

/// Cars on the grid for every race.
pub const FIELD_SIZE: u64 = 4;

/// Share of the advertised prize paid per finishing position.
pub const PRIZE_SHARE: [f64; FIELD_SIZE as usize] = [1.0, 0.5, 0.25, 0.0];

pub const BASE_WIN_CHANCE: f64 = 0.25;
pub const WIN_CHANCE_PER_MECHANIC_POINT: f64 = 0.02;
pub const MAX_WIN_CHANCE: f64 = 0.9;

/// The game's own effects: race resolution and brand bonus upkeep.
pub struct GameEffects {
    rng: RaceRng,
}

impl GameEffects {
    pub fn new(seed: u64) -> Self {
        Self { rng: RngStream::Race.rng(seed) }
    }

    fn roll_position(&mut self, state: &GameState) -> u32 {
        let points = f64::from(state.experience.mechanic.spent());
        let win_chance =
            (BASE_WIN_CHANCE + points * WIN_CHANCE_PER_MECHANIC_POINT).min(MAX_WIN_CHANCE);
        if self.rng.chance(win_chance) {
            1
        } else {
            2 + self.rng.next_u64_below(FIELD_SIZE - 1) as u32
        }
    }

    fn races_on(state: &GameState, track_id: &str) -> u32 {
        state.tracks_stats.get(track_id).map_or(0, |stats| stats.races)
    }

    fn maybe_recalculate(state: &GameState, dispatch: &Dispatcher) {
        if state.acquired_car {
            dispatch.dispatch(Action::RecalculateBrandComplete);
        }
    }
}

/// Prize actually paid for `position` (1-based).
pub fn prize_for(position: u32, prize: Money) -> Money {
    let share = position
        .checked_sub(1)
        .and_then(|i| PRIZE_SHARE.get(i as usize))
        .copied()
        .unwrap_or(0.0);
    (prize * share).trunc()
}

impl EffectRunner for GameEffects {
    fn name(&self) -> &'static str { "game" }

    fn start(&mut self, state: &GameState, dispatch: &Dispatcher) {
        // Its prize went down with the process that started it.
        if let Some(track_id) = &state.race_in_progress {
            log::info!("abandoning interrupted race on {track_id}");
            dispatch.dispatch(Action::AbandonRace { track_id: track_id.clone() });
        }
        Self::maybe_recalculate(state, dispatch);
    }

    fn on_action(
        &mut self,
        action: &Action,
        before: &GameState,
        after: &GameState,
        dispatch: &Dispatcher,
    ) {
        if let Action::StartRace { track_id, prize, .. } = action {
            // Only a start the reducer accepted counts a race.
            if Self::races_on(after, track_id) > Self::races_on(before, track_id) {
                let position = self.roll_position(after);
                log::debug!("{}: {track_id} finished P{position}", self.rng.name);
                dispatch.dispatch(Action::EndRace {
                    track_id: track_id.clone(),
                    position,
                    prize: prize_for(position, *prize),
                });
            }
        }
        Self::maybe_recalculate(after, dispatch);
    }
}
