use crate::{
    action::Action,
    presets,
    reducer::{ReduceContext, Reducer},
    state::{spent_counter_mut, ExpDomain, GameState},
};

/// Ledger, experience, resets and dev presets.
pub struct RootReducer;

impl Reducer for RootReducer {
    fn name(&self) -> &'static str { "root" }

    fn reduce(&self, mut state: GameState, action: &Action, cx: &ReduceContext) -> GameState {
        match action {
            Action::ResetProgress => {
                log::info!("progress reset requested");
                // Fresh timestamp so the reset does not read as idle time.
                GameState { timestamp: cx.now, ..GameState::default() }
            }

            Action::LoadPreset { name } => {
                if !cx.dev_tools {
                    log::warn!("preset '{name}' ignored: dev tools disabled");
                    return state;
                }
                match presets::preset(name) {
                    Some(preset) => GameState { timestamp: cx.now, ..preset },
                    None => {
                        log::warn!("unknown preset '{name}'");
                        state
                    }
                }
            }

            Action::DismissStoreReset => {
                state.warnings.store_reset = false;
                state
            }

            Action::ViewPage { page } => {
                state.page_notifications.remove(page);
                state
            }

            Action::EarnMoney { amount } => {
                if *amount > 0.0 {
                    state.money += amount;
                }
                state
            }

            Action::GainExperience { domain, amount } => {
                gain_experience(&mut state, *domain, *amount);
                state
            }

            Action::SpendPoint { domain, attribute } => {
                if state.experience.available_points(*domain) <= 0 {
                    return state;
                }
                match spent_counter_mut(&mut state.experience, *domain, attribute) {
                    Some(counter) => *counter = counter.saturating_add(1),
                    None => log::debug!("no attribute '{attribute}' in {domain:?}"),
                }
                state
            }

            _ => state,
        }
    }
}

/// Add exp, capped at the domain's max. Negative amounts are ignored.
pub fn gain_experience(state: &mut GameState, domain: ExpDomain, amount: f64) {
    if amount <= 0.0 {
        return;
    }
    let (exp, max) = state.experience.exp_mut(domain);
    *exp = (*exp + amount).min(max);
}
