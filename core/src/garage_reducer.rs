use crate::{
    action::Action,
    reducer::{ReduceContext, Reducer},
    state::{GameState, GarageCar},
};

/// Experience cap raise per completed brand.
pub const BRAND_COMPLETE_EXP_BONUS: f64 = 1_000.0;

pub struct GarageReducer;

impl Reducer for GarageReducer {
    fn name(&self) -> &'static str { "garage" }

    fn reduce(&self, mut state: GameState, action: &Action, _cx: &ReduceContext) -> GameState {
        match action {
            Action::BuyCar { car_id, brand, price } => {
                if state.owns_car(car_id) || *price < 0.0 || state.money < *price {
                    return state;
                }
                state.money -= price;
                state.garage.push(GarageCar { id: car_id.clone(), brand: brand.clone() });
                state.acquired_car = true;
                state
            }

            Action::SellCar { car_id, price } => {
                let before = state.garage.len();
                state.garage.retain(|c| &c.id != car_id);
                if state.garage.len() < before {
                    state.money += price.max(0.0);
                }
                state
            }

            Action::CompleteBrand { brand } => {
                state.brand_complete.insert(brand.clone(), true);
                state.acquired_car = true;
                state
            }

            Action::RecalculateBrandComplete => {
                if !state.acquired_car {
                    return state;
                }
                recalculate_brand_bonus(&mut state);
                state
            }

            _ => state,
        }
    }
}

/// Move every experience cap by the difference between the bonus the
/// completed brands are worth and the bonus already applied.
fn recalculate_brand_bonus(state: &mut GameState) {
    let bonus = state.completed_brands() as f64 * BRAND_COMPLETE_EXP_BONUS;
    let delta = bonus - state.brand_complete_exp_bonus;
    for max in state.experience.maxes_mut() {
        *max += delta;
    }
    log::debug!("brand bonus {} -> {bonus}", state.brand_complete_exp_bonus);
    state.brand_complete_exp_bonus = bonus;
    state.acquired_car = false;
}
