use crate::{
    state::ExpDomain,
    types::{EntityId, Money},
};
use serde::{Deserialize, Serialize};

/// Every action the pipeline understands.
/// Wire shape: `{ "type": "BUY_CAR", "payload": { "carId": .., .. } }`.
/// Variants are added as features land and are never renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    // ── Root ──────────────────────────────────────
    ResetProgress,
    LoadPreset { name: String },
    DismissStoreReset,
    ViewPage { page: String },
    EarnMoney { amount: Money },
    GainExperience { domain: ExpDomain, amount: f64 },
    SpendPoint { domain: ExpDomain, attribute: String },

    // ── Race ──────────────────────────────────────
    StartRace { track_id: EntityId, price: Money, prize: Money },
    EndRace { track_id: EntityId, position: u32, prize: Money },
    AbandonRace { track_id: EntityId },

    // ── Garage ────────────────────────────────────
    BuyCar { car_id: EntityId, brand: EntityId, price: Money },
    SellCar { car_id: EntityId, price: Money },
    CompleteBrand { brand: EntityId },
    RecalculateBrandComplete,

    /// Anything else. Every reducer treats it as a no-op.
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Decode an action from an external producer. Unrecognized types and
    /// malformed payloads come back as `Unknown`, never as an error.
    pub fn parse(value: serde_json::Value) -> Self {
        match serde_json::from_value(value) {
            Ok(action) => action,
            Err(e) => {
                log::debug!("treating undecodable action as unknown: {e}");
                Action::Unknown
            }
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Action::ResetProgress            => "RESET_PROGRESS",
            Action::LoadPreset { .. }        => "LOAD_PRESET",
            Action::DismissStoreReset        => "DISMISS_STORE_RESET",
            Action::ViewPage { .. }          => "VIEW_PAGE",
            Action::EarnMoney { .. }         => "EARN_MONEY",
            Action::GainExperience { .. }    => "GAIN_EXPERIENCE",
            Action::SpendPoint { .. }        => "SPEND_POINT",
            Action::StartRace { .. }         => "START_RACE",
            Action::EndRace { .. }           => "END_RACE",
            Action::AbandonRace { .. }       => "ABANDON_RACE",
            Action::BuyCar { .. }            => "BUY_CAR",
            Action::SellCar { .. }           => "SELL_CAR",
            Action::CompleteBrand { .. }     => "COMPLETE_BRAND",
            Action::RecalculateBrandComplete => "RECALCULATE_BRAND_COMPLETE",
            Action::Unknown                  => "UNKNOWN",
        }
    }
}
