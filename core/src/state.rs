//! The persisted game state.
//!
//! One record, serialized as a single JSON blob. Field names are camelCase
//! on the wire so existing saves stay readable.

use crate::{
    snapshot::CURRENT_STORE_VERSION,
    types::{EntityId, Money, StoreVersion, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const STARTING_MONEY: Money = 500.0;

/// Experience needed for level 2; level grows with the square root of exp.
pub const LEVEL_EXP_BASE: f64 = 100.0;

pub const DEFAULT_BUSINESS_MAX: f64 = 10_000.0;
pub const DEFAULT_RACE_MAX: f64 = 10_000.0;
pub const DEFAULT_MECHANIC_MAX: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub version: StoreVersion,

    // ── Ledger ─────────────────────────────────────────────────
    pub money: Money,
    pub last_money_value: Money,
    pub total_money_earned: Money,
    pub total_money_spent: Money,

    // ── Wall clock ─────────────────────────────────────────────
    pub timestamp: Timestamp,
    pub timelapse: i64,

    // ── Achievements ───────────────────────────────────────────
    pub stars: BTreeMap<String, bool>,
    /// Page key -> time the first unseen achievement landed there.
    pub page_notifications: BTreeMap<String, Timestamp>,

    pub experience: Experience,

    // ── Brand completion bonus ─────────────────────────────────
    pub brand_complete: BTreeMap<EntityId, bool>,
    pub brand_complete_exp_bonus: f64,
    /// Set whenever the brand bonus needs recalculating.
    pub acquired_car: bool,

    // ── Garage and races ───────────────────────────────────────
    pub garage: Vec<GarageCar>,
    pub tracks_stats: BTreeMap<EntityId, TrackStats>,
    pub race_in_progress: Option<EntityId>,

    pub warnings: Warnings,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            version: CURRENT_STORE_VERSION,
            money: STARTING_MONEY,
            last_money_value: STARTING_MONEY,
            total_money_earned: 0.0,
            total_money_spent: 0.0,
            timestamp: 0,
            timelapse: 0,
            stars: BTreeMap::new(),
            page_notifications: BTreeMap::new(),
            experience: Experience::default(),
            brand_complete: BTreeMap::new(),
            brand_complete_exp_bonus: 0.0,
            acquired_car: false,
            garage: Vec::new(),
            tracks_stats: BTreeMap::new(),
            race_in_progress: None,
            warnings: Warnings::default(),
        }
    }
}

impl GameState {
    pub fn owns_car(&self, car_id: &str) -> bool {
        self.garage.iter().any(|c| c.id == car_id)
    }

    pub fn completed_brands(&self) -> usize {
        self.brand_complete.values().filter(|done| **done).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarageCar {
    pub id: EntityId,
    pub brand: EntityId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackStats {
    pub races: u32,
    pub won: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warnings {
    pub store_reset: bool,
}

// ── Experience ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpDomain {
    Business,
    Race,
    Mechanic,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub business: BusinessExp,
    pub race: RaceExp,
    pub mechanic: MechanicExp,
}

impl Experience {
    pub fn exp_mut(&mut self, domain: ExpDomain) -> (&mut f64, f64) {
        match domain {
            ExpDomain::Business => (&mut self.business.exp, self.business.max),
            ExpDomain::Race => (&mut self.race.exp, self.race.max),
            ExpDomain::Mechanic => (&mut self.mechanic.exp, self.mechanic.max),
        }
    }

    /// Points still available to spend in `domain`. Not clamped: a negative
    /// value means the save spent more than it earned.
    pub fn available_points(&self, domain: ExpDomain) -> i64 {
        let (exp, spent) = match domain {
            ExpDomain::Business => (self.business.exp, self.business.spent()),
            ExpDomain::Race => (self.race.exp, self.race.spent()),
            ExpDomain::Mechanic => (self.mechanic.exp, self.mechanic.spent()),
        };
        i64::from(level(exp)) - 1 - i64::from(spent)
    }

    /// Every cap in one pass.
    pub fn maxes_mut(&mut self) -> [&mut f64; 3] {
        [
            &mut self.business.max,
            &mut self.race.max,
            &mut self.mechanic.max,
        ]
    }
}

pub fn level(exp: f64) -> u32 {
    ((exp.max(0.0) / LEVEL_EXP_BASE).sqrt().floor() as u32).saturating_add(1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessExp {
    pub exp: f64,
    pub max: f64,
    pub rewards: u32,
    pub sponsors: u32,
    pub bonus: u32,
}

impl Default for BusinessExp {
    fn default() -> Self {
        Self { exp: 0.0, max: DEFAULT_BUSINESS_MAX, rewards: 0, sponsors: 0, bonus: 0 }
    }
}

impl BusinessExp {
    pub fn spent(&self) -> u32 {
        self.rewards.saturating_add(self.sponsors).saturating_add(self.bonus)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceExp {
    pub exp: f64,
    pub max: f64,
    pub price: u32,
    pub prize: u32,
    pub sponsors: u32,
}

impl Default for RaceExp {
    fn default() -> Self {
        Self { exp: 0.0, max: DEFAULT_RACE_MAX, price: 0, prize: 0, sponsors: 0 }
    }
}

impl RaceExp {
    pub fn spent(&self) -> u32 {
        self.price.saturating_add(self.prize).saturating_add(self.sponsors)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MechanicExp {
    pub exp: f64,
    pub max: f64,
    pub acc: u32,
    pub spd: u32,
    pub hnd: u32,
}

impl Default for MechanicExp {
    fn default() -> Self {
        Self { exp: 0.0, max: DEFAULT_MECHANIC_MAX, acc: 0, spd: 0, hnd: 0 }
    }
}

impl MechanicExp {
    pub fn spent(&self) -> u32 {
        self.acc.saturating_add(self.spd).saturating_add(self.hnd)
    }
}

/// Counter for `attribute` within `domain`, if that pairing exists.
pub fn spent_counter_mut<'a>(
    experience: &'a mut Experience,
    domain: ExpDomain,
    attribute: &str,
) -> Option<&'a mut u32> {
    match (domain, attribute) {
        (ExpDomain::Business, "rewards") => Some(&mut experience.business.rewards),
        (ExpDomain::Business, "sponsors") => Some(&mut experience.business.sponsors),
        (ExpDomain::Business, "bonus") => Some(&mut experience.business.bonus),
        (ExpDomain::Race, "price") => Some(&mut experience.race.price),
        (ExpDomain::Race, "prize") => Some(&mut experience.race.prize),
        (ExpDomain::Race, "sponsors") => Some(&mut experience.race.sponsors),
        (ExpDomain::Mechanic, "acc") => Some(&mut experience.mechanic.acc),
        (ExpDomain::Mechanic, "spd") => Some(&mut experience.mechanic.spd),
        (ExpDomain::Mechanic, "hnd") => Some(&mut experience.mechanic.hnd),
        _ => None,
    }
}
