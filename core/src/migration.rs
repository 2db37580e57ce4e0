//! Snapshot migration.
//!
//! Additive schema changes are absorbed by deep-filling the loaded document
//! onto the defaults. Breaking changes (renames, restructures) must bump
//! `MINIMUM_STORE_VERSION` so old saves are reset instead of misread.

use crate::{
    snapshot::{LoadOutcome, CURRENT_STORE_VERSION},
    state::GameState,
    types::StoreVersion,
};
use serde_json::{Map, Value};

/// Run every migration step over a raw snapshot. Never fails: anything
/// unreadable comes back as `LoadOutcome::Missing`.
pub fn migrate(raw: &str, defaults: &GameState, minimum_version: StoreVersion) -> LoadOutcome {
    let mut loaded: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("snapshot is not valid JSON, using defaults: {e}");
            return LoadOutcome::Missing;
        }
    };
    if !loaded.is_object() {
        log::warn!("snapshot is not a JSON object, using defaults");
        return LoadOutcome::Missing;
    }

    backfill_brand_complete_bonus(&mut loaded, defaults);

    if let Some(version) = loaded.get("version").and_then(Value::as_f64) {
        if version < minimum_version {
            log::info!("snapshot version {version} below floor {minimum_version}, resetting");
            let mut state = defaults.clone();
            state.warnings.store_reset = true;
            return LoadOutcome::Reset(state);
        }
    }

    let mut filled = match serde_json::to_value(defaults) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("defaults failed to serialize: {e}");
            return LoadOutcome::Missing;
        }
    };
    deep_fill(&mut filled, loaded);

    match serde_json::from_value::<GameState>(filled) {
        Ok(mut state) => {
            if state.version < CURRENT_STORE_VERSION {
                state.version = CURRENT_STORE_VERSION;
            }
            LoadOutcome::Restored(state)
        }
        Err(e) => {
            log::warn!("snapshot does not fit the current schema, using defaults: {e}");
            LoadOutcome::Missing
        }
    }
}

/// Saves written before the brand-complete bonus existed have completed
/// brands but no bonus. Flag them for recalculation and put the experience
/// caps back to their defaults so the recalculation starts clean.
pub fn backfill_brand_complete_bonus(loaded: &mut Value, defaults: &GameState) {
    let bonus_is_zero = loaded
        .get("brandCompleteExpBonus")
        .and_then(Value::as_f64)
        .map_or(true, |bonus| bonus.trunc() == 0.0);
    let any_brand_complete = loaded
        .get("brandComplete")
        .and_then(Value::as_object)
        .is_some_and(|brands| brands.values().any(|done| done.as_bool() == Some(true)));

    if !(bonus_is_zero && any_brand_complete) {
        return;
    }
    let Some(root) = loaded.as_object_mut() else {
        return;
    };
    log::info!("legacy save: flagging brand bonus recalculation");
    root.insert("acquiredCar".into(), Value::Bool(true));

    let experience = object_entry(root, "experience");
    let caps = [
        ("business", defaults.experience.business.max),
        ("race", defaults.experience.race.max),
        ("mechanic", defaults.experience.mechanic.max),
    ];
    for (domain, max) in caps {
        object_entry(experience, domain).insert("max".into(), Value::from(max));
    }
}

/// Recursively merge `overlay` onto `base`. Objects merge key by key;
/// any other overlay value replaces the base, except `null`, which keeps
/// the base value.
pub fn deep_fill(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_fill(existing, value),
                    None => {
                        if !value.is_null() {
                            base_map.insert(key, value);
                        }
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, value) => *base = value,
    }
}

/// The object stored under `key`, replacing whatever non-object was there.
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(inner) => inner,
        _ => unreachable!("slot was just made an object"),
    }
}
