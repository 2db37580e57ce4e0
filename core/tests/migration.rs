//! Snapshot migration: version gate, deep-fill, legacy brand backfill.

use idleracer_core::{
    migration::migrate,
    snapshot::{LoadOutcome, CURRENT_STORE_VERSION, MINIMUM_STORE_VERSION},
    state::{GameState, DEFAULT_MECHANIC_MAX},
};
use serde_json::{json, Value};

fn defaults() -> GameState {
    GameState::default()
}

/// The serialized defaults, ready to be edited into an "old" save.
fn saved(state: &GameState) -> Value {
    serde_json::to_value(state).expect("serialize state")
}

fn restored(outcome: LoadOutcome) -> GameState {
    match outcome {
        LoadOutcome::Restored(state) => state,
        other => panic!("expected a restored state, got {}", other.label()),
    }
}

#[test]
fn version_below_floor_resets_with_warning() {
    let mut raw = saved(&defaults());
    raw["version"] = json!(0.5);
    raw["money"] = json!(123_456);

    let outcome = migrate(&raw.to_string(), &defaults(), MINIMUM_STORE_VERSION);
    let LoadOutcome::Reset(state) = outcome else {
        panic!("expected reset");
    };
    assert!(state.warnings.store_reset);
    assert_eq!(state.money, defaults().money, "old progress must be discarded");
    assert_eq!(
        GameState { warnings: Default::default(), ..state },
        defaults()
    );
}

#[test]
fn version_at_floor_is_kept_and_raised() {
    let mut raw = saved(&defaults());
    raw["version"] = json!(MINIMUM_STORE_VERSION);
    raw["money"] = json!(777);

    let state = restored(migrate(&raw.to_string(), &defaults(), MINIMUM_STORE_VERSION));
    assert_eq!(state.money, 777.0);
    assert_eq!(state.version, CURRENT_STORE_VERSION);
    assert!(!state.warnings.store_reset);
}

#[test]
fn deep_fill_restores_missing_nested_fields() {
    let mut base = defaults();
    base.experience.mechanic.hnd = 3;

    let mut raw = saved(&GameState::default());
    raw["experience"]["mechanic"]["exp"] = json!(250);
    raw["experience"]["mechanic"]["acc"] = json!(1);
    raw["experience"]["mechanic"]
        .as_object_mut()
        .unwrap()
        .remove("hnd");
    raw.as_object_mut().unwrap().remove("tracksStats");

    let state = restored(migrate(&raw.to_string(), &base, MINIMUM_STORE_VERSION));
    assert_eq!(state.experience.mechanic.hnd, 3, "missing field takes the default");
    assert_eq!(state.experience.mechanic.exp, 250.0);
    assert_eq!(state.experience.mechanic.acc, 1);
    assert!(state.tracks_stats.is_empty());
}

#[test]
fn null_fields_fall_back_to_defaults() {
    let mut raw = saved(&defaults());
    raw["money"] = Value::Null;
    raw["warnings"] = Value::Null;

    let state = restored(migrate(&raw.to_string(), &defaults(), MINIMUM_STORE_VERSION));
    assert_eq!(state.money, defaults().money);
    assert!(!state.warnings.store_reset);
}

#[test]
fn missing_version_does_not_trip_the_gate() {
    let mut raw = saved(&defaults());
    raw.as_object_mut().unwrap().remove("version");
    raw["money"] = json!(42);

    let state = restored(migrate(&raw.to_string(), &defaults(), MINIMUM_STORE_VERSION));
    assert_eq!(state.money, 42.0);
    assert_eq!(state.version, CURRENT_STORE_VERSION);
}

#[test]
fn legacy_brand_complete_is_backfilled() {
    let mut raw = saved(&defaults());
    raw.as_object_mut().unwrap().remove("brandCompleteExpBonus");
    raw["brandComplete"] = json!({ "kei": true, "muscle": false });
    raw["acquiredCar"] = json!(false);
    for domain in ["business", "race", "mechanic"] {
        raw["experience"][domain]["max"] = json!(99_999);
    }

    let state = restored(migrate(&raw.to_string(), &defaults(), MINIMUM_STORE_VERSION));
    assert!(state.acquired_car);
    assert_eq!(state.experience.business.max, defaults().experience.business.max);
    assert_eq!(state.experience.race.max, defaults().experience.race.max);
    assert_eq!(state.experience.mechanic.max, DEFAULT_MECHANIC_MAX);
}

#[test]
fn saves_with_a_bonus_are_not_backfilled() {
    let mut raw = saved(&defaults());
    raw["brandCompleteExpBonus"] = json!(1000);
    raw["brandComplete"] = json!({ "kei": true });
    raw["experience"]["race"]["max"] = json!(11_000);

    let state = restored(migrate(&raw.to_string(), &defaults(), MINIMUM_STORE_VERSION));
    assert!(!state.acquired_car);
    assert_eq!(state.experience.race.max, 11_000.0);
}

#[test]
fn no_completed_brand_means_no_backfill() {
    let mut raw = saved(&defaults());
    raw["brandComplete"] = json!({ "kei": false });
    raw["experience"]["race"]["max"] = json!(12_345);

    let state = restored(migrate(&raw.to_string(), &defaults(), MINIMUM_STORE_VERSION));
    assert!(!state.acquired_car);
    assert_eq!(state.experience.race.max, 12_345.0);
}

#[test]
fn non_boolean_brand_flags_do_not_decode() {
    let mut raw = saved(&defaults());
    raw["brandComplete"] = json!({ "kei": 1 });
    raw["brandCompleteExpBonus"] = json!(0);

    let outcome = migrate(&raw.to_string(), &defaults(), MINIMUM_STORE_VERSION);
    assert_eq!(outcome, LoadOutcome::Missing);
}

#[test]
fn unreadable_snapshots_are_missing() {
    for raw in ["{not json", "[1, 2, 3]", "\"state\"", r#"{ "money": "lots" }"#] {
        assert_eq!(
            migrate(raw, &defaults(), MINIMUM_STORE_VERSION),
            LoadOutcome::Missing,
            "raw snapshot {raw:?} should fall back silently"
        );
    }
}

#[test]
fn missing_outcome_maps_to_defaults() {
    let state = LoadOutcome::Missing.into_state(defaults());
    assert_eq!(state, defaults());
    assert!(!state.warnings.store_reset);
}
