//! Bootstrap load and throttled snapshot writes.

use idleracer_core::{
    action::Action,
    clock::ManualClock,
    config::StoreConfig,
    effects::GameEffects,
    engine::{GameEngine, Subscriber},
    error::{StoreError, StoreResult},
    snapshot::{LoadOutcome, SnapshotStore},
    state::GameState,
    store::{SaveStore, SnapshotBackend},
    types::Timestamp,
};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Records every write; can be told to fail.
#[derive(Default)]
struct CountingBackend {
    writes: Cell<u32>,
    last: RefCell<Option<String>>,
    fail_writes: Cell<bool>,
}

impl SnapshotBackend for CountingBackend {
    fn read(&self, _key: &str) -> StoreResult<Option<String>> {
        Ok(self.last.borrow().clone())
    }

    fn write(&self, _key: &str, state_json: &str, _saved_at: Timestamp) -> StoreResult<()> {
        if self.fail_writes.get() {
            return Err(anyhow::anyhow!("disk on fire").into());
        }
        self.writes.set(self.writes.get() + 1);
        *self.last.borrow_mut() = Some(state_json.to_string());
        Ok(())
    }

    fn remove(&self, _key: &str) -> StoreResult<()> {
        *self.last.borrow_mut() = None;
        Ok(())
    }
}

struct BrokenBackend;

impl SnapshotBackend for BrokenBackend {
    fn read(&self, _key: &str) -> StoreResult<Option<String>> {
        Err(anyhow::anyhow!("storage unavailable").into())
    }
    fn write(&self, _key: &str, _json: &str, _at: Timestamp) -> StoreResult<()> {
        Err(anyhow::anyhow!("storage unavailable").into())
    }
    fn remove(&self, _key: &str) -> StoreResult<()> {
        Ok(())
    }
}

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn sqlite() -> Rc<SaveStore> {
    let store = SaveStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    Rc::new(store)
}

fn saved_money(backend: &CountingBackend) -> f64 {
    let raw = backend.last.borrow().clone().expect("something was saved");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    value["money"].as_f64().expect("money is a number")
}

#[test]
fn bursts_of_dispatches_collapse_into_one_write() {
    init_logs();
    let backend = Rc::new(CountingBackend::default());
    let clock = ManualClock::starting_at(10_000);
    let (mut engine, outcome) = GameEngine::configure(
        &StoreConfig::default_test(),
        Box::new(Rc::clone(&backend)),
        Box::new(clock.clone()),
    );
    assert_eq!(outcome, LoadOutcome::Missing);
    assert_eq!(backend.writes.get(), 0, "bootstrap must not write");

    for _ in 0..10 {
        engine.dispatch(Action::EarnMoney { amount: 1.0 });
        clock.advance(10);
    }
    assert_eq!(backend.writes.get(), 1, "only the leading write lands inside the window");

    clock.set(10_500);
    engine.poll();
    assert_eq!(backend.writes.get(), 1);

    clock.set(11_000);
    engine.poll();
    assert_eq!(backend.writes.get(), 2, "trailing write fires once the window closes");
    assert_eq!(saved_money(&backend), 510.0, "trailing write carries the latest state");

    clock.set(20_000);
    engine.poll();
    assert_eq!(backend.writes.get(), 2, "nothing pending, nothing written");
}

#[test]
fn shutdown_flushes_a_pending_write() {
    let backend = Rc::new(CountingBackend::default());
    let clock = ManualClock::starting_at(0);
    let (mut engine, _) = GameEngine::configure(
        &StoreConfig::default_test(),
        Box::new(Rc::clone(&backend)),
        Box::new(clock.clone()),
    );
    engine.dispatch(Action::EarnMoney { amount: 5.0 });
    engine.dispatch(Action::EarnMoney { amount: 5.0 });
    assert_eq!(backend.writes.get(), 1);

    engine.shutdown();
    assert_eq!(backend.writes.get(), 2);
    assert_eq!(saved_money(&backend), 510.0);
}

#[test]
fn failed_writes_are_swallowed() {
    let backend = Rc::new(CountingBackend::default());
    backend.fail_writes.set(true);
    let clock = ManualClock::starting_at(0);
    let (mut engine, _) = GameEngine::configure(
        &StoreConfig::default_test(),
        Box::new(Rc::clone(&backend)),
        Box::new(clock.clone()),
    );

    engine.dispatch(Action::EarnMoney { amount: 100.0 });
    assert_eq!(engine.state().money, 600.0, "state keeps moving when storage fails");
    assert_eq!(backend.writes.get(), 0);

    backend.fail_writes.set(false);
    clock.set(5_000);
    engine.dispatch(Action::EarnMoney { amount: 1.0 });
    assert_eq!(backend.writes.get(), 1, "the next window retries with current state");
    assert_eq!(saved_money(&backend), 601.0);
}

#[test]
fn unreadable_storage_falls_back_to_defaults() {
    let clock = ManualClock::starting_at(3_000);
    let (engine, outcome) = GameEngine::configure(
        &StoreConfig::default_test(),
        Box::new(BrokenBackend),
        Box::new(clock),
    );
    assert_eq!(outcome, LoadOutcome::Missing);
    assert_eq!(engine.state().money, GameState::default().money);
    assert_eq!(engine.state().timestamp, 3_000, "fresh state starts with no idle time");
    assert!(!engine.state().warnings.store_reset);
}

#[test]
fn progress_survives_a_restart() {
    let store = sqlite();
    let clock = ManualClock::starting_at(1_000);
    let config = StoreConfig::default_test();

    {
        let (mut engine, _) =
            GameEngine::configure(&config, Box::new(Rc::clone(&store)), Box::new(clock.clone()));
        engine.dispatch(Action::EarnMoney { amount: 4_000.0 });
        engine.dispatch(Action::BuyCar {
            car_id: "kei_1".into(),
            brand: "kei".into(),
            price: 1_000.0,
        });
        engine.shutdown();
    }
    assert_eq!(store.saved_at(&config.storage_key).unwrap(), Some(1_000));

    clock.set(61_000);
    let (mut engine, outcome) =
        GameEngine::configure(&config, Box::new(Rc::clone(&store)), Box::new(clock.clone()));
    assert_eq!(outcome.label(), "restored");
    assert_eq!(engine.state().money, 3_500.0);
    assert!(engine.state().owns_car("kei_1"));
    assert_eq!(engine.state().total_money_earned, 4_000.0);

    engine.dispatch(Action::Unknown);
    assert_eq!(engine.state().timelapse, 60_000, "offline time since the last action");
}

fn city_race() -> Action {
    Action::StartRace { track_id: "city_1".into(), price: 100.0, prize: 1_000.0 }
}

#[test]
fn leading_write_holds_the_resolved_race() {
    let store = sqlite();
    let clock = ManualClock::starting_at(0);
    let config = StoreConfig::default_test();

    {
        let (mut engine, _) =
            GameEngine::configure(&config, Box::new(Rc::clone(&store)), Box::new(clock.clone()));
        engine.run_effects(Box::new(GameEffects::new(config.race_seed))).unwrap();
        engine.dispatch(city_race());
        // Dropped without shutdown: only the leading write made it out.
    }

    let (engine, outcome) =
        GameEngine::configure(&config, Box::new(Rc::clone(&store)), Box::new(clock.clone()));
    assert_eq!(outcome.label(), "restored");
    assert_eq!(engine.state().race_in_progress, None);
    assert_eq!(engine.state().tracks_stats["city_1"].races, 1);
}

#[test]
fn interrupted_race_does_not_block_later_races() {
    let store = sqlite();
    let clock = ManualClock::starting_at(0);
    let config = StoreConfig::default_test();
    let stuck = GameState { race_in_progress: Some("city_1".into()), ..GameState::default() };
    let snapshots = SnapshotStore::new(Box::new(Rc::clone(&store)), config.storage_key.clone());
    assert!(snapshots.save(&stuck, 0));

    let (mut engine, _) =
        GameEngine::configure(&config, Box::new(Rc::clone(&store)), Box::new(clock.clone()));
    assert_eq!(engine.state().race_in_progress.as_deref(), Some("city_1"));
    engine.run_effects(Box::new(GameEffects::new(config.race_seed))).unwrap();
    engine.poll();
    assert_eq!(engine.state().race_in_progress, None);

    for _ in 0..5 {
        engine.dispatch(Action::StartRace {
            track_id: "desert_1".into(),
            price: 10.0,
            prize: 100.0,
        });
    }
    assert_eq!(engine.state().tracks_stats["desert_1"].races, 5);
    assert_eq!(engine.state().race_in_progress, None);
}

#[test]
fn old_save_is_reset_and_flagged() {
    let store = sqlite();
    let config = StoreConfig::default_test();
    let mut old = serde_json::to_value(GameState::default()).unwrap();
    old["version"] = json!(0.5);
    old["money"] = json!(9_999_999);
    store.write(&config.storage_key, &old.to_string(), 0).unwrap();

    let (engine, outcome) = GameEngine::configure(
        &config,
        Box::new(Rc::clone(&store)),
        Box::new(ManualClock::starting_at(1)),
    );
    assert_eq!(outcome.label(), "reset");
    assert!(engine.state().warnings.store_reset);
    assert_eq!(engine.state().money, GameState::default().money);
}

#[test]
fn quota_errors_do_not_escape_save() {
    let store = SaveStore::in_memory().unwrap().with_quota(16);
    store.migrate().unwrap();
    let err = store.write("state", &"x".repeat(64), 0).unwrap_err();
    assert!(matches!(err, StoreError::QuotaExceeded { size: 64, quota: 16 }));

    let snapshots = SnapshotStore::new(Box::new(store), "state");
    assert!(!snapshots.save(&GameState::default(), 0));
    assert_eq!(snapshots.load(&GameState::default()), LoadOutcome::Missing);
}

#[test]
fn clear_removes_the_blob() {
    let store = sqlite();
    let snapshots = SnapshotStore::new(Box::new(Rc::clone(&store)), "state");
    assert!(snapshots.save(&GameState::default(), 5));
    assert!(matches!(snapshots.load(&GameState::default()), LoadOutcome::Restored(_)));

    snapshots.clear();
    assert_eq!(store.read("state").unwrap(), None);
}

/// Counts notifications it receives.
struct Watcher {
    seen: Rc<Cell<u32>>,
}

impl Subscriber for Watcher {
    fn name(&self) -> &'static str { "watcher" }

    fn on_change(&mut self, _state: &GameState, _now: Timestamp) {
        self.seen.set(self.seen.get() + 1);
    }
}

#[test]
fn subscribers_see_every_change_until_unsubscribed() {
    let backend = Rc::new(CountingBackend::default());
    let (mut engine, _) = GameEngine::configure(
        &StoreConfig::default_test(),
        Box::new(Rc::clone(&backend)),
        Box::new(ManualClock::starting_at(0)),
    );
    let seen = Rc::new(Cell::new(0));
    let id = engine.subscribe(Box::new(Watcher { seen: Rc::clone(&seen) }));

    engine.dispatch(Action::Unknown);
    engine.dispatch(Action::Unknown);
    assert_eq!(seen.get(), 2);

    assert!(engine.unsubscribe(id));
    assert!(!engine.unsubscribe(id));
    engine.dispatch(Action::Unknown);
    assert_eq!(seen.get(), 2);
    assert_eq!(backend.writes.get(), 1, "persistence stays subscribed");
}
