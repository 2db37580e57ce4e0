//! The persistence subscriber: writes the state through `SnapshotStore`,
//! at most once per throttle window.

use crate::{
    engine::Subscriber,
    snapshot::SnapshotStore,
    state::GameState,
    throttle::Throttle,
    types::Timestamp,
};

pub struct ThrottledPersistence {
    snapshots: SnapshotStore,
    throttle: Throttle,
}

impl ThrottledPersistence {
    pub fn new(snapshots: SnapshotStore, interval_ms: i64) -> Self {
        Self { snapshots, throttle: Throttle::new(interval_ms) }
    }

    fn write(&mut self, state: &GameState, now: Timestamp) {
        // Failures are already logged; the next window retries.
        let _ = self.snapshots.save(state, now);
    }
}

impl Subscriber for ThrottledPersistence {
    fn name(&self) -> &'static str { "persistence" }

    fn on_change(&mut self, state: &GameState, now: Timestamp) {
        if self.throttle.call(now) {
            self.write(state, now);
        }
    }

    fn poll(&mut self, state: &GameState, now: Timestamp) {
        if self.throttle.poll(now) {
            self.write(state, now);
        }
    }

    fn flush(&mut self, state: &GameState, now: Timestamp) {
        if self.throttle.take_pending(now) {
            self.write(state, now);
        }
    }
}
