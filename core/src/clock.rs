//! Wall-clock sources.
//!
//! RULE: Reducers never read the clock. The engine samples it once per
//! dispatch and hands the value down through `ReduceContext`.

use crate::types::Timestamp;
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Real time, unix milliseconds in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to. Clones share the same time,
/// so a test can keep one handle and give another to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn starting_at(millis: Timestamp) -> Self {
        Self { millis: Arc::new(AtomicI64::new(millis)) }
    }

    pub fn set(&self, millis: Timestamp) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    /// Move forward by `delta` ms. Returns the new time.
    pub fn advance(&self, delta: i64) -> Timestamp {
        self.millis.fetch_add(delta, Ordering::SeqCst) + delta
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.millis.load(Ordering::SeqCst)
    }
}
