//! Leading + trailing edge throttle over an injected clock.
//!
//! The first call in a quiet period runs immediately. Calls inside the
//! window are coalesced into one trailing run, fired by `poll` once the
//! window has elapsed since the last run.

use crate::types::Timestamp;

#[derive(Debug, Clone)]
pub struct Throttle {
    interval_ms: i64,
    last_run: Option<Timestamp>,
    pending: bool,
}

impl Throttle {
    pub fn new(interval_ms: i64) -> Self {
        Self { interval_ms: interval_ms.max(0), last_run: None, pending: false }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Register a call at `now`. Returns true when the work should run now.
    pub fn call(&mut self, now: Timestamp) -> bool {
        if self.window_open(now) {
            self.mark_run(now);
            true
        } else {
            self.pending = true;
            false
        }
    }

    /// Returns true when a coalesced call is due.
    pub fn poll(&mut self, now: Timestamp) -> bool {
        if self.pending && self.window_open(now) {
            self.mark_run(now);
            true
        } else {
            false
        }
    }

    /// Drop the pending flag without waiting; for shutdown flushes.
    pub fn take_pending(&mut self, now: Timestamp) -> bool {
        let pending = self.pending;
        if pending {
            self.mark_run(now);
        }
        pending
    }

    fn window_open(&self, now: Timestamp) -> bool {
        match self.last_run {
            None => true,
            // A clock that went backwards reopens the window.
            Some(last) => now - last >= self.interval_ms || now < last,
        }
    }

    fn mark_run(&mut self, now: Timestamp) {
        self.last_run = Some(now);
        self.pending = false;
    }
}
