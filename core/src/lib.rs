//! State core for an idle racing game.
//!
//! Actions flow through an ordered reducer pipeline; the resulting state is
//! handed to subscribers, one of which persists it as a versioned snapshot
//! at most once per throttle window.

pub mod action;
pub mod clock;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod garage_reducer;
pub mod migration;
pub mod money_tracker_reducer;
pub mod persistence;
pub mod presets;
pub mod race_reducer;
pub mod reducer;
pub mod rng;
pub mod root_reducer;
pub mod snapshot;
pub mod stars;
pub mod state;
pub mod store;
pub mod throttle;
pub mod timestamp_reducer;
pub mod types;
