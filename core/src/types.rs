//! Shared primitive types used across the state core.

/// Wall-clock time in unix milliseconds.
pub type Timestamp = i64;

/// Currency amount. Kept as a JSON number in the persisted blob.
pub type Money = f64;

/// Stable catalog identifier for a car, brand, track or page.
pub type EntityId = String;

/// Schema version tag carried by every snapshot.
pub type StoreVersion = f64;
