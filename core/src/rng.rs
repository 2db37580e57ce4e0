//! Deterministic random numbers for effect runners.
//!
//! RULE: Reducers never roll dice. Randomness lives in effect runners,
//! which turn it into plain actions, so replaying the same actions
//! reproduces the same state.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, seeded stream.
pub struct RaceRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl RaceRng {
    /// Derive a stream from the master seed and a stable stream index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, stream: u64) -> Self {
        let derived_seed = master_seed ^ stream.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// Stable stream assignments. Append only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngStream {
    Race = 0,
}

impl RngStream {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Race => "race",
        }
    }

    pub fn rng(self, master_seed: u64) -> RaceRng {
        RaceRng::new(master_seed, self as u64).with_name(self.name())
    }
}
