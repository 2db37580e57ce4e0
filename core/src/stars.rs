//! Money achievements.

use crate::types::Money;
use std::collections::BTreeMap;

/// Page that shows the stars; gets the first-unseen marker.
pub const STARS_PAGE: &str = "starsPage";

/// (star key, lifetime earnings needed). Ascending.
pub const MONEY_STARS: [(&str, Money); 6] = [
    ("money_1k", 1_000.0),
    ("money_10k", 10_000.0),
    ("money_100k", 100_000.0),
    ("money_1m", 1_000_000.0),
    ("money_10m", 10_000_000.0),
    ("money_100m", 100_000_000.0),
];

/// Keys of money stars reached by `total_earned` that are not earned yet.
pub fn new_money_stars(total_earned: Money, stars: &BTreeMap<String, bool>) -> Vec<&'static str> {
    MONEY_STARS
        .iter()
        .filter(|(_, threshold)| total_earned >= *threshold)
        .filter(|(key, _)| !stars.get(*key).copied().unwrap_or(false))
        .map(|(key, _)| *key)
        .collect()
}
