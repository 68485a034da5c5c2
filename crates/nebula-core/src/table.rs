use crate::RarityTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rounding tolerance used when checking that a table sums to at most one.
pub const EPSILON: f64 = 1e-9;

/// Probability mass per rarity tier.
///
/// Backed by a fixed array indexed by [`RarityTier::index`], so iteration is
/// always in canonical tier order. Serialized as a map keyed by tier name;
/// tiers absent from the map deserialize as zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    into = "BTreeMap<RarityTier, f64>",
    from = "BTreeMap<RarityTier, f64>"
)]
pub struct RarityTable {
    probs: [f64; RarityTier::COUNT],
}

impl RarityTable {
    /// All tiers at zero.
    pub fn zeroed() -> Self {
        Self {
            probs: [0.0; RarityTier::COUNT],
        }
    }

    /// The baseline odds before any upgrade. Sums to 0.998; the residual falls
    /// through to the lowest tier when sampling.
    pub fn baseline() -> Self {
        Self::from_pairs(&[
            (RarityTier::Common, 0.45),
            (RarityTier::Uncommon, 0.28),
            (RarityTier::Rare, 0.15),
            (RarityTier::Epic, 0.08),
            (RarityTier::Mythic, 0.03),
            (RarityTier::Legendary, 0.008),
        ])
    }

    /// Build a table from explicit pairs; unspecified tiers stay at zero.
    pub fn from_pairs(pairs: &[(RarityTier, f64)]) -> Self {
        let mut table = Self::zeroed();
        for (tier, p) in pairs {
            table.set(*tier, *p);
        }
        table
    }

    pub fn get(&self, tier: RarityTier) -> f64 {
        self.probs[tier.index()]
    }

    pub fn set(&mut self, tier: RarityTier, p: f64) {
        self.probs[tier.index()] = p;
    }

    pub fn add(&mut self, tier: RarityTier, delta: f64) {
        self.probs[tier.index()] += delta;
    }

    /// Total probability mass.
    pub fn total(&self) -> f64 {
        self.probs.iter().sum()
    }

    /// `(tier, probability)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (RarityTier, f64)> + '_ {
        RarityTier::ALL.iter().map(move |t| (*t, self.get(*t)))
    }

    /// Clamp negative or non-finite entries to zero, then rescale so the
    /// total is exactly one if it exceeds one. Totals at or below one are
    /// left untouched.
    pub fn normalize(&mut self) {
        for p in self.probs.iter_mut() {
            if !p.is_finite() || *p < 0.0 {
                *p = 0.0;
            }
        }
        let total = self.total();
        if total > 1.0 {
            for p in self.probs.iter_mut() {
                *p /= total;
            }
        }
    }

    /// Probability mass not assigned to any tier.
    pub fn residual(&self) -> f64 {
        (1.0 - self.total()).max(0.0)
    }
}

impl Default for RarityTable {
    fn default() -> Self {
        Self::baseline()
    }
}

impl From<RarityTable> for BTreeMap<RarityTier, f64> {
    fn from(table: RarityTable) -> Self {
        table.iter().collect()
    }
}

impl From<BTreeMap<RarityTier, f64>> for RarityTable {
    fn from(map: BTreeMap<RarityTier, f64>) -> Self {
        let mut table = RarityTable::zeroed();
        for (tier, p) in map {
            table.set(tier, p);
        }
        table
    }
}
