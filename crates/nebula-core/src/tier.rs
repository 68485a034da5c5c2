use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rarity tiers in canonical order, most common first.
///
/// The declaration order is the sampling order and the ordering used for
/// "better planet" comparisons and promotions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RarityTier {
    Common,
    Uncommon,
    Rare,
    Epic,
    Mythic,
    Legendary,
    Celestial,
    Cosmic,
    Divine,
    Primordial,
}

impl RarityTier {
    /// Number of tiers.
    pub const COUNT: usize = 10;

    /// Every tier in canonical order.
    pub const ALL: [RarityTier; Self::COUNT] = [
        RarityTier::Common,
        RarityTier::Uncommon,
        RarityTier::Rare,
        RarityTier::Epic,
        RarityTier::Mythic,
        RarityTier::Legendary,
        RarityTier::Celestial,
        RarityTier::Cosmic,
        RarityTier::Divine,
        RarityTier::Primordial,
    ];

    /// The fallback tier for unmatched draws.
    pub const LOWEST: RarityTier = RarityTier::Common;

    /// Position in canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The tier directly above, if any.
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// High tiers get an extra trait and are the targets of guaranteed draws.
    pub fn is_high(self) -> bool {
        self >= RarityTier::Mythic
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RarityTier::Common => "common",
            RarityTier::Uncommon => "uncommon",
            RarityTier::Rare => "rare",
            RarityTier::Epic => "epic",
            RarityTier::Mythic => "mythic",
            RarityTier::Legendary => "legendary",
            RarityTier::Celestial => "celestial",
            RarityTier::Cosmic => "cosmic",
            RarityTier::Divine => "divine",
            RarityTier::Primordial => "primordial",
        }
    }
}

impl fmt::Display for RarityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RarityTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| ValidationError::UnknownTier(s.to_string()))
    }
}
