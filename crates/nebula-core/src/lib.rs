#![deny(warnings)]

//! Core domain models and invariants for Planetfall.
//!
//! This crate defines the serializable types shared by the draw engine, the
//! save format and the runtime: rarity tiers, probability tables, the upgrade
//! catalog and discovered planets, with validation helpers for the invariants
//! the rest of the workspace relies on.

mod planet;
mod table;
mod tier;
mod upgrade;

pub use planet::{catalog, Planet, PlanetId};
pub use table::{RarityTable, EPSILON};
pub use tier::RarityTier;
pub use upgrade::{
    Catalog, CosmeticTag, Effect, OwnedUpgrades, SpecialEffect, UpgradeCategory, UpgradeDef,
    UpgradeId,
};

use thiserror::Error;

/// Rerolls available in a fresh game.
pub const STARTING_REROLLS: u32 = 1;

/// Maximum number of planets kept in the discovery history.
pub const HISTORY_CAP: usize = 50;

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Tier name not part of the enumeration.
    #[error("unknown rarity tier: {0}")]
    UnknownTier(String),
    /// Probability below zero in a table.
    #[error("negative probability for tier {0}")]
    NegativeProbability(RarityTier),
    /// Table mass above one (beyond rounding tolerance).
    #[error("probability mass {0} exceeds 1")]
    TotalExceedsOne(f64),
    /// Numeric field must be finite.
    #[error("non-finite numeric value encountered")]
    NonFinite,
    /// Two catalog entries share an id.
    #[error("duplicate upgrade id: {0}")]
    DuplicateUpgrade(String),
    /// Upgrade cost must be strictly positive.
    #[error("upgrade {0} must have a positive cost")]
    NonPositiveCost(String),
    /// Chance parameter outside [0, 1].
    #[error("upgrade {0} has a chance outside [0,1]")]
    InvalidChance(String),
    /// Multiplier must be finite and non-negative.
    #[error("upgrade {0} has an invalid factor")]
    InvalidFactor(String),
    /// Guarantee cycle must be at least one roll long.
    #[error("upgrade {0} has a zero-length cycle")]
    ZeroCycle(String),
    /// Guarantee must name at least one tier.
    #[error("upgrade {0} guarantees an empty tier set")]
    EmptyGuarantee(String),
    /// Promotion from the top tier has nowhere to go.
    #[error("upgrade {0} promotes from the highest tier")]
    PromoteFromTop(String),
}

/// Validate a probability table: finite, non-negative, total within tolerance of 1.
pub fn validate_table(table: &RarityTable) -> Result<(), ValidationError> {
    for (tier, p) in table.iter() {
        if !p.is_finite() {
            return Err(ValidationError::NonFinite);
        }
        if p < 0.0 {
            return Err(ValidationError::NegativeProbability(tier));
        }
    }
    let total = table.total();
    if total > 1.0 + EPSILON {
        return Err(ValidationError::TotalExceedsOne(total));
    }
    Ok(())
}

/// Validate a single upgrade definition.
pub fn validate_upgrade(def: &UpgradeDef) -> Result<(), ValidationError> {
    let id = || def.id.0.clone();
    if def.cost == 0 {
        return Err(ValidationError::NonPositiveCost(id()));
    }
    match &def.effect {
        Effect::Modifier(deltas) => {
            if deltas.iter().any(|(_, d)| !d.is_finite()) {
                return Err(ValidationError::NonFinite);
            }
        }
        Effect::Special(special) => match special {
            SpecialEffect::Promote { from, chance } => {
                if !(0.0..=1.0).contains(chance) {
                    return Err(ValidationError::InvalidChance(id()));
                }
                if from.next().is_none() {
                    return Err(ValidationError::PromoteFromTop(id()));
                }
            }
            SpecialEffect::CyclicGuarantee { every, tiers } => {
                if *every == 0 {
                    return Err(ValidationError::ZeroCycle(id()));
                }
                if tiers.is_empty() {
                    return Err(ValidationError::EmptyGuarantee(id()));
                }
            }
            SpecialEffect::UniversalAccess { chance } => {
                if !(0.0..=1.0).contains(chance) {
                    return Err(ValidationError::InvalidChance(id()));
                }
            }
            SpecialEffect::AmplifyBonus { factor } | SpecialEffect::ScaleTier { factor, .. } => {
                if !factor.is_finite() || *factor < 0.0 {
                    return Err(ValidationError::InvalidFactor(id()));
                }
            }
            SpecialEffect::GrantRerolls { .. }
            | SpecialEffect::AutoRoll
            | SpecialEffect::Cosmetic { .. } => {}
        },
    }
    Ok(())
}

/// Validate the whole catalog, including id uniqueness.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), ValidationError> {
    let mut seen = std::collections::BTreeSet::new();
    for def in catalog.iter() {
        validate_upgrade(def)?;
        if !seen.insert(&def.id) {
            return Err(ValidationError::DuplicateUpgrade(def.id.0.clone()));
        }
    }
    Ok(())
}
