use nebula_core::{Catalog, Effect, OwnedUpgrades, RarityTable, RarityTier, SpecialEffect};

/// Steps 1-4 of aggregation, without normalization:
/// additive modifiers, then bonus amplifiers, then direct tier scaling.
///
/// Amplifiers scale `current - base` per tier, so they stack multiplicatively
/// on earned bonuses and never touch the baseline floor. Both amplifiers and
/// scalers apply in catalog order.
pub fn aggregate_unnormalized(
    base: &RarityTable,
    catalog: &Catalog,
    owned: &OwnedUpgrades,
) -> RarityTable {
    let mut table = *base;

    for def in catalog.owned(owned) {
        if let Effect::Modifier(deltas) = &def.effect {
            for (tier, delta) in deltas {
                table.add(*tier, *delta);
            }
        }
    }

    for special in catalog.owned_specials(owned) {
        match special {
            SpecialEffect::AmplifyBonus { factor } => {
                for tier in RarityTier::ALL {
                    let floor = base.get(tier);
                    table.set(tier, floor + (table.get(tier) - floor) * factor);
                }
            }
            SpecialEffect::ScaleTier { .. }
            | SpecialEffect::Promote { .. }
            | SpecialEffect::CyclicGuarantee { .. }
            | SpecialEffect::UniversalAccess { .. }
            | SpecialEffect::GrantRerolls { .. }
            | SpecialEffect::AutoRoll
            | SpecialEffect::Cosmetic { .. } => {}
        }
    }

    for special in catalog.owned_specials(owned) {
        match special {
            SpecialEffect::ScaleTier { tier, factor } => {
                table.set(*tier, table.get(*tier) * factor);
            }
            SpecialEffect::AmplifyBonus { .. }
            | SpecialEffect::Promote { .. }
            | SpecialEffect::CyclicGuarantee { .. }
            | SpecialEffect::UniversalAccess { .. }
            | SpecialEffect::GrantRerolls { .. }
            | SpecialEffect::AutoRoll
            | SpecialEffect::Cosmetic { .. } => {}
        }
    }

    table
}

/// Effective table for an ownership set: a pure function of `base` and the
/// owned ids, normalized so the total never exceeds one.
pub fn recompute(base: &RarityTable, catalog: &Catalog, owned: &OwnedUpgrades) -> RarityTable {
    let mut table = aggregate_unnormalized(base, catalog, owned);
    table.normalize();
    table
}
