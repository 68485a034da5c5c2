use nebula_core::{Catalog, OwnedUpgrades, RarityTable, RarityTier, SpecialEffect};
use rand::Rng;
use tracing::debug;

/// A draw rule that changed the tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppliedRule {
    Promoted { from: RarityTier, to: RarityTier },
    Guaranteed { picked: RarityTier, result: RarityTier },
    UniversalAccess { result: RarityTier },
}

/// Result of one draw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawOutcome {
    /// Tier chosen by table sampling alone.
    pub sampled: RarityTier,
    /// Final tier after every owned rule.
    pub tier: RarityTier,
    /// Rules that fired, in application order.
    pub applied: Vec<AppliedRule>,
}

/// Walk tiers in canonical order and return the first whose running sum
/// reaches `r`. Falls back to the lowest tier when the table's mass is below
/// `r`, so every draw resolves.
pub fn sample_tier(table: &RarityTable, r: f64) -> RarityTier {
    let mut cumulative = 0.0;
    for (tier, p) in table.iter() {
        if p <= 0.0 {
            continue;
        }
        cumulative += p;
        if cumulative >= r {
            return tier;
        }
    }
    RarityTier::LOWEST
}

/// Sample a tier from `table` and run it through the owned draw rules.
pub fn draw<R: Rng + ?Sized>(
    table: &RarityTable,
    catalog: &Catalog,
    owned: &OwnedUpgrades,
    roll_index: u64,
    rng: &mut R,
) -> DrawOutcome {
    let r: f64 = rng.gen();
    let sampled = sample_tier(table, r);
    apply_rules(sampled, catalog, owned, roll_index, rng)
}

/// Apply owned draw rules to an already sampled tier.
///
/// Order is fixed and each stage sees the previous stage's tier:
/// 1. promotions, in catalog order (a promoted tier may be promoted again)
/// 2. cyclic guarantees on `roll_index % every == every - 1`, never lowering
/// 3. universal access, which replaces the tier outright
pub fn apply_rules<R: Rng + ?Sized>(
    sampled: RarityTier,
    catalog: &Catalog,
    owned: &OwnedUpgrades,
    roll_index: u64,
    rng: &mut R,
) -> DrawOutcome {
    let specials: Vec<&SpecialEffect> = catalog.owned_specials(owned).collect();
    let mut tier = sampled;
    let mut applied = Vec::new();

    for special in &specials {
        if let SpecialEffect::Promote { from, chance } = special {
            if tier != *from {
                continue;
            }
            if let Some(to) = from.next() {
                if chance_hit(rng, *chance) {
                    applied.push(AppliedRule::Promoted { from: tier, to });
                    tier = to;
                }
            }
        }
    }

    for special in &specials {
        if let SpecialEffect::CyclicGuarantee { every, tiers } = special {
            if *every == 0 || tiers.is_empty() || roll_index % every != every - 1 {
                continue;
            }
            let picked = tiers[rng.gen_range(0..tiers.len())];
            tier = tier.max(picked);
            applied.push(AppliedRule::Guaranteed {
                picked,
                result: tier,
            });
        }
    }

    for special in &specials {
        if let SpecialEffect::UniversalAccess { chance } = special {
            if chance_hit(rng, *chance) {
                tier = RarityTier::ALL[rng.gen_range(0..RarityTier::COUNT)];
                applied.push(AppliedRule::UniversalAccess { result: tier });
            }
        }
    }

    if !applied.is_empty() {
        debug!(?sampled, ?tier, ?applied, roll_index, "draw rules applied");
    }

    DrawOutcome {
        sampled,
        tier,
        applied,
    }
}

/// Bernoulli trial that tolerates out-of-range and NaN chances.
fn chance_hit<R: Rng + ?Sized>(rng: &mut R, chance: f64) -> bool {
    chance > 0.0 && rng.gen::<f64>() < chance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_rng;
    use nebula_core::{Effect, UpgradeCategory, UpgradeDef, UpgradeId};

    fn owned(ids: &[&str]) -> OwnedUpgrades {
        ids.iter().map(|id| UpgradeId::from(*id)).collect()
    }

    fn def(id: &str, special: SpecialEffect) -> UpgradeDef {
        UpgradeDef {
            id: UpgradeId::from(id),
            name: id.to_string(),
            category: UpgradeCategory::Modifier,
            summary: String::new(),
            flavor: String::new(),
            cost: 1,
            effect: Effect::Special(special),
        }
    }

    fn all_common() -> RarityTable {
        RarityTable::from_pairs(&[(RarityTier::Common, 1.0)])
    }

    #[test]
    fn residual_mass_falls_back_to_common() {
        let base = RarityTable::baseline();
        assert_eq!(sample_tier(&base, 0.999), RarityTier::Common);
        assert_eq!(sample_tier(&RarityTable::zeroed(), 0.5), RarityTier::Common);
    }

    #[test]
    fn sampling_walks_canonical_order() {
        let base = RarityTable::baseline();
        assert_eq!(sample_tier(&base, 0.0), RarityTier::Common);
        assert_eq!(sample_tier(&base, 0.45), RarityTier::Common);
        assert_eq!(sample_tier(&base, 0.46), RarityTier::Uncommon);
        assert_eq!(sample_tier(&base, 0.80), RarityTier::Rare);
        assert_eq!(sample_tier(&base, 0.95), RarityTier::Epic);
        assert_eq!(sample_tier(&base, 0.985), RarityTier::Mythic);
        assert_eq!(sample_tier(&base, 0.995), RarityTier::Legendary);
    }

    #[test]
    fn empirical_frequencies_match_table() {
        let base = RarityTable::baseline();
        let catalog = Catalog::standard();
        let none = OwnedUpgrades::new();
        let mut rng = new_rng(Some(42));
        let n = 100_000;
        let mut counts = [0u32; RarityTier::COUNT];
        for i in 0..n {
            let out = draw(&base, &catalog, &none, i, &mut rng);
            assert!(out.applied.is_empty());
            counts[out.tier.index()] += 1;
        }
        for (tier, p) in base.iter() {
            let expected = if tier == RarityTier::Common {
                p + base.residual()
            } else {
                p
            };
            let observed = counts[tier.index()] as f64 / n as f64;
            assert!(
                (observed - expected).abs() < 0.006,
                "{tier}: observed {observed}, expected {expected}"
            );
        }
    }

    #[test]
    fn cyclic_guarantee_fires_only_on_cycle_end() {
        let catalog = Catalog::standard();
        let own = owned(&["pulsar-metronome"]);
        let table = all_common();
        let high = [RarityTier::Mythic, RarityTier::Legendary, RarityTier::Celestial];
        let mut rng = new_rng(Some(3));
        for index in 0..500u64 {
            let out = draw(&table, &catalog, &own, index, &mut rng);
            if index % 50 == 49 {
                assert!(high.contains(&out.tier), "index {index} got {}", out.tier);
                assert_eq!(out.applied.len(), 1);
            } else {
                assert_eq!(out.tier, RarityTier::Common, "index {index}");
                assert!(out.applied.is_empty());
            }
        }
    }

    #[test]
    fn guarantee_never_lowers_a_tier() {
        let catalog = Catalog::standard();
        let own = owned(&["pulsar-metronome"]);
        let mut rng = new_rng(Some(9));
        for _ in 0..50 {
            let out = apply_rules(RarityTier::Divine, &catalog, &own, 49, &mut rng);
            assert_eq!(out.tier, RarityTier::Divine);
        }
    }

    #[test]
    fn promotions_chain_in_catalog_order() {
        let catalog = Catalog::new(vec![
            def(
                "a",
                SpecialEffect::Promote {
                    from: RarityTier::Uncommon,
                    chance: 1.0,
                },
            ),
            def(
                "b",
                SpecialEffect::Promote {
                    from: RarityTier::Rare,
                    chance: 1.0,
                },
            ),
        ]);
        let mut rng = new_rng(Some(1));
        let out = apply_rules(RarityTier::Uncommon, &catalog, &owned(&["a", "b"]), 0, &mut rng);
        assert_eq!(out.tier, RarityTier::Epic);
        assert_eq!(
            out.applied,
            vec![
                AppliedRule::Promoted {
                    from: RarityTier::Uncommon,
                    to: RarityTier::Rare
                },
                AppliedRule::Promoted {
                    from: RarityTier::Rare,
                    to: RarityTier::Epic
                },
            ]
        );

        // Reversed declaration order: the rare rule runs before the tier is rare.
        let mut defs: Vec<UpgradeDef> = catalog.iter().cloned().collect();
        defs.reverse();
        let reversed = Catalog::new(defs);
        let out = apply_rules(RarityTier::Uncommon, &reversed, &owned(&["a", "b"]), 0, &mut rng);
        assert_eq!(out.tier, RarityTier::Rare);
    }

    #[test]
    fn unowned_rules_do_nothing() {
        let catalog = Catalog::new(vec![def(
            "a",
            SpecialEffect::Promote {
                from: RarityTier::Common,
                chance: 1.0,
            },
        )]);
        let mut rng = new_rng(Some(1));
        let out = apply_rules(RarityTier::Common, &catalog, &OwnedUpgrades::new(), 0, &mut rng);
        assert_eq!(out.tier, RarityTier::Common);
    }

    #[test]
    fn partial_chances_fire_at_their_rate() {
        let catalog = Catalog::new(vec![
            def(
                "synth",
                SpecialEffect::Promote {
                    from: RarityTier::Uncommon,
                    chance: 0.05,
                },
            ),
            def("key", SpecialEffect::UniversalAccess { chance: 0.05 }),
        ]);
        let mut rng = new_rng(Some(21));
        let n = 100_000;

        let promote_only = owned(&["synth"]);
        let promoted = (0..n)
            .filter(|i| {
                let out = apply_rules(RarityTier::Uncommon, &catalog, &promote_only, *i, &mut rng);
                out.tier == RarityTier::Rare
            })
            .count();
        let rate = promoted as f64 / n as f64;
        assert!((rate - 0.05).abs() < 0.004, "promotion rate {rate}");

        let key_only = owned(&["key"]);
        let unlocked = (0..n)
            .filter(|i| {
                let out = apply_rules(RarityTier::Common, &catalog, &key_only, *i, &mut rng);
                !out.applied.is_empty()
            })
            .count();
        let rate = unlocked as f64 / n as f64;
        assert!((rate - 0.05).abs() < 0.004, "universal access rate {rate}");
    }

    #[test]
    fn universal_access_overrides_guarantee() {
        let catalog = Catalog::new(vec![
            def(
                "cycle",
                SpecialEffect::CyclicGuarantee {
                    every: 1,
                    tiers: vec![RarityTier::Primordial],
                },
            ),
            def("key", SpecialEffect::UniversalAccess { chance: 1.0 }),
        ]);
        let own = owned(&["cycle", "key"]);
        let mut rng = new_rng(Some(5));
        let mut saw_lower = false;
        for i in 0..200 {
            let out = apply_rules(RarityTier::Common, &catalog, &own, i, &mut rng);
            assert_eq!(out.applied.len(), 2);
            assert!(matches!(out.applied[0], AppliedRule::Guaranteed { .. }));
            assert!(matches!(out.applied[1], AppliedRule::UniversalAccess { .. }));
            saw_lower |= out.tier < RarityTier::Primordial;
        }
        assert!(saw_lower);
    }
}
