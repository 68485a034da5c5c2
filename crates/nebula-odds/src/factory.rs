use chrono::{DateTime, Utc};
use nebula_core::{catalog, Planet, PlanetId, RarityTier};
use rand::seq::SliceRandom;
use rand::Rng;

/// Number of trait samples for a tier: one, plus one above common, plus one
/// for high tiers. Duplicates are dropped afterwards, so a planet may end up
/// with fewer.
pub fn trait_count(tier: RarityTier) -> usize {
    1 + usize::from(tier > RarityTier::LOWEST) + usize::from(tier.is_high())
}

/// Build a planet of the given tier. Each attribute is drawn uniformly and
/// independently from its catalog.
pub fn create_planet<R: Rng + ?Sized>(
    tier: RarityTier,
    discovered_at: DateTime<Utc>,
    rng: &mut R,
) -> Planet {
    let name = pick(catalog::NAMES, rng);
    let kind = pick(catalog::KINDS, rng);
    let atmosphere = pick(catalog::ATMOSPHERES, rng);
    let terrain = pick(catalog::TERRAINS, rng);
    let temperature = pick(catalog::TEMPERATURES, rng);

    let mut traits: Vec<String> = Vec::with_capacity(trait_count(tier));
    for _ in 0..trait_count(tier) {
        let t = pick(catalog::TRAITS, rng);
        if !traits.contains(&t) {
            traits.push(t);
        }
    }

    let color = pick(catalog::COLORS, rng);
    // Hundredths, so the value survives a JSON round trip unchanged.
    let size = (rng.gen_range(catalog::SIZE_MIN..catalog::SIZE_MAX) * 100.0).floor() / 100.0;
    let id = PlanetId(format!(
        "planet-{}-{:016x}",
        discovered_at.timestamp_millis(),
        rng.gen::<u64>()
    ));

    Planet {
        id,
        name,
        rarity: tier,
        kind,
        atmosphere,
        terrain,
        temperature,
        traits,
        color,
        size,
        discovered_at,
    }
}

fn pick<R: Rng + ?Sized>(list: &[&str], rng: &mut R) -> String {
    list.choose(rng).copied().unwrap_or("Unknown").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_rng;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    #[test]
    fn trait_count_scales_with_rarity() {
        assert_eq!(trait_count(RarityTier::Common), 1);
        assert_eq!(trait_count(RarityTier::Uncommon), 2);
        assert_eq!(trait_count(RarityTier::Epic), 2);
        assert_eq!(trait_count(RarityTier::Mythic), 3);
        assert_eq!(trait_count(RarityTier::Primordial), 3);
    }

    #[test]
    fn traits_are_distinct_and_bounded() {
        let mut rng = new_rng(Some(11));
        for tier in RarityTier::ALL {
            for _ in 0..200 {
                let p = create_planet(tier, at(), &mut rng);
                assert!(!p.traits.is_empty());
                assert!(p.traits.len() <= trait_count(tier));
                let unique: BTreeSet<&String> = p.traits.iter().collect();
                assert_eq!(unique.len(), p.traits.len());
            }
        }
    }

    #[test]
    fn attributes_come_from_catalogs() {
        let mut rng = new_rng(Some(2));
        let p = create_planet(RarityTier::Rare, at(), &mut rng);
        assert_eq!(p.rarity, RarityTier::Rare);
        assert!(catalog::NAMES.contains(&p.name.as_str()));
        assert!(catalog::KINDS.contains(&p.kind.as_str()));
        assert!(catalog::ATMOSPHERES.contains(&p.atmosphere.as_str()));
        assert!(catalog::TERRAINS.contains(&p.terrain.as_str()));
        assert!(catalog::TEMPERATURES.contains(&p.temperature.as_str()));
        assert!(catalog::COLORS.contains(&p.color.as_str()));
        assert!((catalog::SIZE_MIN..catalog::SIZE_MAX).contains(&p.size));
        assert_eq!(p.discovered_at, at());
        assert!(p.id.0.starts_with("planet-"));
    }

    #[test]
    fn same_seed_same_planet() {
        let a = create_planet(RarityTier::Mythic, at(), &mut new_rng(Some(5)));
        let b = create_planet(RarityTier::Mythic, at(), &mut new_rng(Some(5)));
        assert_eq!(a, b);
    }

    #[test]
    fn ids_differ_between_planets() {
        let mut rng = new_rng(Some(8));
        let a = create_planet(RarityTier::Common, at(), &mut rng);
        let b = create_planet(RarityTier::Common, at(), &mut rng);
        assert_ne!(a.id, b.id);
    }
}
