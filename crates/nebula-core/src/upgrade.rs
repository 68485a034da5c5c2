use crate::RarityTier;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;

/// Stable upgrade identifier, e.g. "quantum-prism". Saves refer to upgrades
/// by this id, never by catalog position.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UpgradeId(pub String);

impl From<&str> for UpgradeId {
    fn from(s: &str) -> Self {
        UpgradeId(s.to_string())
    }
}

impl Borrow<str> for UpgradeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Display grouping used by the upgrade panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeCategory {
    Probability,
    Animation,
    Visual,
    Luck,
    Aesthetic,
    Reroll,
    Modifier,
    Automation,
    Amplifier,
    Guarantee,
}

/// Presentation-only effects. The engine never interprets these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CosmeticTag {
    GravityDrop,
    HighlightTraits,
    NebulaEffects,
}

/// Special effects consumed by the aggregator, the draw engine or the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SpecialEffect {
    /// A draw landing on `from` is raised one tier with probability `chance`.
    Promote { from: RarityTier, chance: f64 },
    /// Every `every`-th roll is forced into one of `tiers`.
    CyclicGuarantee { every: u64, tiers: Vec<RarityTier> },
    /// With probability `chance` the final tier is drawn uniformly from all tiers.
    UniversalAccess { chance: f64 },
    /// Multiplies each tier's bonus over the baseline.
    AmplifyBonus { factor: f64 },
    /// Multiplies one tier's aggregated value directly.
    ScaleTier { tier: RarityTier, factor: f64 },
    /// Adds to the reroll budget on purchase and sets the daily allowance.
    GrantRerolls { amount: u32 },
    /// Unlocks the auto-roll toggle.
    AutoRoll,
    Cosmetic { tag: CosmeticTag },
}

/// What owning an upgrade does.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Effect {
    /// Signed per-tier deltas added to the baseline table.
    Modifier(Vec<(RarityTier, f64)>),
    Special(SpecialEffect),
}

/// A purchasable upgrade definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeDef {
    /// Stable identifier.
    pub id: UpgradeId,
    /// Display name.
    pub name: String,
    /// Display grouping.
    pub category: UpgradeCategory,
    /// One-line description of the effect.
    pub summary: String,
    /// Flavor text.
    pub flavor: String,
    /// Roll count required to buy (> 0). Roll count is never spent.
    pub cost: u64,
    /// Effect once owned.
    pub effect: Effect,
}

impl UpgradeDef {
    /// The special effect, if this upgrade has one.
    pub fn special(&self) -> Option<&SpecialEffect> {
        match &self.effect {
            Effect::Special(s) => Some(s),
            Effect::Modifier(_) => None,
        }
    }
}

/// Set of owned upgrade ids. Ownership only ever grows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedUpgrades(BTreeSet<UpgradeId>);

impl OwnedUpgrades {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the id was not owned before.
    pub fn insert(&mut self, id: UpgradeId) -> bool {
        self.0.insert(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpgradeId> {
        self.0.iter()
    }
}

impl FromIterator<UpgradeId> for OwnedUpgrades {
    fn from_iter<I: IntoIterator<Item = UpgradeId>>(iter: I) -> Self {
        OwnedUpgrades(iter.into_iter().collect())
    }
}

/// Ordered upgrade catalog. Declaration order decides the order in which
/// amplifiers and promotions apply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    upgrades: Vec<UpgradeDef>,
}

impl Catalog {
    pub fn new(upgrades: Vec<UpgradeDef>) -> Self {
        Self { upgrades }
    }

    pub fn iter(&self) -> impl Iterator<Item = &UpgradeDef> {
        self.upgrades.iter()
    }

    pub fn len(&self) -> usize {
        self.upgrades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upgrades.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&UpgradeDef> {
        self.upgrades.iter().find(|u| u.id.0 == id)
    }

    /// Owned definitions in catalog order.
    pub fn owned<'a>(
        &'a self,
        owned: &'a OwnedUpgrades,
    ) -> impl Iterator<Item = &'a UpgradeDef> + 'a {
        self.upgrades.iter().filter(move |u| owned.contains(&u.id.0))
    }

    /// Owned special effects in catalog order.
    pub fn owned_specials<'a>(
        &'a self,
        owned: &'a OwnedUpgrades,
    ) -> impl Iterator<Item = &'a SpecialEffect> + 'a {
        self.owned(owned).filter_map(UpgradeDef::special)
    }

    /// The shipped catalog.
    pub fn standard() -> Self {
        use RarityTier::*;
        use SpecialEffect as S;
        use UpgradeCategory as C;

        let up = |id: &str,
                  name: &str,
                  category: UpgradeCategory,
                  summary: &str,
                  flavor: &str,
                  cost: u64,
                  effect: Effect| UpgradeDef {
            id: UpgradeId::from(id),
            name: name.to_string(),
            category,
            summary: summary.to_string(),
            flavor: flavor.to_string(),
            cost,
            effect,
        };

        Self::new(vec![
            up(
                "quantum-prism",
                "Quantum Prism",
                C::Probability,
                "+5% chance to find Rare planets",
                "Through the quantum prism, reality becomes malleable...",
                100,
                Effect::Modifier(vec![(Rare, 0.05)]),
            ),
            up(
                "graviton-pulse",
                "Graviton Pulse",
                C::Animation,
                "Adds a gravity-drop animation to planet reveals",
                "Watch worlds fall into your reality...",
                150,
                Effect::Special(S::Cosmetic {
                    tag: CosmeticTag::GravityDrop,
                }),
            ),
            up(
                "echo-analyzer",
                "Echo Analyzer",
                C::Visual,
                "Highlights rare traits on discovered planets",
                "Every world echoes with untold secrets...",
                200,
                Effect::Special(S::Cosmetic {
                    tag: CosmeticTag::HighlightTraits,
                }),
            ),
            up(
                "nebula-splicer",
                "Nebula Splicer",
                C::Aesthetic,
                "Adds soft fog glow and warp ribbon trails",
                "Reality shimmers with nebular grace...",
                250,
                Effect::Special(S::Cosmetic {
                    tag: CosmeticTag::NebulaEffects,
                }),
            ),
            up(
                "chrono-capsule",
                "Chrono Capsule",
                C::Reroll,
                "Allows 1 reroll per day",
                "Time bends to your will, offering second chances...",
                300,
                Effect::Special(S::GrantRerolls { amount: 1 }),
            ),
            up(
                "nova-synth",
                "Nova Synth",
                C::Modifier,
                "5% chance to upgrade Uncommon planets to Rare",
                "When stars align, the ordinary becomes extraordinary...",
                400,
                Effect::Special(S::Promote {
                    from: Uncommon,
                    chance: 0.05,
                }),
            ),
            up(
                "celestial-lens",
                "Celestial Lens",
                C::Luck,
                "Unlocks a 0.5% chance for Celestial planets",
                "Through the celestial lens, the impossible becomes possible...",
                500,
                Effect::Modifier(vec![(Celestial, 0.005)]),
            ),
            up(
                "stellar-forge",
                "Stellar Forge",
                C::Probability,
                "+3% Epic and +1% Mythic chance",
                "Stars are hammered into shape on an anvil of light...",
                600,
                Effect::Modifier(vec![(Epic, 0.03), (Mythic, 0.01)]),
            ),
            up(
                "supernova-catalyst",
                "Supernova Catalyst",
                C::Modifier,
                "5% chance to upgrade Rare planets to Epic",
                "A dying star gives one last gift...",
                750,
                Effect::Special(S::Promote {
                    from: Rare,
                    chance: 0.05,
                }),
            ),
            up(
                "auto-discovery",
                "Auto-Discovery Array",
                C::Automation,
                "Automatically roll every few seconds after 100 rolls",
                "The array never sleeps, and neither does the cosmos...",
                800,
                Effect::Special(S::AutoRoll),
            ),
            up(
                "dark-matter-lens",
                "Dark Matter Lens",
                C::Amplifier,
                "Amplifies all earned probability bonuses by 50%",
                "What cannot be seen still bends the light...",
                900,
                Effect::Special(S::AmplifyBonus { factor: 1.5 }),
            ),
            up(
                "pulsar-metronome",
                "Pulsar Metronome",
                C::Guarantee,
                "Every 50th roll is guaranteed Mythic or better",
                "Tick. Tick. Tick. Then brilliance.",
                1000,
                Effect::Special(S::CyclicGuarantee {
                    every: 50,
                    tiers: vec![Mythic, Legendary, Celestial],
                }),
            ),
            up(
                "twin-suns",
                "Twin Suns",
                C::Luck,
                "Doubles the chance of Legendary planets",
                "Two lights, one destiny...",
                1200,
                Effect::Special(S::ScaleTier {
                    tier: Legendary,
                    factor: 2.0,
                }),
            ),
            up(
                "void-resonator",
                "Void Resonator",
                C::Luck,
                "Opens faint paths to Cosmic and Divine worlds",
                "The void hums a frequency only the rarest worlds answer...",
                1500,
                Effect::Modifier(vec![(Cosmic, 0.002), (Divine, 0.0005)]),
            ),
            up(
                "quasar-engine",
                "Quasar Engine",
                C::Modifier,
                "10% chance to upgrade Epic planets to Mythic",
                "Focused beams of pure possibility...",
                1800,
                Effect::Special(S::Promote {
                    from: Epic,
                    chance: 0.10,
                }),
            ),
            up(
                "singularity-core",
                "Singularity Core",
                C::Amplifier,
                "Doubles all earned probability bonuses",
                "Everything falls inward, including luck...",
                2500,
                Effect::Special(S::AmplifyBonus { factor: 2.0 }),
            ),
            up(
                "omniversal-key",
                "Omniversal Key",
                C::Luck,
                "0.1% chance that any tier, even Primordial, answers the roll",
                "Every door, every world, every possibility...",
                5000,
                Effect::Special(S::UniversalAccess { chance: 0.001 }),
            ),
        ])
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_iterates_in_catalog_order() {
        let catalog = Catalog::standard();
        let owned: OwnedUpgrades = ["singularity-core", "dark-matter-lens"]
            .into_iter()
            .map(UpgradeId::from)
            .collect();
        let ids: Vec<&str> = catalog.owned(&owned).map(|u| u.id.0.as_str()).collect();
        assert_eq!(ids, vec!["dark-matter-lens", "singularity-core"]);
    }

    #[test]
    fn ownership_insert_reports_novelty() {
        let mut owned = OwnedUpgrades::new();
        assert!(owned.insert(UpgradeId::from("nova-synth")));
        assert!(!owned.insert(UpgradeId::from("nova-synth")));
        assert_eq!(owned.len(), 1);
        assert!(owned.contains("nova-synth"));
    }

    #[test]
    fn lookup_by_id() {
        let catalog = Catalog::standard();
        let prism = catalog.get("quantum-prism").unwrap();
        assert_eq!(prism.cost, 100);
        assert_eq!(prism.effect, Effect::Modifier(vec![(RarityTier::Rare, 0.05)]));
        assert!(catalog.get("missing").is_none());
    }
}
