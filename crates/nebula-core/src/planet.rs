use crate::RarityTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique planet identifier, e.g. "planet-1760868000000-3fa2c91b0e7d4a15".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlanetId(pub String);

/// A discovered planet. Immutable once created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Planet {
    /// Unique per discovery.
    pub id: PlanetId,
    /// Display name.
    pub name: String,
    /// Rarity tier after all draw rules.
    pub rarity: RarityTier,
    /// Category, e.g. "Gas Giant".
    pub kind: String,
    /// Environment.
    pub atmosphere: String,
    pub terrain: String,
    /// Climate.
    pub temperature: String,
    /// 1-3 distinct flavor traits.
    pub traits: Vec<String>,
    /// Hex color used by the renderer.
    pub color: String,
    /// Magnitude in [50, 150).
    pub size: f64,
    /// Discovery time, serialized as RFC 3339.
    pub discovered_at: DateTime<Utc>,
}

/// Fixed attribute catalogs sampled by the planet factory.
pub mod catalog {
    pub const NAMES: &[&str] = &[
        "Xerion",
        "Valtara",
        "Zephyria",
        "Nebulox",
        "Crystalis",
        "Ethereal",
        "Voidheart",
        "Starweaver",
        "Lumina",
        "Astralux",
        "Oberex",
        "Kalypso",
    ];

    pub const KINDS: &[&str] = &[
        "Gas Giant",
        "Rocky",
        "Ice World",
        "Lava Planet",
        "Crystal World",
        "Void Sphere",
        "Plasma Core",
        "Ethereal Realm",
    ];

    pub const ATMOSPHERES: &[&str] = &[
        "Toxic",
        "Breathable",
        "Corrosive",
        "Crystalline",
        "Void",
        "Plasma",
        "Ethereal",
        "Harmonic",
    ];

    pub const TERRAINS: &[&str] = &[
        "Volcanic",
        "Frozen",
        "Crystalline",
        "Void Rifts",
        "Plasma Fields",
        "Ethereal Gardens",
        "Starlight Plains",
    ];

    pub const TEMPERATURES: &[&str] = &[
        "Scorching",
        "Frigid",
        "Temperate",
        "Absolute Zero",
        "Plasma Hot",
        "Ethereal",
        "Harmonic",
    ];

    pub const TRAITS: &[&str] = &[
        "Magnetic Storms",
        "Time Dilation",
        "Gravity Wells",
        "Crystal Formations",
        "Void Portals",
        "Plasma Geysers",
        "Ethereal Mists",
        "Singing Rings",
        "Tidal Lock",
    ];

    pub const COLORS: &[&str] = &[
        "#9C27B0", "#00BCD4", "#FFEB3B", "#E91E63", "#4CAF50", "#FF9800", "#3F51B5", "#F44336",
    ];

    /// Size range, lower bound inclusive.
    pub const SIZE_MIN: f64 = 50.0;
    pub const SIZE_MAX: f64 = 150.0;
}
