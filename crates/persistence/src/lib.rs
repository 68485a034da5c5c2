#![deny(warnings)]

//! Persistence layer: the save document and the slots that hold it.
//!
//! Saves are a single JSON record. Decoding never fails: every field, and
//! every history entry, is read independently and falls back to fresh-game
//! defaults when missing or malformed, so a partially corrupted or older save
//! still restores as much as it can.

mod slot;

pub use slot::{FileSlot, MemorySlot, SaveSlot, SlotError};

use chrono::NaiveDate;
use nebula_core::{Planet, RarityTable, RarityTier, HISTORY_CAP, STARTING_REROLLS};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Current save schema version.
pub const SAVE_VERSION: u32 = 1;

/// Returns the default save file location.
pub fn default_save_path() -> &'static str {
    "./saves/planetfall.json"
}

/// Persisted game state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDocument {
    /// Schema version the document was written with.
    pub version: u32,
    pub roll_count: u64,
    pub daily_rerolls: u32,
    /// Day of the last daily reroll refill.
    pub last_reroll_refresh: Option<NaiveDate>,
    /// Effective odds at save time.
    pub probabilities: RarityTable,
    /// Ownership keyed by upgrade id.
    pub upgrades: BTreeMap<String, bool>,
    /// Most recent first.
    pub history: Vec<Planet>,
    pub current_planet: Option<Planet>,
}

impl Default for SaveDocument {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION,
            roll_count: 0,
            daily_rerolls: STARTING_REROLLS,
            last_reroll_refresh: None,
            probabilities: RarityTable::baseline(),
            upgrades: BTreeMap::new(),
            history: Vec::new(),
            current_planet: None,
        }
    }
}

impl SaveDocument {
    /// Ids marked as owned.
    pub fn owned_ids(&self) -> impl Iterator<Item = &str> {
        self.upgrades
            .iter()
            .filter(|(_, owned)| **owned)
            .map(|(id, _)| id.as_str())
    }
}

/// Serialize a document as pretty JSON.
pub fn encode(doc: &SaveDocument) -> Result<String, SlotError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Decode a save, substituting defaults field by field.
pub fn decode(text: &str) -> SaveDocument {
    let mut doc = SaveDocument::default();
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(err) => {
            warn!(%err, "save is not valid JSON; starting fresh");
            return doc;
        }
    };
    let Some(obj) = value.as_object() else {
        warn!("save is not a JSON object; starting fresh");
        return doc;
    };

    if let Some(version) = field::<u32>(obj, "version") {
        if version > SAVE_VERSION {
            warn!(version, "save written by a newer version; reading known fields");
        }
    }
    if let Some(v) = field(obj, "rollCount") {
        doc.roll_count = v;
    }
    if let Some(v) = field(obj, "dailyRerolls") {
        doc.daily_rerolls = v;
    }
    if let Some(v) = field::<Option<NaiveDate>>(obj, "lastRerollRefresh") {
        doc.last_reroll_refresh = v;
    }
    if let Some(v) = obj.get("probabilities") {
        if let Some(table) = decode_table(v) {
            doc.probabilities = table;
        }
    }
    if let Some(v) = obj.get("upgrades") {
        doc.upgrades = decode_upgrades(v);
    }
    // Older saves stored the history under "planets".
    if let Some(v) = obj.get("history").or_else(|| obj.get("planets")) {
        doc.history = decode_history(v);
    }
    if let Some(v) = obj.get("currentPlanet") {
        if !v.is_null() {
            doc.current_planet = decode_planet(v);
        }
    }
    doc
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    let v = obj.get(key)?;
    match serde_json::from_value(v.clone()) {
        Ok(t) => Some(t),
        Err(err) => {
            warn!(key, %err, "ignoring malformed save field");
            None
        }
    }
}

fn decode_table(v: &Value) -> Option<RarityTable> {
    let Some(map) = v.as_object() else {
        warn!("ignoring malformed probability table");
        return None;
    };
    let mut table = RarityTable::zeroed();
    for (key, p) in map {
        match (key.parse::<RarityTier>(), p.as_f64()) {
            (Ok(tier), Some(p)) => table.set(tier, p),
            _ => warn!(key, "ignoring malformed probability entry"),
        }
    }
    Some(table)
}

/// Accepts the current `{id: owned}` map and the older
/// `[{"id": .., "owned": ..}]` list form.
fn decode_upgrades(v: &Value) -> BTreeMap<String, bool> {
    let mut upgrades = BTreeMap::new();
    match v {
        Value::Object(map) => {
            for (id, owned) in map {
                match owned.as_bool() {
                    Some(owned) => {
                        upgrades.insert(id.clone(), owned);
                    }
                    None => warn!(id = id.as_str(), "ignoring malformed upgrade flag"),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                let id = item.get("id").and_then(Value::as_str);
                let owned = item.get("owned").and_then(Value::as_bool);
                match (id, owned) {
                    (Some(id), Some(owned)) => {
                        upgrades.insert(id.to_string(), owned);
                    }
                    _ => warn!("ignoring malformed upgrade entry"),
                }
            }
        }
        _ => warn!("ignoring malformed upgrades field"),
    }
    upgrades
}

fn decode_history(v: &Value) -> Vec<Planet> {
    let Some(items) = v.as_array() else {
        warn!("ignoring malformed history");
        return Vec::new();
    };
    let mut history: Vec<Planet> = items.iter().filter_map(decode_planet).collect();
    history.truncate(HISTORY_CAP);
    history
}

fn decode_planet(v: &Value) -> Option<Planet> {
    match serde_json::from_value(v.clone()) {
        Ok(p) => Some(p),
        Err(err) => {
            warn!(%err, "dropping unreadable planet");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use nebula_core::PlanetId;
    use proptest::prelude::*;

    fn planet(n: u32) -> Planet {
        Planet {
            id: PlanetId(format!("planet-{n}")),
            name: "Xerion".to_string(),
            rarity: RarityTier::Rare,
            kind: "Rocky".to_string(),
            atmosphere: "Toxic".to_string(),
            terrain: "Frozen".to_string(),
            temperature: "Frigid".to_string(),
            traits: vec!["Gravity Wells".to_string(), "Void Portals".to_string()],
            color: "#00BCD4".to_string(),
            size: 99.25,
            discovered_at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn default_path_is_json() {
        assert!(default_save_path().ends_with(".json"));
    }

    #[test]
    fn document_roundtrip() {
        let mut doc = SaveDocument {
            roll_count: 321,
            daily_rerolls: 0,
            last_reroll_refresh: NaiveDate::from_ymd_opt(2026, 10, 18),
            history: vec![planet(2), planet(1)],
            current_planet: Some(planet(2)),
            ..SaveDocument::default()
        };
        doc.upgrades.insert("quantum-prism".to_string(), true);
        doc.upgrades.insert("nova-synth".to_string(), false);
        doc.probabilities.set(RarityTier::Rare, 0.2);

        let text = encode(&doc).unwrap();
        assert!(text.contains("\"rollCount\": 321"));
        assert!(text.contains("\"discoveredAt\": \"2026-01-02T03:04:05Z\""));
        assert_eq!(decode(&text), doc);
    }

    #[test]
    fn garbage_decodes_to_fresh_state() {
        assert_eq!(decode("not json"), SaveDocument::default());
        assert_eq!(decode("[1,2,3]"), SaveDocument::default());
        assert_eq!(decode("{}"), SaveDocument::default());
    }

    #[test]
    fn malformed_fields_fall_back_individually() {
        let text = r##"{
            "rollCount": -4,
            "dailyRerolls": 3,
            "probabilities": {"common": 0.5, "ultra": 0.1, "rare": "high"},
            "upgrades": {"quantum-prism": true, "echo-analyzer": "yes"},
            "history": [
                {"bogus": true},
                {"id": "planet-9", "name": "Lumina", "rarity": "epic", "kind": "Rocky",
                 "atmosphere": "Void", "terrain": "Frozen", "temperature": "Frigid",
                 "traits": ["Tidal Lock"], "color": "#3F51B5", "size": 70.0,
                 "discoveredAt": "2025-12-31T23:59:59.123Z"}
            ],
            "currentPlanet": 12,
            "futureField": {"x": 1}
        }"##;
        let doc = decode(text);
        assert_eq!(doc.roll_count, 0);
        assert_eq!(doc.daily_rerolls, 3);
        assert_eq!(doc.probabilities.get(RarityTier::Common), 0.5);
        assert_eq!(doc.probabilities.get(RarityTier::Rare), 0.0);
        assert_eq!(doc.owned_ids().collect::<Vec<_>>(), vec!["quantum-prism"]);
        assert_eq!(doc.upgrades.len(), 1);
        assert_eq!(doc.history.len(), 1);
        assert_eq!(doc.history[0].rarity, RarityTier::Epic);
        assert_eq!(
            doc.history[0].discovered_at.timestamp_millis(),
            Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59)
                .unwrap()
                .timestamp_millis()
                + 123
        );
        assert!(doc.current_planet.is_none());
    }

    #[test]
    fn legacy_upgrade_list_and_planets_key() {
        let text = r#"{
            "rollCount": 150,
            "upgrades": [
                {"id": "quantum-prism", "owned": true, "cost": 100},
                {"id": "graviton-pulse", "owned": false}
            ],
            "planets": []
        }"#;
        let doc = decode(text);
        assert_eq!(doc.roll_count, 150);
        assert_eq!(doc.upgrades.get("quantum-prism"), Some(&true));
        assert_eq!(doc.upgrades.get("graviton-pulse"), Some(&false));
        assert!(doc.history.is_empty());
    }

    #[test]
    fn history_is_capped_on_load() {
        let doc = SaveDocument {
            history: (0..80).map(planet).collect(),
            ..SaveDocument::default()
        };
        let back = decode(&encode(&doc).unwrap());
        assert_eq!(back.history.len(), HISTORY_CAP);
        assert_eq!(back.history[0].id, PlanetId("planet-0".to_string()));
    }

    proptest! {
        #[test]
        fn decode_never_panics(text in ".{0,200}") {
            let _ = decode(&text);
        }

        #[test]
        fn counters_survive_roundtrip(rolls in any::<u64>(), rerolls in any::<u32>()) {
            let doc = SaveDocument { roll_count: rolls, daily_rerolls: rerolls, ..SaveDocument::default() };
            let back = decode(&encode(&doc).unwrap());
            prop_assert_eq!(back.roll_count, rolls);
            prop_assert_eq!(back.daily_rerolls, rerolls);
        }
    }
}
